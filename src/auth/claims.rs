// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 The Fly Shop

//! Verified token claims and the resolved request principal.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::roles::Role;

/// Claims accepted from a verified identity-provider token.
///
/// Standard OIDC profile claims are decoded into named fields; everything
/// else the token carries lands in `extra`, where the email resolver can
/// scan for namespaced custom claims.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifiedClaims {
    /// Subject: the provider's stable unique identifier for the caller
    pub sub: String,

    /// Email, when the provider includes it in the token
    #[serde(default)]
    pub email: Option<String>,

    /// Display name
    #[serde(default)]
    pub name: Option<String>,

    /// Provider nickname
    #[serde(default)]
    pub nickname: Option<String>,

    /// Preferred username (often an email for social logins)
    #[serde(default)]
    pub preferred_username: Option<String>,

    /// Avatar URL
    #[serde(default)]
    pub picture: Option<String>,

    /// Expiration timestamp (validated by jsonwebtoken, kept for diagnostics)
    #[serde(default)]
    pub exp: i64,

    /// Issuer
    #[serde(default)]
    pub iss: String,

    /// Remaining claims, including provider-namespaced custom claims
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// The resolved identity and role of a caller.
///
/// Built fresh on every request from verified claims; the role is always
/// computed by the role resolver, never read from the token.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Principal {
    /// Provider-issued stable subject identifier
    pub subject_id: String,

    /// Email, possibly recovered from a fallback source
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Avatar URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture_url: Option<String>,

    /// Resolved role
    pub role: Role,
}

impl Principal {
    /// Assemble a principal from verified claims, the resolved email, and
    /// the computed role.
    pub fn new(claims: &VerifiedClaims, email: Option<String>, role: Role) -> Self {
        Self {
            subject_id: claims.sub.clone(),
            email,
            display_name: claims.name.clone(),
            picture_url: claims.picture.clone(),
            role,
        }
    }

    /// Check if this principal is an admin.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
