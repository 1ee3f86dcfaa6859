// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 The Fly Shop

//! Diagnostic endpoint for troubleshooting auth and admin access.
//!
//! Operators use this to answer "why does this caller (not) have
//! admin?". It reports every stage of the resolution chain read-only:
//! it never persists a user record and never reveals the allow-list
//! entries themselves. Any valid credential may call it; the role
//! decision is reported, not enforced.

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::email::email_from_claims;
use crate::auth::{
    extract_credentials, AuthError, Role, RoleDecision, RoleResolver, ACCESS_TOKEN_HEADER,
};
use crate::state::AppState;

/// Structured snapshot of one caller's resolution chain.
#[derive(Debug, Serialize, ToSchema)]
pub struct DebugReport {
    pub timestamp: DateTime<Utc>,
    pub environment: EnvironmentReport,
    pub headers: HeadersReport,
    pub auth: AuthReport,
    pub role: RoleReport,
    pub storage: StorageReport,
    /// Actionable suggestions derived from the above.
    pub hints: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EnvironmentReport {
    pub issuer_configured: bool,
    /// Entry count only; the list contents are never reported.
    pub allow_list_count: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HeadersReport {
    pub has_authorization: bool,
    pub has_access_token: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthReport {
    /// Always true in a delivered report; failures reject with 401.
    pub verified: bool,
    pub subject_id: String,
    pub email_in_token: bool,
    pub email: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RoleReport {
    pub role: Role,
    #[schema(value_type = String)]
    pub decision: RoleDecision,
    pub decision_reason: String,
    pub record_exists: bool,
    pub stored_email: Option<String>,
    pub stored_role: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StorageReport {
    pub reachable: bool,
}

/// Get a diagnostic report for the calling credential.
///
/// Requires a valid (not necessarily admin) bearer token; fails with the
/// same 401 codes as every protected endpoint.
#[utoipa::path(
    get,
    path = "/v1/auth/debug",
    tag = "Auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Diagnostic report", body = DebugReport),
        (status = 401, description = "Invalid or missing token"),
    )
)]
pub async fn get_auth_debug(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<DebugReport>, AuthError> {
    let credentials = extract_credentials(&headers);

    let claims = state
        .auth
        .verifier
        .verify(credentials.bearer_token.as_deref())
        .await?;

    // Token-only email resolution; the user-info fallback is skipped so
    // the report reflects what the token itself establishes.
    let email = email_from_claims(&claims);

    let resolver = RoleResolver::new(&state.auth.allow_list, &state.store);
    let resolution = resolver.peek(&claims, email.as_deref());

    let storage_reachable = state.store.health_check().is_ok();

    let mut hints = Vec::new();
    if email.is_none() {
        hints.push(format!(
            "Email is missing from the token. Add the subject id to the allow-list instead: {}",
            claims.sub
        ));
    }
    if state.auth.allow_list.is_empty() {
        hints.push("The administrator allow-list is empty; no caller can be granted admin from configuration.".to_string());
    }
    if !storage_reachable {
        hints.push(
            "User record storage is unreachable; only allow-list admin grants are in effect."
                .to_string(),
        );
    }
    if resolution.role == Role::Admin {
        hints.push(format!(
            "Admin access will be granted: {}",
            resolution.decision.describe()
        ));
    }

    let report = DebugReport {
        timestamp: Utc::now(),
        environment: EnvironmentReport {
            issuer_configured: state.auth.verifier.issuer_config().is_some(),
            allow_list_count: state.auth.allow_list.len(),
        },
        headers: HeadersReport {
            has_authorization: headers.contains_key(AUTHORIZATION),
            has_access_token: headers.contains_key(ACCESS_TOKEN_HEADER),
        },
        auth: AuthReport {
            verified: true,
            subject_id: claims.sub.clone(),
            email_in_token: claims.email.as_deref().is_some_and(|e| !e.is_empty()),
            email,
        },
        role: RoleReport {
            role: resolution.role,
            decision: resolution.decision,
            decision_reason: resolution.decision.describe().to_string(),
            record_exists: resolution.record.is_some(),
            stored_email: resolution.record.as_ref().and_then(|r| r.email.clone()),
            stored_role: resolution.record.as_ref().map(|r| r.role.clone()),
        },
        storage: StorageReport {
            reachable: storage_reachable,
        },
        hints,
    };

    Ok(Json(report))
}
