// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 The Fly Shop

//! Request credential extraction and the `Auth` / `AdminOnly` extractors.
//!
//! `Auth` composes the whole resolution chain: header extraction, token
//! verification, email resolution, role resolution with record
//! write-back. Handlers receive a finished `Principal`:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(principal): Auth) -> impl IntoResponse {
//!     // principal.subject_id, principal.role, ...
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use super::claims::Principal;
use super::email::resolve_email;
use super::error::AuthError;
use super::resolver::RoleResolver;
use crate::state::AppState;

/// The secondary credential header, accepted only as fallback input to
/// the user-info email lookup.
pub const ACCESS_TOKEN_HEADER: &str = "x-access-token";

/// Credentials pulled from request headers. Absence is represented, not
/// an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Token following the `Bearer ` prefix of `Authorization`
    pub bearer_token: Option<String>,
    /// Raw value of the secondary access-token header
    pub access_token: Option<String>,
}

/// Extract credentials from headers. The `Bearer ` prefix match is
/// case-sensitive; anything else reads as no token.
pub fn extract_credentials(headers: &HeaderMap) -> Credentials {
    let bearer_token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
        .map(str::to_string);

    let access_token = headers
        .get(ACCESS_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|token| !token.is_empty())
        .map(str::to_string);

    Credentials {
        bearer_token,
        access_token,
    }
}

/// Extractor for authenticated callers.
///
/// Verifies the bearer token, resolves email and role, and persists the
/// merged user record. Rejects with 401 on any verification failure.
pub struct Auth(pub Principal);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // A principal already placed in extensions (tests, pre-auth
        // layers) wins over re-running the chain.
        if let Some(principal) = parts.extensions.get::<Principal>().cloned() {
            return Ok(Auth(principal));
        }

        let credentials = extract_credentials(&parts.headers);

        let claims = state
            .auth
            .verifier
            .verify(credentials.bearer_token.as_deref())
            .await?;

        let email = resolve_email(
            &claims,
            credentials.access_token.as_deref(),
            state.auth.userinfo.as_ref(),
        )
        .await;

        let resolver = RoleResolver::new(&state.auth.allow_list, &state.store);
        let resolution = resolver.resolve(&claims, email.as_deref());

        Ok(Auth(Principal::new(&claims, email, resolution.role)))
    }
}

/// Extractor that additionally requires the admin role. Rejects with 403
/// for a valid non-admin credential.
pub struct AdminOnly(pub Principal);

impl FromRequestParts<AppState> for AdminOnly {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Auth(principal) = Auth::from_request_parts(parts, state).await?;

        if !principal.is_admin() {
            return Err(AuthError::InsufficientPermissions);
        }

        Ok(AdminOnly(principal))
    }
}
