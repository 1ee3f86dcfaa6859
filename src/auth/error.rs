// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 The Fly Shop

//! Authentication and authorization errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Verification-stage and admin-gate failures.
///
/// The four verification kinds are terminal for the request and map to
/// 401 with a machine-readable code, so a client can tell an expired
/// session (re-authenticate) from a forged token or a deployment problem.
/// `InsufficientPermissions` is the admin gate and maps to 403.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// No bearer token in the request
    NoToken,
    /// Issuer domain or audience is not configured on the server
    ServerMisconfigured,
    /// Token expiry is more than the leeway in the past
    TokenExpired,
    /// Any other verification failure: bad signature, wrong issuer or
    /// audience, malformed token, unusable key material
    TokenInvalid,
    /// Valid credential, but the operation requires the admin role
    InsufficientPermissions,
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Machine-readable code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::NoToken => "no_token",
            AuthError::ServerMisconfigured => "server_misconfigured",
            AuthError::TokenExpired => "token_expired",
            AuthError::TokenInvalid => "token_invalid",
            AuthError::InsufficientPermissions => "insufficient_permissions",
        }
    }

    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::NoToken
            | AuthError::ServerMisconfigured
            | AuthError::TokenExpired
            | AuthError::TokenInvalid => StatusCode::UNAUTHORIZED,
            AuthError::InsufficientPermissions => StatusCode::FORBIDDEN,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::NoToken => write!(f, "Authorization bearer token is required"),
            AuthError::ServerMisconfigured => {
                write!(f, "Identity provider is not configured on the server")
            }
            AuthError::TokenExpired => write!(f, "Token has expired"),
            AuthError::TokenInvalid => write!(f, "Token verification failed"),
            AuthError::InsufficientPermissions => {
                write!(f, "Admin access required for this operation")
            }
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}
