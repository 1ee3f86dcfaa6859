// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 The Fly Shop

//! Caller identity endpoint.

use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::{Auth, Principal, Role};

/// Response for GET /v1/users/me
#[derive(Debug, Serialize, ToSchema)]
pub struct UserMeResponse {
    /// Provider subject id
    pub subject_id: String,
    /// Resolved email, when one could be recovered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture_url: Option<String>,
    /// Resolved role
    pub role: Role,
}

impl From<Principal> for UserMeResponse {
    fn from(principal: Principal) -> Self {
        Self {
            subject_id: principal.subject_id,
            email: principal.email,
            display_name: principal.display_name,
            picture_url: principal.picture_url,
            role: principal.role,
        }
    }
}

/// Get the current authenticated caller.
///
/// Resolving the caller also upserts their user record, so the frontend
/// calls this once after login to establish the profile.
#[utoipa::path(
    get,
    path = "/v1/users/me",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Resolved caller identity", body = UserMeResponse),
        (status = 401, description = "Invalid or missing token"),
    )
)]
pub async fn get_current_user(Auth(principal): Auth) -> Json<UserMeResponse> {
    Json(principal.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_copies_principal_fields() {
        let principal = Principal {
            subject_id: "auth0|abc".to_string(),
            email: Some("angler@example.com".to_string()),
            display_name: Some("River Angler".to_string()),
            picture_url: None,
            role: Role::User,
        };

        let response: UserMeResponse = principal.into();
        assert_eq!(response.subject_id, "auth0|abc");
        assert_eq!(response.email.as_deref(), Some("angler@example.com"));
        assert_eq!(response.role, Role::User);
    }
}
