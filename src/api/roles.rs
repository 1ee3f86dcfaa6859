// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 The Fly Shop

//! Admin-only role administration.
//!
//! GET  /v1/roles — list all known users with their persisted roles
//! PUT  /v1/roles — set a user's persisted role

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{AdminOnly, Role};
use crate::error::ApiError;
use crate::state::AppState;
use crate::storage::UserRepository;

/// One user in the role listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserRoleEntry {
    pub subject_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture_url: Option<String>,
    pub role: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Body for PUT /v1/roles.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRoleRequest {
    pub subject_id: String,
    /// Must be `admin` or `user`
    pub role: String,
}

/// Response for PUT /v1/roles.
#[derive(Debug, Serialize, ToSchema)]
pub struct UpdateRoleResponse {
    pub message: String,
    pub user: UserRoleEntry,
}

/// List all known users and their roles.
#[utoipa::path(
    get,
    path = "/v1/roles",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "All known users", body = [UserRoleEntry]),
        (status = 401, description = "Invalid or missing token"),
        (status = 403, description = "Caller is not an admin"),
    )
)]
pub async fn list_users(
    _admin: AdminOnly,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserRoleEntry>>, ApiError> {
    let repo = UserRepository::new(&state.store);
    let users = repo
        .list()?
        .into_iter()
        .map(|record| UserRoleEntry {
            subject_id: record.subject_id,
            email: record.email,
            display_name: record.display_name,
            picture_url: record.picture_url,
            role: record.role,
            created_at: record.created_at,
        })
        .collect();
    Ok(Json(users))
}

/// Set a user's persisted role.
#[utoipa::path(
    put,
    path = "/v1/roles",
    tag = "Users",
    security(("bearer" = [])),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = UpdateRoleResponse),
        (status = 400, description = "Unknown role value"),
        (status = 401, description = "Invalid or missing token"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "No record for the subject"),
    )
)]
pub async fn update_role(
    _admin: AdminOnly,
    State(state): State<AppState>,
    Json(body): Json<UpdateRoleRequest>,
) -> Result<Json<UpdateRoleResponse>, ApiError> {
    let role = Role::from_str(&body.role)
        .ok_or_else(|| ApiError::bad_request(r#"Role must be "admin" or "user""#))?;

    let repo = UserRepository::new(&state.store);
    let record = repo.set_role(&body.subject_id, role)?;

    Ok(Json(UpdateRoleResponse {
        message: "Role updated".to_string(),
        user: UserRoleEntry {
            subject_id: record.subject_id,
            email: record.email,
            display_name: record.display_name,
            picture_url: record.picture_url,
            role: record.role,
            created_at: record.created_at,
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Principal;
    use crate::state::test_support::test_state;
    use crate::storage::{ProfileUpdate, UserRecord};
    use axum::http::StatusCode;
    use chrono::Utc;

    fn admin() -> AdminOnly {
        AdminOnly(Principal {
            subject_id: "auth0|admin".to_string(),
            email: None,
            display_name: None,
            picture_url: None,
            role: Role::Admin,
        })
    }

    fn seed_user(state: &AppState, subject: &str) {
        let record = UserRecord::merged(
            None,
            &ProfileUpdate {
                subject_id: subject.to_string(),
                email: Some(format!("{subject}@example.com")),
                ..Default::default()
            },
            false,
            Utc::now(),
        );
        UserRepository::new(&state.store).save(&record).unwrap();
    }

    #[tokio::test]
    async fn list_returns_seeded_users() {
        let (state, _dir) = test_state();
        seed_user(&state, "auth0|a");
        seed_user(&state, "auth0|b");

        let Json(users) = list_users(admin(), State(state)).await.unwrap();
        assert_eq!(users.len(), 2);
        assert!(users.iter().all(|u| u.role == "user"));
    }

    #[tokio::test]
    async fn update_role_promotes_user() {
        let (state, _dir) = test_state();
        seed_user(&state, "auth0|a");

        let Json(response) = update_role(
            admin(),
            State(state.clone()),
            Json(UpdateRoleRequest {
                subject_id: "auth0|a".to_string(),
                role: "admin".to_string(),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.user.role, "admin");
        let stored = UserRepository::new(&state.store)
            .get("auth0|a")
            .unwrap()
            .unwrap();
        assert!(stored.is_admin());
    }

    #[tokio::test]
    async fn update_role_rejects_unknown_role() {
        let (state, _dir) = test_state();
        seed_user(&state, "auth0|a");

        let err = update_role(
            admin(),
            State(state),
            Json(UpdateRoleRequest {
                subject_id: "auth0|a".to_string(),
                role: "superuser".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn update_role_404s_on_unknown_subject() {
        let (state, _dir) = test_state();

        let err = update_role(
            admin(),
            State(state),
            Json(UpdateRoleRequest {
                subject_id: "auth0|missing".to_string(),
                role: "admin".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
