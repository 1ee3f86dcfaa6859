// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 The Fly Shop

//! Per-user favorite fly patterns.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::auth::Auth;
use crate::error::ApiError;
use crate::models::{self, AddPatternRequest, FavoriteItem};
use crate::state::AppState;
use crate::storage::ListRepository;

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct RemoveFavoriteParams {
    /// Name of the pattern to remove
    pub name: Option<String>,
}

/// List the caller's favorites.
#[utoipa::path(
    get,
    path = "/v1/favorites",
    tag = "Favorites",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "The caller's favorites", body = [FavoriteItem]),
        (status = 401, description = "Invalid or missing token"),
    )
)]
pub async fn list_favorites(
    Auth(principal): Auth,
    State(state): State<AppState>,
) -> Result<Json<Vec<FavoriteItem>>, ApiError> {
    let favorites = ListRepository::favorites(&state.store).get(&principal.subject_id)?;
    Ok(Json(favorites))
}

/// Add a pattern to the caller's favorites. Adding a name twice is a
/// no-op, matching the toggle behavior of the frontend.
#[utoipa::path(
    post,
    path = "/v1/favorites",
    tag = "Favorites",
    security(("bearer" = [])),
    request_body = AddPatternRequest,
    responses(
        (status = 200, description = "Added (or already present)", body = MessageResponse),
        (status = 401, description = "Invalid or missing token"),
    )
)]
pub async fn add_favorite(
    Auth(principal): Auth,
    State(state): State<AppState>,
    Json(body): Json<AddPatternRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let repo = ListRepository::favorites(&state.store);
    let mut favorites: Vec<FavoriteItem> = repo.get(&principal.subject_id)?;

    if models::add_favorite(&mut favorites, body.into_favorite(Utc::now())) {
        repo.put(&principal.subject_id, &favorites)?;
    }

    Ok(Json(MessageResponse {
        message: "Added to favorites".to_string(),
    }))
}

/// Remove a pattern from the caller's favorites by name.
#[utoipa::path(
    delete,
    path = "/v1/favorites",
    tag = "Favorites",
    security(("bearer" = [])),
    params(RemoveFavoriteParams),
    responses(
        (status = 200, description = "Removed", body = MessageResponse),
        (status = 400, description = "Missing name parameter"),
        (status = 401, description = "Invalid or missing token"),
    )
)]
pub async fn remove_favorite(
    Auth(principal): Auth,
    State(state): State<AppState>,
    Query(params): Query<RemoveFavoriteParams>,
) -> Result<Json<MessageResponse>, ApiError> {
    let name = params
        .name
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing fly name parameter"))?;

    let repo = ListRepository::favorites(&state.store);
    let mut favorites: Vec<FavoriteItem> = repo.get(&principal.subject_id)?;
    favorites.retain(|f| f.name != name);
    repo.put(&principal.subject_id, &favorites)?;

    Ok(Json(MessageResponse {
        message: "Removed from favorites".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Principal, Role};
    use crate::state::test_support::test_state;
    use axum::http::StatusCode;

    fn auth(subject: &str) -> Auth {
        Auth(Principal {
            subject_id: subject.to_string(),
            email: None,
            display_name: None,
            picture_url: None,
            role: Role::User,
        })
    }

    fn pattern(name: &str) -> AddPatternRequest {
        AddPatternRequest {
            name: name.to_string(),
            pattern_type: "Streamer".to_string(),
            best_for: None,
            description: None,
            image: None,
            recipe: None,
            price: None,
        }
    }

    #[tokio::test]
    async fn add_list_remove_round_trip() {
        let (state, _dir) = test_state();

        add_favorite(
            auth("auth0|a"),
            State(state.clone()),
            Json(pattern("Woolly Bugger")),
        )
        .await
        .unwrap();

        let Json(listed) = list_favorites(auth("auth0|a"), State(state.clone()))
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);

        remove_favorite(
            auth("auth0|a"),
            State(state.clone()),
            Query(RemoveFavoriteParams {
                name: Some("Woolly Bugger".to_string()),
            }),
        )
        .await
        .unwrap();

        let Json(listed) = list_favorites(auth("auth0|a"), State(state)).await.unwrap();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn duplicate_add_is_noop() {
        let (state, _dir) = test_state();

        for _ in 0..2 {
            add_favorite(
                auth("auth0|a"),
                State(state.clone()),
                Json(pattern("Adams")),
            )
            .await
            .unwrap();
        }

        let Json(listed) = list_favorites(auth("auth0|a"), State(state)).await.unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn remove_requires_name() {
        let (state, _dir) = test_state();
        let err = remove_favorite(
            auth("auth0|a"),
            State(state),
            Query(RemoveFavoriteParams { name: None }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}
