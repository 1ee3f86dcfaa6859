// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 The Fly Shop

//! The shared fly pattern catalog.
//!
//! Reading is public so the storefront renders without a login; writes
//! require a valid credential.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::auth::Auth;
use crate::error::ApiError;
use crate::models::{CatalogItem, UpdateCatalogRequest};
use crate::state::AppState;
use crate::storage::CatalogRepository;

#[derive(Debug, Serialize, ToSchema)]
pub struct CatalogResponse {
    pub message: String,
    pub catalog: Vec<CatalogItem>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct RemovePatternParams {
    /// Name of the pattern to delete
    pub name: Option<String>,
}

/// List the catalog. Public.
#[utoipa::path(
    get,
    path = "/v1/catalog",
    tag = "Catalog",
    responses(
        (status = 200, description = "All catalog patterns", body = [CatalogItem]),
    )
)]
pub async fn list_catalog(
    State(state): State<AppState>,
) -> Result<Json<Vec<CatalogItem>>, ApiError> {
    let catalog = CatalogRepository::new(&state.store).get()?;
    Ok(Json(catalog))
}

/// Add a pattern to the catalog.
#[utoipa::path(
    post,
    path = "/v1/catalog",
    tag = "Catalog",
    security(("bearer" = [])),
    request_body = CatalogItem,
    responses(
        (status = 200, description = "Pattern added", body = CatalogResponse),
        (status = 401, description = "Invalid or missing token"),
    )
)]
pub async fn add_pattern(
    Auth(_principal): Auth,
    State(state): State<AppState>,
    Json(item): Json<CatalogItem>,
) -> Result<Json<CatalogResponse>, ApiError> {
    let repo = CatalogRepository::new(&state.store);
    let mut catalog: Vec<CatalogItem> = repo.get()?;
    catalog.push(item);
    repo.put(&catalog)?;

    Ok(Json(CatalogResponse {
        message: "Fly pattern added".to_string(),
        catalog,
    }))
}

/// Replace a catalog pattern by its current name.
#[utoipa::path(
    put,
    path = "/v1/catalog",
    tag = "Catalog",
    security(("bearer" = [])),
    request_body = UpdateCatalogRequest,
    responses(
        (status = 200, description = "Pattern updated", body = CatalogResponse),
        (status = 401, description = "Invalid or missing token"),
        (status = 404, description = "No pattern with that name"),
    )
)]
pub async fn update_pattern(
    Auth(_principal): Auth,
    State(state): State<AppState>,
    Json(body): Json<UpdateCatalogRequest>,
) -> Result<Json<CatalogResponse>, ApiError> {
    let repo = CatalogRepository::new(&state.store);
    let mut catalog: Vec<CatalogItem> = repo.get()?;

    let slot = catalog
        .iter_mut()
        .find(|item| item.name == body.original_name)
        .ok_or_else(|| ApiError::not_found("Fly pattern not found"))?;
    *slot = body.item;

    repo.put(&catalog)?;
    Ok(Json(CatalogResponse {
        message: "Fly pattern updated".to_string(),
        catalog,
    }))
}

/// Delete a catalog pattern by name.
#[utoipa::path(
    delete,
    path = "/v1/catalog",
    tag = "Catalog",
    security(("bearer" = [])),
    params(RemovePatternParams),
    responses(
        (status = 200, description = "Pattern deleted", body = CatalogResponse),
        (status = 400, description = "Missing name parameter"),
        (status = 401, description = "Invalid or missing token"),
        (status = 404, description = "No pattern with that name"),
    )
)]
pub async fn remove_pattern(
    Auth(_principal): Auth,
    State(state): State<AppState>,
    Query(params): Query<RemovePatternParams>,
) -> Result<Json<CatalogResponse>, ApiError> {
    let name = params
        .name
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing fly name parameter"))?;

    let repo = CatalogRepository::new(&state.store);
    let mut catalog: Vec<CatalogItem> = repo.get()?;

    let before = catalog.len();
    catalog.retain(|item| item.name != name);
    if catalog.len() == before {
        return Err(ApiError::not_found("Fly pattern not found"));
    }

    repo.put(&catalog)?;
    Ok(Json(CatalogResponse {
        message: "Fly pattern deleted".to_string(),
        catalog,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Principal, Role};
    use crate::state::test_support::test_state;
    use axum::http::StatusCode;

    fn auth() -> Auth {
        Auth(Principal {
            subject_id: "auth0|abc".to_string(),
            email: None,
            display_name: None,
            picture_url: None,
            role: Role::User,
        })
    }

    fn item(name: &str) -> CatalogItem {
        CatalogItem {
            name: name.to_string(),
            pattern_type: "Streamer".to_string(),
            best_for: Some("Trout, Bass".to_string()),
            description: None,
            image: None,
            recipe: None,
        }
    }

    #[tokio::test]
    async fn catalog_starts_empty() {
        let (state, _dir) = test_state();
        let Json(catalog) = list_catalog(State(state)).await.unwrap();
        assert!(catalog.is_empty());
    }

    #[tokio::test]
    async fn add_update_delete_round_trip() {
        let (state, _dir) = test_state();

        add_pattern(auth(), State(state.clone()), Json(item("Woolly Bugger")))
            .await
            .unwrap();

        let Json(response) = update_pattern(
            auth(),
            State(state.clone()),
            Json(UpdateCatalogRequest {
                original_name: "Woolly Bugger".to_string(),
                item: item("Woolly Bugger - Olive"),
            }),
        )
        .await
        .unwrap();
        assert_eq!(response.catalog[0].name, "Woolly Bugger - Olive");

        remove_pattern(
            auth(),
            State(state.clone()),
            Query(RemovePatternParams {
                name: Some("Woolly Bugger - Olive".to_string()),
            }),
        )
        .await
        .unwrap();

        let Json(catalog) = list_catalog(State(state)).await.unwrap();
        assert!(catalog.is_empty());
    }

    #[tokio::test]
    async fn update_unknown_pattern_404s() {
        let (state, _dir) = test_state();
        let err = update_pattern(
            auth(),
            State(state),
            Json(UpdateCatalogRequest {
                original_name: "Ghost".to_string(),
                item: item("Ghost"),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_unknown_pattern_404s() {
        let (state, _dir) = test_state();
        let err = remove_pattern(
            auth(),
            State(state),
            Query(RemovePatternParams {
                name: Some("Ghost".to_string()),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
