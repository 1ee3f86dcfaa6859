// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 The Fly Shop

//! Per-user shopping list.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::auth::Auth;
use crate::error::ApiError;
use crate::models::{self, AddPatternRequest, SetQuantityRequest, ShoppingItem};
use crate::state::AppState;
use crate::storage::ListRepository;

#[derive(Debug, Serialize, ToSchema)]
pub struct ListMessageResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct RemoveItemParams {
    /// Name of the line to remove
    pub name: Option<String>,
    /// Clear the whole list instead
    #[serde(default)]
    pub all: Option<bool>,
}

/// List the caller's shopping list.
#[utoipa::path(
    get,
    path = "/v1/shopping-list",
    tag = "Shopping",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "The caller's shopping list", body = [ShoppingItem]),
        (status = 401, description = "Invalid or missing token"),
    )
)]
pub async fn list_items(
    Auth(principal): Auth,
    State(state): State<AppState>,
) -> Result<Json<Vec<ShoppingItem>>, ApiError> {
    let items = ListRepository::shopping_list(&state.store).get(&principal.subject_id)?;
    Ok(Json(items))
}

/// Add a pattern to the shopping list. Re-adding a listed name bumps
/// its quantity by one.
#[utoipa::path(
    post,
    path = "/v1/shopping-list",
    tag = "Shopping",
    security(("bearer" = [])),
    request_body = AddPatternRequest,
    responses(
        (status = 200, description = "Added or bumped", body = ListMessageResponse),
        (status = 401, description = "Invalid or missing token"),
    )
)]
pub async fn add_item(
    Auth(principal): Auth,
    State(state): State<AppState>,
    Json(body): Json<AddPatternRequest>,
) -> Result<Json<ListMessageResponse>, ApiError> {
    let repo = ListRepository::shopping_list(&state.store);
    let mut items: Vec<ShoppingItem> = repo.get(&principal.subject_id)?;

    let quantity = models::add_to_shopping_list(&mut items, body.into_shopping_item(Utc::now()));
    repo.put(&principal.subject_id, &items)?;

    let message = if quantity > 1 {
        "Quantity updated"
    } else {
        "Added to shopping list"
    };
    Ok(Json(ListMessageResponse {
        message: message.to_string(),
        quantity: Some(quantity),
    }))
}

/// Set the quantity of a listed line. Unknown names are ignored, which
/// keeps the operation idempotent for a stale frontend.
#[utoipa::path(
    put,
    path = "/v1/shopping-list",
    tag = "Shopping",
    security(("bearer" = [])),
    request_body = SetQuantityRequest,
    responses(
        (status = 200, description = "Quantity updated", body = ListMessageResponse),
        (status = 401, description = "Invalid or missing token"),
    )
)]
pub async fn set_quantity(
    Auth(principal): Auth,
    State(state): State<AppState>,
    Json(body): Json<SetQuantityRequest>,
) -> Result<Json<ListMessageResponse>, ApiError> {
    let repo = ListRepository::shopping_list(&state.store);
    let mut items: Vec<ShoppingItem> = repo.get(&principal.subject_id)?;

    if let Some(item) = items.iter_mut().find(|item| item.name == body.name) {
        item.quantity = body.quantity;
        item.updated_at = Utc::now();
        repo.put(&principal.subject_id, &items)?;
    }

    Ok(Json(ListMessageResponse {
        message: "Quantity updated".to_string(),
        quantity: Some(body.quantity),
    }))
}

/// Remove a line by name, or clear the list with `all=true`.
#[utoipa::path(
    delete,
    path = "/v1/shopping-list",
    tag = "Shopping",
    security(("bearer" = [])),
    params(RemoveItemParams),
    responses(
        (status = 200, description = "Removed or cleared", body = ListMessageResponse),
        (status = 400, description = "Missing name parameter"),
        (status = 401, description = "Invalid or missing token"),
    )
)]
pub async fn remove_items(
    Auth(principal): Auth,
    State(state): State<AppState>,
    Query(params): Query<RemoveItemParams>,
) -> Result<Json<ListMessageResponse>, ApiError> {
    let repo = ListRepository::shopping_list(&state.store);

    if params.all == Some(true) {
        repo.put::<ShoppingItem>(&principal.subject_id, &[])?;
        return Ok(Json(ListMessageResponse {
            message: "Shopping list cleared".to_string(),
            quantity: None,
        }));
    }

    let name = params
        .name
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing fly name parameter"))?;

    let mut items: Vec<ShoppingItem> = repo.get(&principal.subject_id)?;
    items.retain(|item| item.name != name);
    repo.put(&principal.subject_id, &items)?;

    Ok(Json(ListMessageResponse {
        message: "Removed from shopping list".to_string(),
        quantity: None,
    }))
}
