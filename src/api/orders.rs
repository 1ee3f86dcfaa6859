// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 The Fly Shop

//! Order placement from the shopping list.

use axum::{extract::State, Json};
use chrono::Utc;

use crate::auth::Auth;
use crate::error::ApiError;
use crate::models::{self, Order, PlaceOrderRequest, ShoppingItem};
use crate::state::AppState;
use crate::storage::ListRepository;

/// List the caller's orders, newest first.
#[utoipa::path(
    get,
    path = "/v1/orders",
    tag = "Shopping",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "The caller's orders", body = [Order]),
        (status = 401, description = "Invalid or missing token"),
    )
)]
pub async fn list_orders(
    Auth(principal): Auth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Order>>, ApiError> {
    let orders = ListRepository::orders(&state.store).get(&principal.subject_id)?;
    Ok(Json(orders))
}

/// Place an order from the current shopping list.
///
/// Snapshots the list into an order, prepends it to the order history,
/// and clears the list. An empty list is a 400.
#[utoipa::path(
    post,
    path = "/v1/orders",
    tag = "Shopping",
    security(("bearer" = [])),
    request_body = PlaceOrderRequest,
    responses(
        (status = 200, description = "The placed order", body = Order),
        (status = 400, description = "Shopping list is empty"),
        (status = 401, description = "Invalid or missing token"),
    )
)]
pub async fn place_order(
    Auth(principal): Auth,
    State(state): State<AppState>,
    body: Option<Json<PlaceOrderRequest>>,
) -> Result<Json<Order>, ApiError> {
    let notes = body.and_then(|Json(request)| request.notes);

    let list_repo = ListRepository::shopping_list(&state.store);
    let list: Vec<ShoppingItem> = list_repo.get(&principal.subject_id)?;
    if list.is_empty() {
        return Err(ApiError::bad_request(
            "Shopping list is empty. Add items before placing an order.",
        ));
    }

    let order = models::build_order(&list, notes, Utc::now());

    let orders_repo = ListRepository::orders(&state.store);
    let mut orders: Vec<Order> = orders_repo.get(&principal.subject_id)?;
    orders.insert(0, order.clone());
    orders_repo.put(&principal.subject_id, &orders)?;

    list_repo.put::<ShoppingItem>(&principal.subject_id, &[])?;

    Ok(Json(order))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Principal, Role};
    use crate::models::AddPatternRequest;
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

    fn seed_list(state: &AppState, subject: &str) {
        let request = AddPatternRequest {
            name: "Muddler Minnow".to_string(),
            pattern_type: "Streamer".to_string(),
            best_for: None,
            description: None,
            image: None,
            recipe: None,
            price: Some(2.75),
        };
        let mut items = Vec::new();
        models::add_to_shopping_list(&mut items, request.into_shopping_item(Utc::now()));
        ListRepository::shopping_list(&state.store)
            .put(subject, &items)
            .unwrap();
    }

    #[tokio::test]
    async fn empty_list_rejects_order() {
        let (state, _dir) = test_state();
        let err = place_order(auth("auth0|a"), State(state), None)
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn placing_order_clears_list_and_prepends() {
        let (state, _dir) = test_state();
        seed_list(&state, "auth0|a");

        let Json(order) = place_order(auth("auth0|a"), State(state.clone()), None)
            .await
            .unwrap();
        assert_eq!(order.status, "pending");
        assert_eq!(order.total_flies, 1);

        // List is cleared, order is recorded.
        let list: Vec<ShoppingItem> = ListRepository::shopping_list(&state.store)
            .get("auth0|a")
            .unwrap();
        assert!(list.is_empty());

        seed_list(&state, "auth0|a");
        let Json(second) = place_order(
            auth("auth0|a"),
            State(state.clone()),
            Some(Json(PlaceOrderRequest {
                notes: Some("rush".to_string()),
            })),
        )
        .await
        .unwrap();

        let Json(orders) = list_orders(auth("auth0|a"), State(state)).await.unwrap();
        assert_eq!(orders.len(), 2);
        // Newest first.
        assert_eq!(orders[0].id, second.id);
        assert_eq!(orders[0].notes.as_deref(), Some("rush"));
    }
}
