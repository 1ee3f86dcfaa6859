// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 The Fly Shop

use axum::{
    extract::Request,
    http::{header, HeaderName, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{claims::Principal, roles::Role, ACCESS_TOKEN_HEADER},
    models::{
        AddPatternRequest, CatalogItem, FavoriteItem, Order, OrderItem, PlaceOrderRequest,
        SetQuantityRequest, ShoppingItem, UpdateCatalogRequest,
    },
    state::AppState,
    storage::UserRecord,
};

pub mod auth_config;
pub mod catalog;
pub mod debug;
pub mod favorites;
pub mod health;
pub mod orders;
pub mod roles;
pub mod shopping_list;
pub mod users;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/auth/config", get(auth_config::get_auth_config))
        .route("/auth/debug", get(debug::get_auth_debug))
        .route("/users/me", get(users::get_current_user))
        .route("/roles", get(roles::list_users).put(roles::update_role))
        .route(
            "/favorites",
            get(favorites::list_favorites)
                .post(favorites::add_favorite)
                .delete(favorites::remove_favorite),
        )
        .route(
            "/shopping-list",
            get(shopping_list::list_items)
                .post(shopping_list::add_item)
                .put(shopping_list::set_quantity)
                .delete(shopping_list::remove_items),
        )
        .route("/orders", get(orders::list_orders).post(orders::place_order))
        .route(
            "/catalog",
            get(catalog::list_catalog)
                .post(catalog::add_pattern)
                .put(catalog::update_pattern)
                .delete(catalog::remove_pattern),
        )
        .with_state(state.clone());

    Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state)
        .nest("/v1", v1_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn(short_circuit_options))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

/// Permissive cross-origin policy naming exactly the methods and headers
/// the API consumes.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static(ACCESS_TOKEN_HEADER),
        ])
}

/// Answer OPTIONS with an empty 204 before any verification runs. Real
/// CORS preflights are handled by the outer CORS layer; this catches the
/// rest.
async fn short_circuit_options(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        return StatusCode::NO_CONTENT.into_response();
    }
    next.run(request).await
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        health::readiness,
        auth_config::get_auth_config,
        debug::get_auth_debug,
        users::get_current_user,
        roles::list_users,
        roles::update_role,
        favorites::list_favorites,
        favorites::add_favorite,
        favorites::remove_favorite,
        shopping_list::list_items,
        shopping_list::add_item,
        shopping_list::set_quantity,
        shopping_list::remove_items,
        orders::list_orders,
        orders::place_order,
        catalog::list_catalog,
        catalog::add_pattern,
        catalog::update_pattern,
        catalog::remove_pattern
    ),
    components(
        schemas(
            Principal,
            Role,
            UserRecord,
            CatalogItem,
            FavoriteItem,
            ShoppingItem,
            Order,
            OrderItem,
            AddPatternRequest,
            SetQuantityRequest,
            PlaceOrderRequest,
            UpdateCatalogRequest
        )
    ),
    tags(
        (name = "Health", description = "Liveness and readiness"),
        (name = "Auth", description = "Provider configuration and diagnostics"),
        (name = "Users", description = "Caller identity and role administration"),
        (name = "Favorites", description = "Per-user favorite patterns"),
        (name = "Shopping", description = "Shopping list and orders"),
        (name = "Catalog", description = "Shared fly pattern catalog")
    )
)]
struct ApiDoc;
