// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 The Fly Shop

//! Public identity-provider configuration for the frontend login flow.

use axum::{
    extract::State,
    http::header::{self, HeaderMap, HeaderValue},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

/// Provider settings the login page needs. Nullable until the server is
/// configured, which the frontend surfaces as "login unavailable".
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthConfigResponse {
    /// Identity provider domain
    pub domain: Option<String>,
    /// OAuth client id (also the expected token audience)
    pub client_id: Option<String>,
}

/// Get the identity-provider configuration.
///
/// Public: the domain and client id also ship in the frontend bundle;
/// this endpoint just keeps them in one place.
#[utoipa::path(
    get,
    path = "/v1/auth/config",
    tag = "Auth",
    responses(
        (status = 200, description = "Provider configuration", body = AuthConfigResponse),
    )
)]
pub async fn get_auth_config(
    State(state): State<AppState>,
) -> (HeaderMap, Json<AuthConfigResponse>) {
    let issuer = state.auth.verifier.issuer_config();

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("public, max-age=3600"),
    );

    (
        headers,
        Json(AuthConfigResponse {
            domain: issuer.map(|i| i.domain.clone()),
            client_id: issuer.map(|i| i.audience.clone()),
        }),
    )
}
