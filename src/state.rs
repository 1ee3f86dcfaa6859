// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 The Fly Shop

use std::sync::Arc;

use crate::auth::email::UserInfoClient;
use crate::auth::{AllowList, IssuerConfig, TokenVerifier};
use crate::config::ServerConfig;
use crate::storage::BlobStore;

/// Authentication state shared across requests: the verifier (which
/// owns the JWKS cache), the allow-list, and the user-info client.
pub struct AuthState {
    pub verifier: TokenVerifier,
    pub allow_list: AllowList,
    pub userinfo: Option<UserInfoClient>,
}

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthState>,
    pub store: Arc<BlobStore>,
}

impl AppState {
    pub fn new(auth: AuthState, store: BlobStore) -> Self {
        Self {
            auth: Arc::new(auth),
            store: Arc::new(store),
        }
    }

    /// Build application state from server configuration.
    pub fn from_config(config: &ServerConfig) -> Self {
        let issuer = match (&config.issuer_domain, &config.audience) {
            (Some(domain), Some(audience)) => Some(IssuerConfig::new(domain, audience)),
            _ => None,
        };
        let userinfo = config
            .issuer_domain
            .as_deref()
            .map(UserInfoClient::for_issuer);

        let auth = AuthState {
            verifier: TokenVerifier::new(issuer),
            allow_list: AllowList::parse(&config.admin_principals),
            userinfo,
        };

        Self::new(auth, BlobStore::new(&config.data_dir))
    }
}
