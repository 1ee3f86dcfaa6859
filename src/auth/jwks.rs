// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 The Fly Shop

//! JWKS (JSON Web Key Set) fetching and caching.
//!
//! ## Security
//!
//! - The key set is fetched via HTTPS only
//! - Keys are cached process-wide with a TTL
//! - A lookup for an unknown `kid` refreshes the set once before failing
//! - Refreshes replace the cached set wholesale; concurrent refreshes are
//!   idempotent and last-write-wins

use std::sync::Arc;
use std::time::{Duration, Instant};

use jsonwebtoken::jwk::{AlgorithmParameters, Jwk, JwkSet};
use jsonwebtoken::{Algorithm, DecodingKey};
use thiserror::Error;
use tokio::sync::RwLock;

/// Default key set cache TTL (5 minutes).
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// HTTP timeout for key set fetches.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors raised while obtaining a decoding key.
///
/// The token verifier folds all of these into its invalid-token failure;
/// the distinction matters only for logs.
#[derive(Debug, Error)]
pub enum KeysetError {
    #[error("failed to fetch signing keys: {0}")]
    Fetch(String),
    #[error("no signing key matches the token")]
    NoMatchingKey,
    #[error("unsupported key material: {0}")]
    UnsupportedKey(String),
}

/// Cached key set entry.
struct CacheEntry {
    jwks: JwkSet,
    fetched_at: Instant,
}

/// Signing-key-set manager with caching.
#[derive(Clone)]
pub struct JwksManager {
    /// Key set endpoint URL
    jwks_url: String,
    /// Cache TTL
    cache_ttl: Duration,
    /// Cached key set
    cache: Arc<RwLock<Option<CacheEntry>>>,
    /// HTTP client
    client: reqwest::Client,
}

impl JwksManager {
    /// Create a manager for an issuer domain's well-known JWKS endpoint.
    pub fn for_issuer(issuer_domain: &str) -> Self {
        Self::new(format!(
            "https://{issuer_domain}/.well-known/jwks.json"
        ))
    }

    /// Create a manager for an explicit JWKS URL.
    pub fn new(jwks_url: impl Into<String>) -> Self {
        Self {
            jwks_url: jwks_url.into(),
            cache_ttl: DEFAULT_CACHE_TTL,
            cache: Arc::new(RwLock::new(None)),
            client: reqwest::Client::builder()
                .timeout(FETCH_TIMEOUT)
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    /// Create with custom cache TTL.
    #[cfg(test)]
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Get the JWKS URL.
    pub fn jwks_url(&self) -> &str {
        &self.jwks_url
    }

    /// Get a decoding key for the given key id.
    ///
    /// A fresh cached set that contains the key answers immediately.
    /// Otherwise the set is refetched once (refresh-on-miss) before the
    /// lookup is declared failed. With no `kid`, the first usable key in
    /// the set is returned.
    pub async fn decoding_key(
        &self,
        kid: Option<&str>,
    ) -> Result<(DecodingKey, Algorithm), KeysetError> {
        if let Some(jwks) = self.cached_jwks().await {
            if let Some(found) = lookup(&jwks, kid) {
                return found;
            }
        }

        let jwks = self.refresh().await?;
        lookup(&jwks, kid).unwrap_or(Err(KeysetError::NoMatchingKey))
    }

    /// Return the cached set if it is still within its TTL.
    async fn cached_jwks(&self) -> Option<JwkSet> {
        let cache = self.cache.read().await;
        cache
            .as_ref()
            .filter(|entry| entry.fetched_at.elapsed() < self.cache_ttl)
            .map(|entry| entry.jwks.clone())
    }

    /// Fetch the key set and replace the cache wholesale.
    pub async fn refresh(&self) -> Result<JwkSet, KeysetError> {
        let jwks = self.fetch_jwks().await?;
        let mut cache = self.cache.write().await;
        *cache = Some(CacheEntry {
            jwks: jwks.clone(),
            fetched_at: Instant::now(),
        });
        Ok(jwks)
    }

    /// Fetch the key set from the endpoint.
    async fn fetch_jwks(&self) -> Result<JwkSet, KeysetError> {
        let response = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| KeysetError::Fetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(KeysetError::Fetch(format!(
                "HTTP {} from JWKS endpoint",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| KeysetError::Fetch(e.to_string()))
    }

    /// Check if a key set is currently cached and within its TTL.
    pub async fn is_cached(&self) -> bool {
        let cache = self.cache.read().await;
        cache
            .as_ref()
            .map(|entry| entry.fetched_at.elapsed() < self.cache_ttl)
            .unwrap_or(false)
    }

    /// Seed the cache directly. Test-only; production code always goes
    /// through `refresh`.
    #[cfg(test)]
    pub async fn seed_cache(&self, jwks: JwkSet) {
        let mut cache = self.cache.write().await;
        *cache = Some(CacheEntry {
            jwks,
            fetched_at: Instant::now(),
        });
    }
}

/// Find a key in the set. `None` means the set has no candidate at all;
/// `Some(Err)` means a candidate existed but its material is unusable.
fn lookup(
    jwks: &JwkSet,
    kid: Option<&str>,
) -> Option<Result<(DecodingKey, Algorithm), KeysetError>> {
    match kid {
        Some(kid) => jwks
            .keys
            .iter()
            .find(|k| k.common.key_id.as_deref() == Some(kid))
            .map(jwk_to_decoding_key),
        None => jwks
            .keys
            .iter()
            .map(jwk_to_decoding_key)
            .find(|result| result.is_ok()),
    }
}

/// Convert a JWK to a decoding key.
fn jwk_to_decoding_key(jwk: &Jwk) -> Result<(DecodingKey, Algorithm), KeysetError> {
    match &jwk.algorithm {
        AlgorithmParameters::RSA(rsa) => {
            let key = DecodingKey::from_rsa_components(&rsa.n, &rsa.e)
                .map_err(|e| KeysetError::UnsupportedKey(format!("bad RSA components: {e}")))?;

            let alg = jwk
                .common
                .key_algorithm
                .map(|a| match a {
                    jsonwebtoken::jwk::KeyAlgorithm::RS256 => Algorithm::RS256,
                    jsonwebtoken::jwk::KeyAlgorithm::RS384 => Algorithm::RS384,
                    jsonwebtoken::jwk::KeyAlgorithm::RS512 => Algorithm::RS512,
                    _ => Algorithm::RS256,
                })
                .unwrap_or(Algorithm::RS256);

            Ok((key, alg))
        }
        AlgorithmParameters::EllipticCurve(ec) => {
            let key = DecodingKey::from_ec_components(&ec.x, &ec.y)
                .map_err(|e| KeysetError::UnsupportedKey(format!("bad EC components: {e}")))?;

            let alg = jwk
                .common
                .key_algorithm
                .map(|a| match a {
                    jsonwebtoken::jwk::KeyAlgorithm::ES256 => Algorithm::ES256,
                    jsonwebtoken::jwk::KeyAlgorithm::ES384 => Algorithm::ES384,
                    _ => Algorithm::ES256,
                })
                .unwrap_or(Algorithm::ES256);

            Ok((key, alg))
        }
        _ => Err(KeysetError::UnsupportedKey(
            "unsupported key type in JWKS".to_string(),
        )),
    }
}
