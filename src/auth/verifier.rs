// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 The Fly Shop

//! Bearer-token verification against the identity provider.
//!
//! This is the security-critical path. Signature, issuer, and audience
//! checks get no leniency of any kind; only expiry is given clock-skew
//! tolerance.

use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use tracing::warn;

use super::claims::VerifiedClaims;
use super::error::AuthError;
use super::jwks::JwksManager;

/// Clock skew tolerance for expiry (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Identity-provider configuration plus the shared signing-key cache.
#[derive(Clone)]
pub struct IssuerConfig {
    /// Provider domain, e.g. `tenant.us.auth0.com`
    pub domain: String,
    /// Expected audience (the application's client id)
    pub audience: String,
    /// Shared signing-key-set cache
    pub jwks: JwksManager,
}

impl IssuerConfig {
    pub fn new(domain: impl Into<String>, audience: impl Into<String>) -> Self {
        let domain = domain.into();
        let jwks = JwksManager::for_issuer(&domain);
        Self {
            domain,
            audience: audience.into(),
            jwks,
        }
    }

    /// The exact issuer string tokens must carry.
    pub fn issuer(&self) -> String {
        format!("https://{}/", self.domain)
    }
}

/// Token verifier.
///
/// Unconfigured deployments (missing issuer domain or audience) fail
/// every verification with `ServerMisconfigured` rather than falling
/// back to weaker checks.
#[derive(Clone)]
pub struct TokenVerifier {
    issuer: Option<IssuerConfig>,
}

impl TokenVerifier {
    pub fn new(issuer: Option<IssuerConfig>) -> Self {
        Self { issuer }
    }

    /// The configured issuer, if any. Used by the auth-config endpoint
    /// and diagnostics.
    pub fn issuer_config(&self) -> Option<&IssuerConfig> {
        self.issuer.as_ref()
    }

    /// Verify a bearer token and return its claims.
    pub async fn verify(&self, token: Option<&str>) -> Result<VerifiedClaims, AuthError> {
        let token = token.ok_or(AuthError::NoToken)?;
        let issuer = self.issuer.as_ref().ok_or(AuthError::ServerMisconfigured)?;

        let header = decode_header(token).map_err(|_| AuthError::TokenInvalid)?;

        let (decoding_key, algorithm) = issuer
            .jwks
            .decoding_key(header.kid.as_deref())
            .await
            .map_err(|e| {
                warn!(error = %e, "signing key lookup failed");
                AuthError::TokenInvalid
            })?;

        decode_claims(
            token,
            &decoding_key,
            algorithm,
            &issuer.issuer(),
            &issuer.audience,
        )
    }
}

/// Decode and validate a token against a known key.
///
/// Factored out of `TokenVerifier::verify` so validation behavior is
/// testable without a key-set fetch.
fn decode_claims(
    token: &str,
    decoding_key: &DecodingKey,
    algorithm: Algorithm,
    issuer: &str,
    audience: &str,
) -> Result<VerifiedClaims, AuthError> {
    let mut validation = Validation::new(algorithm);
    validation.leeway = CLOCK_SKEW_LEEWAY;
    validation.set_issuer(&[issuer]);
    validation.set_audience(&[audience]);

    let token_data =
        decode::<VerifiedClaims>(token, decoding_key, &validation).map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::TokenInvalid,
        })?;

    let claims = token_data.claims;
    if claims.sub.is_empty() {
        return Err(AuthError::TokenInvalid);
    }

    Ok(claims)
}
