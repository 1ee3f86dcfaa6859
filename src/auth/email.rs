// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 The Fly Shop

//! Email resolution for verified callers.
//!
//! Providers do not reliably put an email in the token, so resolution
//! walks an ordered fallback chain: the standard claim, namespaced custom
//! claims, email-shaped profile claims, and finally an out-of-band
//! user-info lookup authorized by the caller's access token. The chain
//! never fails; the worst outcome is "no email".

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;
use tracing::warn;

use super::claims::VerifiedClaims;

/// Standard email syntax: local@domain with at least one dot in domain.
static EMAIL_SYNTAX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex compiles"));

/// HTTP timeout for the user-info lookup.
const USERINFO_TIMEOUT: Duration = Duration::from_secs(10);

/// The closed, ordered list of in-token extractors. Each is total; the
/// chain stops at the first `Some`.
const EXTRACTORS: &[fn(&VerifiedClaims) -> Option<String>] =
    &[standard_claim, namespaced_claim, email_shaped_profile_claim];

/// Resolve an email from the token alone.
pub fn email_from_claims(claims: &VerifiedClaims) -> Option<String> {
    EXTRACTORS.iter().find_map(|extract| extract(claims))
}

/// Resolve an email from the token, falling back to the provider's
/// user-info endpoint when the token has none and the caller supplied an
/// access token. Never fails; lookup problems degrade to `None`.
pub async fn resolve_email(
    claims: &VerifiedClaims,
    access_token: Option<&str>,
    userinfo: Option<&UserInfoClient>,
) -> Option<String> {
    if let Some(email) = email_from_claims(claims) {
        return Some(email);
    }

    match (access_token, userinfo) {
        (Some(token), Some(client)) => client.fetch_email(token, &claims.sub).await,
        _ => None,
    }
}

/// 1. Standard `email` claim, if present and non-empty.
fn standard_claim(claims: &VerifiedClaims) -> Option<String> {
    non_empty(claims.email.as_deref())
}

/// 2. First extra claim whose key ends with `/email` (namespaced custom
/// claim, e.g. `https://flyshop.example/email`).
fn namespaced_claim(claims: &VerifiedClaims) -> Option<String> {
    claims
        .extra
        .iter()
        .filter(|(key, _)| key.ends_with("/email"))
        .find_map(|(_, value)| non_empty(value.as_str()))
}

/// 3. `preferred_username`, `name`, or `nickname`, in that order, when
/// the value is email-shaped. These are heuristics, not guarantees, so
/// anything that does not look like an email is skipped.
fn email_shaped_profile_claim(claims: &VerifiedClaims) -> Option<String> {
    [
        claims.preferred_username.as_deref(),
        claims.name.as_deref(),
        claims.nickname.as_deref(),
    ]
    .into_iter()
    .find_map(|candidate| non_empty(candidate).filter(|v| EMAIL_SYNTAX.is_match(v)))
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// User-info payload; the provider returns at least `sub` and may return
/// `email`.
#[derive(Debug, Deserialize)]
struct UserInfoResponse {
    sub: String,
    #[serde(default)]
    email: Option<String>,
}

/// Client for the identity provider's user-info endpoint.
#[derive(Clone)]
pub struct UserInfoClient {
    endpoint: String,
    client: reqwest::Client,
}

impl UserInfoClient {
    /// Client for an issuer domain's standard user-info endpoint.
    pub fn for_issuer(issuer_domain: &str) -> Self {
        Self::new(format!("https://{issuer_domain}/userinfo"))
    }

    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::builder()
                .timeout(USERINFO_TIMEOUT)
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    /// Fetch the caller's email with their access token.
    ///
    /// The returned email is accepted only when the endpoint reports the
    /// same subject the verified token carries; a substituted access
    /// token must not be able to attach someone else's email to this
    /// caller. Mismatches and transport failures are logged and degrade
    /// to `None`.
    pub async fn fetch_email(&self, access_token: &str, expected_sub: &str) -> Option<String> {
        let response = match self
            .client
            .get(&self.endpoint)
            .bearer_auth(access_token)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "user-info request failed");
                return None;
            }
        };

        if !response.status().is_success() {
            warn!(status = %response.status(), "user-info returned non-success");
            return None;
        }

        let info: UserInfoResponse = match response.json().await {
            Ok(info) => info,
            Err(e) => {
                warn!(error = %e, "user-info payload malformed");
                return None;
            }
        };

        if info.sub != expected_sub {
            warn!(
                expected = %expected_sub,
                got = %info.sub,
                "user-info subject mismatch; discarding email"
            );
            return None;
        }

        non_empty(info.email.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(value: serde_json::Value) -> VerifiedClaims {
        serde_json::from_value(value).expect("claims deserialize")
    }

    #[test]
    fn standard_claim_wins() {
        let c = claims(serde_json::json!({
            "sub": "auth0|abc",
            "email": "token@example.com",
            "https://flyshop.example/email": "custom@example.com",
            "preferred_username": "user@example.com",
        }));
        assert_eq!(email_from_claims(&c).as_deref(), Some("token@example.com"));
    }

    #[test]
    fn empty_standard_claim_falls_through() {
        let c = claims(serde_json::json!({
            "sub": "auth0|abc",
            "email": "  ",
            "https://flyshop.example/email": "custom@example.com",
        }));
        assert_eq!(email_from_claims(&c).as_deref(), Some("custom@example.com"));
    }

    #[test]
    fn namespaced_claim_requires_email_suffix() {
        let c = claims(serde_json::json!({
            "sub": "auth0|abc",
            "https://flyshop.example/emailish": "not-this@example.com",
            "https://flyshop.example/roles": ["buyer"],
        }));
        assert_eq!(email_from_claims(&c), None);
    }

    #[test]
    fn profile_claims_checked_in_order() {
        let c = claims(serde_json::json!({
            "sub": "auth0|abc",
            "nickname": "nick@example.com",
            "name": "name@example.com",
            "preferred_username": "preferred@example.com",
        }));
        assert_eq!(
            email_from_claims(&c).as_deref(),
            Some("preferred@example.com")
        );
    }

    #[test]
    fn non_email_profile_values_are_skipped() {
        let c = claims(serde_json::json!({
            "sub": "auth0|abc",
            "preferred_username": "riverangler",
            "name": "River Angler",
            "nickname": "nick@example.com",
        }));
        assert_eq!(email_from_claims(&c).as_deref(), Some("nick@example.com"));
    }

    #[test]
    fn email_syntax_requires_dotted_domain() {
        let c = claims(serde_json::json!({
            "sub": "auth0|abc",
            "name": "user@localhost",
        }));
        assert_eq!(email_from_claims(&c), None);
    }

    #[test]
    fn no_candidates_means_no_email() {
        let c = claims(serde_json::json!({ "sub": "auth0|abc" }));
        assert_eq!(email_from_claims(&c), None);
    }

    /// Serve a fixed user-info payload on an ephemeral local port.
    async fn spawn_userinfo(body: serde_json::Value) -> String {
        use axum::{routing::get, Json, Router};

        let app = Router::new().route(
            "/userinfo",
            get(move || {
                let body = body.clone();
                async move { Json(body) }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/userinfo")
    }

    #[tokio::test]
    async fn userinfo_email_accepted_on_matching_sub() {
        let url = spawn_userinfo(serde_json::json!({
            "sub": "auth0|abc",
            "email": "x@y.com",
        }))
        .await;

        let c = claims(serde_json::json!({ "sub": "auth0|abc" }));
        let client = UserInfoClient::new(url);
        let email = resolve_email(&c, Some("access-token"), Some(&client)).await;
        assert_eq!(email.as_deref(), Some("x@y.com"));
    }

    #[tokio::test]
    async fn userinfo_email_rejected_on_sub_mismatch() {
        let url = spawn_userinfo(serde_json::json!({
            "sub": "auth0|someone-else",
            "email": "x@y.com",
        }))
        .await;

        let c = claims(serde_json::json!({ "sub": "auth0|abc" }));
        let client = UserInfoClient::new(url);
        let email = resolve_email(&c, Some("access-token"), Some(&client)).await;
        assert_eq!(email, None);
    }

    #[tokio::test]
    async fn resolve_without_access_token_skips_lookup() {
        let c = claims(serde_json::json!({ "sub": "auth0|abc" }));
        let client = UserInfoClient::new("https://unreachable.invalid/userinfo");
        let email = resolve_email(&c, None, Some(&client)).await;
        assert_eq!(email, None);
    }

    #[tokio::test]
    async fn lookup_failure_degrades_to_none() {
        let c = claims(serde_json::json!({ "sub": "auth0|abc" }));
        let client = UserInfoClient::new("https://unreachable.invalid/userinfo");
        let email = resolve_email(&c, Some("access-token"), Some(&client)).await;
        assert_eq!(email, None);
    }
}
