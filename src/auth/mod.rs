// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 The Fly Shop

//! # Authentication Module
//!
//! Request-time identity resolution against the Auth0 identity provider.
//!
//! ## Resolution chain
//!
//! 1. `extractor` pulls the bearer token and the optional access token
//!    from request headers
//! 2. `verifier` validates signature, issuer, audience, and expiry
//!    against the provider's JWKS (cached by `jwks`)
//! 3. `email` recovers an email identifier, falling back to the
//!    provider's user-info endpoint when the token has none
//! 4. `resolver` computes the admin/user role from the allow-list and
//!    the persisted user record, and writes the merged record back
//!
//! ## Security
//!
//! - Signature, issuer, and audience checks have no fallback paths
//! - Expiry gets 60 seconds of clock-skew tolerance, nothing else does
//! - Admin is granted only by the allow-list or a persisted admin role
//! - Storage outages degrade to allow-list-only decisions instead of
//!   locking out allow-listed administrators

pub mod claims;
pub mod email;
pub mod error;
pub mod extractor;
pub mod jwks;
pub mod resolver;
pub mod roles;
pub mod verifier;

pub use claims::{Principal, VerifiedClaims};
pub use error::AuthError;
pub use extractor::{extract_credentials, AdminOnly, Auth, ACCESS_TOKEN_HEADER};
pub use jwks::JwksManager;
pub use resolver::{Resolution, RoleDecision, RoleResolver};
pub use roles::{AllowList, Role};
pub use verifier::{IssuerConfig, TokenVerifier};
