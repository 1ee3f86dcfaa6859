// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 The Fly Shop

//! Role resolution.
//!
//! The caller's role comes from two sources of truth that can disagree:
//! the static administrator allow-list and the persisted user record.
//! Precedence, first match wins:
//!
//! 1. token email or subject id in the allow-list
//! 2. persisted record role is admin
//! 3. token carried no email, but the stored email is in the allow-list
//! 4. default user
//!
//! A live allow-list grant always beats a stale persisted demotion, and
//! a token that lost its email claim cannot silently lose an established
//! grant. Storage is best-effort throughout: rules that need only the
//! allow-list still run during an outage, so an allow-listed admin is
//! never locked out by one.

use chrono::Utc;
use serde::Serialize;
use tracing::warn;

use super::claims::VerifiedClaims;
use super::roles::{AllowList, Role};
use crate::storage::{BlobStore, ProfileUpdate, UserRecord, UserRepository};

/// Which precedence rule decided the role. Reported by diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleDecision {
    /// Rule 1: token email or subject id matched the allow-list
    AllowListToken,
    /// Rule 2: persisted record carries the admin role
    StoredRole,
    /// Rule 3: stored email matched the allow-list for an email-less token
    AllowListStored,
    /// Rule 4: no grant; default user
    Default,
}

impl RoleDecision {
    /// Operator-facing explanation.
    pub fn describe(&self) -> &'static str {
        match self {
            RoleDecision::AllowListToken => "allow-list matched token email or subject id",
            RoleDecision::StoredRole => "persisted admin role on user record",
            RoleDecision::AllowListStored => "allow-list matched stored email",
            RoleDecision::Default => "no admin grant; default role",
        }
    }
}

/// Outcome of role resolution.
#[derive(Debug)]
pub struct Resolution {
    pub role: Role,
    pub decision: RoleDecision,
    /// The user record after write-back (or as stored, for a dry run).
    pub record: Option<UserRecord>,
    /// Whether the record store answered the read.
    pub storage_ok: bool,
}

/// Role resolver over the allow-list and the user-record store.
pub struct RoleResolver<'a> {
    allow_list: &'a AllowList,
    users: UserRepository<'a>,
}

impl<'a> RoleResolver<'a> {
    pub fn new(allow_list: &'a AllowList, store: &'a BlobStore) -> Self {
        Self {
            allow_list,
            users: UserRepository::new(store),
        }
    }

    /// Resolve the caller's role and persist the merged user record.
    ///
    /// The write-back merges the incoming claims onto the stored record;
    /// it is skipped when the read failed, because merging onto unknown
    /// state would blind-overwrite whatever is actually there.
    pub fn resolve(&self, claims: &VerifiedClaims, email: Option<&str>) -> Resolution {
        let (stored, storage_ok) = self.read_record(&claims.sub);
        let decision = self.decide(claims, email, stored.as_ref());
        let role = decision_role(decision);

        if !storage_ok {
            return Resolution {
                role,
                decision,
                record: None,
                storage_ok,
            };
        }

        let update = ProfileUpdate {
            subject_id: claims.sub.clone(),
            email: email.map(str::to_string),
            display_name: claims.name.clone(),
            picture_url: claims.picture.clone(),
        };
        let merged = UserRecord::merged(stored, &update, role == Role::Admin, Utc::now());

        if let Err(e) = self.users.save(&merged) {
            warn!(subject = %claims.sub, error = %e, "user record write failed; continuing");
        }

        Resolution {
            role,
            decision,
            record: Some(merged),
            storage_ok,
        }
    }

    /// Resolve without persisting anything. Used by diagnostics, which
    /// must never mutate state.
    pub fn peek(&self, claims: &VerifiedClaims, email: Option<&str>) -> Resolution {
        let (stored, storage_ok) = self.read_record(&claims.sub);
        let decision = self.decide(claims, email, stored.as_ref());
        Resolution {
            role: decision_role(decision),
            decision,
            record: stored,
            storage_ok,
        }
    }

    fn read_record(&self, subject_id: &str) -> (Option<UserRecord>, bool) {
        match self.users.get(subject_id) {
            Ok(stored) => (stored, true),
            Err(e) => {
                warn!(subject = %subject_id, error = %e, "user record read failed; degrading to allow-list only");
                (None, false)
            }
        }
    }

    fn decide(
        &self,
        claims: &VerifiedClaims,
        email: Option<&str>,
        stored: Option<&UserRecord>,
    ) -> RoleDecision {
        let email_listed = email.is_some_and(|e| self.allow_list.contains(e));
        if email_listed || self.allow_list.contains(&claims.sub) {
            return RoleDecision::AllowListToken;
        }

        if stored.is_some_and(UserRecord::is_admin) {
            return RoleDecision::StoredRole;
        }

        let stored_email = stored.and_then(|r| r.email.as_deref());
        if email.is_none() && stored_email.is_some_and(|e| self.allow_list.contains(e)) {
            return RoleDecision::AllowListStored;
        }

        RoleDecision::Default
    }
}

fn decision_role(decision: RoleDecision) -> Role {
    match decision {
        RoleDecision::Default => Role::User,
        _ => Role::Admin,
    }
}
