// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 The Fly Shop

//! User roles and the administrator allow-list.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Caller role for authorization.
///
/// `Admin` is granted only through the allow-list or a persisted admin
/// role; tokens never carry it directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full administrative access
    Admin,
    /// Normal storefront user
    User,
}

impl Role {
    /// Parse a role from a persisted string (case-insensitive).
    ///
    /// Anything other than `admin` or `user` is not a recognized role.
    pub fn from_str(s: &str) -> Option<Role> {
        match s.to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "user" => Some(Role::User),
            _ => None,
        }
    }
}

impl Default for Role {
    /// Default role is User (least privilege for authenticated callers).
    fn default() -> Self {
        Role::User
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::User => write!(f, "user"),
        }
    }
}

/// Administrator allow-list, parsed once at startup.
///
/// The source string names administrator emails and/or provider subject
/// ids, separated by commas, semicolons, pipes, or newlines. Entries are
/// trimmed, stripped of control characters, and case-folded, and lookups
/// case-fold the probe the same way.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    entries: Vec<String>,
}

impl AllowList {
    /// Parse the delimited configuration string.
    pub fn parse(raw: &str) -> Self {
        let entries = raw
            .split(['\n', ',', ';', '|'])
            .map(normalize_entry)
            .filter(|entry| !entry.is_empty())
            .collect();
        Self { entries }
    }

    /// Check whether an email or subject id is allow-listed.
    pub fn contains(&self, probe: &str) -> bool {
        let probe = normalize_entry(probe);
        !probe.is_empty() && self.entries.iter().any(|entry| *entry == probe)
    }

    /// Number of configured entries. Exposed to diagnostics; the entries
    /// themselves are never reported.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn normalize_entry(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_control())
        .collect::<String>()
        .trim()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_str_parses_known_roles() {
        assert_eq!(Role::from_str("admin"), Some(Role::Admin));
        assert_eq!(Role::from_str("ADMIN"), Some(Role::Admin));
        assert_eq!(Role::from_str("User"), Some(Role::User));
        assert_eq!(Role::from_str("moderator"), None);
    }

    #[test]
    fn default_role_is_user() {
        assert_eq!(Role::default(), Role::User);
    }

    #[test]
    fn parse_splits_on_all_delimiters() {
        let list = AllowList::parse("a@x.com,b@x.com;c@x.com|d@x.com\ne@x.com");
        assert_eq!(list.len(), 5);
        assert!(list.contains("a@x.com"));
        assert!(list.contains("e@x.com"));
    }

    #[test]
    fn entries_are_trimmed_and_case_folded() {
        let list = AllowList::parse("  Admin@Shop.com , auth0|ABC123 ");
        assert!(list.contains("admin@shop.com"));
        assert!(list.contains("ADMIN@SHOP.COM"));
        assert!(list.contains("auth0|abc123"));
    }

    #[test]
    fn control_characters_are_stripped() {
        let list = AllowList::parse("admin@shop.com\r\n\tother@shop.com\u{0000}");
        assert_eq!(list.len(), 2);
        assert!(list.contains("admin@shop.com"));
        assert!(list.contains("other@shop.com"));
    }

    #[test]
    fn empty_entries_are_skipped() {
        let list = AllowList::parse(",,;  ;|\n");
        assert!(list.is_empty());
        assert!(!list.contains(""));
    }

    #[test]
    fn contains_rejects_unlisted() {
        let list = AllowList::parse("admin@shop.com");
        assert!(!list.contains("user@shop.com"));
    }
}
