// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 The Fly Shop

//! User records: durable per-subject profile and persisted role.
//!
//! Records are owned by the role-resolution path: created on a subject's
//! first successful verification, merged on every later one. Merges must
//! never lose data another writer (or an older deploy) put on the
//! record, so unknown fields ride along in a flattened map and incoming
//! absent fields never overwrite stored values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::blob::{self, BlobStore, StorageError, StorageResult};
use crate::auth::Role;

fn default_role() -> String {
    "user".to_string()
}

/// Durable per-subject state, keyed by the provider subject id.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserRecord {
    /// Provider subject id
    pub subject_id: String,

    /// Last-known email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Last-known display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Last-known avatar URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture_url: Option<String>,

    /// Persisted role string. Only `"admin"` grants anything; other
    /// values are preserved verbatim and read as the user role.
    #[serde(default = "default_role")]
    pub role: String,

    /// First-creation timestamp, never changed after creation
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    /// Last-write timestamp
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,

    /// Fields this version of the server does not know about. Preserved
    /// across merges.
    #[serde(flatten)]
    #[schema(ignore)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UserRecord {
    /// Whether the persisted role grants admin.
    pub fn is_admin(&self) -> bool {
        self.role.eq_ignore_ascii_case("admin")
    }

    /// Merge an incoming profile update (and the computed role) onto a
    /// stored record, or mint a new record when none exists.
    ///
    /// `created_at` is set only on first creation; `updated_at` on every
    /// merge. Incoming `None` fields leave stored values alone, and a
    /// stored non-admin role string survives a non-admin resolution.
    pub fn merged(
        stored: Option<UserRecord>,
        update: &ProfileUpdate,
        admin: bool,
        now: DateTime<Utc>,
    ) -> UserRecord {
        let mut record = stored.unwrap_or_else(|| UserRecord {
            subject_id: update.subject_id.clone(),
            email: None,
            display_name: None,
            picture_url: None,
            role: default_role(),
            created_at: now,
            updated_at: now,
            extra: serde_json::Map::new(),
        });

        record.subject_id = update.subject_id.clone();
        if update.email.is_some() {
            record.email = update.email.clone();
        }
        if update.display_name.is_some() {
            record.display_name = update.display_name.clone();
        }
        if update.picture_url.is_some() {
            record.picture_url = update.picture_url.clone();
        }
        if admin {
            record.role = "admin".to_string();
        }
        record.updated_at = now;
        record
    }
}

/// Incoming profile fields from a verified request.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub subject_id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub picture_url: Option<String>,
}

/// Repository for user records in the blob store.
pub struct UserRepository<'a> {
    store: &'a BlobStore,
}

impl<'a> UserRepository<'a> {
    pub fn new(store: &'a BlobStore) -> Self {
        Self { store }
    }

    /// Get a record by subject id. `Ok(None)` when the subject has none.
    pub fn get(&self, subject_id: &str) -> StorageResult<Option<UserRecord>> {
        self.store.read_json(blob::USERS, subject_id)
    }

    /// Persist a record.
    pub fn save(&self, record: &UserRecord) -> StorageResult<()> {
        self.store
            .write_json(blob::USERS, &record.subject_id, record)
    }

    /// List every known user record.
    pub fn list(&self) -> StorageResult<Vec<UserRecord>> {
        let mut records = Vec::new();
        for key in self.store.list_keys(blob::USERS)? {
            if let Some(record) = self.get(&key)? {
                records.push(record);
            }
        }
        Ok(records)
    }

    /// Set the persisted role of an existing record. Re-reads and merges
    /// so concurrent profile writes are not clobbered.
    pub fn set_role(&self, subject_id: &str, role: Role) -> StorageResult<UserRecord> {
        let mut record = self
            .get(subject_id)?
            .ok_or_else(|| StorageError::NotFound(format!("user {subject_id}")))?;
        record.role = role.to_string();
        record.updated_at = Utc::now();
        self.save(&record)?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store() -> (BlobStore, TempDir) {
        let dir = TempDir::new().expect("temp dir");
        let store = BlobStore::new(dir.path());
        store.initialize().expect("initialize");
        (store, dir)
    }

    fn update(subject: &str, email: Option<&str>) -> ProfileUpdate {
        ProfileUpdate {
            subject_id: subject.to_string(),
            email: email.map(str::to_string),
            display_name: Some("River Angler".to_string()),
            picture_url: None,
        }
    }

    #[test]
    fn merge_creates_record_with_defaults() {
        let now = Utc::now();
        let record = UserRecord::merged(None, &update("auth0|abc", Some("a@x.com")), false, now);

        assert_eq!(record.subject_id, "auth0|abc");
        assert_eq!(record.email.as_deref(), Some("a@x.com"));
        assert_eq!(record.role, "user");
        assert_eq!(record.created_at, now);
        assert_eq!(record.updated_at, now);
    }

    #[test]
    fn merge_preserves_unknown_fields_and_updates_email() {
        // Stored record written by some other component with a prefs
        // field this server knows nothing about.
        let stored: UserRecord = serde_json::from_value(serde_json::json!({
            "subject_id": "auth0|abc",
            "email": "a@x.com",
            "prefs": {"theme": "dark"},
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z",
        }))
        .unwrap();

        let now = Utc::now();
        let merged = UserRecord::merged(
            Some(stored),
            &update("auth0|abc", Some("b@x.com")),
            false,
            now,
        );

        assert_eq!(merged.email.as_deref(), Some("b@x.com"));
        assert_eq!(merged.extra["prefs"], serde_json::json!({"theme": "dark"}));

        // And the unknown field survives serialization too.
        let value = serde_json::to_value(&merged).unwrap();
        assert_eq!(value["prefs"]["theme"], "dark");
    }

    #[test]
    fn merge_keeps_stored_email_when_incoming_is_absent() {
        let stored: UserRecord = serde_json::from_value(serde_json::json!({
            "subject_id": "auth0|abc",
            "email": "keep@x.com",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z",
        }))
        .unwrap();

        let merged = UserRecord::merged(Some(stored), &update("auth0|abc", None), false, Utc::now());
        assert_eq!(merged.email.as_deref(), Some("keep@x.com"));
    }

    #[test]
    fn merge_preserves_created_at_and_foreign_role() {
        let stored: UserRecord = serde_json::from_value(serde_json::json!({
            "subject_id": "auth0|abc",
            "role": "auditor",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z",
        }))
        .unwrap();
        let created_at = stored.created_at;

        let merged = UserRecord::merged(Some(stored), &update("auth0|abc", None), false, Utc::now());
        assert_eq!(merged.created_at, created_at);
        // Not admin, but not reset to "user" either.
        assert_eq!(merged.role, "auditor");
        assert!(!merged.is_admin());
    }

    #[test]
    fn merge_promotes_to_admin() {
        let merged = UserRecord::merged(None, &update("auth0|abc", None), true, Utc::now());
        assert!(merged.is_admin());
    }

    #[test]
    fn record_without_role_defaults_to_user() {
        let record: UserRecord = serde_json::from_value(serde_json::json!({
            "subject_id": "auth0|abc",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z",
        }))
        .unwrap();
        assert_eq!(record.role, "user");
        assert!(!record.is_admin());
    }

    #[test]
    fn save_get_list_round_trip() {
        let (store, _dir) = test_store();
        let repo = UserRepository::new(&store);

        for subject in ["auth0|a", "auth0|b"] {
            let record = UserRecord::merged(None, &update(subject, None), false, Utc::now());
            repo.save(&record).unwrap();
        }

        let loaded = repo.get("auth0|a").unwrap().unwrap();
        assert_eq!(loaded.subject_id, "auth0|a");

        let all = repo.list().unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn set_role_requires_existing_record() {
        let (store, _dir) = test_store();
        let repo = UserRepository::new(&store);

        let err = repo.set_role("auth0|missing", Role::Admin).unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));

        let record = UserRecord::merged(None, &update("auth0|abc", None), false, Utc::now());
        repo.save(&record).unwrap();

        let updated = repo.set_role("auth0|abc", Role::Admin).unwrap();
        assert!(updated.is_admin());
        assert_eq!(repo.get("auth0|abc").unwrap().unwrap().role, "admin");
    }
}
