// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 The Fly Shop

//! # JSON Blob Storage
//!
//! Durable storefront state lives in a directory of JSON blobs, one
//! named store per record family:
//!
//! ```text
//! {DATA_DIR}/
//!   users/{subject_id}.json          # per-subject profile + role
//!   favorites/{subject_id}.json      # per-subject array
//!   shopping-list/{subject_id}.json  # per-subject array
//!   orders/{subject_id}.json         # per-subject array, newest first
//!   catalog/all.json                 # shared array
//! ```
//!
//! Consistency is whatever the filesystem gives us; callers never depend
//! on read-after-write across stores, and concurrent writers of one key
//! re-read then merge rather than blind-overwrite.

pub mod blob;
pub mod records;
pub mod users;

pub use blob::{BlobStore, StorageError, StorageResult};
pub use records::{CatalogRepository, ListRepository};
pub use users::{ProfileUpdate, UserRecord, UserRepository};
