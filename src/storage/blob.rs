// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 The Fly Shop

//! Filesystem-backed JSON blob store.
//!
//! Keys are arbitrary strings (provider subject ids contain `|` and may
//! contain anything else), so they are percent-encoded into filenames.
//! A missing blob reads as `None`; every other failure surfaces as an
//! error for the caller to decide degradation policy.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Store names, also the subdirectory names under the data root.
pub const USERS: &str = "users";
pub const FAVORITES: &str = "favorites";
pub const SHOPPING_LIST: &str = "shopping-list";
pub const ORDERS: &str = "orders";
pub const CATALOG: &str = "catalog";

const STORES: &[&str] = &[USERS, FAVORITES, SHOPPING_LIST, ORDERS, CATALOG];

/// Error type for blob store operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("not found: {0}")]
    NotFound(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// JSON blob store rooted at the data directory.
#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    /// Create a store rooted at `root`. Does not touch the filesystem;
    /// call `initialize` to create the store directories.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the directory for every named store. Idempotent.
    pub fn initialize(&self) -> StorageResult<()> {
        for store in STORES {
            fs::create_dir_all(self.root.join(store))?;
        }
        Ok(())
    }

    /// Verify the store is usable with a write-read-delete round trip.
    pub fn health_check(&self) -> StorageResult<()> {
        let probe = self.root.join(".health_check");
        let data = b"health_check";

        fs::write(&probe, data)?;
        let read_back = fs::read(&probe)?;
        fs::remove_file(&probe)?;

        if read_back != data {
            return Err(StorageError::Io(io::Error::other(
                "health check read back different data",
            )));
        }
        Ok(())
    }

    /// Read and deserialize a blob. `Ok(None)` when the key has no blob.
    pub fn read_json<T: DeserializeOwned>(
        &self,
        store: &str,
        key: &str,
    ) -> StorageResult<Option<T>> {
        let path = self.blob_path(store, key);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    /// Serialize and write a blob, creating the store directory if the
    /// store was never initialized.
    pub fn write_json<T: Serialize>(&self, store: &str, key: &str, value: &T) -> StorageResult<()> {
        let path = self.blob_path(store, key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_vec_pretty(value)?;
        fs::write(&path, raw)?;
        Ok(())
    }

    /// Delete a blob.
    pub fn delete(&self, store: &str, key: &str) -> StorageResult<()> {
        let path = self.blob_path(store, key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(format!("{store}/{key}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// List the keys present in a store.
    pub fn list_keys(&self, store: &str) -> StorageResult<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(self.root.join(store))? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some(stem) = name.strip_suffix(".json") {
                keys.push(decode_key(stem));
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn blob_path(&self, store: &str, key: &str) -> PathBuf {
        self.root.join(store).join(format!("{}.json", encode_key(key)))
    }
}

/// Percent-encode a key into a safe filename. `/` and every byte outside
/// a conservative set is escaped, so no key can traverse out of its
/// store directory.
fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for byte in key.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'@' | b'|' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// Inverse of `encode_key`. Malformed escapes are kept literally; they
/// can only come from files this process did not write.
fn decode_key(encoded: &str) -> String {
    let bytes = encoded.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && i + 2 < bytes.len()
            && bytes[i + 1].is_ascii_hexdigit()
            && bytes[i + 2].is_ascii_hexdigit()
        {
            if let Ok(byte) = u8::from_str_radix(&encoded[i + 1..i + 3], 16) {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}
