// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 The Fly Shop

//! Storefront record repositories.
//!
//! Favorites, shopping lists, and orders are per-subject JSON arrays;
//! the catalog is one shared array. These are plain CRUD surfaces with
//! no resolution logic, so the repositories stay generic over the item
//! type and the handlers own the (trivial) mutations.

use serde::{de::DeserializeOwned, Serialize};

use super::blob::{self, BlobStore, StorageResult};

/// Per-subject array store (favorites, shopping list, orders).
pub struct ListRepository<'a> {
    store: &'a BlobStore,
    name: &'static str,
}

impl<'a> ListRepository<'a> {
    pub fn favorites(store: &'a BlobStore) -> Self {
        Self {
            store,
            name: blob::FAVORITES,
        }
    }

    pub fn shopping_list(store: &'a BlobStore) -> Self {
        Self {
            store,
            name: blob::SHOPPING_LIST,
        }
    }

    pub fn orders(store: &'a BlobStore) -> Self {
        Self {
            store,
            name: blob::ORDERS,
        }
    }

    /// Read a subject's array; a subject with no blob has an empty one.
    pub fn get<T: DeserializeOwned>(&self, subject_id: &str) -> StorageResult<Vec<T>> {
        Ok(self
            .store
            .read_json(self.name, subject_id)?
            .unwrap_or_default())
    }

    /// Replace a subject's array.
    pub fn put<T: Serialize>(&self, subject_id: &str, items: &[T]) -> StorageResult<()> {
        self.store.write_json(self.name, subject_id, &items)
    }
}

/// The shared catalog array, stored under a single well-known key.
pub struct CatalogRepository<'a> {
    store: &'a BlobStore,
}

const CATALOG_KEY: &str = "all";

impl<'a> CatalogRepository<'a> {
    pub fn new(store: &'a BlobStore) -> Self {
        Self { store }
    }

    pub fn get<T: DeserializeOwned>(&self) -> StorageResult<Vec<T>> {
        Ok(self
            .store
            .read_json(blob::CATALOG, CATALOG_KEY)?
            .unwrap_or_default())
    }

    pub fn put<T: Serialize>(&self, items: &[T]) -> StorageResult<()> {
        self.store.write_json(blob::CATALOG, CATALOG_KEY, &items)
    }
}
