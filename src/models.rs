// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 The Fly Shop

//! Storefront record types and the pure list mutations the handlers use.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Fallback price for shopping-list items added without one.
pub const DEFAULT_PRICE: f64 = 2.50;

/// A fly pattern in the shared catalog.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CatalogItem {
    /// Pattern name, unique within the catalog
    pub name: String,
    /// Pattern category, e.g. "Streamer", "Dry Fly"
    #[serde(rename = "type")]
    pub pattern_type: String,
    /// Target species, e.g. "Trout, Bass"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_for: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Image URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Tying recipe
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe: Option<String>,
}

/// A pattern a user marked as favorite.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FavoriteItem {
    pub name: String,
    #[serde(rename = "type")]
    pub pattern_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_for: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A shopping-list line.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ShoppingItem {
    pub name: String,
    #[serde(rename = "type")]
    pub pattern_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_for: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe: Option<String>,
    pub quantity: u32,
    pub price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A line of a placed order, snapshotted from the shopping list.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub name: String,
    #[serde(rename = "type")]
    pub pattern_type: String,
    pub quantity: u32,
    pub price: f64,
}

/// A placed order.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: String,
    pub status: String,
    pub total_amount: f64,
    pub total_flies: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Request types
// ============================================================================

/// Body for adding a favorite or a shopping-list item.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AddPatternRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub pattern_type: String,
    #[serde(default)]
    pub best_for: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub recipe: Option<String>,
    /// Shopping list only; favorites ignore it
    #[serde(default)]
    pub price: Option<f64>,
}

/// Body for setting a shopping-list line quantity.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SetQuantityRequest {
    pub name: String,
    pub quantity: u32,
}

/// Body for placing an order.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PlaceOrderRequest {
    #[serde(default)]
    pub notes: Option<String>,
}

/// Body for replacing a catalog entry.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCatalogRequest {
    /// Name of the entry being replaced
    pub original_name: String,
    #[serde(flatten)]
    pub item: CatalogItem,
}

// ============================================================================
// Pure list mutations
// ============================================================================

impl AddPatternRequest {
    pub fn into_favorite(self, now: DateTime<Utc>) -> FavoriteItem {
        FavoriteItem {
            name: self.name,
            pattern_type: self.pattern_type,
            best_for: self.best_for,
            description: self.description,
            image: self.image,
            recipe: self.recipe,
            created_at: now,
        }
    }

    pub fn into_shopping_item(self, now: DateTime<Utc>) -> ShoppingItem {
        ShoppingItem {
            name: self.name,
            pattern_type: self.pattern_type,
            best_for: self.best_for,
            description: self.description,
            image: self.image,
            recipe: self.recipe,
            quantity: 1,
            price: self.price.unwrap_or(DEFAULT_PRICE),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Add a favorite unless one with the same name exists. Returns whether
/// the list changed.
pub fn add_favorite(favorites: &mut Vec<FavoriteItem>, item: FavoriteItem) -> bool {
    if favorites.iter().any(|f| f.name == item.name) {
        return false;
    }
    favorites.push(item);
    true
}

/// Add to the shopping list, bumping the quantity when the name is
/// already listed. Returns the resulting quantity of the line.
pub fn add_to_shopping_list(items: &mut Vec<ShoppingItem>, item: ShoppingItem) -> u32 {
    if let Some(existing) = items.iter_mut().find(|i| i.name == item.name) {
        existing.quantity += 1;
        existing.updated_at = item.updated_at;
        return existing.quantity;
    }
    let quantity = item.quantity;
    items.push(item);
    quantity
}

/// Snapshot the shopping list into an order.
pub fn build_order(
    list: &[ShoppingItem],
    notes: Option<String>,
    now: DateTime<Utc>,
) -> Order {
    let items: Vec<OrderItem> = list
        .iter()
        .map(|line| OrderItem {
            name: line.name.clone(),
            pattern_type: line.pattern_type.clone(),
            quantity: line.quantity,
            price: line.price,
        })
        .collect();

    let total_amount = items
        .iter()
        .map(|item| item.price * f64::from(item.quantity))
        .sum();
    let total_flies = items.iter().map(|item| item.quantity).sum();

    Order {
        id: Uuid::new_v4().to_string(),
        status: "pending".to_string(),
        total_amount,
        total_flies,
        notes,
        items,
        created_at: now,
        updated_at: now,
    }
}
