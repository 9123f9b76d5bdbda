//! Cart line items and derived totals.
//!
//! The server owns the cart. Clients hold a read-through copy of the line
//! items and derive every aggregate from it on demand, so totals cannot drift
//! from the lines they summarize.

use serde::{Deserialize, Serialize};

use crate::{CartLineId, GuestId, Item, ItemId, Price, Store};

/// A chosen variation on a cart line (e.g. size, weight, flavour).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariationSelection {
    /// Variation type label, e.g. `"500g"`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Price of the variation when it overrides the item price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    /// Backend-specific fields kept verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One line of the server-side cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartLineId,
    pub item_id: ItemId,
    pub price: Price,
    pub quantity: u32,
    #[serde(default)]
    pub variant: Option<String>,
    #[serde(default)]
    pub variation: Vec<VariationSelection>,
    #[serde(default)]
    pub add_on_ids: Vec<i64>,
    #[serde(default)]
    pub add_on_qtys: Vec<u32>,
    /// Item metadata embedded by the backend.
    #[serde(default)]
    pub item: Option<Item>,
    /// Store the item is sold by.
    #[serde(default)]
    pub store: Option<Store>,
}

impl CartItem {
    /// Price of the whole line.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// Body of the add-to-cart and update-cart calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItemRequest {
    /// Line being updated; absent when adding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cart_id: Option<CartLineId>,
    pub item_id: ItemId,
    /// Polymorphic model name the backend expects (`"Item"` or `"ItemCampaign"`).
    pub model: String,
    pub price: Price,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(default)]
    pub variation: Vec<VariationSelection>,
    #[serde(default)]
    pub add_on_ids: Vec<i64>,
    #[serde(default)]
    pub add_on_qtys: Vec<u32>,
    /// Filled in by the client for guest sessions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_id: Option<GuestId>,
}

impl CartItemRequest {
    /// A plain add request for an item without variations or add-ons.
    #[must_use]
    pub fn add(item_id: ItemId, price: Price, quantity: u32) -> Self {
        Self {
            cart_id: None,
            item_id,
            model: "Item".to_string(),
            price,
            quantity,
            variant: None,
            variation: Vec::new(),
            add_on_ids: Vec::new(),
            add_on_qtys: Vec::new(),
            guest_id: None,
        }
    }

    /// An update request changing the quantity of an existing line.
    #[must_use]
    pub fn update(line: &CartItem, quantity: u32) -> Self {
        Self {
            cart_id: Some(line.id),
            item_id: line.item_id,
            model: "Item".to_string(),
            price: line.price,
            quantity,
            variant: line.variant.clone(),
            variation: line.variation.clone(),
            add_on_ids: line.add_on_ids.clone(),
            add_on_qtys: line.add_on_qtys.clone(),
            guest_id: None,
        }
    }
}

/// Aggregates derived from a slice of cart lines.
///
/// Always computed from the lines at hand; never stored next to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CartTotals {
    /// Sum of line quantities.
    pub item_count: u32,
    /// Sum of price x quantity.
    pub subtotal: Price,
}

impl CartTotals {
    /// Compute totals for the given lines.
    #[must_use]
    pub fn of(items: &[CartItem]) -> Self {
        Self {
            item_count: items.iter().map(|i| i.quantity).sum(),
            subtotal: items.iter().map(CartItem::line_total).sum(),
        }
    }
}
