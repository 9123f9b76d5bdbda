//! Catalog records: items, stores, categories, modules, coupons and zones.
//!
//! List endpoints wrap their records in a page envelope whose array lives
//! under a resource-specific key. Each envelope gets its own type here so the
//! key is fixed per endpoint.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use crate::{CategoryId, CouponId, ItemId, ModuleId, Price, StoreId, ZoneId};

/// A sellable item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub price: Price,
    #[serde(default)]
    pub discount: Option<Price>,
    #[serde(default)]
    pub discount_type: Option<String>,
    #[serde(default)]
    pub avg_rating: Option<f64>,
    #[serde(default)]
    pub rating_count: Option<u32>,
    #[serde(default)]
    pub store_id: Option<StoreId>,
    #[serde(default)]
    pub store_name: Option<String>,
    #[serde(default)]
    pub module_id: Option<ModuleId>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub stock: Option<i64>,
    #[serde(default)]
    pub unit_type: Option<String>,
}

/// A vendor store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    pub id: StoreId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub cover_photo: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub avg_rating: Option<f64>,
    #[serde(default)]
    pub delivery_time: Option<String>,
    #[serde(default)]
    pub minimum_order: Option<Price>,
    #[serde(default)]
    pub module_id: Option<ModuleId>,
    #[serde(default)]
    pub zone_id: Option<ZoneId>,
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
    #[serde(default)]
    pub position: Option<i64>,
}

/// A marketplace module (e.g. pharmacy, grocery).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub id: ModuleId,
    #[serde(default)]
    pub module_name: String,
    #[serde(default)]
    pub module_type: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A discount coupon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    pub id: CouponId,
    #[serde(default)]
    pub title: String,
    pub code: String,
    #[serde(default)]
    pub discount: Price,
    /// `"percent"` or `"amount"`.
    #[serde(default)]
    pub discount_type: String,
    #[serde(default)]
    pub min_purchase: Price,
    #[serde(default)]
    pub max_discount: Option<Price>,
    #[serde(default)]
    pub expire_date: Option<NaiveDate>,
    #[serde(default)]
    pub store_id: Option<StoreId>,
}

impl Coupon {
    /// Discount this coupon grants on `subtotal`, capped and floored at zero.
    #[must_use]
    pub fn discount_on(&self, subtotal: Price) -> Price {
        if subtotal < self.min_purchase {
            return Price::ZERO;
        }
        let raw = if self.discount_type == "percent" {
            Price::new(subtotal.amount() * self.discount.amount() / Decimal::ONE_HUNDRED)
        } else {
            self.discount
        };
        let capped = match self.max_discount {
            Some(max) if max > Price::ZERO && raw > max => max,
            _ => raw,
        };
        capped.min(subtotal)
    }
}

/// The customer's saved items and stores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WishList {
    #[serde(default)]
    pub item: Vec<Item>,
    #[serde(default)]
    pub store: Vec<Store>,
}

/// Result of the zone lookup for a coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneInfo {
    /// Zone ids covering the coordinate. The backend sends these as a JSON
    /// array encoded inside a string (`"[1,2]"`); both forms are accepted.
    #[serde(deserialize_with = "zone_ids_from_any")]
    pub zone_id: Vec<ZoneId>,
}

/// Subset of the public application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub business_name: String,
    #[serde(default)]
    pub currency_symbol: String,
    #[serde(default)]
    pub currency_symbol_direction: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub guest_checkout_status: Option<u8>,
    #[serde(default)]
    pub module: Option<Module>,
    /// Remaining settings, kept verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl AppConfig {
    /// Whether the marketplace accepts orders from guests.
    #[must_use]
    pub fn allows_guest_checkout(&self) -> bool {
        self.guest_checkout_status == Some(1)
    }
}

/// Page envelope of item list endpoints: `{total_size, limit, offset, items}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemPage {
    #[serde(default, deserialize_with = "count_from_any")]
    pub total_size: u32,
    #[serde(default, deserialize_with = "count_from_any")]
    pub limit: u32,
    #[serde(default, deserialize_with = "count_from_any")]
    pub offset: u32,
    #[serde(default)]
    pub items: Vec<Item>,
}

/// Page envelope of store list endpoints: `{total_size, limit, offset, stores}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorePage {
    #[serde(default, deserialize_with = "count_from_any")]
    pub total_size: u32,
    #[serde(default, deserialize_with = "count_from_any")]
    pub limit: u32,
    #[serde(default, deserialize_with = "count_from_any")]
    pub offset: u32,
    #[serde(default)]
    pub stores: Vec<Store>,
}

/// Combined response of the item-or-store search endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemAndStoreResults {
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub stores: Vec<Store>,
}

/// A customer review of an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub item_id: ItemId,
    /// Star rating, 1 to 5
    #[serde(default)]
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Accept a count as a JSON number, a numeric string or null.
pub(crate) fn count_from_any<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u32),
        Text(String),
        Null(()),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) if s.trim().is_empty() => Ok(0),
        Raw::Text(s) => s.trim().parse().map_err(de::Error::custom),
        Raw::Null(()) => Ok(0),
    }
}

fn zone_ids_from_any<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<ZoneId>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        List(Vec<ZoneId>),
        Encoded(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::List(ids) => Ok(ids),
        Raw::Encoded(s) => serde_json::from_str(&s).map_err(de::Error::custom),
    }
}
