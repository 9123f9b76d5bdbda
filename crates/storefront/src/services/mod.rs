//! Typed wrappers around the marketplace REST resources.
//!
//! One service per backend resource. Each method maps typed arguments to a
//! single HTTP call through [`ApiClient`] and returns the decoded record or
//! the explicit envelope type for that endpoint. Side effects are limited to
//! persisting session values the response hands back (token, guest id,
//! module id, zone ids).
//!
//! # Services
//!
//! - `auth` - login, registration, guest login, profile
//! - `address` - saved delivery addresses
//! - `items` - item details, listings, reviews
//! - `stores` - store listings and details
//! - `categories` - category tree (cached)
//! - `orders` - place, list, track, cancel
//! - `wishlist` - saved items and stores
//! - `cart` - server-side cart lines
//! - `coupons` - coupon list and validation
//! - `config` - app config, modules, zones (cached)
//! - `search` - combined item/store search with supersession

pub mod address;
pub mod auth;
pub mod cache;
pub mod cart;
pub mod categories;
pub mod config;
pub mod coupons;
pub mod items;
pub mod orders;
pub mod search;
pub mod stores;
pub mod wishlist;

pub use address::AddressService;
pub use auth::{
    AuthResponse, AuthService, GuestLoginResponse, ProfileImage, ProfileUpdate, RegisterRequest,
    SocialLoginRequest,
};
pub use cache::CatalogCache;
pub use cart::CartService;
pub use categories::CategoryService;
pub use config::ConfigService;
pub use coupons::CouponService;
pub use items::ItemService;
pub use orders::{OrderPlaced, OrderService};
pub use search::SearchService;
pub use stores::{StoreFilter, StoreService};
pub use wishlist::WishlistService;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::http::ApiClient;

/// Default page size for list endpoints.
pub const DEFAULT_PAGE_LIMIT: u32 = 10;

/// `{"message": "..."}` acknowledgement returned by most mutating endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

/// Offset/limit pair sent to paginated endpoints.
///
/// The backend counts `offset` in pages starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: u32,
    pub limit: u32,
}

impl PageRequest {
    /// First page with the default limit.
    #[must_use]
    pub const fn first() -> Self {
        Self {
            offset: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }

    /// The page after this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self {
            offset: self.offset + 1,
            limit: self.limit,
        }
    }

    pub(crate) fn query(self) -> [(&'static str, String); 2] {
        [
            ("offset", self.offset.to_string()),
            ("limit", self.limit.to_string()),
        ]
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first()
    }
}

/// Borrow owned query pairs as `(&str, &str)` for [`ApiClient`].
pub(crate) fn pairs<'a>(owned: &'a [(&'a str, String)]) -> Vec<(&'a str, &'a str)> {
    owned.iter().map(|(k, v)| (*k, v.as_str())).collect()
}

// =============================================================================
// Services
// =============================================================================

/// All service modules sharing one [`ApiClient`] and one catalog cache.
#[derive(Debug, Clone)]
pub struct Services {
    pub auth: AuthService,
    pub address: AddressService,
    pub items: ItemService,
    pub stores: StoreService,
    pub categories: CategoryService,
    pub orders: OrderService,
    pub wishlist: WishlistService,
    pub cart: CartService,
    pub coupons: CouponService,
    pub config: ConfigService,
    pub search: SearchService,
}

impl Services {
    /// Build every service over `api`; catalog reads are cached for `cache_ttl`.
    #[must_use]
    pub fn new(api: &ApiClient, cache_ttl: Duration) -> Self {
        let cache = CatalogCache::new(cache_ttl);
        Self {
            auth: AuthService::new(api.clone()),
            address: AddressService::new(api.clone()),
            items: ItemService::new(api.clone()),
            stores: StoreService::new(api.clone()),
            categories: CategoryService::new(api.clone(), cache.clone()),
            orders: OrderService::new(api.clone()),
            wishlist: WishlistService::new(api.clone()),
            cart: CartService::new(api.clone()),
            coupons: CouponService::new(api.clone()),
            config: ConfigService::new(api.clone(), cache),
            search: SearchService::new(api.clone()),
        }
    }
}
