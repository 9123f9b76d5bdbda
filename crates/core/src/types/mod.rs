//! Core types for Wellspring.
//!
//! This module provides type-safe wrappers for the marketplace's domain
//! concepts and the JSON records the backend exchanges.

pub mod address;
pub mod cart;
pub mod catalog;
pub mod contact;
pub mod id;
pub mod order;
pub mod price;
pub mod session;
pub mod user;

pub use address::{Address, AddressInput, AddressType};
pub use cart::{CartItem, CartItemRequest, CartTotals, VariationSelection};
pub use catalog::{
    AppConfig, Category, Coupon, Item, ItemAndStoreResults, ItemPage, Module, Review, Store,
    StorePage, WishList, ZoneInfo,
};
pub use contact::{ContactError, Email, Phone};
pub use id::*;
pub use order::{Order, OrderDetail, OrderPage, OrderStatus, PaymentMethod, PlaceOrderRequest};
pub use price::Price;
pub use session::{AuthToken, GuestId, Session};
pub use user::UserProfile;
