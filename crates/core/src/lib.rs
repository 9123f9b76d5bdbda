//! Wellspring Core - Shared domain types.
//!
//! This crate provides the types exchanged between the Wellspring storefront
//! client and the marketplace backend:
//! - typed ids, money and contact details
//! - the session snapshot (token / guest duality)
//! - cart line items and their derived totals
//! - catalog, order and address records
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no runtime. The `storefront` crate builds the session and cart
//! orchestration on top of it.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers and wire records

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
