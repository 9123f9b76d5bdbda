//! Wellspring storefront client core.
//!
//! The session, cart and catalog logic behind the Wellspring marketplace
//! storefront, as a library a UI shell sits on. It talks to the marketplace
//! REST backend and keeps the client-side view of "who is shopping" and
//! "what is in their cart" consistent with the server.
//!
//! # Layers
//!
//! - [`http::ApiClient`] - authenticated JSON requests, error normalization
//! - [`session`] - persisted session keys and the 401/logout signal bus
//! - [`services`] - one typed wrapper per backend resource
//! - [`resource::Resource`] - fetch state with loading/error tracking
//! - [`auth::AuthSession`] - guest/customer lifecycle
//! - [`cart::CartSync`] - server-synchronized cart mirror
//! - [`toast::ToastQueue`] - transient notifications
//! - [`state::Storefront`] - all of the above, wired together

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod cart;
pub mod config;
pub mod error;
pub mod http;
pub mod resource;
pub mod resources;
pub mod search;
pub mod services;
pub mod session;
pub mod state;
pub mod telemetry;
pub mod toast;

pub use auth::{Actor, AuthPhase, AuthSession, AuthSnapshot};
pub use cart::{CartState, CartSync};
pub use config::StorefrontConfig;
pub use error::ApiError;
pub use http::ApiClient;
pub use resource::{Resource, ResourceState};
pub use state::Storefront;
pub use toast::{Toast, ToastKind, ToastQueue};
