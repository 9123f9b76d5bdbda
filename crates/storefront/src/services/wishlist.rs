//! Wishlist endpoints.

use tracing::instrument;
use wellspring_core::{ItemId, StoreId, WishList};

use super::MessageResponse;
use crate::error::Result;
use crate::http::ApiClient;

/// Wishlist service.
#[derive(Debug, Clone)]
pub struct WishlistService {
    api: ApiClient,
}

impl WishlistService {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Saved items and stores.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<WishList> {
        self.api.get("api/v1/customer/wish-list").await
    }

    /// Save an item.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(item_id = %id))]
    pub async fn add_item(&self, id: ItemId) -> Result<MessageResponse> {
        self.add(&format!("api/v1/customer/wish-list/add?item_id={id}"))
            .await
    }

    /// Save a store.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(store_id = %id))]
    pub async fn add_store(&self, id: StoreId) -> Result<MessageResponse> {
        self.add(&format!("api/v1/customer/wish-list/add?store_id={id}"))
            .await
    }

    /// Remove a saved item.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(item_id = %id))]
    pub async fn remove_item(&self, id: ItemId) -> Result<()> {
        let id = id.to_string();
        self.api
            .delete("api/v1/customer/wish-list/remove", &[("item_id", id.as_str())])
            .await
    }

    /// Remove a saved store.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(store_id = %id))]
    pub async fn remove_store(&self, id: StoreId) -> Result<()> {
        let id = id.to_string();
        self.api
            .delete("api/v1/customer/wish-list/remove", &[("store_id", id.as_str())])
            .await
    }

    async fn add(&self, path: &str) -> Result<MessageResponse> {
        self.api.post(path, &serde_json::json!({})).await
    }
}
