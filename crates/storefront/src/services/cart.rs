//! Server-side cart endpoints.
//!
//! The guest id is sent as a query parameter on every call where the
//! caller supplies one; the backend uses it to find a guest's cart.

use tracing::instrument;
use wellspring_core::{CartItem, CartItemRequest, CartLineId, GuestId};

use crate::error::Result;
use crate::http::ApiClient;

/// Cart service.
#[derive(Debug, Clone)]
pub struct CartService {
    api: ApiClient,
}

impl CartService {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// All lines of the current actor's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn list(&self, guest_id: Option<&GuestId>) -> Result<Vec<CartItem>> {
        self.api
            .get_with_query("api/v1/customer/cart/list", &guest_query(guest_id))
            .await
    }

    /// Add a line.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, request), fields(item_id = %request.item_id, quantity = request.quantity))]
    pub async fn add(&self, request: &CartItemRequest) -> Result<()> {
        self.api.post_unit("api/v1/customer/cart/add", request).await
    }

    /// Update a line's quantity or options.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, request), fields(item_id = %request.item_id, quantity = request.quantity))]
    pub async fn update(&self, request: &CartItemRequest) -> Result<()> {
        self.api
            .post_unit("api/v1/customer/cart/update", request)
            .await
    }

    /// Remove one line.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(cart_id = %id))]
    pub async fn remove_item(&self, id: CartLineId, guest_id: Option<&GuestId>) -> Result<()> {
        let id = id.to_string();
        let mut query = vec![("cart_id", id.as_str())];
        query.extend(guest_query(guest_id));
        self.api
            .delete("api/v1/customer/cart/remove-item", &query)
            .await
    }

    /// Remove every line.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn remove_all(&self, guest_id: Option<&GuestId>) -> Result<()> {
        self.api
            .delete("api/v1/customer/cart/remove", &guest_query(guest_id))
            .await
    }
}

fn guest_query(guest_id: Option<&GuestId>) -> Vec<(&'static str, &str)> {
    guest_id
        .map(|g| vec![("guest_id", g.as_str())])
        .unwrap_or_default()
}
