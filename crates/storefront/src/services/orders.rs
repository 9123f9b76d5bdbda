//! Order endpoints.

use serde::Deserialize;
use tracing::instrument;
use wellspring_core::{Order, OrderDetail, OrderId, OrderPage, PlaceOrderRequest, Price};

use super::{MessageResponse, PageRequest, pairs};
use crate::error::Result;
use crate::http::ApiClient;
use crate::session::SessionStoreExt;

/// Response of the place-order endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderPlaced {
    pub order_id: OrderId,
    #[serde(default)]
    pub total_amount: Option<Price>,
    #[serde(default)]
    pub message: String,
}

/// Order service.
#[derive(Debug, Clone)]
pub struct OrderService {
    api: ApiClient,
}

impl OrderService {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Place an order from the current cart.
    ///
    /// Guests have their stored guest id attached when the request has none.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, request), fields(store_id = %request.store_id))]
    pub async fn place(&self, mut request: PlaceOrderRequest) -> Result<OrderPlaced> {
        let store = self.api.session_store();
        if request.guest_id.is_none() && store.token().is_none() {
            request.guest_id = store.guest_id();
        }
        self.api.post("api/v1/customer/order/place", &request).await
    }

    /// Orders still being processed.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn running(&self, page: PageRequest) -> Result<OrderPage> {
        let owned = page.query();
        self.api
            .get_with_query("api/v1/customer/order/running-orders", &pairs(&owned))
            .await
    }

    /// Order history.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn list(&self, page: PageRequest) -> Result<OrderPage> {
        let owned = page.query();
        self.api
            .get_with_query("api/v1/customer/order/list", &pairs(&owned))
            .await
    }

    /// Line items of an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn details(&self, id: OrderId) -> Result<Vec<OrderDetail>> {
        let query = self.with_guest(("order_id", id.to_string()));
        self.api
            .get_with_query("api/v1/customer/order/details", &pairs(&query))
            .await
    }

    /// Current state of an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn track(&self, id: OrderId) -> Result<Order> {
        let query = self.with_guest(("order_id", id.to_string()));
        self.api
            .get_with_query("api/v1/customer/order/track", &pairs(&query))
            .await
    }

    /// Cancel an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, e.g. the order is past cancellation.
    #[instrument(skip(self, reason), fields(order_id = %id))]
    pub async fn cancel(&self, id: OrderId, reason: &str) -> Result<MessageResponse> {
        let body = serde_json::json!({
            "order_id": id,
            "reason": reason,
        });
        self.api.put("api/v1/customer/order/cancel", &body).await
    }

    /// `pair` plus the stored guest id when acting as a guest.
    fn with_guest(&self, pair: (&'static str, String)) -> Vec<(&'static str, String)> {
        let store = self.api.session_store();
        let mut owned = vec![pair];
        if store.token().is_none()
            && let Some(guest_id) = store.guest_id()
        {
            owned.push(("guest_id", guest_id.as_str().to_string()));
        }
        owned
    }
}
