//! Coupon endpoints.

use tracing::instrument;
use wellspring_core::{Coupon, StoreId};

use crate::error::Result;
use crate::http::ApiClient;

/// Coupon service.
#[derive(Debug, Clone)]
pub struct CouponService {
    api: ApiClient,
}

impl CouponService {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Coupons available to the customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Coupon>> {
        self.api.get("api/v1/coupon/list").await
    }

    /// Validate `code` against a store and return the coupon it names.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the coupon does not apply.
    #[instrument(skip(self), fields(store_id = %store))]
    pub async fn apply(&self, code: &str, store: StoreId) -> Result<Coupon> {
        let store = store.to_string();
        self.api
            .get_with_query(
                "api/v1/coupon/apply",
                &[("code", code.trim()), ("store_id", store.as_str())],
            )
            .await
    }
}
