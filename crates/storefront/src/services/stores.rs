//! Store catalog endpoints.

use tracing::instrument;
use wellspring_core::{ItemPage, Store, StoreId, StorePage};

use super::{PageRequest, pairs};
use crate::error::Result;
use crate::http::ApiClient;

/// Listing filter accepted by the store list endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreFilter {
    #[default]
    All,
    Delivery,
    TakeAway,
}

impl StoreFilter {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Delivery => "delivery",
            Self::TakeAway => "take_away",
        }
    }
}

/// Store catalog service.
#[derive(Debug, Clone)]
pub struct StoreService {
    api: ApiClient,
}

impl StoreService {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Stores in the current zone.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn list(&self, filter: StoreFilter, page: PageRequest) -> Result<StorePage> {
        let owned = page.query();
        self.api
            .get_with_query(
                &format!("api/v1/stores/get-stores/{}", filter.as_str()),
                &pairs(&owned),
            )
            .await
    }

    /// Most popular stores.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn popular(&self) -> Result<Vec<Store>> {
        let page: StorePage = self.api.get("api/v1/stores/popular").await?;
        Ok(page.stores)
    }

    /// Newest stores.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn latest(&self) -> Result<Vec<Store>> {
        let page: StorePage = self.api.get("api/v1/stores/latest").await?;
        Ok(page.stores)
    }

    /// A single store.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the store does not exist.
    #[instrument(skip(self), fields(store_id = %id))]
    pub async fn details(&self, id: StoreId) -> Result<Store> {
        self.api.get(&format!("api/v1/stores/details/{id}")).await
    }

    /// Items sold by a store.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(store_id = %id))]
    pub async fn items(&self, id: StoreId, page: PageRequest) -> Result<ItemPage> {
        let owned = page.query();
        let store_id = id.to_string();
        let mut query = pairs(&owned);
        query.push(("store_id", store_id.as_str()));
        self.api.get_with_query("api/v1/items/latest", &query).await
    }
}
