//! Combined item and store search.

use tracing::instrument;
use wellspring_core::ItemAndStoreResults;

use crate::error::Result;
use crate::http::ApiClient;
use crate::search::SearchCoordinator;

/// Search service. Clones share one [`SearchCoordinator`], so a new search
/// from any clone supersedes the one in flight.
#[derive(Debug, Clone)]
pub struct SearchService {
    api: ApiClient,
    coordinator: SearchCoordinator,
}

impl SearchService {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            coordinator: SearchCoordinator::new(),
        }
    }

    /// Search items and stores by name.
    ///
    /// Resolves to `Ok(None)` when a newer search superseded this one.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn search_items_and_stores(&self, name: &str) -> Result<Option<ItemAndStoreResults>> {
        let api = self.api.clone();
        let name = name.trim().to_string();
        self.coordinator
            .run(async move {
                api.get_with_query::<ItemAndStoreResults>(
                    "api/v1/items/item-or-store-search",
                    &[("name", name.as_str())],
                )
                .await
            })
            .await
    }

    /// Abandon the search in flight, if any.
    pub fn cancel(&self) {
        self.coordinator.cancel();
    }
}
