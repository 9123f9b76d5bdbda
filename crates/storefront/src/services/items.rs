//! Item catalog endpoints.

use serde::Deserialize;
use tracing::instrument;
use wellspring_core::{CategoryId, Item, ItemId, ItemPage, Review};

use super::{PageRequest, pairs};
use crate::error::Result;
use crate::http::ApiClient;

/// Item details arrive either bare or wrapped as `{"item": {...}}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum ItemDetails {
    Wrapped { item: Item },
    Bare(Item),
}

impl From<ItemDetails> for Item {
    fn from(details: ItemDetails) -> Self {
        match details {
            ItemDetails::Wrapped { item } | ItemDetails::Bare(item) => item,
        }
    }
}

/// Item catalog service.
#[derive(Debug, Clone)]
pub struct ItemService {
    api: ApiClient,
}

impl ItemService {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Get a single item.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the item does not exist.
    #[instrument(skip(self), fields(item_id = %id))]
    pub async fn details(&self, id: ItemId) -> Result<Item> {
        let details: ItemDetails = self
            .api
            .get(&format!("api/v1/items/details/{id}"))
            .await?;
        Ok(details.into())
    }

    /// Popular items in the current module and zone.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn popular(&self, page: PageRequest) -> Result<ItemPage> {
        self.page("api/v1/items/popular", page, &[]).await
    }

    /// Most recently added items.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn latest(&self, page: PageRequest) -> Result<ItemPage> {
        self.page("api/v1/items/latest", page, &[]).await
    }

    /// Items currently on discount.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn discounted(&self, page: PageRequest) -> Result<ItemPage> {
        self.page("api/v1/items/discounted", page, &[]).await
    }

    /// Items in a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(category_id = %category))]
    pub async fn by_category(&self, category: CategoryId, page: PageRequest) -> Result<ItemPage> {
        self.page(&format!("api/v1/categories/items/{category}"), page, &[])
            .await
    }

    /// Full-text item search.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn search(&self, name: &str, page: PageRequest) -> Result<ItemPage> {
        self.page("api/v1/items/search", page, &[("name", name)])
            .await
    }

    /// Reviews of an item.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(item_id = %id))]
    pub async fn reviews(&self, id: ItemId) -> Result<Vec<Review>> {
        self.api.get(&format!("api/v1/items/reviews/{id}")).await
    }

    async fn page(&self, path: &str, page: PageRequest, extra: &[(&str, &str)]) -> Result<ItemPage> {
        let owned = page.query();
        let mut query = pairs(&owned);
        query.extend_from_slice(extra);
        self.api.get_with_query(path, &query).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_item_details_wrapped_and_bare() {
        let wrapped: ItemDetails =
            serde_json::from_str(r#"{"item": {"id": 7, "name": "Ashwagandha", "price": "100"}}"#)
                .unwrap();
        let bare: ItemDetails =
            serde_json::from_str(r#"{"id": 7, "name": "Ashwagandha", "price": 100}"#).unwrap();
        let wrapped: Item = wrapped.into();
        let bare: Item = bare.into();
        assert_eq!(wrapped.id, ItemId::new(7));
        assert_eq!(wrapped, bare);
    }
}
