//! Ready-made [`Resource`]s for the common storefront views.
//!
//! Each constructor binds a service call and flattens the endpoint's page
//! envelope into a plain `Vec`.

use futures::FutureExt;
use wellspring_core::{Address, Category, Item, Order, Store, WishList};

use crate::resource::Resource;
use crate::services::{PageRequest, Services, StoreFilter};

/// Popular items, first page.
#[must_use]
pub fn popular_items(services: &Services, page: PageRequest) -> Resource<Vec<Item>> {
    let items = services.items.clone();
    Resource::new(move || {
        let items = items.clone();
        async move { items.popular(page).await.map(|p| p.items) }.boxed()
    })
}

/// Latest items.
#[must_use]
pub fn latest_items(services: &Services, page: PageRequest) -> Resource<Vec<Item>> {
    let items = services.items.clone();
    Resource::new(move || {
        let items = items.clone();
        async move { items.latest(page).await.map(|p| p.items) }.boxed()
    })
}

/// Stores matching `filter`.
#[must_use]
pub fn stores(services: &Services, filter: StoreFilter, page: PageRequest) -> Resource<Vec<Store>> {
    let stores = services.stores.clone();
    Resource::new(move || {
        let stores = stores.clone();
        async move { stores.list(filter, page).await.map(|p| p.stores) }.boxed()
    })
}

/// Top-level categories.
#[must_use]
pub fn categories(services: &Services) -> Resource<Vec<Category>> {
    let categories = services.categories.clone();
    Resource::new(move || {
        let categories = categories.clone();
        async move { categories.list().await }.boxed()
    })
}

/// Order history.
#[must_use]
pub fn orders(services: &Services, page: PageRequest) -> Resource<Vec<Order>> {
    let orders = services.orders.clone();
    Resource::new(move || {
        let orders = orders.clone();
        async move { orders.list(page).await.map(|p| p.orders) }.boxed()
    })
}

/// Saved items and stores.
#[must_use]
pub fn wishlist(services: &Services) -> Resource<WishList> {
    let wishlist = services.wishlist.clone();
    Resource::new(move || {
        let wishlist = wishlist.clone();
        async move { wishlist.list().await }.boxed()
    })
}

/// Saved addresses.
#[must_use]
pub fn addresses(services: &Services) -> Resource<Vec<Address>> {
    let address = services.address.clone();
    Resource::new(move || {
        let address = address.clone();
        async move { address.list().await }.boxed()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use url::Url;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::StorefrontConfig;
    use crate::http::ApiClient;
    use crate::session::{MemorySessionStore, SessionSignals};

    #[tokio::test]
    async fn test_popular_items_unwraps_page() {
        let server = MockServer::start().await;
        let config = StorefrontConfig::new(Url::parse(&server.uri()).unwrap());
        let api = ApiClient::new(
            &config,
            Arc::new(MemorySessionStore::new()),
            SessionSignals::new(),
        )
        .unwrap();
        let services = Services::new(&api, Duration::from_secs(60));

        Mock::given(method("GET"))
            .and(path("/api/v1/items/popular"))
            .and(query_param("offset", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "total_size": "2",
                "limit": "10",
                "offset": "1",
                "items": [
                    {"id": 1, "name": "Magnesium", "price": "12.5"},
                    {"id": 2, "name": "Zinc", "price": 8}
                ]
            })))
            .mount(&server)
            .await;

        let resource = popular_items(&services, PageRequest::first());
        let items = resource.refetch().await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(resource.snapshot().data.unwrap()[1].name, "Zinc");
    }
}
