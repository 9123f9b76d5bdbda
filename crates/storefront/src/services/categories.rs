//! Category endpoints, cached per module and locale.

use tracing::{debug, instrument};
use wellspring_core::{Category, CategoryId};

use super::cache::{CacheKey, CacheValue, CatalogCache};
use crate::error::Result;
use crate::http::ApiClient;
use crate::session::SessionStoreExt;

/// Category tree service.
#[derive(Debug, Clone)]
pub struct CategoryService {
    api: ApiClient,
    cache: CatalogCache,
}

impl CategoryService {
    #[must_use]
    pub const fn new(api: ApiClient, cache: CatalogCache) -> Self {
        Self { api, cache }
    }

    /// Top-level categories of the selected module.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Category>> {
        let key = CacheKey::Categories {
            module: self.api.session_store().module_id(),
            locale: self.api.locale().to_string(),
        };
        self.cached(key, "api/v1/categories").await
    }

    /// Sub-categories of `parent`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(parent = %parent))]
    pub async fn children(&self, parent: CategoryId) -> Result<Vec<Category>> {
        let key = CacheKey::ChildCategories {
            parent,
            module: self.api.session_store().module_id(),
            locale: self.api.locale().to_string(),
        };
        self.cached(key, &format!("api/v1/categories/childes/{parent}"))
            .await
    }

    async fn cached(&self, key: CacheKey, path: &str) -> Result<Vec<Category>> {
        if let Some(CacheValue::Categories(categories)) = self.cache.get(&key).await {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories: Vec<Category> = self.api.get(path).await?;
        self.cache
            .insert(key, CacheValue::Categories(categories.clone()))
            .await;
        Ok(categories)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use url::Url;
    use wellspring_core::ModuleId;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::StorefrontConfig;
    use crate::session::{MemorySessionStore, SessionSignals};

    #[tokio::test]
    async fn test_list_is_cached_per_module() {
        let server = MockServer::start().await;
        let store = Arc::new(MemorySessionStore::new());
        let config = StorefrontConfig::new(Url::parse(&server.uri()).unwrap());
        let api = ApiClient::new(&config, store.clone(), SessionSignals::new()).unwrap();
        let service = CategoryService::new(api, CatalogCache::new(Duration::from_secs(60)));

        Mock::given(method("GET"))
            .and(path("/api/v1/categories"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 1, "name": "Supplements"},
                {"id": 2, "name": "Skincare"}
            ])))
            .expect(2)
            .mount(&server)
            .await;

        store.set_module_id(ModuleId::new(1)).unwrap();
        assert_eq!(service.list().await.unwrap().len(), 2);
        assert_eq!(service.list().await.unwrap().len(), 2);

        store.set_module_id(ModuleId::new(2)).unwrap();
        assert_eq!(service.list().await.unwrap().len(), 2);
    }
}
