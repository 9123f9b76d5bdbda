//! Application config, modules and zones.
//!
//! Zone lookup and module selection persist their result in the session
//! store, since every later request sends them as headers. Both also drop
//! the catalog cache: cached categories belong to the previous module or
//! zone.

use tracing::{debug, info, instrument};
use wellspring_core::{AppConfig, Module, ModuleId, ZoneId, ZoneInfo};

use super::cache::{CacheKey, CacheValue, CatalogCache};
use crate::error::Result;
use crate::http::ApiClient;
use crate::session::SessionStoreExt;

/// Configuration service.
#[derive(Debug, Clone)]
pub struct ConfigService {
    api: ApiClient,
    cache: CatalogCache,
}

impl ConfigService {
    #[must_use]
    pub const fn new(api: ApiClient, cache: CatalogCache) -> Self {
        Self { api, cache }
    }

    /// Public application configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn app_config(&self) -> Result<AppConfig> {
        if let Some(CacheValue::Config(config)) = self.cache.get(&CacheKey::Config).await {
            debug!("Cache hit for app config");
            return Ok(*config);
        }

        let config: AppConfig = self.api.get("api/v1/config").await?;
        self.cache
            .insert(CacheKey::Config, CacheValue::Config(Box::new(config.clone())))
            .await;
        Ok(config)
    }

    /// Available marketplace modules.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn modules(&self) -> Result<Vec<Module>> {
        if let Some(CacheValue::Modules(modules)) = self.cache.get(&CacheKey::Modules).await {
            debug!("Cache hit for modules");
            return Ok(modules);
        }

        let modules: Vec<Module> = self.api.get("api/v1/module").await?;
        self.cache
            .insert(CacheKey::Modules, CacheValue::Modules(modules.clone()))
            .await;
        Ok(modules)
    }

    /// Zones covering a coordinate. The result is persisted.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the zones cannot be persisted.
    #[instrument(skip(self))]
    pub async fn zone_for(&self, lat: &str, lng: &str) -> Result<Vec<ZoneId>> {
        let zone: ZoneInfo = self
            .api
            .get_with_query("api/v1/config/get-zone-id", &[("lat", lat), ("lng", lng)])
            .await?;
        self.api.session_store().set_zone_ids(&zone.zone_id)?;
        self.cache.invalidate_all();
        info!(zones = ?zone.zone_id, "Zone selected");
        Ok(zone.zone_id)
    }

    /// Make `module` the active module. The choice is persisted.
    ///
    /// # Errors
    ///
    /// Returns an error if the module cannot be persisted.
    #[instrument(skip(self))]
    pub fn select_module(&self, module: ModuleId) -> Result<()> {
        self.api.session_store().set_module_id(module)?;
        self.cache.invalidate_all();
        info!(module_id = %module, "Module selected");
        Ok(())
    }
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
    use crate::session::{MemorySessionStore, SessionSignals};

    async fn service() -> (MockServer, ConfigService, Arc<MemorySessionStore>) {
        let server = MockServer::start().await;
        let store = Arc::new(MemorySessionStore::new());
        let config = StorefrontConfig::new(Url::parse(&server.uri()).unwrap());
        let api = ApiClient::new(&config, store.clone(), SessionSignals::new()).unwrap();
        let service = ConfigService::new(api, CatalogCache::new(Duration::from_secs(60)));
        (server, service, store)
    }

    #[tokio::test]
    async fn test_app_config_is_cached() {
        let (server, service, _store) = service().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/config"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "business_name": "Wellspring",
                "currency_symbol": "$",
                "guest_checkout_status": 1
            })))
            .expect(1)
            .mount(&server)
            .await;

        let first = service.app_config().await.unwrap();
        let second = service.app_config().await.unwrap();
        assert_eq!(first.business_name, "Wellspring");
        assert!(second.allows_guest_checkout());
    }

    #[tokio::test]
    async fn test_zone_lookup_persists_zone_ids() {
        let (server, service, store) = service().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/config/get-zone-id"))
            .and(query_param("lat", "23.8"))
            .and(query_param("lng", "90.4"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"zone_id": "[1,2]"})),
            )
            .mount(&server)
            .await;

        let zones = service.zone_for("23.8", "90.4").await.unwrap();
        assert_eq!(zones, vec![ZoneId::new(1), ZoneId::new(2)]);
        assert_eq!(store.zone_ids(), zones);
    }

    #[tokio::test]
    async fn test_select_module_persists() {
        let (_server, service, store) = service().await;
        service.select_module(ModuleId::new(4)).unwrap();
        assert_eq!(store.module_id(), Some(ModuleId::new(4)));
    }
}
