//! In-memory cache for actor-independent catalog reads.
//!
//! App config, modules and categories do not depend on who is signed in, so
//! they are cached with a TTL. Keys include the selected module and locale,
//! since the backend filters and translates catalog data by both.

use std::time::Duration;

use moka::future::Cache;
use wellspring_core::{AppConfig, Category, CategoryId, Module, ModuleId};

/// Maximum number of cached entries.
const MAX_CAPACITY: u64 = 1000;

/// Cache key for catalog reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Config,
    Modules,
    Categories {
        module: Option<ModuleId>,
        locale: String,
    },
    ChildCategories {
        parent: CategoryId,
        module: Option<ModuleId>,
        locale: String,
    },
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Config(Box<AppConfig>),
    Modules(Vec<Module>),
    Categories(Vec<Category>),
}

/// Shared TTL cache; clones share entries.
#[derive(Clone)]
pub struct CatalogCache {
    inner: Cache<CacheKey, CacheValue>,
}

impl CatalogCache {
    /// Create a cache whose entries live for `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(MAX_CAPACITY)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub async fn get(&self, key: &CacheKey) -> Option<CacheValue> {
        self.inner.get(key).await
    }

    pub async fn insert(&self, key: CacheKey, value: CacheValue) {
        self.inner.insert(key, value).await;
    }

    /// Drop every entry, e.g. after the module or zone changes.
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }
}

impl std::fmt::Debug for CatalogCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogCache")
            .field("entries", &self.inner.entry_count())
            .finish()
    }
}
