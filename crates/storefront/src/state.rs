//! The storefront client facade.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::info;

use crate::auth::{AuthSession, AuthSnapshot};
use crate::cart::CartSync;
use crate::config::StorefrontConfig;
use crate::error::Result;
use crate::http::ApiClient;
use crate::services::Services;
use crate::session::{FileSessionStore, MemorySessionStore, SessionSignals, SessionStore};
use crate::toast::ToastQueue;

/// Everything a UI shell needs, wired together.
///
/// This struct is cheaply cloneable via `Arc`. The session store, HTTP
/// client, session orchestrator and cart mirror are shared by all clones.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    config: StorefrontConfig,
    api: ApiClient,
    services: Services,
    auth: Arc<AuthSession>,
    cart: Arc<CartSync>,
    toasts: ToastQueue,
}

impl Storefront {
    /// Wire the client core around `store`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: StorefrontConfig, store: Arc<dyn SessionStore>) -> Result<Self> {
        let api = ApiClient::new(&config, store, SessionSignals::new())?;
        let services = Services::new(&api, config.catalog_cache_ttl);
        let auth = AuthSession::new(&api, services.auth.clone());
        let cart = CartSync::new(services.cart.clone(), auth.clone());
        let toasts = ToastQueue::new(config.toast_duration);

        Ok(Self {
            inner: Arc::new(StorefrontInner {
                config,
                api,
                services,
                auth,
                cart,
                toasts,
            }),
        })
    }

    /// Wire the client core with the store the configuration asks for:
    /// a session file when one is configured, memory otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the session file is unreadable or corrupt, or
    /// the HTTP client cannot be built.
    pub fn from_config(config: StorefrontConfig) -> Result<Self> {
        let store: Arc<dyn SessionStore> = match &config.session_file {
            Some(path) => Arc::new(FileSessionStore::open(path)?),
            None => Arc::new(MemorySessionStore::new()),
        };
        Self::new(config, store)
    }

    /// Start the cart watcher, then restore or create the session.
    ///
    /// The watcher reloads the cart as soon as the session has an actor.
    pub async fn start(&self) -> (AuthSnapshot, JoinHandle<()>) {
        let watcher = self.inner.cart.spawn_auth_watcher();
        let snapshot = self.inner.auth.initialize().await;
        info!(phase = ?snapshot.phase, "Storefront session ready");
        (snapshot, watcher)
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the HTTP client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Get a reference to the service modules.
    #[must_use]
    pub fn services(&self) -> &Services {
        &self.inner.services
    }

    /// Get a reference to the session orchestrator.
    #[must_use]
    pub fn auth(&self) -> &Arc<AuthSession> {
        &self.inner.auth
    }

    /// Get a reference to the cart mirror.
    #[must_use]
    pub fn cart(&self) -> &Arc<CartSync> {
        &self.inner.cart
    }

    /// Get a reference to the toast queue.
    #[must_use]
    pub fn toasts(&self) -> &ToastQueue {
        &self.inner.toasts
    }
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("api", &self.inner.api)
            .field("auth", &self.inner.auth)
            .field("cart", &self.inner.cart)
            .finish_non_exhaustive()
    }
}
