//! Integration tests for the Wellspring storefront client.
//!
//! Every test runs the full client core against a `wiremock` server that
//! plays the marketplace backend; no network access or credentials needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p wellspring-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `session` - guest/customer lifecycle, logout, 401 handling
//! - `cart` - read-your-writes, totals, reload ordering
//! - `search` - supersession of overlapping searches
//! - `resources` - fetch state and unmount behaviour

use std::sync::Arc;

use serde_json::{Value, json};
use url::Url;
use wellspring_storefront::session::MemorySessionStore;
use wellspring_storefront::{Storefront, StorefrontConfig};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A mocked backend plus a storefront pointed at it.
pub struct TestContext {
    pub server: MockServer,
    pub store: Arc<MemorySessionStore>,
    pub storefront: Storefront,
}

impl TestContext {
    /// Start a mock backend and wire a storefront with an in-memory session.
    ///
    /// # Panics
    ///
    /// Panics if the storefront cannot be built.
    #[allow(clippy::unwrap_used)]
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        let store = Arc::new(MemorySessionStore::new());
        let config = StorefrontConfig::new(Url::parse(&server.uri()).unwrap());
        let storefront = Storefront::new(config, store.clone()).unwrap();
        Self {
            server,
            store,
            storefront,
        }
    }

    /// Answer guest login with `guest_id`.
    pub async fn mock_guest_login(&self, guest_id: &str) {
        Mock::given(method("POST"))
            .and(path("/api/v1/auth/guest/request"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "guest_verified",
                "guest_id": guest_id
            })))
            .mount(&self.server)
            .await;
    }

    /// Answer the profile endpoint with a fixed customer.
    pub async fn mock_profile(&self) {
        Mock::given(method("GET"))
            .and(path("/api/v1/customer/info"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 11,
                "f_name": "Ada",
                "l_name": "Lovelace",
                "email": "ada@example.com",
                "phone": "+15550100",
                "order_count": 2,
                "wishlist_count": 1
            })))
            .mount(&self.server)
            .await;
    }
}

/// A cart line as the backend returns it.
#[must_use]
pub fn cart_line(id: i64, item_id: i64, price: &str, quantity: u32) -> Value {
    json!({
        "id": id,
        "item_id": item_id,
        "price": price,
        "quantity": quantity,
        "variation": [],
        "add_on_ids": [],
        "add_on_qtys": [],
        "item": {"id": item_id, "name": format!("Item {item_id}"), "price": price}
    })
}
