//! Server-synchronized cart mirror.
//!
//! The server owns the cart. [`CartSync`] keeps a read-through copy of its
//! lines: every mutation is followed by a full reload, so after an awaited
//! call the local lines match what the server holds. Totals are derived from
//! the lines on every read.
//!
//! Each reload takes a ticket from a monotonic counter, and a result is only
//! applied if no newer reload has been applied already. Overlapping
//! mutations therefore settle on the most recently issued reload rather than
//! whichever response arrived last.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};
use wellspring_core::{CartItem, CartItemRequest, CartLineId, CartTotals, GuestId, Price};

use crate::auth::{Actor, AuthSession};
use crate::error::{ApiError, Result, add_breadcrumb};
use crate::services::CartService;

/// Published cart contents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartState {
    pub items: Vec<CartItem>,
    /// Ticket of the reload that produced `items`.
    ticket: u64,
}

impl CartState {
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        CartTotals::of(&self.items)
    }
}

/// Cart orchestrator.
pub struct CartSync {
    cart: CartService,
    auth: Arc<AuthSession>,
    state: watch::Sender<CartState>,
    tickets: AtomicU64,
}

impl CartSync {
    #[must_use]
    pub fn new(cart: CartService, auth: Arc<AuthSession>) -> Arc<Self> {
        Arc::new(Self {
            cart,
            auth,
            state: watch::Sender::new(CartState::default()),
            tickets: AtomicU64::new(0),
        })
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Current lines.
    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        self.state.borrow().items.clone()
    }

    /// Item count and subtotal of the current lines.
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        self.state.borrow().totals()
    }

    /// Sum of line quantities.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.totals().item_count
    }

    /// Sum of price x quantity.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.totals().subtotal
    }

    /// Receive every change of the cart contents.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartState> {
        self.state.subscribe()
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Reload the cart from the server.
    ///
    /// Does nothing without an actor. Failures are logged and the previous
    /// contents kept.
    #[instrument(skip(self))]
    pub async fn refresh_cart(&self) {
        let guest_id = match self.auth.snapshot().actor() {
            Actor::None => {
                debug!("No actor, skipping cart reload");
                return;
            }
            Actor::Guest(guest_id) => Some(guest_id),
            Actor::Customer(_) => None,
        };

        let ticket = self.next_ticket();
        match self.cart.list(guest_id.as_ref()).await {
            Ok(items) => self.apply(ticket, items),
            Err(e) => warn!(error = %e, "Failed to load cart, keeping previous contents"),
        }
    }

    /// Add a line, then reload.
    ///
    /// # Errors
    ///
    /// Returns `NotSignedIn` without an actor, or the request's error.
    #[instrument(skip(self, request), fields(item_id = %request.item_id))]
    pub async fn add_item(&self, mut request: CartItemRequest) -> Result<()> {
        request.guest_id = self.actor_guest_id()?;
        self.cart.add(&request).await?;
        let item_id = request.item_id.to_string();
        add_breadcrumb("cart", "Added item", Some(&[("item_id", item_id.as_str())]));
        self.refresh_cart().await;
        Ok(())
    }

    /// Update a line, then reload.
    ///
    /// # Errors
    ///
    /// Returns `NotSignedIn` without an actor, or the request's error.
    #[instrument(skip(self, request), fields(item_id = %request.item_id))]
    pub async fn update_item(&self, mut request: CartItemRequest) -> Result<()> {
        request.guest_id = self.actor_guest_id()?;
        self.cart.update(&request).await?;
        self.refresh_cart().await;
        Ok(())
    }

    /// Remove a line, then reload.
    ///
    /// # Errors
    ///
    /// Returns `NotSignedIn` without an actor, or the request's error.
    #[instrument(skip(self))]
    pub async fn remove_item(&self, id: CartLineId) -> Result<()> {
        let guest_id = self.actor_guest_id()?;
        self.cart.remove_item(id, guest_id.as_ref()).await?;
        self.refresh_cart().await;
        Ok(())
    }

    /// Empty the cart. The local copy is cleared without a reload.
    ///
    /// # Errors
    ///
    /// Returns `NotSignedIn` without an actor, or the request's error.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self) -> Result<()> {
        let guest_id = self.actor_guest_id()?;
        self.cart.remove_all(guest_id.as_ref()).await?;
        let ticket = self.next_ticket();
        self.apply(ticket, Vec::new());
        add_breadcrumb("cart", "Cleared cart", None);
        Ok(())
    }

    /// Reload whenever the actor changes; clear the copy when there is none.
    ///
    /// The task holds the orchestrator weakly and ends once it is dropped
    /// or the session is gone.
    pub fn spawn_auth_watcher(self: &Arc<Self>) -> JoinHandle<()> {
        let weak: Weak<Self> = Arc::downgrade(self);
        let mut changes = self.auth.subscribe();

        tokio::spawn(async move {
            let mut last: Option<Actor> = None;
            loop {
                let actor = changes.borrow_and_update().actor();
                if last.as_ref() != Some(&actor) {
                    let Some(cart) = weak.upgrade() else { break };
                    match &actor {
                        Actor::None => cart.reset(),
                        Actor::Guest(_) | Actor::Customer(_) => {
                            debug!("Actor changed, reloading cart");
                            cart.refresh_cart().await;
                        }
                    }
                    last = Some(actor);
                }
                if changes.changed().await.is_err() {
                    break;
                }
            }
        })
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// The guest id to send for the current actor; `None` for customers.
    fn actor_guest_id(&self) -> Result<Option<GuestId>> {
        match self.auth.snapshot().actor() {
            Actor::None => Err(ApiError::NotSignedIn),
            Actor::Guest(guest_id) => Ok(Some(guest_id)),
            Actor::Customer(_) => Ok(None),
        }
    }

    fn next_ticket(&self) -> u64 {
        self.tickets.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn apply(&self, ticket: u64, items: Vec<CartItem>) {
        let applied = self.state.send_if_modified(|state| {
            if ticket <= state.ticket {
                return false;
            }
            state.ticket = ticket;
            state.items = items;
            true
        });
        if !applied {
            debug!(ticket, "Discarding stale cart reload");
        }
    }

    fn reset(&self) {
        let ticket = self.next_ticket();
        self.apply(ticket, Vec::new());
    }
}

impl std::fmt::Debug for CartSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartSync")
            .field("lines", &self.state.borrow().items.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use url::Url;
    use wellspring_core::ItemId;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::StorefrontConfig;
    use crate::http::ApiClient;
    use crate::services::AuthService;
    use crate::session::{MemorySessionStore, SessionSignals};

    async fn setup() -> (MockServer, Arc<AuthSession>, Arc<CartSync>) {
        let server = MockServer::start().await;
        let config = StorefrontConfig::new(Url::parse(&server.uri()).unwrap());
        let api = ApiClient::new(
            &config,
            Arc::new(MemorySessionStore::new()),
            SessionSignals::new(),
        )
        .unwrap();
        let auth = AuthSession::new(&api, AuthService::new(api.clone()));
        let cart = CartSync::new(CartService::new(api), auth.clone());
        (server, auth, cart)
    }

    fn line(id: i64, item_id: i64, price: &str, quantity: u32) -> serde_json::Value {
        serde_json::json!({"id": id, "item_id": item_id, "price": price, "quantity": quantity})
    }

    #[tokio::test]
    async fn test_mutations_require_actor() {
        let (_server, _auth, cart) = setup().await;
        let err = cart
            .add_item(CartItemRequest::add(ItemId::new(1), Price::from_units(1), 1))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotSignedIn));
    }

    #[tokio::test]
    async fn test_refresh_without_actor_is_noop() {
        let (server, _auth, cart) = setup().await;
        cart.refresh_cart().await;
        assert!(cart.items().is_empty());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_items() {
        let (server, auth, cart) = setup().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/auth/guest/request"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"guest_id": "g1"})),
            )
            .mount(&server)
            .await;
        auth.initialize().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/customer/cart/list"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!([line(1, 7, "100", 2)])),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        cart.refresh_cart().await;
        assert_eq!(cart.item_count(), 2);

        Mock::given(method("GET"))
            .and(path("/api/v1/customer/cart/list"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        cart.refresh_cart().await;
        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.subtotal(), Price::from_units(200));
    }

    #[tokio::test]
    async fn test_stale_reload_is_discarded() {
        let (_server, _auth, cart) = setup().await;
        let old = cart.next_ticket();
        let new = cart.next_ticket();
        let fresh: CartItem = serde_json::from_value(line(2, 8, "5", 1)).unwrap();
        let stale: CartItem = serde_json::from_value(line(1, 7, "100", 2)).unwrap();

        cart.apply(new, vec![fresh.clone()]);
        cart.apply(old, vec![stale]);
        assert_eq!(cart.items(), vec![fresh]);
    }
}
