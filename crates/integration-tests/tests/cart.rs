//! Cart synchronization against a mocked backend.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use serde_json::json;
use wellspring_core::{AuthToken, CartItemRequest, CartLineId, ItemId, Price};
use wellspring_integration_tests::{TestContext, cart_line};
use wellspring_storefront::session::SessionStoreExt;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

async fn authenticated() -> TestContext {
    let ctx = TestContext::new().await;
    ctx.mock_profile().await;
    ctx.store.set_token(&AuthToken::new("tok")).unwrap();
    ctx.storefront.auth().initialize().await;
    ctx
}

#[tokio::test]
async fn test_add_item_reloads_cart() {
    let ctx = authenticated().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/customer/cart/add"))
        .and(body_partial_json(json!({"item_id": 7, "price": "100", "quantity": 2})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/customer/cart/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([cart_line(1, 7, "100", 2)])))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let cart = ctx.storefront.cart();
    cart.add_item(CartItemRequest::add(ItemId::new(7), Price::from_units(100), 2))
        .await
        .unwrap();

    let items = cart.items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].item_id, ItemId::new(7));
    assert_eq!(items[0].quantity, 2);
    assert_eq!(cart.item_count(), 2);
    assert_eq!(cart.subtotal(), Price::from_units(200));
}

#[tokio::test]
async fn test_each_mutation_observes_server_state() {
    let ctx = authenticated().await;
    let cart = ctx.storefront.cart();

    Mock::given(method("POST"))
        .and(path("/api/v1/customer/cart/add"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&ctx.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/customer/cart/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            cart_line(1, 7, "100", 1),
            cart_line(2, 9, "15.50", 3)
        ])))
        .up_to_n_times(1)
        .mount(&ctx.server)
        .await;
    cart.add_item(CartItemRequest::add(ItemId::new(9), "15.50".parse().unwrap(), 3))
        .await
        .unwrap();
    assert_eq!(cart.item_count(), 4);
    assert_eq!(cart.subtotal(), "146.50".parse().unwrap());

    Mock::given(method("POST"))
        .and(path("/api/v1/customer/cart/update"))
        .and(body_partial_json(json!({"cart_id": 2, "quantity": 1})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/customer/cart/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            cart_line(1, 7, "100", 1),
            cart_line(2, 9, "15.50", 1)
        ])))
        .up_to_n_times(1)
        .mount(&ctx.server)
        .await;
    let line = cart.items()[1].clone();
    cart.update_item(CartItemRequest::update(&line, 1)).await.unwrap();
    assert_eq!(cart.item_count(), 2);
    assert_eq!(cart.subtotal(), "115.50".parse().unwrap());

    Mock::given(method("DELETE"))
        .and(path("/api/v1/customer/cart/remove-item"))
        .and(query_param("cart_id", "1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/customer/cart/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([cart_line(2, 9, "15.50", 1)])))
        .mount(&ctx.server)
        .await;
    cart.remove_item(CartLineId::new(1)).await.unwrap();
    assert_eq!(cart.items().len(), 1);
    assert_eq!(cart.totals().item_count, 1);
}

#[tokio::test]
async fn test_mutation_failure_propagates() {
    let ctx = authenticated().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/customer/cart/add"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "errors": [{"code": "stock", "message": "Out of stock"}]
        })))
        .mount(&ctx.server)
        .await;

    let err = ctx
        .storefront
        .cart()
        .add_item(CartItemRequest::add(ItemId::new(7), Price::from_units(100), 1))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(403));
    assert_eq!(err.user_message(), "Out of stock");
}

#[tokio::test]
async fn test_clear_cart_empties_without_reload() {
    let ctx = authenticated().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/customer/cart/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([cart_line(1, 7, "100", 2)])))
        .expect(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/customer/cart/remove"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let cart = ctx.storefront.cart();
    cart.refresh_cart().await;
    assert_eq!(cart.item_count(), 2);

    cart.clear_cart().await.unwrap();
    assert!(cart.items().is_empty());
    assert_eq!(cart.subtotal(), Price::ZERO);
}

#[tokio::test]
async fn test_guest_cart_calls_carry_guest_id() {
    let ctx = TestContext::new().await;
    ctx.mock_guest_login("g123").await;
    Mock::given(method("POST"))
        .and(path("/api/v1/customer/cart/add"))
        .and(body_partial_json(json!({"guest_id": "g123"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/customer/cart/list"))
        .and(query_param("guest_id", "g123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([cart_line(1, 7, "100", 1)])))
        .mount(&ctx.server)
        .await;

    ctx.storefront.auth().initialize().await;
    let cart = ctx.storefront.cart();
    cart.add_item(CartItemRequest::add(ItemId::new(7), Price::from_units(100), 1))
        .await
        .unwrap();
    assert_eq!(cart.item_count(), 1);
}

#[tokio::test]
async fn test_watcher_reloads_when_actor_changes() {
    let ctx = TestContext::new().await;
    ctx.mock_guest_login("g123").await;
    ctx.mock_profile().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/customer/cart/list"))
        .and(query_param("guest_id", "g123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([cart_line(1, 7, "100", 1)])))
        .mount(&ctx.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/customer/cart/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            cart_line(5, 7, "100", 1),
            cart_line(6, 8, "20", 2)
        ])))
        .with_priority(10)
        .mount(&ctx.server)
        .await;

    let (_snapshot, watcher) = ctx.storefront.start().await;
    let mut changes = ctx.storefront.cart().subscribe();
    tokio::time::timeout(Duration::from_secs(5), changes.wait_for(|c| !c.items.is_empty()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ctx.storefront.cart().item_count(), 1);

    ctx.storefront
        .auth()
        .on_login_success(AuthToken::new("tok"))
        .await
        .unwrap();
    tokio::time::timeout(Duration::from_secs(5), changes.wait_for(|c| c.totals().item_count == 3))
        .await
        .unwrap()
        .unwrap();

    ctx.storefront.auth().logout().unwrap();
    tokio::time::timeout(Duration::from_secs(5), changes.wait_for(|c| c.items.is_empty()))
        .await
        .unwrap()
        .unwrap();

    watcher.abort();
}

#[tokio::test]
async fn test_older_reload_never_overwrites_newer() {
    let ctx = authenticated().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/customer/cart/list"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([cart_line(1, 7, "100", 1)]))
                .set_delay(Duration::from_millis(400)),
        )
        .up_to_n_times(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/customer/cart/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([cart_line(1, 7, "100", 5)])))
        .mount(&ctx.server)
        .await;

    let cart = ctx.storefront.cart().clone();
    let slow = {
        let cart = cart.clone();
        tokio::spawn(async move { cart.refresh_cart().await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;
    cart.refresh_cart().await;
    assert_eq!(cart.item_count(), 5);

    slow.await.unwrap();
    assert_eq!(cart.item_count(), 5);
}
