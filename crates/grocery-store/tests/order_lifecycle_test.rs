use async_trait::async_trait;
use grocery_store::cart_actor::CartError;
use grocery_store::catalog;
use grocery_store::config::StoreConfig;
use grocery_store::lifecycle::Storefront;
use grocery_store::model::{OrderDraft, OrderStatus, ProductId};
use grocery_store::order_actor::{OrderBackend, OrderError};
use grocery_store::payment::{confirm_payment, PaymentConfirmation, PaymentMethod};
use grocery_store::storage::{SharedStorage, CART_KEY};
use std::sync::Arc;
use std::time::Duration;

struct DecliningBackend;

#[async_trait]
impl OrderBackend for DecliningBackend {
    async fn submit(
        &self,
        _draft: &OrderDraft,
        _payment: &PaymentConfirmation,
    ) -> Result<(), OrderError> {
        Err(OrderError::Backend("declined".to_string()))
    }
}

fn config() -> StoreConfig {
    StoreConfig {
        rng_seed: Some(11),
        ..StoreConfig::default()
    }
}

fn cash(amount: f64) -> PaymentConfirmation {
    confirm_payment(&PaymentMethod::CashOnDelivery, amount).unwrap()
}

/// Fill the cart up to a subtotal of 1000.
async fn fill_cart(view: &Storefront) {
    for (id, quantity) in [(8, 4), (7, 2), (1, 4)] {
        view.cart
            .add_item(catalog::product(id).unwrap())
            .await
            .unwrap();
        view.cart
            .update_quantity(ProductId(id), quantity)
            .await
            .unwrap();
    }
    assert_eq!(view.cart.state().await.unwrap().total(), 1000.0);
}

async fn status_of(view: &Storefront, id: &grocery_store::model::OrderId) -> OrderStatus {
    view.orders
        .get(id.clone())
        .await
        .unwrap()
        .expect("order exists")
        .status
}

#[tokio::test(start_paused = true)]
async fn test_checkout_walks_order_through_its_statuses() {
    let storage = SharedStorage::new();
    let view = Storefront::start(&storage, &config()).unwrap();
    fill_cart(&view).await;

    let order = view.orders.checkout(&cash(1040.0)).await.unwrap();
    assert_eq!(order.subtotal, 1000.0);
    assert_eq!(order.total, 1040.0);
    assert_eq!(order.status, OrderStatus::Confirmed);
    assert_eq!(order.lines.len(), 3);
    assert_eq!(order.shop_location, catalog::SHOP_LOCATION);
    assert_eq!(order.customer_location, catalog::CUSTOMER_LOCATION);

    // The cart is empty, in memory and in storage
    assert!(view.cart.state().await.unwrap().is_empty());
    let saved: serde_json::Value =
        serde_json::from_str(&storage.view().get(CART_KEY).unwrap()).unwrap();
    assert_eq!(saved["items"].as_array().map(Vec::len), Some(0));

    tokio::time::sleep(Duration::from_millis(4_900)).await;
    assert_eq!(status_of(&view, &order.id).await, OrderStatus::Confirmed);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(status_of(&view, &order.id).await, OrderStatus::Preparing);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(status_of(&view, &order.id).await, OrderStatus::OutForDelivery);

    // Nothing moves it further on its own
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(status_of(&view, &order.id).await, OrderStatus::OutForDelivery);

    view.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_courier_moves_only_while_out_for_delivery() {
    let view = Storefront::start(&SharedStorage::new(), &config()).unwrap();
    fill_cart(&view).await;
    let order = view.orders.checkout(&cash(1040.0)).await.unwrap();
    let mut updates = view.orders.subscribe(order.id.clone()).await.unwrap();

    // Preparing: the courier waits at the shop
    tokio::time::sleep(Duration::from_secs(8)).await;
    let preparing = updates.borrow_and_update().clone();
    assert_eq!(preparing.status, OrderStatus::Preparing);
    assert_eq!(preparing.courier.location, catalog::SHOP_LOCATION);

    // Out for delivery at 10 s, first tick 3 s later
    tokio::time::sleep(Duration::from_millis(5_100)).await;
    let moving = updates.borrow_and_update().clone();
    assert_eq!(moving.status, OrderStatus::OutForDelivery);
    let start = catalog::SHOP_LOCATION;
    let step = moving.courier.location;
    assert_ne!(step, start);
    assert!((step.lat - start.lat).abs() <= 0.0005);
    assert!((step.lng - start.lng).abs() <= 0.0005);

    // Cancelling stops the ticker
    let cancelled = view.orders.cancel(order.id.clone()).await.unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    tokio::time::sleep(Duration::from_secs(10)).await;
    let after = view.orders.get(order.id.clone()).await.unwrap().unwrap();
    assert_eq!(after.courier.location, cancelled.courier.location);
}

#[tokio::test(start_paused = true)]
async fn test_stop_tracking_keeps_status() {
    let view = Storefront::start(&SharedStorage::new(), &config()).unwrap();
    fill_cart(&view).await;
    let order = view.orders.checkout(&cash(1040.0)).await.unwrap();

    tokio::time::sleep(Duration::from_millis(10_100)).await;
    let stopped = view.orders.stop_tracking(order.id.clone()).await.unwrap();
    assert_eq!(stopped.status, OrderStatus::OutForDelivery);

    tokio::time::sleep(Duration::from_secs(10)).await;
    let later = view.orders.get(order.id.clone()).await.unwrap().unwrap();
    assert_eq!(later.courier.location, stopped.courier.location);
    assert_eq!(later.status, OrderStatus::OutForDelivery);
}

#[tokio::test(start_paused = true)]
async fn test_declined_order_leaves_cart_untouched() {
    let view = Storefront::with_backend(
        &SharedStorage::new(),
        &config(),
        Arc::new(DecliningBackend),
    )
    .unwrap();
    fill_cart(&view).await;
    let before = view.cart.state().await.unwrap();

    let err = view.orders.checkout(&cash(1040.0)).await.unwrap_err();
    assert_eq!(err, OrderError::Backend("declined".to_string()));
    assert_eq!(view.cart.state().await.unwrap(), before);
    assert!(view.orders.list().await.unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_payment_must_cover_cart_and_delivery() {
    let view = Storefront::start(&SharedStorage::new(), &config()).unwrap();
    fill_cart(&view).await;
    let before = view.cart.state().await.unwrap();

    let err = view.orders.checkout(&cash(1000.0)).await.unwrap_err();
    assert_eq!(
        err,
        OrderError::PaymentMismatch {
            paid: 1000.0,
            due: 1040.0
        }
    );
    assert_eq!(view.cart.state().await.unwrap(), before);
    assert!(view.orders.list().await.unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_items_added_during_processing_stay_in_cart() {
    let view = Storefront::start(&SharedStorage::new(), &config()).unwrap();
    fill_cart(&view).await;

    let orders = view.orders.clone();
    let checkout = tokio::spawn(async move { orders.checkout(&cash(1040.0)).await });

    // Processing takes 2 s; add more paneer halfway through
    tokio::time::sleep(Duration::from_millis(500)).await;
    view.cart
        .add_item(catalog::product(7).unwrap())
        .await
        .unwrap();

    let order = checkout.await.unwrap().unwrap();
    assert_eq!(order.subtotal, 1000.0);
    assert_eq!(order.total, 1040.0);
    assert_eq!(order.lines.len(), 3);

    let left = view.cart.state().await.unwrap();
    assert_eq!(left.lines().len(), 1);
    assert_eq!(left.quantity_of(ProductId(7)), 1);
    assert_eq!(left.total(), 120.0);
}

#[tokio::test(start_paused = true)]
async fn test_items_removed_during_processing_fail_checkout() {
    let view = Storefront::start(&SharedStorage::new(), &config()).unwrap();
    fill_cart(&view).await;

    let orders = view.orders.clone();
    let checkout = tokio::spawn(async move { orders.checkout(&cash(1040.0)).await });

    tokio::time::sleep(Duration::from_millis(500)).await;
    view.cart.remove_item(ProductId(8)).await.unwrap();
    let before = view.cart.state().await.unwrap();

    let err = checkout.await.unwrap().unwrap_err();
    assert!(matches!(err, OrderError::Cart(CartError::Changed(_))));
    assert_eq!(view.cart.state().await.unwrap(), before);
    assert!(view.orders.list().await.unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_empty_cart_checkout_is_rejected() {
    let view = Storefront::start(&SharedStorage::new(), &config()).unwrap();

    let err = view.orders.checkout(&cash(40.0)).await.unwrap_err();
    assert_eq!(err, OrderError::EmptyCart);
    assert!(view.orders.list().await.unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_cancel_before_preparing_and_listing() {
    let view = Storefront::start(&SharedStorage::new(), &config()).unwrap();

    fill_cart(&view).await;
    let first = view.orders.checkout(&cash(1040.0)).await.unwrap();
    view.cart
        .add_item(catalog::product(3).unwrap())
        .await
        .unwrap();
    let second = view.orders.checkout(&cash(120.0)).await.unwrap();
    assert_ne!(first.id, second.id);
    assert_eq!(second.total, 120.0);

    view.orders.cancel(first.id.clone()).await.unwrap();
    tokio::time::sleep(Duration::from_secs(11)).await;

    let orders = view.orders.list().await.unwrap();
    let statuses: Vec<_> = orders.iter().map(|o| (o.id.clone(), o.status)).collect();
    assert_eq!(
        statuses,
        vec![
            (first.id, OrderStatus::Cancelled),
            (second.id, OrderStatus::OutForDelivery),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_with_pending_timers() {
    let view = Storefront::start(&SharedStorage::new(), &config()).unwrap();
    fill_cart(&view).await;
    view.orders.checkout(&cash(1040.0)).await.unwrap();

    // Transitions are still scheduled; shutdown must not wait for them
    view.shutdown().await.unwrap();
}
