use grocery_actor::tracing::setup_tracing;
use grocery_store::catalog;
use grocery_store::config::StoreConfig;
use grocery_store::lifecycle::Storefront;
use grocery_store::model::{Location, OrderStatus, ProductId};
use grocery_store::payment::{confirm_payment, PaymentMethod};
use grocery_store::storage::SharedStorage;
use std::time::Duration;
use tracing::{info, warn, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = StoreConfig::from_env().map_err(|e| e.to_string())?;
    let storage = SharedStorage::new();

    // Two views on the same storage, like two open tabs
    let tab = Storefront::start(&storage, &config).map_err(|e| e.to_string())?;
    let other_tab = Storefront::start(&storage, &config).map_err(|e| e.to_string())?;

    let identity = tab
        .session
        .login("customer@rks.com", "customer123")
        .await
        .map_err(|e| e.to_string())?;
    info!(name = %identity.name, role = %identity.role, "Logged in");

    let mut selector = tab.shop_selector();
    selector
        .set_device_location(Some(Location::new(28.5360, 77.2170)))
        .map_err(|e| e.to_string())?;
    for shop in selector.listings() {
        info!(shop = %shop.shop.name, distance = %shop.distance, "Nearby shop");
    }

    let span = tracing::info_span!("shopping");
    async {
        for id in [1, 1, 7, 8] {
            let product = catalog::product(id).ok_or_else(|| format!("no product {id}"))?;
            tab.cart.add_item(product).await.map_err(|e| e.to_string())?;
        }
        tab.cart
            .update_quantity(ProductId(8), 3)
            .await
            .map_err(|e| e.to_string())?;
        Ok::<_, String>(())
    }
    .instrument(span)
    .await?;

    // Give the other tab a moment to pick up the cart
    tokio::time::sleep(Duration::from_millis(50)).await;
    let mirrored = other_tab.cart.state().await.map_err(|e| e.to_string())?;
    info!(items = mirrored.item_count(), total = mirrored.total(), "Other tab sees cart");

    let cart = tab.cart.state().await.map_err(|e| e.to_string())?;
    let payment = confirm_payment(
        &PaymentMethod::CashOnDelivery,
        cart.total() + config.orders.delivery_fee,
    )
    .map_err(|e| e.to_string())?;

    let order = tab
        .orders
        .checkout(&payment)
        .await
        .map_err(|e| e.to_string())?;
    info!(order_id = %order.id, total = order.total, eta = %order.estimated_delivery_time, "Order placed");

    let mut updates = tab
        .orders
        .subscribe(order.id.clone())
        .await
        .map_err(|e| e.to_string())?;
    let mut courier_updates = 0;
    while courier_updates < 2 {
        if updates.changed().await.is_err() {
            warn!("Order updates ended early");
            break;
        }
        let current = updates.borrow_and_update().clone();
        info!(status = %current.status, courier = %current.courier.location, "Order update");
        if current.status == OrderStatus::OutForDelivery {
            courier_updates += 1;
        }
    }

    tab.orders
        .stop_tracking(order.id.clone())
        .await
        .map_err(|e| e.to_string())?;
    tab.session.logout().await.map_err(|e| e.to_string())?;
    drop(updates);

    other_tab.shutdown().await?;
    tab.shutdown().await?;
    Ok(())
}
