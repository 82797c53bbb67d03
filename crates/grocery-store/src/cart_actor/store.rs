//! [`ActorState`] implementation for the persisted cart.

use super::CartError;
use crate::model::{CartLine, CartState, Product, ProductId};
use crate::storage::{StorageView, CART_KEY};
use async_trait::async_trait;
use grocery_actor::ActorState;
use serde::Deserialize;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub enum CartCommand {
    /// Add one unit of the product.
    Add(Product),
    Remove(ProductId),
    /// Replace the quantity; zero or below removes the line.
    SetQuantity {
        product_id: ProductId,
        quantity: i64,
    },
    Clear,
    /// Empty the cart, replying with what it held.
    Take,
    /// Remove exactly these lines, replying with them. Fails without touching the cart
    /// unless every line is still present with the same product and at least that quantity.
    TakeLines(Vec<CartLine>),
    /// Add lines back on top of the current contents.
    Restore(Vec<CartLine>),
    /// Reconcile with a value another view wrote to the cart slot.
    ApplyExternal(Option<String>),
}

/// The cart slot as another view may have written it. Quantities are read signed so a
/// hand-edited or stale payload still parses and goes through the usual validation.
#[derive(Debug, Deserialize)]
struct PersistedCart {
    #[serde(default)]
    items: Vec<PersistedLine>,
    #[serde(default)]
    total: f64,
}

#[derive(Debug, Deserialize)]
struct PersistedLine {
    product: Product,
    quantity: i64,
}

impl PersistedCart {
    fn matches(&self, state: &CartState) -> bool {
        self.total == state.total()
            && self.items.len() == state.lines().len()
            && self
                .items
                .iter()
                .zip(state.lines())
                .all(|(p, l)| p.product == l.product && p.quantity == i64::from(l.quantity))
    }
}

/// Cart state owned by the cart actor and mirrored to the [`CART_KEY`] slot.
#[derive(Debug, Default)]
pub struct CartStore {
    state: CartState,
}

impl CartStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn validate_product(product: &Product) -> Result<(), CartError> {
        if !product.id.is_assigned() {
            return Err(CartError::InvalidProduct(format!(
                "{} has no id",
                product.name
            )));
        }
        if !product.price.is_finite() || product.price < 0.0 {
            return Err(CartError::InvalidProduct(format!(
                "{} has price {}",
                product.id, product.price
            )));
        }
        Ok(())
    }

    fn add(&mut self, product: Product) -> bool {
        if let Err(e) = Self::validate_product(&product) {
            warn!(error = %e, "Ignoring product");
            return false;
        }
        self.state.add(product);
        true
    }

    /// Add the product, then set its quantity if it differs from one.
    fn replay_line(&mut self, product: Product, quantity: i64) {
        let id = product.id;
        if self.add(product) && quantity != 1 {
            self.state.set_quantity(id, quantity);
        }
    }

    fn replay(&mut self, cart: PersistedCart) {
        self.state.clear();
        for line in cart.items {
            self.replay_line(line.product, line.quantity);
        }
    }

    fn restore(&mut self, lines: Vec<CartLine>) -> bool {
        let mut changed = false;
        for line in lines.into_iter().filter(|l| l.quantity > 0) {
            let id = line.product.id;
            let target = i64::from(self.state.quantity_of(id)) + i64::from(line.quantity);
            if self.add(line.product) {
                self.state.set_quantity(id, target);
                changed = true;
            }
        }
        changed
    }

    fn take_lines(&mut self, lines: &[CartLine]) -> Result<CartState, CartError> {
        let wanted = CartState::from_lines(lines.iter().cloned());
        for line in wanted.lines() {
            match self.state.line(line.product.id) {
                Some(held) if held.product == line.product && held.quantity >= line.quantity => {}
                _ => {
                    return Err(CartError::Changed(format!(
                        "{} x{} is no longer in the cart",
                        line.product.id, line.quantity
                    )));
                }
            }
        }
        for line in wanted.lines() {
            let id = line.product.id;
            let left = i64::from(self.state.quantity_of(id)) - i64::from(line.quantity);
            self.state.set_quantity(id, left);
        }
        Ok(wanted)
    }

    fn apply_external(&mut self, value: Option<String>) -> bool {
        let Some(raw) = value else {
            debug!("Cart slot removed elsewhere; keeping local cart");
            return false;
        };
        let external: PersistedCart = match serde_json::from_str(&raw) {
            Ok(cart) => cart,
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable external cart");
                return false;
            }
        };
        if external.matches(&self.state) {
            return false;
        }
        self.replay(external);
        info!(lines = self.state.lines().len(), "Cart reconciled from another view");
        true
    }

    fn persist(&self, view: &StorageView) -> Result<(), CartError> {
        let json = serde_json::to_string(&self.state)
            .map_err(|e| CartError::Serialization(e.to_string()))?;
        view.set(CART_KEY, json)?;
        Ok(())
    }
}

#[async_trait]
impl ActorState for CartStore {
    type Command = CartCommand;
    type Reply = CartState;
    type Snapshot = CartState;
    type Context = StorageView;
    type Error = CartError;

    async fn on_start(&mut self, view: &StorageView) -> Result<(), CartError> {
        let Some(raw) = view.get(CART_KEY) else {
            return Ok(());
        };
        match serde_json::from_str::<PersistedCart>(&raw) {
            Ok(saved) => {
                self.replay(saved);
                info!(lines = self.state.lines().len(), "Cart loaded");
            }
            Err(e) => warn!(error = %e, "Discarding unreadable saved cart"),
        }
        Ok(())
    }

    /// Replies with the cart after the command, except `Take` and `TakeLines`, which reply
    /// with what was removed.
    async fn handle(
        &mut self,
        command: CartCommand,
        view: &StorageView,
    ) -> Result<CartState, CartError> {
        let mut reply = None;
        let changed = match command {
            CartCommand::Add(product) => self.add(product),
            CartCommand::Remove(id) => self.state.remove(id),
            CartCommand::SetQuantity {
                product_id,
                quantity,
            } => self.state.set_quantity(product_id, quantity),
            CartCommand::Clear => {
                let had_lines = !self.state.is_empty();
                self.state.clear();
                had_lines
            }
            CartCommand::Take => {
                let taken = std::mem::take(&mut self.state);
                let had_lines = !taken.is_empty();
                reply = Some(taken);
                had_lines
            }
            CartCommand::TakeLines(lines) => {
                let taken = self.take_lines(&lines)?;
                let had_lines = !taken.is_empty();
                reply = Some(taken);
                had_lines
            }
            CartCommand::Restore(lines) => self.restore(lines),
            CartCommand::ApplyExternal(value) => self.apply_external(value),
        };

        if changed {
            if let Err(e) = self.persist(view) {
                warn!(error = %e, "Failed to persist cart");
            }
        }
        Ok(reply.unwrap_or_else(|| self.state.clone()))
    }

    fn snapshot(&self) -> CartState {
        self.state.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SharedStorage;

    fn product(id: u32, price: f64) -> Product {
        Product::new(id, format!("Item {id}"), price, "pack", "Test")
    }

    async fn apply(store: &mut CartStore, view: &StorageView, command: CartCommand) -> CartState {
        store.handle(command, view).await.unwrap()
    }

    #[tokio::test]
    async fn test_invalid_products_are_ignored() {
        let view = SharedStorage::new().view();
        let mut store = CartStore::new();

        let state = apply(&mut store, &view, CartCommand::Add(product(0, 10.0))).await;
        assert!(state.is_empty());
        let state = apply(&mut store, &view, CartCommand::Add(product(3, f64::NAN))).await;
        assert!(state.is_empty());
        let state = apply(&mut store, &view, CartCommand::Add(product(3, -1.0))).await;
        assert!(state.is_empty());

        // Nothing changed, so nothing was written
        assert_eq!(view.get(CART_KEY), None);
    }

    #[tokio::test]
    async fn test_mutations_are_persisted() {
        let view = SharedStorage::new().view();
        let mut store = CartStore::new();

        apply(&mut store, &view, CartCommand::Add(product(1, 40.0))).await;
        apply(
            &mut store,
            &view,
            CartCommand::SetQuantity {
                product_id: ProductId(1),
                quantity: 3,
            },
        )
        .await;

        let saved: serde_json::Value =
            serde_json::from_str(&view.get(CART_KEY).unwrap()).unwrap();
        assert_eq!(saved["items"][0]["quantity"], 3);
        assert_eq!(saved["total"], 120.0);
    }

    #[tokio::test]
    async fn test_take_returns_previous_cart_and_empties() {
        let view = SharedStorage::new().view();
        let mut store = CartStore::new();
        apply(&mut store, &view, CartCommand::Add(product(1, 40.0))).await;

        let taken = apply(&mut store, &view, CartCommand::Take).await;
        assert_eq!(taken.total(), 40.0);
        assert!(store.snapshot().is_empty());
        assert!(view.get(CART_KEY).unwrap().contains("\"items\":[]"));
    }

    #[tokio::test]
    async fn test_take_lines_leaves_later_additions() {
        let view = SharedStorage::new().view();
        let mut store = CartStore::new();
        apply(&mut store, &view, CartCommand::Add(product(1, 40.0))).await;
        apply(&mut store, &view, CartCommand::Add(product(1, 40.0))).await;
        let paid = store.snapshot().lines().to_vec();
        apply(&mut store, &view, CartCommand::Add(product(1, 40.0))).await;
        apply(&mut store, &view, CartCommand::Add(product(2, 60.0))).await;

        let taken = apply(&mut store, &view, CartCommand::TakeLines(paid)).await;
        assert_eq!(taken.quantity_of(ProductId(1)), 2);
        assert_eq!(taken.total(), 80.0);

        let left = store.snapshot();
        assert_eq!(left.quantity_of(ProductId(1)), 1);
        assert_eq!(left.quantity_of(ProductId(2)), 1);
        assert_eq!(left.total(), 100.0);
    }

    #[tokio::test]
    async fn test_take_lines_fails_when_cart_shrank() {
        let view = SharedStorage::new().view();
        let mut store = CartStore::new();
        apply(&mut store, &view, CartCommand::Add(product(1, 40.0))).await;
        apply(&mut store, &view, CartCommand::Add(product(2, 60.0))).await;
        let paid = store.snapshot().lines().to_vec();
        apply(&mut store, &view, CartCommand::Remove(ProductId(2))).await;
        let before = store.snapshot();

        let err = store
            .handle(CartCommand::TakeLines(paid), &view)
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::Changed(_)));
        assert_eq!(store.snapshot(), before);
    }

    #[tokio::test]
    async fn test_restore_adds_on_top() {
        let view = SharedStorage::new().view();
        let mut store = CartStore::new();
        apply(&mut store, &view, CartCommand::Add(product(1, 40.0))).await;

        let state = apply(
            &mut store,
            &view,
            CartCommand::Restore(vec![
                CartLine::new(product(1, 40.0), 2),
                CartLine::new(product(2, 60.0), 1),
            ]),
        )
        .await;
        assert_eq!(state.quantity_of(ProductId(1)), 3);
        assert_eq!(state.quantity_of(ProductId(2)), 1);
        assert_eq!(state.total(), 180.0);
    }

    #[tokio::test]
    async fn test_apply_external_replays_payload_in_order() {
        let view = SharedStorage::new().view();
        let mut store = CartStore::new();
        apply(&mut store, &view, CartCommand::Add(product(9, 5.0))).await;

        let mut other = CartState::new();
        other.add(product(2, 60.0));
        other.add(product(1, 40.0));
        other.set_quantity(ProductId(1), 4);
        let payload = serde_json::to_string(&other).unwrap();

        let state = apply(&mut store, &view, CartCommand::ApplyExternal(Some(payload))).await;
        assert_eq!(state, other);
    }

    #[tokio::test]
    async fn test_apply_external_ignores_garbage_and_removal() {
        let view = SharedStorage::new().view();
        let mut store = CartStore::new();
        apply(&mut store, &view, CartCommand::Add(product(1, 40.0))).await;
        let before = store.snapshot();

        let state = apply(
            &mut store,
            &view,
            CartCommand::ApplyExternal(Some("{not json".into())),
        )
        .await;
        assert_eq!(state, before);

        let state = apply(&mut store, &view, CartCommand::ApplyExternal(None)).await;
        assert_eq!(state, before);
    }

    #[tokio::test]
    async fn test_external_line_with_zero_quantity_is_dropped() {
        let view = SharedStorage::new().view();
        let mut store = CartStore::new();
        let payload = r#"{"items":[
            {"product":{"id":1,"name":"Fresh Tomatoes","price":40.0,"unit":"kg","category":"Vegetables"},"quantity":0},
            {"product":{"id":7,"name":"Paneer","price":120.0,"unit":"pack","category":"Dairy"},"quantity":2}
        ],"total":240.0}"#;

        let state = apply(
            &mut store,
            &view,
            CartCommand::ApplyExternal(Some(payload.into())),
        )
        .await;
        assert_eq!(state.lines().len(), 1);
        assert_eq!(state.quantity_of(ProductId(7)), 2);
        assert_eq!(state.total(), 240.0);
    }

    #[tokio::test]
    async fn test_on_start_loads_saved_cart_fail_soft() {
        let storage = SharedStorage::new();
        let view = storage.view();

        view.set(CART_KEY, "garbage".into()).unwrap();
        let mut store = CartStore::new();
        store.on_start(&view).await.unwrap();
        assert!(store.snapshot().is_empty());

        let mut saved = CartState::new();
        saved.add(product(4, 45.0));
        saved.add(product(4, 45.0));
        view.set(CART_KEY, serde_json::to_string(&saved).unwrap()).unwrap();

        let mut store = CartStore::new();
        store.on_start(&view).await.unwrap();
        assert_eq!(store.snapshot(), saved);
    }
}
