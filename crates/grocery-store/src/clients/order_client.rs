//! # Order Client
//!
//! Wraps the order desk and runs checkout, the one operation that spans two stores: it
//! takes the paid-for lines out of the cart and places the order, so that either both
//! happen or neither does.

use crate::clients::CartClient;
use crate::model::{Order, OrderDraft, OrderId};
use crate::order_actor::{OrderBackend, OrderCommand, OrderDesk, OrderError, OrderReply};
use crate::payment::PaymentConfirmation;
use async_trait::async_trait;
use grocery_actor::{ActorClient, FrameworkError, StateClient};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, instrument, warn, Instrument};

/// Largest difference between paid and due amounts still treated as equal.
const AMOUNT_TOLERANCE: f64 = 0.005;

/// Client for the order desk.
#[derive(Clone)]
pub struct OrderClient {
    inner: StateClient<OrderDesk>,
    cart: CartClient,
    backend: Arc<dyn OrderBackend>,
    delivery_fee: f64,
}

impl std::fmt::Debug for OrderClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderClient")
            .field("inner", &self.inner)
            .field("cart", &self.cart)
            .field("delivery_fee", &self.delivery_fee)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ActorClient<OrderDesk> for OrderClient {
    type Error = OrderError;

    fn inner(&self) -> &StateClient<OrderDesk> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        e.downcast_state::<OrderError>()
            .unwrap_or_else(|e| OrderError::ActorCommunicationError(e.to_string()))
    }
}

fn unexpected(reply: OrderReply) -> OrderError {
    OrderError::ActorCommunicationError(format!("Unexpected reply: {reply:?}"))
}

impl OrderClient {
    /// `delivery_fee` must be the fee the desk charges; checkout uses it to check payments.
    pub fn new(
        inner: StateClient<OrderDesk>,
        cart: CartClient,
        backend: Arc<dyn OrderBackend>,
        delivery_fee: f64,
    ) -> Self {
        Self {
            inner,
            cart,
            backend,
            delivery_fee,
        }
    }

    /// Turn the cart into an order.
    ///
    /// 1. An empty cart is rejected before anything else happens.
    /// 2. The payment must be for the cart total plus the delivery fee.
    /// 3. The backend processes the order; if it refuses, the cart is left as it was.
    /// 4. Exactly the submitted lines are taken from the cart and placed as a `confirmed`
    ///    order. Items added while the backend was working stay in the cart. If the
    ///    submitted lines are gone the checkout fails; if placing fails they are put back.
    ///
    /// Step 4 runs on its own task. Dropping the returned future after the backend
    /// accepted does not stop it, so the cart is never left emptied without an order.
    #[instrument(name = "checkout", skip_all, fields(amount = payment.amount()))]
    pub async fn checkout(&self, payment: &PaymentConfirmation) -> Result<Order, OrderError> {
        let cart = self.cart.state().await?;
        if cart.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        let due = cart.total() + self.delivery_fee;
        if (payment.amount() - due).abs() > AMOUNT_TOLERANCE {
            return Err(OrderError::PaymentMismatch {
                paid: payment.amount(),
                due,
            });
        }

        let draft = OrderDraft {
            lines: cart.lines().to_vec(),
            subtotal: cart.total(),
        };
        self.backend.submit(&draft, payment).await?;

        let this = self.clone();
        tokio::spawn(async move { this.commit(draft).await }.in_current_span())
            .await
            .map_err(|e| {
                OrderError::ActorCommunicationError(format!("Checkout task failed: {e}"))
            })?
    }

    async fn commit(&self, draft: OrderDraft) -> Result<Order, OrderError> {
        let lines = draft.lines.clone();
        self.cart.take_lines(lines.clone()).await?;

        match self.place(draft).await {
            Ok(order) => {
                info!(order_id = %order.id, total = order.total, "Checkout complete");
                Ok(order)
            }
            Err(e) => {
                warn!(error = %e, "Placing order failed; restoring cart");
                if let Err(restore) = self.cart.restore(lines).await {
                    warn!(error = %restore, "Failed to restore cart");
                }
                Err(e)
            }
        }
    }

    #[instrument(skip_all, fields(lines = draft.lines.len()))]
    pub async fn place(&self, draft: OrderDraft) -> Result<Order, OrderError> {
        match self.send(OrderCommand::Place(draft)).await? {
            OrderReply::Placed(order) => Ok(order),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, OrderError> {
        match self.send(OrderCommand::Get(id)).await? {
            OrderReply::Found(order) => Ok(order),
            other => Err(unexpected(other)),
        }
    }

    /// A receiver that always holds the latest snapshot of the order.
    #[instrument(skip(self))]
    pub async fn subscribe(&self, id: OrderId) -> Result<watch::Receiver<Order>, OrderError> {
        match self.send(OrderCommand::Subscribe(id)).await? {
            OrderReply::Subscribed(updates) => Ok(updates),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn cancel(&self, id: OrderId) -> Result<Order, OrderError> {
        match self.send(OrderCommand::Cancel(id)).await? {
            OrderReply::Updated(order) => Ok(order),
            other => Err(unexpected(other)),
        }
    }

    /// Stop the courier ticker, e.g. when nothing is tracking the delivery any more.
    #[instrument(skip(self))]
    pub async fn stop_tracking(&self, id: OrderId) -> Result<Order, OrderError> {
        match self.send(OrderCommand::StopTracking(id)).await? {
            OrderReply::Updated(order) => Ok(order),
            other => Err(unexpected(other)),
        }
    }

    /// Every order of the session, oldest first.
    pub async fn list(&self) -> Result<Vec<Order>, OrderError> {
        match self.send(OrderCommand::List).await? {
            OrderReply::Listed(orders) => Ok(orders),
            other => Err(unexpected(other)),
        }
    }
}
