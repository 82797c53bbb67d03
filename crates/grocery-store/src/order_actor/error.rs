//! Error types for the order desk and checkout.

use crate::cart_actor::CartError;
use crate::model::OrderStatus;
use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    /// Checkout was attempted with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// The requested order was not found.
    #[error("Order not found: {0}")]
    NotFound(String),

    #[error("Order {id} cannot be cancelled once {status}")]
    NotCancellable { id: String, status: OrderStatus },

    /// Statuses only move forward.
    #[error("Order cannot go from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// The confirmed payment is not for the cart total plus delivery.
    #[error("Payment of {paid} does not match order total {due}")]
    PaymentMismatch { paid: f64, due: f64 },

    #[error("No courier available")]
    NoCourierAvailable,

    /// Order processing failed before anything was committed.
    #[error("Order processing failed: {0}")]
    Backend(String),

    /// The cart could not be read or emptied.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<String> for OrderError {
    fn from(msg: String) -> Self {
        OrderError::ActorCommunicationError(msg)
    }
}
