//! Error types for the cart store.

use crate::storage::StorageError;
use thiserror::Error;

/// Errors that can occur during cart operations.
///
/// Invalid products and failed writes never reach callers of the cart commands: they are
/// logged and the command carries on. These variants surface from the persistence helpers,
/// from `TakeLines` and from talking to the actor.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CartError {
    /// The product has no identity or an unusable price.
    #[error("Invalid product: {0}")]
    InvalidProduct(String),

    /// Writing the durable slot failed.
    #[error("Cart persistence error: {0}")]
    Persistence(#[from] StorageError),

    /// The cart could not be encoded.
    #[error("Cart serialization error: {0}")]
    Serialization(String),

    /// The cart no longer holds what the caller expected to take from it.
    #[error("Cart changed: {0}")]
    Changed(String),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<String> for CartError {
    fn from(msg: String) -> Self {
        CartError::ActorCommunicationError(msg)
    }
}
