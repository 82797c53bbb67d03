//! Persisted cart: an actor owning the [`CartState`](crate::model::CartState), mirrored to
//! the durable cart slot after every change.

pub mod error;
pub mod store;

pub use error::*;
pub use store::{CartCommand, CartStore};

use crate::clients::CartClient;
use grocery_actor::StateActor;

/// Creates a new cart actor and its client.
pub fn new(buffer_size: usize) -> (StateActor<CartStore>, CartClient) {
    let (actor, client) = StateActor::new(CartStore::new(), buffer_size);
    (actor, CartClient::new(client))
}
