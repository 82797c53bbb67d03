//! Session store: who is signed in, shared across views through the identity slot.

pub mod access;
pub mod error;
pub mod store;

pub use access::{check_access, Access, Route};
pub use error::*;
pub use store::{SessionCommand, SessionStore};

use crate::clients::SessionClient;
use grocery_actor::StateActor;
use rand::rngs::StdRng;

/// Creates a new session actor and its client.
pub fn new(rng: StdRng, buffer_size: usize) -> (StateActor<SessionStore>, SessionClient) {
    let (actor, client) = StateActor::new(SessionStore::new(rng), buffer_size);
    (actor, SessionClient::new(client))
}
