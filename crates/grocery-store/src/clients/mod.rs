//! Type-safe wrappers around [`StateClient`](grocery_actor::StateClient), one per store.

pub mod cart_client;
pub mod order_client;
pub mod session_client;

pub use cart_client::*;
pub use order_client::*;
pub use session_client::*;
