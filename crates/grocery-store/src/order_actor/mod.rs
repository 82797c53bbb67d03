//! Order desk: places orders, walks them through their statuses on a timer and moves the
//! courier while an order is out for delivery.

pub mod backend;
pub mod desk;
pub mod error;

pub use backend::{OrderBackend, SimulatedBackend};
pub use desk::{OrderCommand, OrderContext, OrderDesk, OrderReply};
pub use error::*;

use crate::clients::{CartClient, OrderClient};
use crate::config::OrderSchedule;
use grocery_actor::StateActor;
use rand::rngs::StdRng;
use std::sync::Arc;

/// Creates a new order desk actor and its client.
///
/// Checkout goes through `backend` and takes its lines from `cart`. The actor must be run
/// with an [`OrderContext`] holding a weak client to itself.
pub fn new(
    schedule: OrderSchedule,
    rng: StdRng,
    cart: CartClient,
    backend: Arc<dyn OrderBackend>,
    buffer_size: usize,
) -> (StateActor<OrderDesk>, OrderClient) {
    let delivery_fee = schedule.delivery_fee;
    let (actor, client) = StateActor::new(OrderDesk::new(schedule, rng), buffer_size);
    (actor, OrderClient::new(client, cart, backend, delivery_fee))
}
