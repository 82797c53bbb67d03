//! [`ActorState`] implementation for the order desk: every order of the session, its status
//! timers and its courier.

use super::OrderError;
use crate::catalog;
use crate::config::OrderSchedule;
use crate::ids;
use crate::model::{Courier, Order, OrderDraft, OrderId, OrderStatus};
use async_trait::async_trait;
use chrono::Utc;
use grocery_actor::timer::{schedule_at, schedule_every};
use grocery_actor::{ActorState, TimerHandle, WeakStateClient};
use rand::rngs::StdRng;
use rand::Rng;
use std::collections::HashMap;
use std::ops::ControlFlow;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

#[derive(Debug)]
pub enum OrderCommand {
    Place(OrderDraft),
    Get(OrderId),
    /// Receive every new snapshot of the order.
    Subscribe(OrderId),
    /// Sent by the order's own transition timers.
    Advance { id: OrderId, status: OrderStatus },
    /// Sent by the courier ticker while the order is out for delivery.
    CourierTick(OrderId),
    Cancel(OrderId),
    /// Stop moving the courier; the status is left alone.
    StopTracking(OrderId),
    List,
}

#[derive(Debug)]
pub enum OrderReply {
    Placed(Order),
    Found(Option<Order>),
    Subscribed(watch::Receiver<Order>),
    Updated(Order),
    Listed(Vec<Order>),
}

/// Handles the desk needs at runtime: a weak client to itself, used by its timers.
#[derive(Debug, Clone)]
pub struct OrderContext {
    pub desk: WeakStateClient<OrderDesk>,
}

#[derive(Debug)]
struct TrackedOrder {
    order: Order,
    updates: watch::Sender<Order>,
    transitions: Vec<TimerHandle>,
    courier_ticker: Option<TimerHandle>,
}

impl TrackedOrder {
    fn publish(&mut self) {
        self.updates.send_replace(self.order.clone());
    }

    fn stop_timers(&mut self) {
        self.transitions.clear();
        self.courier_ticker = None;
    }
}

pub struct OrderDesk {
    orders: HashMap<OrderId, TrackedOrder>,
    placed: Vec<OrderId>,
    schedule: OrderSchedule,
    couriers: Vec<Courier>,
    rng: StdRng,
}

impl std::fmt::Debug for OrderDesk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderDesk")
            .field("orders", &self.placed.len())
            .field("schedule", &self.schedule)
            .finish_non_exhaustive()
    }
}

impl OrderDesk {
    pub fn new(schedule: OrderSchedule, rng: StdRng) -> Self {
        Self::with_couriers(schedule, catalog::couriers(), rng)
    }

    pub fn with_couriers(schedule: OrderSchedule, couriers: Vec<Courier>, rng: StdRng) -> Self {
        Self {
            orders: HashMap::new(),
            placed: Vec::new(),
            schedule,
            couriers,
            rng,
        }
    }

    fn tracked(&mut self, id: &OrderId) -> Result<&mut TrackedOrder, OrderError> {
        self.orders
            .get_mut(id)
            .ok_or_else(|| OrderError::NotFound(id.to_string()))
    }

    fn next_id(&mut self) -> OrderId {
        loop {
            let id = OrderId(format!("ORD{}", ids::base36(&mut self.rng, 9)));
            if !self.orders.contains_key(&id) {
                return id;
            }
        }
    }

    fn place(&mut self, draft: OrderDraft, ctx: &OrderContext) -> Result<Order, OrderError> {
        if draft.lines.is_empty() {
            return Err(OrderError::EmptyCart);
        }
        if self.couriers.is_empty() {
            return Err(OrderError::NoCourierAvailable);
        }
        let courier = self.couriers[self.rng.gen_range(0..self.couriers.len())].clone();
        let id = self.next_id();
        let order = Order {
            id: id.clone(),
            lines: draft.lines,
            subtotal: draft.subtotal,
            delivery_fee: self.schedule.delivery_fee,
            total: draft.subtotal + self.schedule.delivery_fee,
            status: OrderStatus::Confirmed,
            courier,
            estimated_delivery_time: self.schedule.estimated_delivery.clone(),
            customer_location: catalog::CUSTOMER_LOCATION,
            shop_location: catalog::SHOP_LOCATION,
            created_at: Utc::now(),
        };

        let created = Instant::now();
        let transitions = vec![
            advance_at(
                ctx,
                created + self.schedule.preparing_after,
                id.clone(),
                OrderStatus::Preparing,
            ),
            advance_at(
                ctx,
                created + self.schedule.out_for_delivery_after,
                id.clone(),
                OrderStatus::OutForDelivery,
            ),
        ];

        let (updates, _) = watch::channel(order.clone());
        self.orders.insert(
            id.clone(),
            TrackedOrder {
                order: order.clone(),
                updates,
                transitions,
                courier_ticker: None,
            },
        );
        self.placed.push(id.clone());
        info!(order_id = %id, total = order.total, "Order placed");
        Ok(order)
    }

    fn advance(
        &mut self,
        id: &OrderId,
        status: OrderStatus,
        ctx: &OrderContext,
    ) -> Result<Order, OrderError> {
        let tick = self.schedule.courier_tick;
        let tracked = self.tracked(id)?;
        let from = tracked.order.status;
        if !from.can_become(status) {
            return Err(OrderError::InvalidTransition { from, to: status });
        }

        tracked.order.status = status;
        if status == OrderStatus::OutForDelivery {
            tracked.courier_ticker = Some(courier_ticker(ctx, tick, id.clone()));
        } else {
            tracked.courier_ticker = None;
        }
        if status.is_terminal() {
            tracked.stop_timers();
        }
        tracked.publish();
        info!(order_id = %id, status = %status, "Order status changed");
        Ok(tracked.order.clone())
    }

    fn move_courier(&mut self, id: &OrderId) -> Result<Order, OrderError> {
        let jitter = self.schedule.courier_jitter;
        let dlat = (self.rng.gen::<f64>() - 0.5) * jitter;
        let dlng = (self.rng.gen::<f64>() - 0.5) * jitter;
        let tracked = self.tracked(id)?;
        if tracked.order.status != OrderStatus::OutForDelivery {
            debug!(order_id = %id, "Courier tick outside delivery ignored");
            return Ok(tracked.order.clone());
        }
        let courier = &mut tracked.order.courier;
        courier.location = courier.location.offset(dlat, dlng);
        trace!(order_id = %id, location = %courier.location, "Courier moved");
        tracked.publish();
        Ok(tracked.order.clone())
    }

    fn cancel(&mut self, id: &OrderId) -> Result<Order, OrderError> {
        let tracked = self.tracked(id)?;
        let status = tracked.order.status;
        if !status.can_become(OrderStatus::Cancelled) {
            return Err(OrderError::NotCancellable {
                id: id.to_string(),
                status,
            });
        }
        tracked.order.status = OrderStatus::Cancelled;
        tracked.stop_timers();
        tracked.publish();
        info!(order_id = %id, "Order cancelled");
        Ok(tracked.order.clone())
    }

    fn stop_tracking(&mut self, id: &OrderId) -> Result<Order, OrderError> {
        let tracked = self.tracked(id)?;
        if tracked.courier_ticker.take().is_some() {
            debug!(order_id = %id, "Courier tracking stopped");
        }
        Ok(tracked.order.clone())
    }

    fn list(&self) -> Vec<Order> {
        self.placed
            .iter()
            .filter_map(|id| self.orders.get(id))
            .map(|tracked| tracked.order.clone())
            .collect()
    }
}

/// One-shot timer delivering `Advance` to the desk at `deadline`.
fn advance_at(
    ctx: &OrderContext,
    deadline: Instant,
    id: OrderId,
    status: OrderStatus,
) -> TimerHandle {
    let desk = ctx.desk.clone();
    schedule_at(deadline, "order-transition", async move {
        let Some(desk) = desk.upgrade() else {
            return;
        };
        if let Err(e) = desk.send(OrderCommand::Advance { id, status }).await {
            warn!(status = %status, error = %e, "Scheduled transition failed");
        }
    })
}

/// Repeating timer delivering `CourierTick` until the desk goes away.
fn courier_ticker(ctx: &OrderContext, period: std::time::Duration, id: OrderId) -> TimerHandle {
    let desk = ctx.desk.clone();
    schedule_every(period, "courier", move || {
        let desk = desk.clone();
        let id = id.clone();
        async move {
            match desk.upgrade() {
                Some(desk) if desk.send(OrderCommand::CourierTick(id)).await.is_ok() => {
                    ControlFlow::Continue(())
                }
                _ => ControlFlow::Break(()),
            }
        }
    })
}

#[async_trait]
impl ActorState for OrderDesk {
    type Command = OrderCommand;
    type Reply = OrderReply;
    type Snapshot = Vec<Order>;
    type Context = OrderContext;
    type Error = OrderError;

    async fn handle(
        &mut self,
        command: OrderCommand,
        ctx: &OrderContext,
    ) -> Result<OrderReply, OrderError> {
        match command {
            OrderCommand::Place(draft) => self.place(draft, ctx).map(OrderReply::Placed),
            OrderCommand::Get(id) => Ok(OrderReply::Found(
                self.orders.get(&id).map(|tracked| tracked.order.clone()),
            )),
            OrderCommand::Subscribe(id) => {
                let tracked = self.tracked(&id)?;
                Ok(OrderReply::Subscribed(tracked.updates.subscribe()))
            }
            OrderCommand::Advance { id, status } => {
                self.advance(&id, status, ctx).map(OrderReply::Updated)
            }
            OrderCommand::CourierTick(id) => self.move_courier(&id).map(OrderReply::Updated),
            OrderCommand::Cancel(id) => self.cancel(&id).map(OrderReply::Updated),
            OrderCommand::StopTracking(id) => self.stop_tracking(&id).map(OrderReply::Updated),
            OrderCommand::List => Ok(OrderReply::Listed(self.list())),
        }
    }

    fn snapshot(&self) -> Vec<Order> {
        self.list()
    }

    async fn on_stop(&mut self, _ctx: &OrderContext) {
        let pending = self
            .orders
            .values()
            .filter(|t| !t.transitions.is_empty() || t.courier_ticker.is_some())
            .count();
        for tracked in self.orders.values_mut() {
            tracked.stop_timers();
        }
        if pending > 0 {
            info!(orders = pending, "Cancelled outstanding order timers");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CartLine, Product};
    use grocery_actor::StateActor;
    use rand::SeedableRng;
    use std::time::Duration;

    fn draft() -> OrderDraft {
        let line = CartLine::new(Product::new(8, "Basmati Rice", 150.0, "kg", "Grains"), 2);
        OrderDraft {
            subtotal: line.line_total(),
            lines: vec![line],
        }
    }

    fn start() -> grocery_actor::StateClient<OrderDesk> {
        let desk = OrderDesk::new(OrderSchedule::default(), StdRng::seed_from_u64(1));
        let (actor, client) = StateActor::new(desk, 16);
        tokio::spawn(actor.run(OrderContext {
            desk: client.downgrade(),
        }));
        client
    }

    async fn place(client: &grocery_actor::StateClient<OrderDesk>) -> Order {
        match client.send(OrderCommand::Place(draft())).await.unwrap() {
            OrderReply::Placed(order) => order,
            other => panic!("unexpected reply {other:?}"),
        }
    }

    async fn status(client: &grocery_actor::StateClient<OrderDesk>, id: &OrderId) -> OrderStatus {
        match client.send(OrderCommand::Get(id.clone())).await.unwrap() {
            OrderReply::Found(Some(order)) => order.status,
            other => panic!("unexpected reply {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_place_builds_confirmed_order() {
        let client = start();
        let order = place(&client).await;

        assert!(order.id.0.starts_with("ORD"));
        assert_eq!(order.id.0.len(), 12);
        assert_eq!(order.status, OrderStatus::Confirmed);
        assert_eq!(order.total, 340.0);
        assert_eq!(order.delivery_fee, 40.0);
        assert_eq!(order.courier.name, "Rajesh Kumar");
        assert_eq!(order.estimated_delivery_time, "30-45 minutes");
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_draft_is_rejected() {
        let client = start();
        let err = client
            .send(OrderCommand::Place(OrderDraft {
                lines: Vec::new(),
                subtotal: 0.0,
            }))
            .await
            .unwrap_err()
            .downcast_state::<OrderError>()
            .unwrap();
        assert_eq!(err, OrderError::EmptyCart);
        assert!(client.snapshot().await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_transitions_follow_schedule() {
        let client = start();
        let id = place(&client).await.id;

        tokio::time::sleep(Duration::from_millis(4_900)).await;
        assert_eq!(status(&client, &id).await, OrderStatus::Confirmed);
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(status(&client, &id).await, OrderStatus::Preparing);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(status(&client, &id).await, OrderStatus::OutForDelivery);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backwards_transition_is_refused() {
        let client = start();
        let id = place(&client).await.id;

        let err = client
            .send(OrderCommand::Advance {
                id: id.clone(),
                status: OrderStatus::Pending,
            })
            .await
            .unwrap_err()
            .downcast_state::<OrderError>()
            .unwrap();
        assert_eq!(
            err,
            OrderError::InvalidTransition {
                from: OrderStatus::Confirmed,
                to: OrderStatus::Pending
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_transitions() {
        let client = start();
        let id = place(&client).await.id;

        client.send(OrderCommand::Cancel(id.clone())).await.unwrap();
        tokio::time::sleep(Duration::from_secs(15)).await;
        assert_eq!(status(&client, &id).await, OrderStatus::Cancelled);

        let err = client
            .send(OrderCommand::Cancel(id.clone()))
            .await
            .unwrap_err()
            .downcast_state::<OrderError>()
            .unwrap();
        assert!(matches!(err, OrderError::NotCancellable { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_order() {
        let client = start();
        let missing = OrderId("ORDmissing00".into());

        assert!(matches!(
            client.send(OrderCommand::Get(missing.clone())).await.unwrap(),
            OrderReply::Found(None)
        ));
        let err = client
            .send(OrderCommand::Subscribe(missing))
            .await
            .unwrap_err()
            .downcast_state::<OrderError>()
            .unwrap();
        assert!(matches!(err, OrderError::NotFound(_)));
    }
}
