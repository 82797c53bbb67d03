//! # Grocery Actor Runtime
//!
//! The building blocks every storefront store is made of: a task that exclusively owns one
//! piece of state, a cloneable client that sends it commands, cancellable timers for
//! scheduled work, and a mock client for tests.
//!
//! ## Why one actor per store?
//!
//! The storefront has a handful of independent stores (cart, session, orders). Each one is
//! mutated from many places: user actions, timers, change notifications from other views.
//! Giving every store its own task and a FIFO channel means:
//!
//! - **No locks**: the state is owned by a single task.
//! - **Ordering**: commands are applied in the order they were sent.
//! - **Explicit wiring**: consumers receive a client handle instead of reaching into a
//!   global, so tests can start isolated instances.
//!
//! ## Quick Start
//!
//! ```rust
//! use grocery_actor::{ActorState, StateActor};
//! use async_trait::async_trait;
//!
//! #[derive(Debug, Default)]
//! struct Counter { value: i64 }
//!
//! #[derive(Debug)]
//! enum CounterCommand { Add(i64), Reset }
//!
//! #[derive(Debug, thiserror::Error)]
//! #[error("counter overflow")]
//! struct CounterError;
//!
//! #[async_trait]
//! impl ActorState for Counter {
//!     type Command = CounterCommand;
//!     type Reply = i64;
//!     type Snapshot = i64;
//!     type Context = ();
//!     type Error = CounterError;
//!
//!     async fn handle(&mut self, command: CounterCommand, _: &()) -> Result<i64, CounterError> {
//!         match command {
//!             CounterCommand::Add(n) => {
//!                 self.value = self.value.checked_add(n).ok_or(CounterError)?;
//!             }
//!             CounterCommand::Reset => self.value = 0,
//!         }
//!         Ok(self.value)
//!     }
//!
//!     fn snapshot(&self) -> i64 { self.value }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let (actor, client) = StateActor::new(Counter::default(), 10);
//!     tokio::spawn(actor.run(()));
//!
//!     client.send(CounterCommand::Add(40)).await.unwrap();
//!     assert_eq!(client.snapshot().await.unwrap(), 40);
//! }
//! ```
//!
//! ## Context Injection Pattern
//!
//! Dependencies are injected at **runtime** via `run(context)`, not at construction. This
//! lets a store receive handles that only exist after it was created, including a
//! [`WeakStateClient`] pointing back at itself, which its timers use to deliver scheduled
//! commands without keeping the store alive.
//!
//! ## Timers
//!
//! [`timer`] schedules one-shot and repeating work and returns a [`TimerHandle`] that
//! cancels it. Timers use the Tokio clock, so paused-clock tests advance them exactly.
//!
//! ## Testing
//!
//! See [`mock`] for `MockClient`, which answers a real client's requests from scripted
//! expectations.

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod error;
pub mod message;
pub mod mock;
pub mod state;
pub mod timer;
pub mod tracing;

pub use actor::StateActor;
pub use client::{StateClient, WeakStateClient};
pub use client_trait::ActorClient;
pub use error::FrameworkError;
pub use message::{Response, StateRequest};
pub use state::ActorState;
pub use timer::TimerHandle;
