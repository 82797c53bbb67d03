//! # ActorState Trait
//!
//! The `ActorState` trait is the contract every store (cart, session, order desk) implements
//! to be driven by the generic [`StateActor`](crate::StateActor). It names the command
//! vocabulary of the store, what a command replies with, what a read-only snapshot looks
//! like, the dependencies injected at `run()` time and the store's error type.
//!
//! # Architecture Note
//! A store owns exactly one piece of state and mutates it only from inside its own task.
//! The message loop is written once in [`StateActor`](crate::StateActor); a store only
//! describes how a single command changes its state.
//!
//! # Provided Methods (Hooks)
//! - [`ActorState::on_start`] runs once before the first command (e.g. load persisted state).
//! - [`ActorState::on_stop`] runs once after the last client is gone (e.g. cancel timers).
//!
//! Both default to doing nothing.

use async_trait::async_trait;
use std::fmt::Debug;

/// State owned by a [`StateActor`](crate::StateActor).
///
/// # Async & Context
/// The trait is `#[async_trait]` so hooks may await other actors. The `Context` type is
/// injected into every hook, which lets dependencies (storage handles, other clients, a
/// weak handle to the actor itself) be bound late, when the actor is started.
#[async_trait]
pub trait ActorState: Send + 'static {
    /// Commands understood by this store.
    type Command: Send + Debug;

    /// Value returned for a successfully handled command.
    type Reply: Send + Debug;

    /// Read-only view returned by a snapshot request.
    type Snapshot: Send + Debug;

    /// Dependencies injected at `run()`. Use `()` if none are needed.
    type Context: Send + Sync;

    /// The error type for this store.
    ///
    /// One enum per store rather than one per command: clients deal with a single
    /// `CartError` or `SessionError` and match on the variants they care about.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Called once before the first command is handled.
    async fn on_start(&mut self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Apply one command to the state.
    async fn handle(
        &mut self,
        command: Self::Command,
        ctx: &Self::Context,
    ) -> Result<Self::Reply, Self::Error>;

    /// Produce the current read-only view of the state.
    fn snapshot(&self) -> Self::Snapshot;

    /// Called once after the channel closes, before the state is dropped.
    async fn on_stop(&mut self, _ctx: &Self::Context) {}
}
