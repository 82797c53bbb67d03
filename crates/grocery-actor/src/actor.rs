//! # Generic Actor Server
//!
//! This module defines the `StateActor`, the task that owns a store's state and applies
//! commands to it one at a time.

use crate::client::StateClient;
use crate::error::FrameworkError;
use crate::message::StateRequest;
use crate::state::ActorState;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The generic actor that owns one store.
///
/// # Architecture Note
/// This struct is the "server" half of a store. It owns the state and the receiver end of
/// the channel. Commands are processed *sequentially* in a loop, so the state needs no
/// `Mutex` even though many clients send to it concurrently: within one store, mutations are
/// applied in the order they arrive, and a command's side effects (a persistence write, a
/// scheduled timer) complete before the next command starts.
///
/// # Usage Pattern
///
/// 1.  **Create**: `StateActor::new(state, buffer)` returns the actor and its client.
/// 2.  **Wire**: pass dependencies into `actor.run(context)`.
/// 3.  **Run**: spawn the run loop in a background task.
///
/// ```rust
/// use grocery_actor::{ActorState, StateActor};
/// use async_trait::async_trait;
///
/// #[derive(Debug, Default)]
/// struct Tally { count: u32 }
///
/// #[derive(Debug)]
/// enum TallyCommand { Bump }
///
/// #[derive(Debug, thiserror::Error)]
/// #[error("tally error")]
/// struct TallyError;
///
/// #[async_trait]
/// impl ActorState for Tally {
///     type Command = TallyCommand;
///     type Reply = u32;
///     type Snapshot = u32;
///     type Context = ();
///     type Error = TallyError;
///
///     async fn handle(&mut self, _: TallyCommand, _: &()) -> Result<u32, TallyError> {
///         self.count += 1;
///         Ok(self.count)
///     }
///
///     fn snapshot(&self) -> u32 { self.count }
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let (actor, client) = StateActor::new(Tally::default(), 10);
///     tokio::spawn(actor.run(()));
///
///     assert_eq!(client.send(TallyCommand::Bump).await.unwrap(), 1);
///     assert_eq!(client.snapshot().await.unwrap(), 1);
/// }
/// ```
pub struct StateActor<T: ActorState> {
    receiver: mpsc::Receiver<StateRequest<T>>,
    state: T,
}

impl<T: ActorState> StateActor<T> {
    /// Creates a new `StateActor` around `state` and its associated `StateClient`.
    ///
    /// `buffer_size` is the capacity of the request channel; when it is full, client calls
    /// wait for space.
    pub fn new(state: T, buffer_size: usize) -> (Self, StateClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self { receiver, state };
        (actor, StateClient::new(sender))
    }

    /// Runs the actor's event loop until every strong client has been dropped.
    ///
    /// # Context Injection
    /// `context` is handed to every hook. It can hold things created *after* the actor
    /// itself, such as a weak client pointing back at this actor.
    pub async fn run(mut self, context: T::Context) {
        // "CartStore" rather than "grocery_store::cart_actor::state::CartStore"
        let state_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(state_type, "Actor started");

        if let Err(e) = self.state.on_start(&context).await {
            warn!(state_type, error = %e, "on_start failed");
        }

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                StateRequest::Command {
                    command,
                    respond_to,
                } => {
                    debug!(state_type, ?command, "Command");
                    let result = self
                        .state
                        .handle(command, &context)
                        .await
                        .map_err(|e| FrameworkError::StateError(Box::new(e)));
                    match &result {
                        Ok(_) => debug!(state_type, "Command ok"),
                        Err(e) => warn!(state_type, error = %e, "Command failed"),
                    }
                    let _ = respond_to.send(result);
                }
                StateRequest::Snapshot { respond_to } => {
                    let _ = respond_to.send(Ok(self.state.snapshot()));
                }
            }
        }

        self.state.on_stop(&context).await;
        info!(state_type, "Shutdown");
    }
}
