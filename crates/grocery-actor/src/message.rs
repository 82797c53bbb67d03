//! # Generic Messages
//!
//! This module defines the message types exchanged between a [`StateClient`](crate::StateClient)
//! and its [`StateActor`](crate::StateActor).

use crate::error::FrameworkError;
use crate::state::ActorState;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by actors.
pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Internal message type sent to the actor.
///
/// Every store speaks the same two-verb protocol: a `Command` that may mutate the state and
/// yields the store's `Reply`, and a `Snapshot` that reads it. The command vocabulary itself
/// lives in the store's [`ActorState::Command`] type, so a cart command can never reach the
/// session store.
pub enum StateRequest<T: ActorState> {
    Command {
        command: T::Command,
        respond_to: Response<T::Reply>,
    },
    Snapshot {
        respond_to: Response<T::Snapshot>,
    },
}

impl<T: ActorState> std::fmt::Debug for StateRequest<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StateRequest::Command { command, .. } => f
                .debug_struct("Command")
                .field("command", command)
                .finish_non_exhaustive(),
            StateRequest::Snapshot { .. } => f.write_str("Snapshot"),
        }
    }
}
