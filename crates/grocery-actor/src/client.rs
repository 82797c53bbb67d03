//! # Generic Client
//!
//! This module defines the handle used to talk to a [`StateActor`](crate::StateActor).

use crate::error::FrameworkError;
use crate::message::StateRequest;
use crate::state::ActorState;
use tokio::sync::{mpsc, oneshot};

/// ## StateClient
///
/// A type-safe, cloneable handle to a `StateActor<T>`. It forwards commands and snapshot
/// requests over a Tokio mpsc channel and receives results over oneshot channels.
///
/// * **Cloneable** – holds only a sender, so cloning is inexpensive.
/// * **Ordered** – requests from one client are handled in the order they were sent.
/// * **Lifetime** – the actor keeps running while at least one `StateClient` exists.
pub struct StateClient<T: ActorState> {
    sender: mpsc::Sender<StateRequest<T>>,
}

impl<T: ActorState> Clone for StateClient<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<T: ActorState> std::fmt::Debug for StateClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateClient")
            .field("closed", &self.sender.is_closed())
            .finish()
    }
}

impl<T: ActorState> StateClient<T> {
    pub fn new(sender: mpsc::Sender<StateRequest<T>>) -> Self {
        Self { sender }
    }

    pub async fn send(&self, command: T::Command) -> Result<T::Reply, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StateRequest::Command {
                command,
                respond_to,
            })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn snapshot(&self) -> Result<T::Snapshot, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StateRequest::Snapshot { respond_to })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    /// A handle that does not keep the actor alive.
    ///
    /// Timers and listeners owned by an actor hold weak handles back to it, so dropping the
    /// last strong client still shuts the actor down.
    pub fn downgrade(&self) -> WeakStateClient<T> {
        WeakStateClient {
            sender: self.sender.downgrade(),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Non-owning counterpart of [`StateClient`].
pub struct WeakStateClient<T: ActorState> {
    sender: mpsc::WeakSender<StateRequest<T>>,
}

impl<T: ActorState> Clone for WeakStateClient<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<T: ActorState> std::fmt::Debug for WeakStateClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeakStateClient").finish_non_exhaustive()
    }
}

impl<T: ActorState> WeakStateClient<T> {
    /// Returns `None` once every strong client has been dropped.
    pub fn upgrade(&self) -> Option<StateClient<T>> {
        self.sender.upgrade().map(StateClient::new)
    }
}
