//! # ActorClient Trait
//!
//! Common interface for store-specific clients, adding default `snapshot` and `send`
//! methods on top of a generic [`StateClient`].
use crate::{ActorState, FrameworkError, StateClient};
use async_trait::async_trait;

/// Trait for store-specific clients to inherit the generic operations.
///
/// # Example
///
/// ```rust
/// use grocery_actor::{ActorClient, ActorState, FrameworkError, StateClient};
/// use async_trait::async_trait;
///
/// #[derive(Debug, Default)]
/// struct Shelf { items: Vec<String> }
/// #[derive(Debug)] enum ShelfCommand { Stock(String) }
/// #[derive(Debug, thiserror::Error)]
/// enum ShelfError {
///     #[error("communication: {0}")]
///     Communication(String),
/// }
///
/// #[async_trait]
/// impl ActorState for Shelf {
///     type Command = ShelfCommand;
///     type Reply = usize;
///     type Snapshot = Vec<String>;
///     type Context = ();
///     type Error = ShelfError;
///
///     async fn handle(&mut self, command: ShelfCommand, _: &()) -> Result<usize, ShelfError> {
///         let ShelfCommand::Stock(item) = command;
///         self.items.push(item);
///         Ok(self.items.len())
///     }
///     fn snapshot(&self) -> Vec<String> { self.items.clone() }
/// }
///
/// struct ShelfClient { inner: StateClient<Shelf> }
///
/// #[async_trait]
/// impl ActorClient<Shelf> for ShelfClient {
///     type Error = ShelfError;
///
///     fn inner(&self) -> &StateClient<Shelf> { &self.inner }
///
///     fn map_error(e: FrameworkError) -> ShelfError {
///         ShelfError::Communication(e.to_string())
///     }
/// }
///
/// async fn usage(client: ShelfClient) {
///     // snapshot() and send() are provided automatically
///     let _ = client.send(ShelfCommand::Stock("rice".into())).await;
///     let _ = client.snapshot().await;
/// }
/// ```
#[async_trait]
pub trait ActorClient<T: ActorState>: Send + Sync {
    /// The store-specific error type.
    type Error: Send + Sync;

    /// Access the inner generic client.
    fn inner(&self) -> &StateClient<T>;

    /// Map runtime errors to the store's error type.
    fn map_error(e: FrameworkError) -> Self::Error;

    /// Read the store's current snapshot.
    #[tracing::instrument(skip(self))]
    async fn snapshot(&self) -> Result<T::Snapshot, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().snapshot().await.map_err(Self::map_error)
    }

    /// Send a raw command to the store.
    #[tracing::instrument(skip(self))]
    async fn send(&self, command: T::Command) -> Result<T::Reply, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().send(command).await.map_err(Self::map_error)
    }
}
