//! # Mock Framework & Testing Guide
//!
//! `MockClient<T>` hands out a real [`StateClient<T>`] whose requests are answered from a
//! queue of expectations instead of a running store. Use it to test code that *talks to* a
//! store (for example checkout, which talks to the cart) without starting that store.
//!
//! ## When to use Mocks vs Real Actors
//!
//! | Feature | MockClient | Real Actor |
//! |---------|------------|------------|
//! | **Speed** | Instant (in-memory) | Fast (but involves tokio spawn) |
//! | **Determinism** | Fully scripted replies | Subject to the store's logic |
//! | **Use Case** | Logic *around* a client | The store itself or the full storefront |
//! | **Error Injection** | Easy (`return_err`) | Requires provoking the failure |
//!
//! ## Testing Strategies
//!
//! - **Pattern 0 – client logic, pure mock**: script replies with [`MockClient`].
//! - **Pattern 1 – single store**: spawn one `StateActor` and drive it through its client.
//! - **Pattern 2 – real store, mocked neighbour**: a real store driven together with a
//!   mocked store it depends on (see the grocery-store `tests/checkout_mock_test.rs`).
//! - **Pattern 3 – full system**: start a whole storefront view.
//!
//! ```rust
//! use grocery_actor::mock::MockClient;
//! use grocery_actor::{ActorState, FrameworkError};
//! use async_trait::async_trait;
//!
//! #[derive(Debug, Default)] struct Basket { items: u32 }
//! #[derive(Debug)] enum BasketCommand { Drop }
//! #[derive(Debug, thiserror::Error)] #[error("basket error")] struct BasketError;
//!
//! #[async_trait]
//! impl ActorState for Basket {
//!     type Command = BasketCommand; type Reply = u32; type Snapshot = u32;
//!     type Context = (); type Error = BasketError;
//!     async fn handle(&mut self, _: BasketCommand, _: &()) -> Result<u32, BasketError> { Ok(0) }
//!     fn snapshot(&self) -> u32 { self.items }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut mock = MockClient::<Basket>::new();
//!     mock.expect_snapshot().return_ok(3);
//!     mock.expect_command()
//!         .matching(|c| matches!(c, BasketCommand::Drop))
//!         .return_err(FrameworkError::ActorClosed);
//!
//!     let client = mock.client();
//!     assert_eq!(client.snapshot().await.unwrap(), 3);
//!     assert!(matches!(
//!         client.send(BasketCommand::Drop).await,
//!         Err(FrameworkError::ActorClosed)
//!     ));
//!     mock.verify();
//! }
//! ```
//!
//! ## Mocking Utilities
//!
//! Use [`create_mock_client`] to get a client and the raw receiver, or the fluent
//! [`MockClient`] API.

use crate::client::StateClient;
use crate::error::FrameworkError;
use crate::message::StateRequest;
use crate::state::ActorState;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{mpsc, oneshot};

type Matcher<C> = Box<dyn Fn(&C) -> bool + Send>;

/// An expected request to the mock client.
enum Expectation<T: ActorState> {
    Command {
        matcher: Option<Matcher<T::Command>>,
        response: Result<T::Reply, FrameworkError>,
    },
    Snapshot {
        response: Result<T::Snapshot, FrameworkError>,
    },
}

type Queue<T> = Arc<Mutex<VecDeque<Expectation<T>>>>;

fn lock<T: ActorState>(queue: &Queue<T>) -> MutexGuard<'_, VecDeque<Expectation<T>>> {
    queue.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A mock client with expectation tracking for fluent testing.
///
/// Expectations are consumed in the order they were declared. A request that does not
/// match the next expectation panics the mock's background task, which surfaces to the
/// caller as [`FrameworkError::ActorDropped`] and leaves [`MockClient::verify`] failing.
pub struct MockClient<T: ActorState> {
    client: StateClient<T>,
    expectations: Queue<T>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<T: ActorState> Default for MockClient<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ActorState> MockClient<T> {
    /// Creates a new mock client with no expectations.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<StateRequest<T>>(100);
        let expectations: Queue<T> = Arc::new(Mutex::new(VecDeque::new()));
        let queue = expectations.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let expectation = lock(&queue).pop_front();

                match (request, expectation) {
                    (
                        StateRequest::Command {
                            command,
                            respond_to,
                        },
                        Some(Expectation::Command { matcher, response }),
                    ) => {
                        if let Some(matcher) = matcher {
                            assert!(matcher(&command), "Unexpected command: {command:?}");
                        }
                        let _ = respond_to.send(response);
                    }
                    (
                        StateRequest::Snapshot { respond_to },
                        Some(Expectation::Snapshot { response }),
                    ) => {
                        let _ = respond_to.send(response);
                    }
                    (request, _) => {
                        panic!("Unexpected request or expectation mismatch: {request:?}");
                    }
                }
            }
        });

        Self {
            client: StateClient::new(sender),
            expectations,
            _handle: handle,
        }
    }

    /// Returns the client for use in tests.
    pub fn client(&self) -> StateClient<T> {
        self.client.clone()
    }

    /// Expects a command.
    pub fn expect_command(&mut self) -> CommandExpectationBuilder<T> {
        CommandExpectationBuilder {
            matcher: None,
            expectations: self.expectations.clone(),
        }
    }

    /// Expects a snapshot request.
    pub fn expect_snapshot(&mut self) -> SnapshotExpectationBuilder<T> {
        SnapshotExpectationBuilder {
            expectations: self.expectations.clone(),
        }
    }

    /// Panics unless every expectation was consumed.
    pub fn verify(&self) {
        let remaining = lock(&self.expectations).len();
        assert!(
            remaining == 0,
            "Not all expectations were met. {remaining} remaining"
        );
    }
}

/// Builder for command expectations.
pub struct CommandExpectationBuilder<T: ActorState> {
    matcher: Option<Matcher<T::Command>>,
    expectations: Queue<T>,
}

impl<T: ActorState> CommandExpectationBuilder<T> {
    /// Only accept a command for which `matcher` returns true.
    pub fn matching<F>(mut self, matcher: F) -> Self
    where
        F: Fn(&T::Command) -> bool + Send + 'static,
    {
        self.matcher = Some(Box::new(matcher));
        self
    }

    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, reply: T::Reply) {
        lock(&self.expectations).push_back(Expectation::Command {
            matcher: self.matcher,
            response: Ok(reply),
        });
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: FrameworkError) {
        lock(&self.expectations).push_back(Expectation::Command {
            matcher: self.matcher,
            response: Err(error),
        });
    }
}

/// Builder for snapshot expectations.
pub struct SnapshotExpectationBuilder<T: ActorState> {
    expectations: Queue<T>,
}

impl<T: ActorState> SnapshotExpectationBuilder<T> {
    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, snapshot: T::Snapshot) {
        lock(&self.expectations).push_back(Expectation::Snapshot {
            response: Ok(snapshot),
        });
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: FrameworkError) {
        lock(&self.expectations).push_back(Expectation::Snapshot {
            response: Err(error),
        });
    }
}

// =============================================================================
// RAW RECEIVER HELPERS
// =============================================================================

/// Creates a client and the receiver its requests arrive on.
///
/// The test plays the actor: it pulls requests off `receiver`, asserts on them and answers
/// through the oneshot sender, which allows replies to be delayed or dropped at will.
pub fn create_mock_client<T: ActorState>(
    buffer_size: usize,
) -> (StateClient<T>, mpsc::Receiver<StateRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (StateClient::new(sender), receiver)
}

/// Returns the next request if it is a command.
pub async fn expect_command<T: ActorState>(
    receiver: &mut mpsc::Receiver<StateRequest<T>>,
) -> Option<(
    T::Command,
    oneshot::Sender<Result<T::Reply, FrameworkError>>,
)> {
    match receiver.recv().await {
        Some(StateRequest::Command {
            command,
            respond_to,
        }) => Some((command, respond_to)),
        _ => None,
    }
}

/// Returns the next request if it is a snapshot request.
pub async fn expect_snapshot<T: ActorState>(
    receiver: &mut mpsc::Receiver<StateRequest<T>>,
) -> Option<oneshot::Sender<Result<T::Snapshot, FrameworkError>>> {
    match receiver.recv().await {
        Some(StateRequest::Snapshot { respond_to }) => Some(respond_to),
        _ => None,
    }
}
