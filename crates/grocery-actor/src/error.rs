//! # Framework Errors
//!
//! Common error type for the actor runtime itself. Store-specific failures travel inside
//! [`FrameworkError::StateError`] and can be recovered with [`FrameworkError::downcast_state`].

/// Errors that can occur within the actor runtime.
#[derive(Debug, thiserror::Error)]
pub enum FrameworkError {
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped response channel")]
    ActorDropped,
    #[error("State error: {0}")]
    StateError(Box<dyn std::error::Error + Send + Sync>),
}

impl FrameworkError {
    /// Recover the store's own error type from a `StateError`.
    ///
    /// Returns the original error unchanged when it is not a `StateError` or when the boxed
    /// error is of a different type.
    pub fn downcast_state<E>(self) -> Result<E, FrameworkError>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        match self {
            FrameworkError::StateError(inner) => inner
                .downcast::<E>()
                .map(|e| *e)
                .map_err(FrameworkError::StateError),
            other => Err(other),
        }
    }
}
