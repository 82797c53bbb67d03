//! Error types for the session store.

use crate::model::Role;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SessionError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Email already in use: {0}")]
    EmailInUse(String),

    /// Only dealer and customer accounts can be created.
    #[error("Cannot sign up as {0}")]
    RoleNotAllowed(Role),

    #[error("Invalid signup: {0}")]
    InvalidSignup(String),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<String> for SessionError {
    fn from(msg: String) -> Self {
        SessionError::ActorCommunicationError(msg)
    }
}
