use thiserror::Error;

use crate::actor_framework::FrameworkError;

/// Errors that can occur during user operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum UserError {
    #[error("User not found: {0}")]
    NotFound(String),
    #[error("Email already exists: {0}")]
    DuplicateEmail(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError> for UserError {
    fn from(err: FrameworkError) -> Self {
        match err {
            FrameworkError::NotFound(id) => UserError::NotFound(id),
            FrameworkError::Conflict(email) => UserError::DuplicateEmail(email),
            other => UserError::ActorCommunicationError(other.to_string()),
        }
    }
}
