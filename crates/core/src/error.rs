//! Error types for Aula Core

use thiserror::Error;

use crate::validation::ValidationError;

/// How a failure is surfaced to the user.
///
/// Every error in the workspace falls into exactly one of these classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Network or transport failure; the request never produced an answer
    Transport,
    /// Credentials rejected
    Authentication,
    /// Client-side check failed before any request was sent
    Validation,
    /// The server declined the action (no slots left, illegal state, ...)
    BusinessRule,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub fn class(&self) -> ErrorClass {
        match self {
            Error::Validation(_) => ErrorClass::Validation,
            Error::NotFound(_) | Error::InvalidOperation(_) => ErrorClass::BusinessRule,
            Error::Database(_) | Error::Io(_) | Error::Serialization(_) => ErrorClass::Transport,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
