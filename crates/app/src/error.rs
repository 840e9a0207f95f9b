//! Application-level errors

use aula_core::{ErrorClass, Role, ValidationError};

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Gateway(#[from] aula_net::Error),

    #[error(transparent)]
    Core(#[from] aula_core::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Not signed in")]
    NotSignedIn,

    #[error("This action is only available to the {0} role")]
    WrongRole(Role),

    #[error("The signed-in profile has no account id")]
    MissingUserId,

    #[error("A request for this item is already in progress")]
    Busy,

    #[error("The view was closed before the request finished")]
    Cancelled,

    #[error("{failed} of {total} requests failed")]
    Partial { failed: usize, total: usize },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    pub fn class(&self) -> ErrorClass {
        match self {
            AppError::Gateway(e) => e.class(),
            AppError::Core(e) => e.class(),
            AppError::Validation(_)
            | AppError::MissingUserId
            | AppError::Busy
            | AppError::Config(_) => ErrorClass::Validation,
            AppError::NotSignedIn | AppError::WrongRole(_) => ErrorClass::Authentication,
            AppError::Cancelled | AppError::Partial { .. } => ErrorClass::Transport,
        }
    }

    /// The single message string shown for this failure
    pub fn user_message(&self) -> String {
        match self {
            AppError::Gateway(e) => e.user_message(),
            AppError::Partial { failed, total } => {
                format!("{failed} of {total} updates could not be saved. Try again.")
            }
            other => other.to_string(),
        }
    }
}
