//! Aula Core Library
//!
//! Domain models, form validation, collection reconciliation and client
//! storage for the Aula academic portal.

pub mod error;
pub mod invariants;
pub mod models;
pub mod reconcile;
pub mod storage;
pub mod validation;
pub mod views;

pub use error::{Error, ErrorClass, Result};
pub use models::*;
pub use reconcile::{reconcile_batch, remove, replace_existing, upsert, Keyed, Placement};
pub use storage::{ClientStateStore, Database, ProfileStore};
pub use validation::{MeetingRequestForm, ProposalForm, TopicForm, ValidationError};
pub use views::DashboardSummary;
