//! Data models for Aula

mod ids;
mod meeting;
mod notification;
mod person;
mod proposal;
mod topic;

pub use ids::*;
pub use meeting::*;
pub use notification::*;
pub use person::*;
pub use proposal::*;
pub use topic::*;
