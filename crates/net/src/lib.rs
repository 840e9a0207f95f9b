//! Aula Network Library
//!
//! Remote data gateway for the portal's REST API.
//!
//! # Architecture
//!
//! - **Api**: one async trait per resource, combined into [`Gateway`]
//! - **Client**: [`HttpGateway`], JSON over HTTP, one attempt per call
//! - **Protocol**: wire shapes and their conversion into domain models
//!
//! # Usage
//!
//! ```ignore
//! let gateway = HttpGateway::new(DEFAULT_BASE_URL, None)?;
//! let profile = gateway.login("luis@utem.cl", "secreto").await?;
//! let topics = gateway.list_topics(&TopicQuery::default()).await?;
//! ```

pub mod api;
pub mod client;
pub mod error;
pub mod protocol;

pub use api::{AuthApi, Gateway, MeetingApi, NotificationApi, ProposalApi, TeacherApi, TopicApi};
pub use client::HttpGateway;
pub use error::{Error, Result};
pub use protocol::{MeetingQuery, ProposalQuery, RequestQuery, TopicQuery};

/// Default API root
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/";
