//! Typed identifiers
//!
//! The portal API assigns plain integer ids to every resource. Each resource
//! gets its own newtype so a topic id can't be passed where a proposal id is
//! expected.

use serde::{Deserialize, Serialize};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

entity_id!(
    /// Any portal account (student, teacher or coordinator)
    UserId
);
entity_id!(TopicId);
entity_id!(ProposalId);
entity_id!(MeetingRequestId);
entity_id!(MeetingId);
entity_id!(NotificationId);
entity_id!(TraceEventId);
