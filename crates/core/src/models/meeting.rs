//! Meeting requests, meetings, and their trace logs

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::{MeetingId, MeetingRequestId, PersonSummary, TraceEventId, UserId};
use crate::reconcile::Keyed;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeetingRequestState {
    #[serde(rename = "pendiente")]
    Pending,
    #[serde(rename = "aprobada")]
    Approved,
    #[serde(rename = "rechazada")]
    Rejected,
}

impl MeetingRequestState {
    pub fn as_tag(&self) -> &'static str {
        match self {
            MeetingRequestState::Pending => "pendiente",
            MeetingRequestState::Approved => "aprobada",
            MeetingRequestState::Rejected => "rechazada",
        }
    }
}

impl std::fmt::Display for MeetingRequestState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            MeetingRequestState::Pending => "Pending",
            MeetingRequestState::Approved => "Approved",
            MeetingRequestState::Rejected => "Rejected",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeetingState {
    /// Scheduled
    #[serde(rename = "aprobada")]
    Approved,
    #[serde(rename = "finalizada")]
    Finalized,
    #[serde(rename = "no_realizada")]
    NotHeld,
    #[serde(rename = "reprogramada")]
    Rescheduled,
}

impl MeetingState {
    pub fn as_tag(&self) -> &'static str {
        match self {
            MeetingState::Approved => "aprobada",
            MeetingState::Finalized => "finalizada",
            MeetingState::NotHeld => "no_realizada",
            MeetingState::Rescheduled => "reprogramada",
        }
    }

    /// Still expected to take place
    pub fn is_open(&self) -> bool {
        matches!(self, MeetingState::Approved | MeetingState::Rescheduled)
    }
}

impl std::fmt::Display for MeetingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            MeetingState::Approved => "Scheduled",
            MeetingState::Finalized => "Finalized",
            MeetingState::NotHeld => "Not held",
            MeetingState::Rescheduled => "Rescheduled",
        };
        write!(f, "{label}")
    }
}

/// How a meeting takes place
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Modality {
    #[serde(rename = "presencial")]
    InPerson,
    #[serde(rename = "online")]
    Online,
    #[serde(untagged)]
    Other(String),
}

impl Modality {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "presencial" => Modality::InPerson,
            "online" => Modality::Online,
            other => Modality::Other(other.to_string()),
        }
    }

    pub fn as_tag(&self) -> &str {
        match self {
            Modality::InPerson => "presencial",
            Modality::Online => "online",
            Modality::Other(tag) => tag,
        }
    }
}

/// Final outcome when a teacher closes a meeting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeetingOutcome {
    Finalized,
    NotHeld,
}

impl MeetingOutcome {
    pub fn state(&self) -> MeetingState {
        match self {
            MeetingOutcome::Finalized => MeetingState::Finalized,
            MeetingOutcome::NotHeld => MeetingState::NotHeld,
        }
    }
}

/// One entry of a request's or meeting's audit log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    pub id: TraceEventId,
    pub kind: String,
    pub previous_state: Option<String>,
    pub new_state: Option<String>,
    pub comment: Option<String>,
    pub data: serde_json::Map<String, serde_json::Value>,
    pub at: DateTime<Utc>,
    pub user: Option<PersonSummary>,
}

/// Order a trace log oldest first
pub fn sort_trace(events: &mut [TraceEvent]) {
    events.sort_by_key(|e| e.at);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingRequest {
    pub id: MeetingRequestId,
    pub state: MeetingRequestState,
    pub reason: String,
    pub suggested_availability: Option<String>,
    pub suggested_date: Option<NaiveDate>,
    pub suggested_time: Option<NaiveTime>,
    pub suggested_modality: Option<Modality>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub student: Option<PersonSummary>,
    pub teacher: Option<PersonSummary>,
    pub trace: Vec<TraceEvent>,
}

impl Keyed for MeetingRequest {
    type Key = MeetingRequestId;

    fn key(&self) -> MeetingRequestId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meeting {
    pub id: MeetingId,
    pub state: MeetingState,
    pub reason: String,
    pub observations: Option<String>,
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub modality: Modality,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub student: Option<PersonSummary>,
    pub teacher: Option<PersonSummary>,
    pub request_id: Option<MeetingRequestId>,
    pub trace: Vec<TraceEvent>,
}

impl Keyed for Meeting {
    type Key = MeetingId;

    fn key(&self) -> MeetingId {
        self.id
    }
}

/// Student's request for a meeting with their guide teacher
#[derive(Debug, Clone, PartialEq)]
pub struct NewMeetingRequest {
    pub student_id: UserId,
    pub reason: String,
    pub suggested_availability: Option<String>,
}

/// Teacher's approval, which schedules the meeting
#[derive(Debug, Clone, PartialEq)]
pub struct MeetingApproval {
    pub teacher_id: UserId,
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub modality: Modality,
    pub comment: Option<String>,
}

/// A meeting scheduled directly by a teacher
#[derive(Debug, Clone, PartialEq)]
pub struct NewMeeting {
    pub student_id: UserId,
    pub teacher_id: UserId,
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub modality: Modality,
    pub reason: String,
    pub observations: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modality_tags() {
        assert_eq!(Modality::from_tag("presencial"), Modality::InPerson);
        assert_eq!(Modality::from_tag("hibrida"), Modality::Other("hibrida".to_string()));
        assert_eq!(Modality::Other("hibrida".to_string()).as_tag(), "hibrida");
        let parsed: Modality = serde_json::from_str("\"online\"").unwrap();
        assert_eq!(parsed, Modality::Online);
        let other: Modality = serde_json::from_str("\"telefono\"").unwrap();
        assert_eq!(other, Modality::Other("telefono".to_string()));
    }

    #[test]
    fn test_meeting_state_tags() {
        let state: MeetingState = serde_json::from_str("\"no_realizada\"").unwrap();
        assert_eq!(state, MeetingState::NotHeld);
        assert!(!state.is_open());
        assert!(MeetingState::Rescheduled.is_open());
        assert_eq!(MeetingOutcome::Finalized.state().as_tag(), "finalizada");
    }
}
