//! Client-side form validation
//!
//! Every check here runs before a request is sent. A failure blocks the
//! submission and names the offending rule.

use std::collections::HashSet;
use std::hash::Hash;

use chrono::NaiveTime;
use thiserror::Error;

use crate::models::{NewMeetingRequest, NewProposal, NewTopic, ProposalState, UserId};

/// Longest accepted meeting-request reason, in characters
pub const MAX_REASON_LEN: usize = 500;

/// Proposal field limits, in characters
pub const MAX_TITLE_LEN: usize = 160;
pub const MAX_OBJECTIVE_LEN: usize = 300;
pub const MAX_DESCRIPTION_LEN: usize = 1200;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("the same teacher was chosen more than once")]
    DuplicatePreferences,

    #[error("'{0}' is not a valid teacher")]
    InvalidPreference(String),

    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),

    #[error("not enough slots for every companion (at most {max})")]
    TooManyCompanions { max: usize },

    #[error("authorized slots must be lower than the {requested} requested")]
    AdjustmentNotBelowRequested { requested: u32 },

    #[error("slot count must be at least 1")]
    InvalidSlotCount,

    #[error("a comment is required for this decision")]
    CommentRequired,

    #[error("a proposal cannot move from {from} to {to}")]
    InvalidTransition { from: ProposalState, to: ProposalState },

    #[error("the meeting must end after it starts")]
    InvalidTimeRange,
}

impl ValidationError {
    /// Form error key, as the portal's forms name them
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::MissingField(_) => "required",
            ValidationError::TooLong { .. } => "maxlength",
            ValidationError::DuplicatePreferences => "profesoresDuplicados",
            ValidationError::InvalidPreference(_) => "preferenciaInvalida",
            ValidationError::InvalidEmail(_) => "email",
            ValidationError::TooManyCompanions { .. } => "cuposInsuficientes",
            ValidationError::AdjustmentNotBelowRequested { .. } => "ajusteInvalido",
            ValidationError::InvalidSlotCount => "cuposInvalidos",
            ValidationError::CommentRequired => "comentarioRequerido",
            ValidationError::InvalidTransition { .. } => "transicionInvalida",
            ValidationError::InvalidTimeRange => "horarioInvalido",
        }
    }
}

/// Non-empty preferences must be pairwise distinct
pub fn distinct_preferences<T: Eq + Hash>(values: &[Option<T>]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for value in values.iter().flatten() {
        if !seen.insert(value) {
            return Err(ValidationError::DuplicatePreferences);
        }
    }
    Ok(())
}

/// Parse one preference picker value; blank means unset
pub fn parse_preference(raw: &str) -> Result<Option<UserId>, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<i64>()
        .map(|id| Some(UserId(id)))
        .map_err(|_| ValidationError::InvalidPreference(raw.to_string()))
}

fn required(value: &str, field: &'static str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

/// Required and at most `max` characters once trimmed
fn bounded(value: &str, field: &'static str, max: usize) -> Result<String, ValidationError> {
    let value = required(value, field)?;
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(value)
}

/// Loose address check: one `@`, non-empty local part, dotted domain
pub fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !value.chars().any(char::is_whitespace)
        && domain.split('.').count() >= 2
        && domain.split('.').all(|part| !part.is_empty())
}

/// Proposal submission form, as typed by the student
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProposalForm {
    pub title: String,
    pub objective: String,
    pub description: String,
    pub branch: String,
    /// Raw picker values, most preferred first; blank means unset
    pub preferences: Vec<String>,
    pub requested_slots: u32,
    pub peer_emails: Vec<String>,
}

impl ProposalForm {
    /// Preference ids, parsed, blanks kept as `None`
    pub fn parsed_preferences(&self) -> Result<Vec<Option<UserId>>, ValidationError> {
        self.preferences.iter().map(|p| parse_preference(p)).collect()
    }

    /// Validity predicate, re-evaluated after every field change
    pub fn is_valid(&self) -> bool {
        self.validate(None).is_ok()
    }

    pub fn validate(&self, student_id: Option<UserId>) -> Result<NewProposal, ValidationError> {
        let title = bounded(&self.title, "title", MAX_TITLE_LEN)?;
        let objective = bounded(&self.objective, "objective", MAX_OBJECTIVE_LEN)?;
        let description = bounded(&self.description, "description", MAX_DESCRIPTION_LEN)?;
        let branch = required(&self.branch, "branch")?;

        let preferences = self.parsed_preferences()?;
        distinct_preferences(&preferences)?;
        let teacher_preferences: Vec<UserId> = preferences.into_iter().flatten().collect();
        if teacher_preferences.is_empty() {
            return Err(ValidationError::MissingField("teacher preference"));
        }

        let requested_slots = self.requested_slots.max(1);
        let peer_emails = normalize_emails(&self.peer_emails, None)?;
        let max_peers = requested_slots.saturating_sub(1) as usize;
        if peer_emails.len() > max_peers {
            return Err(ValidationError::TooManyCompanions { max: max_peers });
        }

        Ok(NewProposal {
            student_id,
            title,
            objective,
            description,
            branch,
            teacher_id: teacher_preferences.first().copied(),
            teacher_preferences,
            requested_slots,
            peer_emails,
        })
    }
}

/// Trim, drop blanks, check format, and de-duplicate case-insensitively,
/// keeping the first spelling. `own` is excluded from the result.
fn normalize_emails(raw: &[String], own: Option<&str>) -> Result<Vec<String>, ValidationError> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for email in raw.iter().map(|e| e.trim()).filter(|e| !e.is_empty()) {
        if !is_valid_email(email) {
            return Err(ValidationError::InvalidEmail(email.to_string()));
        }
        if own.is_some_and(|own| own.trim().eq_ignore_ascii_case(email)) {
            continue;
        }
        if seen.insert(email.to_lowercase()) {
            out.push(email.to_string());
        }
    }
    Ok(out)
}

/// Companion emails for a topic the student already holds
pub fn companion_emails(
    raw: &[String],
    own: Option<&str>,
    max: usize,
) -> Result<Vec<String>, ValidationError> {
    let emails = normalize_emails(raw, own)?;
    if emails.len() > max {
        return Err(ValidationError::TooManyCompanions { max });
    }
    Ok(emails)
}

/// Meeting request form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeetingRequestForm {
    pub reason: String,
    pub availability: String,
}

impl MeetingRequestForm {
    pub fn validate(&self, student_id: UserId) -> Result<NewMeetingRequest, ValidationError> {
        let reason = bounded(&self.reason, "reason", MAX_REASON_LEN)?;
        let availability = self.availability.trim();
        Ok(NewMeetingRequest {
            student_id,
            reason,
            suggested_availability: (!availability.is_empty()).then(|| availability.to_string()),
        })
    }
}

/// Topic publishing form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopicForm {
    pub title: String,
    pub career: String,
    pub description: String,
    /// One requirement per entry; blanks are dropped
    pub requirements: Vec<String>,
    pub total_slots: u32,
}

impl TopicForm {
    pub fn validate(&self, created_by: Option<UserId>) -> Result<NewTopic, ValidationError> {
        let title = required(&self.title, "title")?;
        let career = required(&self.career, "career")?;
        if self.total_slots == 0 {
            return Err(ValidationError::InvalidSlotCount);
        }
        Ok(NewTopic {
            title,
            career,
            description: self.description.trim().to_string(),
            requirements: self
                .requirements
                .iter()
                .map(|r| r.trim())
                .filter(|r| !r.is_empty())
                .map(String::from)
                .collect(),
            total_slots: self.total_slots,
            created_by,
        })
    }
}

pub fn time_range(start: NaiveTime, end: NaiveTime) -> Result<(), ValidationError> {
    if end <= start {
        return Err(ValidationError::InvalidTimeRange);
    }
    Ok(())
}
