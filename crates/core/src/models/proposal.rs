//! Student-authored topic proposals

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{PersonSummary, ProposalId, UserId};
use crate::reconcile::Keyed;
use crate::validation::ValidationError;

/// Proposal lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalState {
    #[serde(rename = "pendiente")]
    Pending,
    /// The teacher asked the student to reduce the requested slots
    #[serde(rename = "pendiente_ajuste")]
    PendingAdjustment,
    #[serde(rename = "pendiente_aprobacion")]
    PendingApproval,
    #[serde(rename = "aceptada")]
    Accepted,
    #[serde(rename = "rechazada")]
    Rejected,
}

impl ProposalState {
    pub fn as_tag(&self) -> &'static str {
        match self {
            ProposalState::Pending => "pendiente",
            ProposalState::PendingAdjustment => "pendiente_ajuste",
            ProposalState::PendingApproval => "pendiente_aprobacion",
            ProposalState::Accepted => "aceptada",
            ProposalState::Rejected => "rechazada",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProposalState::Pending => "Pending",
            ProposalState::PendingAdjustment => "Pending adjustment",
            ProposalState::PendingApproval => "Pending approval",
            ProposalState::Accepted => "Accepted",
            ProposalState::Rejected => "Rejected",
        }
    }

    /// Any of the three states awaiting a decision
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            ProposalState::Pending | ProposalState::PendingAdjustment | ProposalState::PendingApproval
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ProposalState::Accepted | ProposalState::Rejected)
    }

    /// States only move forward, except the adjustment loop from
    /// pending-approval back to pending-adjustment.
    pub fn can_transition_to(&self, next: ProposalState) -> bool {
        use ProposalState::*;
        match self {
            Pending => matches!(next, PendingAdjustment | PendingApproval | Accepted | Rejected),
            PendingAdjustment => matches!(next, PendingApproval | Rejected),
            PendingApproval => matches!(next, PendingAdjustment | Accepted | Rejected),
            Accepted | Rejected => false,
        }
    }
}

impl std::fmt::Display for ProposalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub title: String,
    pub objective: String,
    pub description: String,
    pub branch: String,
    pub state: ProposalState,
    pub decision_comment: Option<String>,
    /// Ordered, most preferred first
    pub teacher_preferences: Vec<UserId>,
    pub requested_slots: u32,
    pub authorized_slots: Option<u32>,
    pub peer_emails: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub student: Option<PersonSummary>,
    pub teacher: Option<PersonSummary>,
}

impl Proposal {
    /// Slots the student may actually fill
    pub fn effective_slots(&self) -> u32 {
        self.authorized_slots.unwrap_or(self.requested_slots)
    }
}

impl Keyed for Proposal {
    type Key = ProposalId;

    fn key(&self) -> ProposalId {
        self.id
    }
}

/// Payload for submitting a proposal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProposal {
    pub student_id: Option<UserId>,
    pub title: String,
    pub objective: String,
    pub description: String,
    pub branch: String,
    pub teacher_preferences: Vec<UserId>,
    pub requested_slots: u32,
    pub peer_emails: Vec<String>,
    /// First preference, proposed as the deciding teacher
    pub teacher_id: Option<UserId>,
}

/// A teacher's decision on a proposal
#[derive(Debug, Clone, PartialEq)]
pub enum ProposalDecision {
    RequestAdjustment { authorized_slots: u32, comment: String },
    ApproveFinal { comment: String },
    Reject { comment: String },
}

impl ProposalDecision {
    /// Wire tag of the action
    pub fn action_tag(&self) -> &'static str {
        match self {
            ProposalDecision::RequestAdjustment { .. } => "solicitar_ajuste",
            ProposalDecision::ApproveFinal { .. } => "aprobar_final",
            ProposalDecision::Reject { .. } => "rechazar",
        }
    }

    pub fn target_state(&self) -> ProposalState {
        match self {
            ProposalDecision::RequestAdjustment { .. } => ProposalState::PendingAdjustment,
            ProposalDecision::ApproveFinal { .. } => ProposalState::Accepted,
            ProposalDecision::Reject { .. } => ProposalState::Rejected,
        }
    }

    pub fn comment(&self) -> &str {
        match self {
            ProposalDecision::RequestAdjustment { comment, .. }
            | ProposalDecision::ApproveFinal { comment }
            | ProposalDecision::Reject { comment } => comment,
        }
    }

    pub fn authorized_slots(&self) -> Option<u32> {
        match self {
            ProposalDecision::RequestAdjustment { authorized_slots, .. } => Some(*authorized_slots),
            _ => None,
        }
    }

    /// Check the decision against the proposal it applies to
    pub fn validate(&self, proposal: &Proposal) -> Result<(), ValidationError> {
        let target = self.target_state();
        if !proposal.state.can_transition_to(target) {
            return Err(ValidationError::InvalidTransition {
                from: proposal.state,
                to: target,
            });
        }
        if self.comment().trim().is_empty() {
            return Err(ValidationError::CommentRequired);
        }
        if let ProposalDecision::RequestAdjustment { authorized_slots, .. } = self {
            if *authorized_slots < 1 {
                return Err(ValidationError::InvalidSlotCount);
            }
            if *authorized_slots >= proposal.requested_slots {
                return Err(ValidationError::AdjustmentNotBelowRequested {
                    requested: proposal.requested_slots,
                });
            }
        }
        Ok(())
    }
}
