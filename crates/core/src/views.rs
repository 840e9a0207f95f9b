//! Derived, read-only views over fetched collections
//!
//! Nothing here mutates its input. Views return fresh vectors of the same
//! `Arc`s so callers can compare entries by pointer.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::models::{
    Meeting, MeetingRequest, MeetingRequestState, Notification, Proposal, ProposalState, Teacher,
    Topic,
};

/// Most recently updated first
pub fn proposals_by_recency(proposals: &[Arc<Proposal>]) -> Vec<Arc<Proposal>> {
    let mut sorted = proposals.to_vec();
    sorted.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    sorted
}

pub fn proposals_in_state(proposals: &[Arc<Proposal>], state: ProposalState) -> Vec<Arc<Proposal>> {
    proposals_by_recency(proposals)
        .into_iter()
        .filter(|p| p.state == state)
        .collect()
}

/// The proposal a student sees first.
///
/// The most recent accepted proposal wins; failing that, the most recent
/// one still in plain `Pending`. Proposals awaiting an adjustment or a
/// final approval are only listed in the history.
pub fn featured_proposal(proposals: &[Arc<Proposal>]) -> Option<Arc<Proposal>> {
    let sorted = proposals_by_recency(proposals);
    sorted
        .iter()
        .find(|p| p.state == ProposalState::Accepted)
        .or_else(|| sorted.iter().find(|p| p.state == ProposalState::Pending))
        .cloned()
}

/// Everything but the featured proposal, most recent first
pub fn proposal_history(proposals: &[Arc<Proposal>]) -> Vec<Arc<Proposal>> {
    let featured = featured_proposal(proposals).map(|p| p.id);
    proposals_by_recency(proposals)
        .into_iter()
        .filter(|p| Some(p.id) != featured)
        .collect()
}

/// Teachers selectable for `branch`; an empty branch keeps everyone
pub fn teachers_for_branch(teachers: &[Arc<Teacher>], branch: &str) -> Vec<Arc<Teacher>> {
    let branch = branch.trim();
    if branch.is_empty() {
        return teachers.to_vec();
    }
    teachers
        .iter()
        .filter(|t| t.covers_branch(branch))
        .cloned()
        .collect()
}

pub fn topics_for_career(topics: &[Arc<Topic>], career: Option<&str>) -> Vec<Arc<Topic>> {
    match career.map(str::trim).filter(|c| !c.is_empty()) {
        None => topics.to_vec(),
        Some(career) => topics
            .iter()
            .filter(|t| t.career.eq_ignore_ascii_case(career))
            .cloned()
            .collect(),
    }
}

/// Requests split into (pending, resolved)
pub fn split_requests(
    requests: &[Arc<MeetingRequest>],
) -> (Vec<Arc<MeetingRequest>>, Vec<Arc<MeetingRequest>>) {
    requests
        .iter()
        .cloned()
        .partition(|r| r.state == MeetingRequestState::Pending)
}

/// Meetings split into (upcoming, past) relative to `today`.
///
/// Upcoming meetings are open and dated today or later, soonest first;
/// past ones are the rest, latest first.
pub fn split_meetings(
    meetings: &[Arc<Meeting>],
    today: NaiveDate,
) -> (Vec<Arc<Meeting>>, Vec<Arc<Meeting>>) {
    let (mut upcoming, mut past): (Vec<_>, Vec<_>) = meetings
        .iter()
        .cloned()
        .partition(|m| m.state.is_open() && m.date >= today);
    upcoming.sort_by_key(|m| (m.date, m.start));
    past.sort_by(|a, b| (b.date, b.start).cmp(&(a.date, a.start)));
    (upcoming, past)
}

pub fn unread(notifications: &[Arc<Notification>]) -> Vec<Arc<Notification>> {
    notifications.iter().filter(|n| !n.read).cloned().collect()
}

pub fn unread_count(notifications: &[Arc<Notification>]) -> usize {
    notifications.iter().filter(|n| !n.read).count()
}

/// Per-role counters for the dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardSummary {
    pub proposals_pending: usize,
    pub proposals_accepted: usize,
    pub proposals_rejected: usize,
    pub requests_pending: usize,
    pub meetings_upcoming: usize,
    pub notifications_unread: usize,
}

impl DashboardSummary {
    pub fn compute(
        proposals: &[Arc<Proposal>],
        requests: &[Arc<MeetingRequest>],
        meetings: &[Arc<Meeting>],
        notifications: &[Arc<Notification>],
        today: NaiveDate,
    ) -> Self {
        Self {
            proposals_pending: proposals.iter().filter(|p| p.state.is_pending()).count(),
            proposals_accepted: proposals
                .iter()
                .filter(|p| p.state == ProposalState::Accepted)
                .count(),
            proposals_rejected: proposals
                .iter()
                .filter(|p| p.state == ProposalState::Rejected)
                .count(),
            requests_pending: split_requests(requests).0.len(),
            meetings_upcoming: split_meetings(meetings, today).0.len(),
            notifications_unread: unread_count(notifications),
        }
    }
}
