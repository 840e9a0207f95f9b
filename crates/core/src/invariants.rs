//! Developer guardrails and invariants
//!
//! Debug assertions for detecting impossible states during development.
//! These checks are compiled out in release builds.

use std::collections::HashSet;

use crate::models::{Meeting, MeetingRequest, Proposal, Topic, TraceEvent};

/// Slot arithmetic and reservation uniqueness
pub fn assert_topic_invariants(topic: &Topic) {
    debug_assert!(
        topic.available_slots <= topic.total_slots,
        "Topic {} reports {} available of {} slots",
        topic.id,
        topic.available_slots,
        topic.total_slots
    );

    if let Some(reservations) = &topic.reservations {
        let taken = reservations.len() as u32;
        debug_assert!(
            topic.available_slots == topic.total_slots.saturating_sub(taken),
            "Topic {} has {} reservations but {} of {} slots available",
            topic.id,
            taken,
            topic.available_slots,
            topic.total_slots
        );

        // At most one active reservation per student
        let mut students = HashSet::new();
        debug_assert!(
            reservations.iter().all(|r| students.insert(r.student_id)),
            "Topic {} has a student holding two reservations",
            topic.id
        );
    }
}

pub fn assert_proposal_invariants(proposal: &Proposal) {
    debug_assert!(
        proposal.updated_at >= proposal.created_at,
        "Proposal {} updated ({}) before it was created ({})",
        proposal.id,
        proposal.updated_at,
        proposal.created_at
    );

    debug_assert!(
        !proposal.title.trim().is_empty(),
        "Proposal {} has empty title",
        proposal.id
    );
}

/// Trace logs are kept oldest first
pub fn assert_trace_ordered(trace: &[TraceEvent], context: &str) {
    debug_assert!(
        trace.windows(2).all(|w| w[0].at <= w[1].at),
        "Trace log out of order in context: {}",
        context
    );
}

pub fn assert_request_invariants(request: &MeetingRequest) {
    assert_trace_ordered(&request.trace, "meeting request");
}

pub fn assert_meeting_invariants(meeting: &Meeting) {
    debug_assert!(
        meeting.start <= meeting.end,
        "Meeting {} ends ({}) before it starts ({})",
        meeting.id,
        meeting.end,
        meeting.start
    );
    assert_trace_ordered(&meeting.trace, "meeting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::{at, proposal, reservation, topic};
    use crate::models::ProposalState;

    #[test]
    fn test_valid_topic() {
        assert_topic_invariants(&topic(1, 3, &[1, 2]));
    }

    #[test]
    #[should_panic(expected = "reservations")]
    fn test_stale_slot_count() {
        let mut t = topic(1, 3, &[1, 2]);
        t.available_slots = 3;
        assert_topic_invariants(&t);
    }

    #[test]
    #[should_panic(expected = "two reservations")]
    fn test_double_reservation() {
        let mut t = topic(1, 3, &[1]);
        t.reservations.as_mut().unwrap().push(reservation(1));
        t.recompute_slots();
        assert_topic_invariants(&t);
    }

    #[test]
    fn test_valid_proposal() {
        assert_proposal_invariants(&proposal(1, ProposalState::Pending, 10));
    }

    #[test]
    #[should_panic(expected = "before it was created")]
    fn test_proposal_time_travel() {
        let mut p = proposal(1, ProposalState::Pending, 0);
        p.created_at = at(100);
        assert_proposal_invariants(&p);
    }
}
