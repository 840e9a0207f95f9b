//! Dashboard view model
//!
//! Per-role counters over proposals, meeting requests, meetings and
//! notifications, all fetched concurrently.

use std::sync::Arc;

use aula_core::{views, DashboardSummary, Meeting, MeetingRequest, Notification, Proposal, Role};
use aula_net::{
    MeetingApi, MeetingQuery, NotificationApi, ProposalApi, ProposalQuery, RequestQuery,
};
use chrono::NaiveDate;

use crate::error::{AppError, Result};
use crate::scope::ViewScope;
use crate::state::AppState;
use crate::store::CollectionStore;

pub struct DashboardViewModel {
    state: AppState,
    scope: ViewScope,
    proposals: CollectionStore<Proposal>,
    requests: CollectionStore<MeetingRequest>,
    meetings: CollectionStore<Meeting>,
    notifications: CollectionStore<Notification>,
}

impl DashboardViewModel {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            scope: ViewScope::new(),
            proposals: CollectionStore::new("dashboard_proposals"),
            requests: CollectionStore::new("dashboard_requests"),
            meetings: CollectionStore::new("dashboard_meetings"),
            notifications: CollectionStore::new("dashboard_notifications"),
        }
    }

    pub fn scope(&self) -> &ViewScope {
        &self.scope
    }

    pub async fn activate(&self) -> Result<()> {
        let profile = self.state.session.require()?;
        let user = profile.id.ok_or(AppError::MissingUserId)?;
        let proposal_query = match profile.role {
            Role::Student => ProposalQuery::for_student(user),
            Role::Teacher => ProposalQuery::for_teacher(user),
            Role::Coordination => ProposalQuery::all(),
        };
        let request_query = RequestQuery::for_role(profile.role, user);
        let meeting_query = MeetingQuery::for_role(profile.role, user);
        let gateway = &self.state.gateway;

        let (proposals, requests, meetings, notifications) = futures::join!(
            self.proposals
                .activate(&self.scope, || gateway.list_proposals(&proposal_query)),
            self.requests
                .activate(&self.scope, || gateway.list_requests(&request_query)),
            self.meetings
                .activate(&self.scope, || gateway.list_meetings(&meeting_query)),
            self.notifications
                .activate(&self.scope, || gateway.list_notifications(user, false)),
        );
        proposals?;
        requests?;
        meetings?;
        notifications?;
        Ok(())
    }

    pub fn summary(&self, today: NaiveDate) -> DashboardSummary {
        DashboardSummary::compute(
            &self.proposals.snapshot(),
            &self.requests.snapshot(),
            &self.meetings.snapshot(),
            &self.notifications.snapshot(),
            today,
        )
    }

    /// The student's headline proposal
    pub fn featured_proposal(&self) -> Option<Arc<Proposal>> {
        views::featured_proposal(&self.proposals.snapshot())
    }

    /// Soonest open meeting from `today` on
    pub fn next_meeting(&self, today: NaiveDate) -> Option<Arc<Meeting>> {
        views::split_meetings(&self.meetings.snapshot(), today)
            .0
            .into_iter()
            .next()
    }
}
