//! Meetings view model
//!
//! Students request meetings with their guide; teachers approve (which
//! schedules a meeting), reject, schedule directly and close meetings.
//! Listings are scoped to the signed-in user's role.

use std::sync::Arc;

use aula_core::validation::time_range;
use aula_core::{
    views, Meeting, MeetingApproval, MeetingId, MeetingOutcome, MeetingRequest, MeetingRequestForm,
    MeetingRequestId, MeetingRequestState, Modality, NewMeeting, Role, UserId,
};
use aula_net::{MeetingApi, MeetingQuery, RequestQuery};
use chrono::{NaiveDate, NaiveTime};
use tracing::{info, warn};

use crate::error::{AppError, Result};
use crate::scope::ViewScope;
use crate::state::AppState;
use crate::store::{CollectionStore, InFlight};

/// Slot a teacher picks when approving or scheduling
#[derive(Debug, Clone, PartialEq)]
pub struct SlotForm {
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub modality: Modality,
    pub comment: Option<String>,
}

pub struct MeetingsViewModel {
    state: AppState,
    scope: ViewScope,
    requests: CollectionStore<MeetingRequest>,
    meetings: CollectionStore<Meeting>,
    requesting: InFlight<()>,
    answering: InFlight<MeetingRequestId>,
    scheduling: InFlight<()>,
    closing: InFlight<MeetingId>,
}

impl MeetingsViewModel {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            scope: ViewScope::new(),
            requests: CollectionStore::new("meeting_requests"),
            meetings: CollectionStore::new("meetings"),
            requesting: InFlight::new(),
            answering: InFlight::new(),
            scheduling: InFlight::new(),
            closing: InFlight::new(),
        }
    }

    pub fn scope(&self) -> &ViewScope {
        &self.scope
    }

    pub fn requests(&self) -> &CollectionStore<MeetingRequest> {
        &self.requests
    }

    pub fn meetings(&self) -> &CollectionStore<Meeting> {
        &self.meetings
    }

    fn queries(&self) -> Result<(RequestQuery, MeetingQuery)> {
        let profile = self.state.session.require()?;
        let user = profile.id.ok_or(AppError::MissingUserId)?;
        Ok((
            RequestQuery::for_role(profile.role, user),
            MeetingQuery::for_role(profile.role, user),
        ))
    }

    pub async fn activate(&self) -> Result<()> {
        let (request_query, meeting_query) = self.queries()?;
        let gateway = &self.state.gateway;
        let (requests, meetings) = futures::join!(
            self.requests
                .activate(&self.scope, || gateway.list_requests(&request_query)),
            self.meetings
                .activate(&self.scope, || gateway.list_meetings(&meeting_query)),
        );
        requests?;
        meetings?;
        Ok(())
    }

    pub async fn refresh_requests(&self) -> Result<()> {
        let (query, _) = self.queries()?;
        self.requests
            .refresh(&self.scope, || self.state.gateway.list_requests(&query))
            .await?;
        Ok(())
    }

    pub async fn refresh_meetings(&self) -> Result<()> {
        let (_, query) = self.queries()?;
        self.meetings
            .refresh(&self.scope, || self.state.gateway.list_meetings(&query))
            .await?;
        Ok(())
    }

    /// (pending, resolved)
    pub fn split_requests(&self) -> (Vec<Arc<MeetingRequest>>, Vec<Arc<MeetingRequest>>) {
        views::split_requests(&self.requests.snapshot())
    }

    /// (upcoming, past) relative to `today`
    pub fn split_meetings(&self, today: NaiveDate) -> (Vec<Arc<Meeting>>, Vec<Arc<Meeting>>) {
        views::split_meetings(&self.meetings.snapshot(), today)
    }

    pub async fn request_meeting(&self, form: &MeetingRequestForm) -> Result<Arc<MeetingRequest>> {
        let student = self.state.session.require_role(Role::Student)?;
        let new = form.validate(student)?;

        let _guard = self.requesting.begin(())?;
        let created = self
            .scope
            .run(self.state.gateway.create_request(&new))
            .await
            .ok_or(AppError::Cancelled)??;

        info!(request = %created.id, "Meeting requested");
        Ok(self.requests.upsert(created))
    }

    fn pending_request(&self, id: MeetingRequestId) -> Result<Arc<MeetingRequest>> {
        let request = self
            .requests
            .get(id)
            .ok_or_else(|| aula_core::Error::NotFound(format!("meeting request {id}")))?;
        if request.state != MeetingRequestState::Pending {
            return Err(aula_core::Error::InvalidOperation(format!(
                "meeting request {id} is already {}",
                request.state.as_tag()
            ))
            .into());
        }
        Ok(request)
    }

    /// Approve a pending request, scheduling the meeting it asked for
    pub async fn approve(&self, id: MeetingRequestId, slot: &SlotForm) -> Result<Arc<Meeting>> {
        let teacher = self.state.session.require_role(Role::Teacher)?;
        time_range(slot.start, slot.end)?;
        self.pending_request(id)?;

        let approval = MeetingApproval {
            teacher_id: teacher,
            date: slot.date,
            start: slot.start,
            end: slot.end,
            modality: slot.modality.clone(),
            comment: slot.comment.clone(),
        };
        let _guard = self.answering.begin(id)?;
        let meeting = self
            .scope
            .run(self.state.gateway.approve_request(id, &approval))
            .await
            .ok_or(AppError::Cancelled)??;
        let meeting = self.meetings.upsert(meeting);
        info!(request = %id, meeting = %meeting.id, "Meeting request approved");

        if let Err(e) = self.refresh_requests().await {
            warn!(error = %e, "Request list refresh failed after approval");
        }
        Ok(meeting)
    }

    pub async fn reject(
        &self,
        id: MeetingRequestId,
        comment: Option<&str>,
    ) -> Result<Arc<MeetingRequest>> {
        let teacher = self.state.session.require_role(Role::Teacher)?;
        self.pending_request(id)?;
        let comment = comment.map(str::trim).filter(|c| !c.is_empty());

        let _guard = self.answering.begin(id)?;
        let updated = self
            .scope
            .run(self.state.gateway.reject_request(id, teacher, comment))
            .await
            .ok_or(AppError::Cancelled)??;

        info!(request = %id, "Meeting request rejected");
        Ok(self.requests.upsert(updated))
    }

    /// Schedule a meeting with `student` without a prior request
    pub async fn schedule(
        &self,
        student: UserId,
        reason: &str,
        slot: &SlotForm,
    ) -> Result<Arc<Meeting>> {
        let teacher = self.state.session.require_role(Role::Teacher)?;
        time_range(slot.start, slot.end)?;
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(aula_core::ValidationError::MissingField("reason").into());
        }

        let new = NewMeeting {
            student_id: student,
            teacher_id: teacher,
            date: slot.date,
            start: slot.start,
            end: slot.end,
            modality: slot.modality.clone(),
            reason: reason.to_string(),
            observations: slot.comment.clone(),
        };
        let _guard = self.scheduling.begin(())?;
        let meeting = self
            .scope
            .run(self.state.gateway.schedule_meeting(&new))
            .await
            .ok_or(AppError::Cancelled)??;

        info!(meeting = %meeting.id, "Meeting scheduled");
        Ok(self.meetings.upsert(meeting))
    }

    pub async fn close(
        &self,
        id: MeetingId,
        outcome: MeetingOutcome,
        comment: Option<&str>,
    ) -> Result<Arc<Meeting>> {
        let teacher = self.state.session.require_role(Role::Teacher)?;
        let meeting = self
            .meetings
            .get(id)
            .ok_or_else(|| aula_core::Error::NotFound(format!("meeting {id}")))?;
        if !meeting.state.is_open() {
            return Err(aula_core::Error::InvalidOperation(format!(
                "meeting {id} is already closed"
            ))
            .into());
        }
        let comment = comment.map(str::trim).filter(|c| !c.is_empty());

        let _guard = self.closing.begin(id)?;
        let updated = self
            .scope
            .run(self.state.gateway.close_meeting(id, teacher, outcome, comment))
            .await
            .ok_or(AppError::Cancelled)??;

        info!(meeting = %id, state = updated.state.as_tag(), "Meeting closed");
        Ok(self.meetings.upsert(updated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::lock;
    use crate::testing::{day, hour, meeting, profile, request, state_with, FakeGateway};
    use aula_core::{ErrorClass, MeetingState, ValidationError};

    fn slot(start: u32, end: u32) -> SlotForm {
        SlotForm {
            date: day(20),
            start: hour(start),
            end: hour(end),
            modality: Modality::InPerson,
            comment: None,
        }
    }

    fn teacher_vm(gateway: &Arc<FakeGateway>) -> MeetingsViewModel {
        MeetingsViewModel::new(state_with(gateway.clone(), Some(profile(7, Role::Teacher))))
    }

    #[tokio::test]
    async fn test_student_requests_meeting() {
        let gateway = FakeGateway::new();
        lock(&gateway.requests).push(request(1, MeetingRequestState::Rejected));
        let vm = MeetingsViewModel::new(state_with(
            gateway.clone(),
            Some(profile(21, Role::Student)),
        ));
        vm.activate().await.unwrap();

        let form = MeetingRequestForm {
            reason: "Dudas del capítulo 2".to_string(),
            availability: "Martes en la tarde".to_string(),
        };
        let created = vm.request_meeting(&form).await.unwrap();
        assert_eq!(vm.requests().snapshot()[0].id, created.id);

        let (pending, resolved) = vm.split_requests();
        assert_eq!(pending.len(), 1);
        assert_eq!(resolved.len(), 1);
    }

    #[tokio::test]
    async fn test_approve_schedules_and_refreshes() {
        let gateway = FakeGateway::new();
        lock(&gateway.requests).push(request(1, MeetingRequestState::Pending));
        let vm = teacher_vm(&gateway);
        vm.activate().await.unwrap();

        let scheduled = vm.approve(MeetingRequestId(1), &slot(10, 11)).await.unwrap();
        assert_eq!(scheduled.request_id, Some(MeetingRequestId(1)));
        assert_eq!(vm.meetings().len(), 1);
        assert_eq!(gateway.count("list_requests"), 2);
        assert_eq!(
            vm.requests().get(MeetingRequestId(1)).unwrap().state,
            MeetingRequestState::Approved
        );

        let (upcoming, past) = vm.split_meetings(day(19));
        assert_eq!(upcoming.len(), 1);
        assert!(past.is_empty());
    }

    #[tokio::test]
    async fn test_approve_checks_time_range() {
        let gateway = FakeGateway::new();
        lock(&gateway.requests).push(request(1, MeetingRequestState::Pending));
        let vm = teacher_vm(&gateway);
        vm.activate().await.unwrap();

        let err = vm.approve(MeetingRequestId(1), &slot(11, 10)).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation(ValidationError::InvalidTimeRange)
        ));
        assert_eq!(gateway.count("approve_request"), 0);
    }

    #[tokio::test]
    async fn test_answered_request_not_answered_again() {
        let gateway = FakeGateway::new();
        lock(&gateway.requests).push(request(1, MeetingRequestState::Pending));
        let vm = teacher_vm(&gateway);
        vm.activate().await.unwrap();

        let rejected = vm.reject(MeetingRequestId(1), Some("  ")).await.unwrap();
        assert_eq!(rejected.state, MeetingRequestState::Rejected);

        let err = vm.approve(MeetingRequestId(1), &slot(10, 11)).await.unwrap_err();
        assert_eq!(err.class(), ErrorClass::BusinessRule);
    }

    #[tokio::test]
    async fn test_close_meeting() {
        let gateway = FakeGateway::new();
        lock(&gateway.meetings).extend([
            meeting(1, MeetingState::Approved, day(10)),
            meeting(2, MeetingState::Finalized, day(3)),
        ]);
        let vm = teacher_vm(&gateway);
        vm.activate().await.unwrap();

        let closed = vm
            .close(MeetingId(1), MeetingOutcome::NotHeld, Some("No asistió"))
            .await
            .unwrap();
        assert_eq!(closed.state, MeetingState::NotHeld);
        assert_eq!(closed.observations.as_deref(), Some("No asistió"));

        let err = vm
            .close(MeetingId(2), MeetingOutcome::Finalized, None)
            .await
            .unwrap_err();
        assert_eq!(err.class(), ErrorClass::BusinessRule);
        assert_eq!(gateway.count("close_meeting"), 1);
    }

    #[tokio::test]
    async fn test_schedule_directly() {
        let gateway = FakeGateway::new();
        let vm = teacher_vm(&gateway);

        let err = vm.schedule(UserId(21), " ", &slot(9, 10)).await.unwrap_err();
        assert_eq!(err.class(), ErrorClass::Validation);

        let meeting = vm
            .schedule(UserId(21), "Revisión final", &slot(9, 10))
            .await
            .unwrap();
        assert_eq!(meeting.state, MeetingState::Approved);
        assert_eq!(vm.meetings().snapshot()[0].id, meeting.id);
    }

    #[tokio::test]
    async fn test_students_cannot_answer() {
        let gateway = FakeGateway::new();
        lock(&gateway.requests).push(request(1, MeetingRequestState::Pending));
        let vm = MeetingsViewModel::new(state_with(
            gateway.clone(),
            Some(profile(21, Role::Student)),
        ));
        vm.activate().await.unwrap();
        assert!(matches!(
            vm.reject(MeetingRequestId(1), None).await,
            Err(AppError::WrongRole(Role::Teacher))
        ));
    }
}
