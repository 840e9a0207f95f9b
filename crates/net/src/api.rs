//! Remote gateway traits
//!
//! One trait per portal resource. Each method issues exactly one request
//! and never touches local state, allowing for different implementations
//! (HTTP, in-memory fakes).

use async_trait::async_trait;

use aula_core::models::{
    Meeting, MeetingApproval, MeetingId, MeetingOutcome, MeetingRequest, MeetingRequestId,
    NewMeeting, NewMeetingRequest, NewProposal, NewTopic, Notification, NotificationId, Proposal,
    ProposalDecision, ProposalId, Teacher, Topic, TopicId, UserId, UserProfile,
};

use crate::error::Result;
use crate::protocol::{MeetingQuery, ProposalQuery, RequestQuery, TopicQuery};

/// Topic operations
#[async_trait]
pub trait TopicApi: Send + Sync {
    /// List topics
    async fn list_topics(&self, query: &TopicQuery) -> Result<Vec<Topic>>;

    /// Publish a topic
    async fn create_topic(&self, topic: &NewTopic) -> Result<Topic>;

    /// Reserve one slot for a student; returns the updated topic
    async fn reserve_topic(&self, topic: TopicId, student: UserId) -> Result<Topic>;

    /// Attach companions to the student's reservation; returns the updated topic
    async fn assign_companions(
        &self,
        topic: TopicId,
        student: UserId,
        emails: &[String],
    ) -> Result<Topic>;

    /// Delete a topic
    async fn delete_topic(&self, topic: TopicId) -> Result<()>;
}

/// Proposal operations
#[async_trait]
pub trait ProposalApi: Send + Sync {
    /// Submit a proposal
    async fn create_proposal(&self, proposal: &NewProposal) -> Result<Proposal>;

    /// List proposals by student, by teacher, or all of them
    async fn list_proposals(&self, query: &ProposalQuery) -> Result<Vec<Proposal>>;

    /// Record a teacher's decision
    async fn decide_proposal(
        &self,
        proposal: ProposalId,
        decision: &ProposalDecision,
        teacher: Option<UserId>,
    ) -> Result<Proposal>;

    /// Delete a proposal
    async fn delete_proposal(&self, proposal: ProposalId) -> Result<()>;
}

/// Meeting request and meeting operations
#[async_trait]
pub trait MeetingApi: Send + Sync {
    async fn list_requests(&self, query: &RequestQuery) -> Result<Vec<MeetingRequest>>;

    async fn create_request(&self, request: &NewMeetingRequest) -> Result<MeetingRequest>;

    /// Approve a request; the server answers with the meeting it scheduled
    async fn approve_request(
        &self,
        request: MeetingRequestId,
        approval: &MeetingApproval,
    ) -> Result<Meeting>;

    async fn reject_request(
        &self,
        request: MeetingRequestId,
        teacher: UserId,
        comment: Option<&str>,
    ) -> Result<MeetingRequest>;

    async fn list_meetings(&self, query: &MeetingQuery) -> Result<Vec<Meeting>>;

    /// Schedule a meeting without a prior request
    async fn schedule_meeting(&self, meeting: &NewMeeting) -> Result<Meeting>;

    /// Close a meeting as finalized or not held
    async fn close_meeting(
        &self,
        meeting: MeetingId,
        teacher: UserId,
        outcome: MeetingOutcome,
        comment: Option<&str>,
    ) -> Result<Meeting>;
}

/// Notification operations
#[async_trait]
pub trait NotificationApi: Send + Sync {
    async fn list_notifications(&self, user: UserId, unread_only: bool)
        -> Result<Vec<Notification>>;

    /// Mark one notification read; returns it as stored by the server
    async fn mark_read(&self, notification: NotificationId) -> Result<Notification>;
}

/// Teacher directory
#[async_trait]
pub trait TeacherApi: Send + Sync {
    async fn list_teachers(&self, career: Option<&str>) -> Result<Vec<Teacher>>;
}

/// Authentication
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<UserProfile>;

    async fn logout(&self) -> Result<()>;
}

/// Combined gateway trait
pub trait Gateway: TopicApi + ProposalApi + MeetingApi + NotificationApi + TeacherApi + AuthApi {}

// Blanket implementation: any type implementing all traits implements Gateway
impl<T> Gateway for T where
    T: TopicApi + ProposalApi + MeetingApi + NotificationApi + TeacherApi + AuthApi
{
}
