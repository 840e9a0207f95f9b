//! In-memory gateway and fixtures for view-model tests

use std::collections::HashSet;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};

use aula_core::models::*;
use aula_core::Database;
use aula_net::{
    AuthApi, MeetingApi, MeetingQuery, NotificationApi, ProposalApi, ProposalQuery, RequestQuery,
    TeacherApi, TopicApi, TopicQuery,
};

use crate::session::SessionContext;
use crate::state::AppState;
use crate::store::lock;

type NetResult<T> = aula_net::Result<T>;

pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

pub fn profile(id: i64, role: Role) -> UserProfile {
    UserProfile {
        id: Some(UserId(id)),
        role,
        name: format!("Usuario {id}"),
        email: format!("u{id}@utem.cl"),
        rut: None,
        career: Some("Informática".to_string()),
        phone: None,
    }
}

pub fn person(id: i64, role: &str) -> PersonSummary {
    PersonSummary {
        id: UserId(id),
        name: format!("Persona {id}"),
        email: format!("p{id}@utem.cl"),
        career: None,
        phone: None,
        role: role.to_string(),
    }
}

pub fn reservation(student: i64) -> Reservation {
    Reservation {
        student_id: UserId(student),
        name: format!("Alumno {student}"),
        email: format!("u{student}@utem.cl"),
        career: None,
        reserved_at: Some(at(0)),
    }
}

pub fn topic(id: i64, total: u32, holders: &[i64]) -> Topic {
    let mut topic = Topic {
        id: TopicId(id),
        title: format!("Tema {id}"),
        career: "Informática".to_string(),
        description: String::new(),
        requirements: Vec::new(),
        total_slots: total,
        available_slots: total,
        has_own_slot: false,
        created_by: Some(UserId(900)),
        creator: None,
        teacher_in_charge: None,
        responsible_teacher: None,
        created_at: Some(at(0)),
        reservations: Some(holders.iter().map(|s| reservation(*s)).collect()),
    };
    topic.recompute_slots();
    topic
}

pub fn proposal(id: i64, state: ProposalState, updated: i64) -> Proposal {
    Proposal {
        id: ProposalId(id),
        title: format!("Propuesta {id}"),
        objective: "Objetivo".to_string(),
        description: "Descripción".to_string(),
        branch: "Datos".to_string(),
        state,
        decision_comment: None,
        teacher_preferences: vec![UserId(7)],
        requested_slots: 3,
        authorized_slots: None,
        peer_emails: Vec::new(),
        created_at: at(0),
        updated_at: at(updated),
        student: Some(person(21, "alumno")),
        teacher: None,
    }
}

pub fn teacher(id: i64, branches: Option<&[&str]>) -> Teacher {
    Teacher {
        id: UserId(id),
        name: format!("Docente {id}"),
        email: format!("d{id}@utem.cl"),
        career: None,
        phone: None,
        branches: branches.map(|b| b.iter().map(|s| s.to_string()).collect()),
    }
}

pub fn notification(id: i64, read: bool) -> Notification {
    Notification {
        id: NotificationId(id),
        title: format!("Aviso {id}"),
        message: String::new(),
        kind: "general".to_string(),
        read,
        meta: serde_json::Map::new(),
        created_at: at(id),
    }
}

pub fn request(id: i64, state: MeetingRequestState) -> MeetingRequest {
    MeetingRequest {
        id: MeetingRequestId(id),
        state,
        reason: "Revisar avance".to_string(),
        suggested_availability: None,
        suggested_date: None,
        suggested_time: None,
        suggested_modality: None,
        created_at: at(id),
        updated_at: at(id),
        student: Some(person(21, "alumno")),
        teacher: Some(person(7, "docente")),
        trace: Vec::new(),
    }
}

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
}

pub fn hour(h: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, 0, 0).unwrap()
}

pub fn meeting(id: i64, state: MeetingState, date: NaiveDate) -> Meeting {
    Meeting {
        id: MeetingId(id),
        state,
        reason: "Revisar avance".to_string(),
        observations: None,
        date,
        start: hour(10),
        end: hour(11),
        modality: Modality::Online,
        created_at: at(0),
        updated_at: at(0),
        student: Some(person(21, "alumno")),
        teacher: Some(person(7, "docente")),
        request_id: None,
        trace: Vec::new(),
    }
}

/// Gateway backed by in-memory collections.
///
/// Records every call by name; calls listed in `failing` (by name, or
/// `name:id`) are rejected as a business rule.
#[derive(Default)]
pub struct FakeGateway {
    pub topics: Mutex<Vec<Topic>>,
    pub proposals: Mutex<Vec<Proposal>>,
    pub requests: Mutex<Vec<MeetingRequest>>,
    pub meetings: Mutex<Vec<Meeting>>,
    pub notifications: Mutex<Vec<Notification>>,
    pub teachers: Mutex<Vec<Teacher>>,
    pub accounts: Mutex<Vec<(String, String, UserProfile)>>,
    pub failing: Mutex<HashSet<String>>,
    calls: Mutex<Vec<String>>,
    next_id: AtomicI64,
    delay_ms: AtomicU64,
}

impl FakeGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            next_id: AtomicI64::new(1000),
            ..Self::default()
        })
    }

    pub fn fail(&self, call: &str) {
        lock(&self.failing).insert(call.to_string());
    }

    /// Make every call wait before answering
    pub fn set_delay(&self, delay: Duration) {
        self.delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    pub fn count(&self, name: &str) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|c| c.as_str() == name || c.starts_with(&format!("{name}:")))
            .count()
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    async fn record(&self, name: &str, id: Option<i64>) -> NetResult<()> {
        let call = match id {
            Some(id) => format!("{name}:{id}"),
            None => name.to_string(),
        };
        lock(&self.calls).push(call.clone());

        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        let failing = lock(&self.failing);
        if failing.contains(name) || failing.contains(&call) {
            return Err(rejected("rejected by test"));
        }
        Ok(())
    }
}

fn rejected(detail: &str) -> aula_net::Error {
    aula_net::Error::Rejected {
        status: 400,
        detail: detail.to_string(),
    }
}

fn not_found() -> aula_net::Error {
    aula_net::Error::Rejected {
        status: 404,
        detail: "No encontrado.".to_string(),
    }
}

#[async_trait]
impl TopicApi for FakeGateway {
    async fn list_topics(&self, _query: &TopicQuery) -> NetResult<Vec<Topic>> {
        self.record("list_topics", None).await?;
        Ok(lock(&self.topics).clone())
    }

    async fn create_topic(&self, new: &NewTopic) -> NetResult<Topic> {
        self.record("create_topic", None).await?;
        let topic = Topic {
            id: TopicId(self.next_id()),
            title: new.title.clone(),
            career: new.career.clone(),
            description: new.description.clone(),
            requirements: new.requirements.clone(),
            total_slots: new.total_slots,
            available_slots: new.total_slots,
            has_own_slot: false,
            created_by: new.created_by,
            creator: None,
            teacher_in_charge: None,
            responsible_teacher: new.created_by,
            created_at: Some(Utc::now()),
            reservations: Some(Vec::new()),
        };
        lock(&self.topics).insert(0, topic.clone());
        Ok(topic)
    }

    async fn reserve_topic(&self, id: TopicId, student: UserId) -> NetResult<Topic> {
        self.record("reserve_topic", Some(id.0)).await?;
        let mut topics = lock(&self.topics);
        let topic = topics.iter_mut().find(|t| t.id == id).ok_or_else(not_found)?;
        if topic.available_slots == 0 {
            return Err(rejected("No quedan cupos disponibles."));
        }
        topic
            .reservations
            .get_or_insert_with(Vec::new)
            .push(reservation(student.0));
        topic.has_own_slot = true;
        topic.recompute_slots();
        Ok(topic.clone())
    }

    async fn assign_companions(
        &self,
        id: TopicId,
        student: UserId,
        emails: &[String],
    ) -> NetResult<Topic> {
        self.record("assign_companions", Some(id.0)).await?;
        let mut topics = lock(&self.topics);
        let topic = topics.iter_mut().find(|t| t.id == id).ok_or_else(not_found)?;
        let list = topic.reservations.get_or_insert_with(Vec::new);
        list.retain(|r| r.student_id == student);
        for (i, email) in emails.iter().enumerate() {
            let mut companion = reservation(5000 + i as i64);
            companion.email = email.clone();
            list.push(companion);
        }
        topic.recompute_slots();
        Ok(topic.clone())
    }

    async fn delete_topic(&self, id: TopicId) -> NetResult<()> {
        self.record("delete_topic", Some(id.0)).await?;
        lock(&self.topics).retain(|t| t.id != id);
        Ok(())
    }
}

#[async_trait]
impl ProposalApi for FakeGateway {
    async fn create_proposal(&self, new: &NewProposal) -> NetResult<Proposal> {
        self.record("create_proposal", None).await?;
        let now = Utc::now();
        let proposal = Proposal {
            id: ProposalId(self.next_id()),
            title: new.title.clone(),
            objective: new.objective.clone(),
            description: new.description.clone(),
            branch: new.branch.clone(),
            state: ProposalState::Pending,
            decision_comment: None,
            teacher_preferences: new.teacher_preferences.clone(),
            requested_slots: new.requested_slots,
            authorized_slots: None,
            peer_emails: new.peer_emails.clone(),
            created_at: now,
            updated_at: now,
            student: new.student_id.map(|id| person(id.0, "alumno")),
            teacher: None,
        };
        lock(&self.proposals).insert(0, proposal.clone());
        Ok(proposal)
    }

    async fn list_proposals(&self, _query: &ProposalQuery) -> NetResult<Vec<Proposal>> {
        self.record("list_proposals", None).await?;
        Ok(lock(&self.proposals).clone())
    }

    async fn decide_proposal(
        &self,
        id: ProposalId,
        decision: &ProposalDecision,
        teacher: Option<UserId>,
    ) -> NetResult<Proposal> {
        self.record("decide_proposal", Some(id.0)).await?;
        let mut proposals = lock(&self.proposals);
        let proposal = proposals.iter_mut().find(|p| p.id == id).ok_or_else(not_found)?;
        proposal.state = decision.target_state();
        proposal.decision_comment = Some(decision.comment().to_string());
        if let Some(slots) = decision.authorized_slots() {
            proposal.authorized_slots = Some(slots);
        }
        proposal.teacher = teacher.map(|id| person(id.0, "docente"));
        proposal.updated_at = Utc::now();
        Ok(proposal.clone())
    }

    async fn delete_proposal(&self, id: ProposalId) -> NetResult<()> {
        self.record("delete_proposal", Some(id.0)).await?;
        lock(&self.proposals).retain(|p| p.id != id);
        Ok(())
    }
}

#[async_trait]
impl MeetingApi for FakeGateway {
    async fn list_requests(&self, _query: &RequestQuery) -> NetResult<Vec<MeetingRequest>> {
        self.record("list_requests", None).await?;
        Ok(lock(&self.requests).clone())
    }

    async fn create_request(&self, new: &NewMeetingRequest) -> NetResult<MeetingRequest> {
        self.record("create_request", None).await?;
        let mut created = request(self.next_id(), MeetingRequestState::Pending);
        created.reason = new.reason.clone();
        created.suggested_availability = new.suggested_availability.clone();
        created.student = Some(person(new.student_id.0, "alumno"));
        lock(&self.requests).insert(0, created.clone());
        Ok(created)
    }

    async fn approve_request(
        &self,
        id: MeetingRequestId,
        approval: &MeetingApproval,
    ) -> NetResult<Meeting> {
        self.record("approve_request", Some(id.0)).await?;
        let reason = {
            let mut requests = lock(&self.requests);
            let request = requests.iter_mut().find(|r| r.id == id).ok_or_else(not_found)?;
            request.state = MeetingRequestState::Approved;
            request.reason.clone()
        };
        let mut scheduled = meeting(self.next_id(), MeetingState::Approved, approval.date);
        scheduled.reason = reason;
        scheduled.start = approval.start;
        scheduled.end = approval.end;
        scheduled.modality = approval.modality.clone();
        scheduled.request_id = Some(id);
        lock(&self.meetings).insert(0, scheduled.clone());
        Ok(scheduled)
    }

    async fn reject_request(
        &self,
        id: MeetingRequestId,
        _teacher: UserId,
        _comment: Option<&str>,
    ) -> NetResult<MeetingRequest> {
        self.record("reject_request", Some(id.0)).await?;
        let mut requests = lock(&self.requests);
        let request = requests.iter_mut().find(|r| r.id == id).ok_or_else(not_found)?;
        request.state = MeetingRequestState::Rejected;
        Ok(request.clone())
    }

    async fn list_meetings(&self, _query: &MeetingQuery) -> NetResult<Vec<Meeting>> {
        self.record("list_meetings", None).await?;
        Ok(lock(&self.meetings).clone())
    }

    async fn schedule_meeting(&self, new: &NewMeeting) -> NetResult<Meeting> {
        self.record("schedule_meeting", None).await?;
        let mut scheduled = meeting(self.next_id(), MeetingState::Approved, new.date);
        scheduled.start = new.start;
        scheduled.end = new.end;
        scheduled.modality = new.modality.clone();
        scheduled.reason = new.reason.clone();
        scheduled.observations = new.observations.clone();
        lock(&self.meetings).insert(0, scheduled.clone());
        Ok(scheduled)
    }

    async fn close_meeting(
        &self,
        id: MeetingId,
        _teacher: UserId,
        outcome: MeetingOutcome,
        comment: Option<&str>,
    ) -> NetResult<Meeting> {
        self.record("close_meeting", Some(id.0)).await?;
        let mut meetings = lock(&self.meetings);
        let meeting = meetings.iter_mut().find(|m| m.id == id).ok_or_else(not_found)?;
        meeting.state = outcome.state();
        meeting.observations = comment.map(String::from);
        Ok(meeting.clone())
    }
}

#[async_trait]
impl NotificationApi for FakeGateway {
    async fn list_notifications(
        &self,
        _user: UserId,
        unread_only: bool,
    ) -> NetResult<Vec<Notification>> {
        self.record("list_notifications", None).await?;
        Ok(lock(&self.notifications)
            .iter()
            .filter(|n| !unread_only || !n.read)
            .cloned()
            .collect())
    }

    async fn mark_read(&self, id: NotificationId) -> NetResult<Notification> {
        self.record("mark_read", Some(id.0)).await?;
        let mut notifications = lock(&self.notifications);
        let notification = notifications
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(not_found)?;
        notification.read = true;
        Ok(notification.clone())
    }
}

#[async_trait]
impl TeacherApi for FakeGateway {
    async fn list_teachers(&self, _career: Option<&str>) -> NetResult<Vec<Teacher>> {
        self.record("list_teachers", None).await?;
        Ok(lock(&self.teachers).clone())
    }
}

#[async_trait]
impl AuthApi for FakeGateway {
    async fn login(&self, email: &str, password: &str) -> NetResult<UserProfile> {
        self.record("login", None).await?;
        lock(&self.accounts)
            .iter()
            .find(|(e, p, _)| e == email && p == password)
            .map(|(_, _, profile)| profile.clone())
            .ok_or(aula_net::Error::Authentication {
                status: 401,
                detail: Some("Credenciales inválidas".to_string()),
            })
    }

    async fn logout(&self) -> NetResult<()> {
        self.record("logout", None).await
    }
}

/// State over `gateway` with an in-memory database, signed in as `profile`
pub fn state_with(gateway: Arc<FakeGateway>, profile: Option<UserProfile>) -> AppState {
    let session = SessionContext::open(Database::open_in_memory().unwrap()).unwrap();
    if let Some(profile) = profile {
        session.sign_in(profile).unwrap();
    }
    AppState::with_gateway(session, gateway)
}
