//! HTTP gateway to the portal's REST API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use aula_core::models::{
    Meeting, MeetingApproval, MeetingId, MeetingOutcome, MeetingRequest, MeetingRequestId,
    NewMeeting, NewMeetingRequest, NewProposal, NewTopic, Notification, NotificationId, Proposal,
    ProposalDecision, ProposalId, Teacher, Topic, TopicId, UserId, UserProfile,
};

use crate::api::{AuthApi, MeetingApi, NotificationApi, ProposalApi, TeacherApi, TopicApi};
use crate::error::{Error, Result};
use crate::protocol::{
    ApproveRequestBody, CloseMeetingBody, CompanionsBody, LoginBody, LoginWire, MeetingQuery,
    MeetingRequestWire, MeetingWire, NewMeetingBody, NewMeetingRequestBody, NewProposalBody,
    NewTopicBody, NotificationQuery, NotificationWire, ProposalDecisionBody, ProposalQuery,
    ProposalWire, RejectRequestBody, RequestQuery, ReserveBody, TeacherQuery, TeacherWire,
    TopicQuery, TopicWire,
};

/// Gateway speaking JSON over HTTP.
///
/// Every call is a single attempt; there is no retry or backoff.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    http: reqwest::Client,
    base: Url,
}

impl HttpGateway {
    /// Create a gateway rooted at `base_url`, with an optional per-request timeout
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut base =
            Url::parse(base_url).map_err(|e| Error::InvalidUrl(format!("{base_url}: {e}")))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self
            .base
            .join(path)
            .map_err(|e| Error::InvalidUrl(format!("{path}: {e}")))?;
        debug!(%method, %url, "Sending request");
        Ok(self.http.request(method, url))
    }

    /// Send and return the raw success body
    async fn execute(&self, request: RequestBuilder) -> Result<Vec<u8>> {
        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "Request failed before a response arrived");
            Error::Transport(e)
        })?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();

        if status.is_success() {
            Ok(body)
        } else {
            let err = Error::from_status(status.as_u16(), &body);
            warn!(status = status.as_u16(), error = %err, "Request rejected");
            Err(err)
        }
    }

    async fn fetch<W, T>(&self, request: RequestBuilder) -> Result<T>
    where
        W: DeserializeOwned,
        T: From<W>,
    {
        let body = self.execute(request).await?;
        let wire: W = serde_json::from_slice(&body)?;
        Ok(T::from(wire))
    }

    async fn fetch_list<W, T>(&self, request: RequestBuilder) -> Result<Vec<T>>
    where
        W: DeserializeOwned,
        T: From<W>,
    {
        let body = self.execute(request).await?;
        let wire: Vec<W> = serde_json::from_slice(&body)?;
        Ok(wire.into_iter().map(T::from).collect())
    }

    async fn get_list<W, T, Q>(&self, path: &str, query: &Q) -> Result<Vec<T>>
    where
        W: DeserializeOwned,
        T: From<W>,
        Q: Serialize + ?Sized,
    {
        let request = self.request(Method::GET, path)?.query(query);
        self.fetch_list::<W, T>(request).await
    }

    async fn post<W, T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        W: DeserializeOwned,
        T: From<W>,
        B: Serialize + ?Sized,
    {
        let request = self.request(Method::POST, path)?.json(body);
        self.fetch::<W, T>(request).await
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let request = self.request(Method::DELETE, path)?;
        self.execute(request).await?;
        Ok(())
    }
}

#[async_trait]
impl TopicApi for HttpGateway {
    #[instrument(skip(self))]
    async fn list_topics(&self, query: &TopicQuery) -> Result<Vec<Topic>> {
        self.get_list::<TopicWire, _, _>("temas/", query).await
    }

    #[instrument(skip(self, topic), fields(title = %topic.title))]
    async fn create_topic(&self, topic: &NewTopic) -> Result<Topic> {
        self.post::<TopicWire, _, _>("temas/", &NewTopicBody::from(topic))
            .await
    }

    #[instrument(skip(self))]
    async fn reserve_topic(&self, topic: TopicId, student: UserId) -> Result<Topic> {
        self.post::<TopicWire, _, _>(
            &format!("temas/{topic}/reservas/"),
            &ReserveBody { alumno: student },
        )
        .await
    }

    #[instrument(skip(self, emails), fields(count = emails.len()))]
    async fn assign_companions(
        &self,
        topic: TopicId,
        student: UserId,
        emails: &[String],
    ) -> Result<Topic> {
        self.post::<TopicWire, _, _>(
            &format!("temas/{topic}/companeros/"),
            &CompanionsBody {
                alumno: student,
                correos: emails,
            },
        )
        .await
    }

    #[instrument(skip(self))]
    async fn delete_topic(&self, topic: TopicId) -> Result<()> {
        self.delete(&format!("temas/{topic}/")).await
    }
}

#[async_trait]
impl ProposalApi for HttpGateway {
    #[instrument(skip(self, proposal), fields(title = %proposal.title))]
    async fn create_proposal(&self, proposal: &NewProposal) -> Result<Proposal> {
        self.post::<ProposalWire, _, _>("propuestas/", &NewProposalBody::from(proposal))
            .await
    }

    #[instrument(skip(self))]
    async fn list_proposals(&self, query: &ProposalQuery) -> Result<Vec<Proposal>> {
        self.get_list::<ProposalWire, _, _>("propuestas/", query)
            .await
    }

    #[instrument(skip(self, decision), fields(action = decision.action_tag()))]
    async fn decide_proposal(
        &self,
        proposal: ProposalId,
        decision: &ProposalDecision,
        teacher: Option<UserId>,
    ) -> Result<Proposal> {
        let request = self
            .request(Method::PATCH, &format!("propuestas/{proposal}/"))?
            .json(&ProposalDecisionBody::new(decision, teacher));
        self.fetch::<ProposalWire, _>(request).await
    }

    #[instrument(skip(self))]
    async fn delete_proposal(&self, proposal: ProposalId) -> Result<()> {
        self.delete(&format!("propuestas/{proposal}/")).await
    }
}

#[async_trait]
impl MeetingApi for HttpGateway {
    #[instrument(skip(self))]
    async fn list_requests(&self, query: &RequestQuery) -> Result<Vec<MeetingRequest>> {
        self.get_list::<MeetingRequestWire, _, _>("reuniones/solicitudes/", query)
            .await
    }

    #[instrument(skip(self, request), fields(student = %request.student_id))]
    async fn create_request(&self, request: &NewMeetingRequest) -> Result<MeetingRequest> {
        self.post::<MeetingRequestWire, _, _>(
            "reuniones/solicitudes/",
            &NewMeetingRequestBody::from(request),
        )
        .await
    }

    #[instrument(skip(self, approval))]
    async fn approve_request(
        &self,
        request: MeetingRequestId,
        approval: &MeetingApproval,
    ) -> Result<Meeting> {
        self.post::<MeetingWire, _, _>(
            &format!("reuniones/solicitudes/{request}/aprobar/"),
            &ApproveRequestBody::from(approval),
        )
        .await
    }

    #[instrument(skip(self, comment))]
    async fn reject_request(
        &self,
        request: MeetingRequestId,
        teacher: UserId,
        comment: Option<&str>,
    ) -> Result<MeetingRequest> {
        self.post::<MeetingRequestWire, _, _>(
            &format!("reuniones/solicitudes/{request}/rechazar/"),
            &RejectRequestBody {
                docente: teacher,
                comentario: comment,
            },
        )
        .await
    }

    #[instrument(skip(self))]
    async fn list_meetings(&self, query: &MeetingQuery) -> Result<Vec<Meeting>> {
        self.get_list::<MeetingWire, _, _>("reuniones/", query).await
    }

    #[instrument(skip(self, meeting), fields(student = %meeting.student_id))]
    async fn schedule_meeting(&self, meeting: &NewMeeting) -> Result<Meeting> {
        self.post::<MeetingWire, _, _>("reuniones/", &NewMeetingBody::from(meeting))
            .await
    }

    #[instrument(skip(self, comment))]
    async fn close_meeting(
        &self,
        meeting: MeetingId,
        teacher: UserId,
        outcome: MeetingOutcome,
        comment: Option<&str>,
    ) -> Result<Meeting> {
        self.post::<MeetingWire, _, _>(
            &format!("reuniones/{meeting}/cerrar/"),
            &CloseMeetingBody::new(teacher, outcome, comment),
        )
        .await
    }
}

#[async_trait]
impl NotificationApi for HttpGateway {
    #[instrument(skip(self))]
    async fn list_notifications(
        &self,
        user: UserId,
        unread_only: bool,
    ) -> Result<Vec<Notification>> {
        self.get_list::<NotificationWire, _, _>(
            "notificaciones/",
            &NotificationQuery::new(user, unread_only),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn mark_read(&self, notification: NotificationId) -> Result<Notification> {
        self.post::<NotificationWire, _, _>(
            &format!("notificaciones/{notification}/leer/"),
            &serde_json::json!({}),
        )
        .await
    }
}

#[async_trait]
impl TeacherApi for HttpGateway {
    #[instrument(skip(self))]
    async fn list_teachers(&self, career: Option<&str>) -> Result<Vec<Teacher>> {
        self.get_list::<TeacherWire, _, _>("docentes/", &TeacherQuery { carrera: career })
            .await
    }
}

#[async_trait]
impl AuthApi for HttpGateway {
    #[instrument(skip(self, password))]
    async fn login(&self, email: &str, password: &str) -> Result<UserProfile> {
        let request = self
            .request(Method::POST, "login")?
            .json(&LoginBody { email, password });
        let body = self.execute(request).await?;
        let wire: LoginWire = serde_json::from_slice(&body)?;
        Ok(wire.into_profile(email))
    }

    #[instrument(skip(self))]
    async fn logout(&self) -> Result<()> {
        let request = self
            .request(Method::POST, "logout")?
            .json(&serde_json::json!({}));
        self.execute(request).await?;
        Ok(())
    }
}
