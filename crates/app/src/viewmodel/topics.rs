//! Student topics view model
//!
//! Topic catalogue, slot reservations, companions and the student's own
//! proposals. The teacher directory is loaded alongside so the proposal
//! form can offer preferences.

use std::sync::Arc;

use aula_core::validation::companion_emails;
use aula_core::{
    views, Proposal, ProposalForm, Role, Teacher, Topic, TopicAvailability, TopicId,
};
use aula_net::{ProposalApi, ProposalQuery, TeacherApi, TopicApi, TopicQuery};
use tracing::{info, warn};

use crate::error::{AppError, Result};
use crate::scope::ViewScope;
use crate::state::AppState;
use crate::store::{CollectionStore, InFlight};

pub struct TopicsViewModel {
    state: AppState,
    scope: ViewScope,
    topics: CollectionStore<Topic>,
    proposals: CollectionStore<Proposal>,
    teachers: CollectionStore<Teacher>,
    reserving: InFlight<TopicId>,
    assigning: InFlight<TopicId>,
    submitting: InFlight<()>,
}

impl TopicsViewModel {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            scope: ViewScope::new(),
            topics: CollectionStore::new("topics"),
            proposals: CollectionStore::new("proposals"),
            teachers: CollectionStore::new("teachers"),
            reserving: InFlight::new(),
            assigning: InFlight::new(),
            submitting: InFlight::new(),
        }
    }

    pub fn scope(&self) -> &ViewScope {
        &self.scope
    }

    pub fn topics(&self) -> &CollectionStore<Topic> {
        &self.topics
    }

    pub fn proposals(&self) -> &CollectionStore<Proposal> {
        &self.proposals
    }

    pub fn teachers(&self) -> &CollectionStore<Teacher> {
        &self.teachers
    }

    /// Load topics, proposals and teachers concurrently
    pub async fn activate(&self) -> Result<()> {
        let student = self.state.session.require_role(Role::Student)?;
        let gateway = &self.state.gateway;
        let topic_query = TopicQuery::for_student(student);
        let proposal_query = ProposalQuery::for_student(student);

        let (topics, proposals, teachers) = futures::join!(
            self.topics
                .activate(&self.scope, || gateway.list_topics(&topic_query)),
            self.proposals
                .activate(&self.scope, || gateway.list_proposals(&proposal_query)),
            self.teachers
                .activate(&self.scope, || gateway.list_teachers(None)),
        );
        topics?;
        proposals?;
        teachers?;
        Ok(())
    }

    pub async fn refresh_topics(&self) -> Result<()> {
        let student = self.state.session.require_role(Role::Student)?;
        let query = TopicQuery::for_student(student);
        self.topics
            .refresh(&self.scope, || self.state.gateway.list_topics(&query))
            .await?;
        Ok(())
    }

    pub async fn refresh_proposals(&self) -> Result<()> {
        let student = self.state.session.require_role(Role::Student)?;
        let query = ProposalQuery::for_student(student);
        self.proposals
            .refresh(&self.scope, || self.state.gateway.list_proposals(&query))
            .await?;
        Ok(())
    }

    /// Topics offered to the student's career
    pub fn visible_topics(&self) -> Vec<Arc<Topic>> {
        let career = self.state.session.current().and_then(|p| p.career);
        views::topics_for_career(&self.topics.snapshot(), career.as_deref())
    }

    pub fn availability(&self, topic: &Topic) -> Result<TopicAvailability> {
        let student = self.state.session.require_role(Role::Student)?;
        let reserving = self
            .topics
            .snapshot()
            .iter()
            .map(|t| t.id)
            .find(|id| self.reserving.contains(*id));
        Ok(topic.availability(student, reserving))
    }

    pub fn featured_proposal(&self) -> Option<Arc<Proposal>> {
        views::featured_proposal(&self.proposals.snapshot())
    }

    pub fn proposal_history(&self) -> Vec<Arc<Proposal>> {
        views::proposal_history(&self.proposals.snapshot())
    }

    /// Teachers offered for `branch`
    pub fn teacher_choices(&self, branch: &str) -> Vec<Arc<Teacher>> {
        views::teachers_for_branch(&self.teachers.snapshot(), branch)
    }

    /// Preference pickers stay disabled until there is someone to pick
    pub fn preference_pickers_enabled(&self) -> bool {
        !self.teachers.is_loading() && !self.teachers.is_empty()
    }

    /// Companion emails already attached to the student's reservation
    pub fn current_companions(&self, topic: TopicId) -> Vec<String> {
        let own = self.state.session.current().map(|p| p.email);
        self.topics
            .get(topic)
            .map(|t| t.companion_emails(own.as_deref()))
            .unwrap_or_default()
    }

    /// Take one slot of `topic_id`
    pub async fn reserve(&self, topic_id: TopicId) -> Result<Arc<Topic>> {
        let student = self.state.session.require_role(Role::Student)?;
        if let Some(topic) = self.topics.get(topic_id) {
            if topic.is_reserved_by(student) {
                return Err(aula_core::Error::InvalidOperation(
                    "You already hold a slot on this topic".to_string(),
                )
                .into());
            }
            if !topic.can_request(student) {
                return Err(aula_core::Error::InvalidOperation(
                    "This topic has no slots left".to_string(),
                )
                .into());
            }
        }

        let _guard = self.reserving.begin(topic_id)?;
        let updated = self
            .scope
            .run(self.state.gateway.reserve_topic(topic_id, student))
            .await
            .ok_or(AppError::Cancelled)??;

        info!(topic = %topic_id, available = updated.available_slots, "Slot reserved");
        Ok(self.topics.upsert(updated))
    }

    /// Replace the companions on the student's reservation.
    ///
    /// `raw` is the full list as typed, one address per entry.
    pub async fn assign_companions(&self, topic_id: TopicId, raw: &[String]) -> Result<Arc<Topic>> {
        let profile = self.state.session.require()?;
        let student = self.state.session.require_role(Role::Student)?;
        let topic = self.topics.get(topic_id).ok_or_else(|| {
            aula_core::Error::NotFound(format!("topic {topic_id}"))
        })?;
        if !topic.can_manage_companions(student) {
            return Err(aula_core::Error::InvalidOperation(
                "Companions can only be added to a shared topic you hold a slot on".to_string(),
            )
            .into());
        }
        let emails = companion_emails(raw, Some(&profile.email), topic.max_companions())?;

        let _guard = self.assigning.begin(topic_id)?;
        let updated = self
            .scope
            .run(self.state.gateway.assign_companions(topic_id, student, &emails))
            .await
            .ok_or(AppError::Cancelled)??;

        info!(topic = %topic_id, companions = emails.len(), "Companions assigned");
        Ok(self.topics.upsert(updated))
    }

    /// Submit a proposal; exactly one create call, then a list refresh
    pub async fn submit_proposal(&self, form: &ProposalForm) -> Result<Arc<Proposal>> {
        let student = self.state.session.require_role(Role::Student)?;
        let new = form.validate(Some(student))?;

        let _guard = self.submitting.begin(())?;
        let created = self
            .scope
            .run(self.state.gateway.create_proposal(&new))
            .await
            .ok_or(AppError::Cancelled)??;
        let created = self.proposals.upsert(created);
        info!(proposal = %created.id, "Proposal submitted");

        if let Err(e) = self.refresh_proposals().await {
            warn!(error = %e, "Proposal list refresh failed after submit");
        }
        Ok(created)
    }

    pub fn is_submitting(&self) -> bool {
        !self.submitting.is_idle()
    }
}
