//! Teacher desk view model
//!
//! Proposals awaiting a decision and the topics a teacher publishes.
//! Coordination sees every proposal and topic and may publish or delete;
//! only teachers decide.

use std::sync::Arc;

use aula_core::{
    views, Proposal, ProposalDecision, ProposalId, ProposalState, Role, Topic, TopicForm, TopicId,
    UserId,
};
use aula_net::{ProposalApi, ProposalQuery, TopicApi, TopicQuery};
use tracing::info;

use crate::error::{AppError, Result};
use crate::scope::ViewScope;
use crate::state::AppState;
use crate::store::{CollectionStore, InFlight};

pub struct DeskViewModel {
    state: AppState,
    scope: ViewScope,
    proposals: CollectionStore<Proposal>,
    topics: CollectionStore<Topic>,
    deciding: InFlight<ProposalId>,
    publishing: InFlight<()>,
    deleting: InFlight<TopicId>,
    withdrawing: InFlight<ProposalId>,
}

impl DeskViewModel {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            scope: ViewScope::new(),
            proposals: CollectionStore::new("desk_proposals"),
            topics: CollectionStore::new("desk_topics"),
            deciding: InFlight::new(),
            publishing: InFlight::new(),
            deleting: InFlight::new(),
            withdrawing: InFlight::new(),
        }
    }

    pub fn scope(&self) -> &ViewScope {
        &self.scope
    }

    pub fn proposals(&self) -> &CollectionStore<Proposal> {
        &self.proposals
    }

    pub fn topics(&self) -> &CollectionStore<Topic> {
        &self.topics
    }

    /// Signed-in teacher or coordinator
    fn staff(&self) -> Result<(Role, UserId)> {
        let profile = self.state.session.require()?;
        if profile.role == Role::Student {
            return Err(AppError::WrongRole(Role::Teacher));
        }
        let id = profile.id.ok_or(AppError::MissingUserId)?;
        Ok((profile.role, id))
    }

    fn queries(&self) -> Result<(ProposalQuery, TopicQuery)> {
        Ok(match self.staff()? {
            (Role::Teacher, id) => (ProposalQuery::for_teacher(id), TopicQuery::for_user(id)),
            _ => (ProposalQuery::all(), TopicQuery::default()),
        })
    }

    pub async fn activate(&self) -> Result<()> {
        let (proposal_query, topic_query) = self.queries()?;
        let gateway = &self.state.gateway;
        let (proposals, topics) = futures::join!(
            self.proposals
                .activate(&self.scope, || gateway.list_proposals(&proposal_query)),
            self.topics
                .activate(&self.scope, || gateway.list_topics(&topic_query)),
        );
        proposals?;
        topics?;
        Ok(())
    }

    pub async fn refresh(&self) -> Result<()> {
        let (proposal_query, topic_query) = self.queries()?;
        let gateway = &self.state.gateway;
        let (proposals, topics) = futures::join!(
            self.proposals
                .refresh(&self.scope, || gateway.list_proposals(&proposal_query)),
            self.topics
                .refresh(&self.scope, || gateway.list_topics(&topic_query)),
        );
        proposals?;
        topics?;
        Ok(())
    }

    /// Proposals still waiting on the teacher, most recent first
    pub fn pending(&self) -> Vec<Arc<Proposal>> {
        views::proposals_by_recency(&self.proposals.snapshot())
            .into_iter()
            .filter(|p| p.state.is_pending())
            .collect()
    }

    pub fn in_state(&self, state: ProposalState) -> Vec<Arc<Proposal>> {
        views::proposals_in_state(&self.proposals.snapshot(), state)
    }

    pub fn is_deciding(&self, id: ProposalId) -> bool {
        self.deciding.contains(id)
    }

    /// Record a decision and splice the server's copy into the list
    pub async fn decide(&self, id: ProposalId, decision: ProposalDecision) -> Result<Arc<Proposal>> {
        let teacher = self.state.session.require_role(Role::Teacher)?;
        let proposal = self
            .proposals
            .get(id)
            .ok_or_else(|| aula_core::Error::NotFound(format!("proposal {id}")))?;
        decision.validate(&proposal)?;

        let _guard = self.deciding.begin(id)?;
        let updated = self
            .scope
            .run(
                self.state
                    .gateway
                    .decide_proposal(id, &decision, Some(teacher)),
            )
            .await
            .ok_or(AppError::Cancelled)??;

        info!(proposal = %id, action = decision.action_tag(), "Decision recorded");
        Ok(self.proposals.upsert(updated))
    }

    pub async fn delete_proposal(&self, id: ProposalId) -> Result<()> {
        self.staff()?;
        let _guard = self.withdrawing.begin(id)?;
        self.scope
            .run(self.state.gateway.delete_proposal(id))
            .await
            .ok_or(AppError::Cancelled)??;

        self.proposals.remove(id);
        info!(proposal = %id, "Proposal deleted");
        Ok(())
    }

    pub async fn publish_topic(&self, form: &TopicForm) -> Result<Arc<Topic>> {
        let (_, author) = self.staff()?;
        let new = form.validate(Some(author))?;

        let _guard = self.publishing.begin(())?;
        let created = self
            .scope
            .run(self.state.gateway.create_topic(&new))
            .await
            .ok_or(AppError::Cancelled)??;

        info!(topic = %created.id, "Topic published");
        Ok(self.topics.upsert(created))
    }

    pub async fn delete_topic(&self, id: TopicId) -> Result<()> {
        self.staff()?;
        let _guard = self.deleting.begin(id)?;
        self.scope
            .run(self.state.gateway.delete_topic(id))
            .await
            .ok_or(AppError::Cancelled)??;

        self.topics.remove(id);
        info!(topic = %id, "Topic deleted");
        Ok(())
    }
}
