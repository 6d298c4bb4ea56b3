use std::sync::Arc;

use tracing::debug;

use practice_core::model::{CourseId, TopicId};

use crate::api::PracticeApi;
use crate::error::SessionError;
use super::service::{PracticeRequest, PracticeResponse, PracticeSession, Reply, Ticket};

/// Runs session tickets against a `PracticeApi`.
#[derive(Clone)]
pub struct PracticeLoopService {
    api: Arc<dyn PracticeApi>,
    history_enabled: bool,
}

impl PracticeLoopService {
    #[must_use]
    pub fn new(api: Arc<dyn PracticeApi>) -> Self {
        Self {
            api,
            history_enabled: true,
        }
    }

    #[must_use]
    pub fn with_history_enabled(mut self, enabled: bool) -> Self {
        self.history_enabled = enabled;
        self
    }

    /// A fresh session for `topic_id`, configured like this service.
    #[must_use]
    pub fn new_session(&self, topic_id: TopicId, course_id: Option<CourseId>) -> PracticeSession {
        PracticeSession::new(topic_id)
            .with_course(course_id)
            .with_history_enabled(self.history_enabled)
    }

    /// Perform the call a ticket describes. Failures travel inside the reply.
    pub async fn execute(&self, ticket: Ticket) -> Reply {
        debug!(
            topic_id = %ticket.topic_id,
            generation = ticket.generation,
            seq = ticket.seq,
            "executing practice request"
        );
        let response = match &ticket.request {
            PracticeRequest::LoadTopic => {
                PracticeResponse::Topic(self.api.get_topic(ticket.topic_id).await)
            }
            PracticeRequest::NextQuestion => {
                PracticeResponse::NextQuestion(self.api.get_next_question(ticket.topic_id).await)
            }
            PracticeRequest::SubmitAnswer {
                question_id,
                selected,
            } => PracticeResponse::Answer(self.api.submit_answer(*question_id, selected).await),
            PracticeRequest::History => {
                PracticeResponse::History(self.api.get_history(ticket.topic_id).await)
            }
            PracticeRequest::Reset => {
                PracticeResponse::Reset(self.api.reset_topic(ticket.topic_id).await)
            }
        };
        Reply::to(&ticket, response)
    }

    /// Execute `ticket` and every follow-up the session asks for, one at a time.
    pub async fn drive(&self, session: &mut PracticeSession, ticket: Option<Ticket>) {
        let mut next = ticket;
        while let Some(ticket) = next {
            let reply = self.execute(ticket).await;
            next = session.apply(reply);
        }
    }

    /// Load the topic and its first question.
    pub async fn start(&self, topic_id: TopicId, course_id: Option<CourseId>) -> PracticeSession {
        let mut session = self.new_session(topic_id, course_id);
        let ticket = session.begin_load_topic();
        self.drive(&mut session, Some(ticket)).await;
        session
    }

    /// Submit the current selection and apply the grading.
    ///
    /// # Errors
    ///
    /// Returns the `SessionError` raised by [`PracticeSession::begin_submit`].
    pub async fn submit(&self, session: &mut PracticeSession) -> Result<(), SessionError> {
        let ticket = session.begin_submit()?;
        self.drive(session, ticket).await;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns the `SessionError` raised by [`PracticeSession::continue_session`].
    pub async fn continue_session(&self, session: &mut PracticeSession) -> Result<(), SessionError> {
        let ticket = session.continue_session()?;
        self.drive(session, ticket).await;
        Ok(())
    }

    /// Reset the finished topic and load the first question again.
    ///
    /// # Errors
    ///
    /// Returns the `SessionError` raised by [`PracticeSession::begin_reset`].
    pub async fn retry(&self, session: &mut PracticeSession) -> Result<(), SessionError> {
        let ticket = session.begin_reset()?;
        self.drive(session, Some(ticket)).await;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns the `SessionError` raised by [`PracticeSession::begin_history`].
    pub async fn view_history(&self, session: &mut PracticeSession) -> Result<(), SessionError> {
        let ticket = session.begin_history()?;
        self.drive(session, Some(ticket)).await;
        Ok(())
    }

    /// Deliver one timer tick and run the expiry fetch it may trigger.
    pub async fn tick(&self, session: &mut PracticeSession, generation: u64) {
        let ticket = session.tick(generation);
        self.drive(session, ticket).await;
    }
}
