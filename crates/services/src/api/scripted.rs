use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use practice_core::model::{OptionId, QuestionId, TopicId};

use super::payload::{AnswerPayload, HistoryPayload, NextQuestionPayload, TopicPayload};
use super::PracticeApi;
use crate::error::ApiError;

/// One call received by [`ScriptedPracticeApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    GetTopic(TopicId),
    GetNextQuestion(TopicId),
    SubmitAnswer {
        question_id: QuestionId,
        selected: Vec<OptionId>,
    },
    GetHistory(TopicId),
    ResetTopic(TopicId),
}

#[derive(Default)]
struct Script {
    topics: VecDeque<Result<TopicPayload, ApiError>>,
    next_questions: VecDeque<Result<NextQuestionPayload, ApiError>>,
    answers: VecDeque<Result<AnswerPayload, ApiError>>,
    histories: VecDeque<Result<HistoryPayload, ApiError>>,
    resets: VecDeque<Result<(), ApiError>>,
    calls: Vec<RecordedCall>,
}

/// In-memory `PracticeApi` replaying queued responses in order.
///
/// Every call is recorded. A call with nothing queued fails with
/// `ApiError::Unavailable`, which the session treats like a network error.
#[derive(Clone, Default)]
pub struct ScriptedPracticeApi {
    script: Arc<Mutex<Script>>,
}

impl ScriptedPracticeApi {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Script>, ApiError> {
        self.script
            .lock()
            .map_err(|_| ApiError::Unavailable("practice script lock poisoned".into()))
    }

    fn with_script(&self, f: impl FnOnce(&mut Script)) {
        if let Ok(mut script) = self.lock() {
            f(&mut script);
        }
    }

    pub fn push_topic(&self, response: Result<TopicPayload, ApiError>) -> &Self {
        self.with_script(|script| script.topics.push_back(response));
        self
    }

    pub fn push_next_question(&self, response: Result<NextQuestionPayload, ApiError>) -> &Self {
        self.with_script(|script| script.next_questions.push_back(response));
        self
    }

    pub fn push_answer(&self, response: Result<AnswerPayload, ApiError>) -> &Self {
        self.with_script(|script| script.answers.push_back(response));
        self
    }

    pub fn push_history(&self, response: Result<HistoryPayload, ApiError>) -> &Self {
        self.with_script(|script| script.histories.push_back(response));
        self
    }

    pub fn push_reset(&self, response: Result<(), ApiError>) -> &Self {
        self.with_script(|script| script.resets.push_back(response));
        self
    }

    /// Calls received so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock()
            .map(|script| script.calls.clone())
            .unwrap_or_default()
    }

    /// Queued responses not consumed yet.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.lock()
            .map(|script| {
                script.topics.len()
                    + script.next_questions.len()
                    + script.answers.len()
                    + script.histories.len()
                    + script.resets.len()
            })
            .unwrap_or_default()
    }
}

fn next<T>(queue: &mut VecDeque<Result<T, ApiError>>, operation: &str) -> Result<T, ApiError> {
    queue
        .pop_front()
        .unwrap_or_else(|| Err(ApiError::Unavailable(format!("no scripted response for {operation}"))))
}

#[async_trait]
impl PracticeApi for ScriptedPracticeApi {
    async fn get_topic(&self, topic_id: TopicId) -> Result<TopicPayload, ApiError> {
        let mut script = self.lock()?;
        script.calls.push(RecordedCall::GetTopic(topic_id));
        next(&mut script.topics, "get_topic")
    }

    async fn get_next_question(&self, topic_id: TopicId) -> Result<NextQuestionPayload, ApiError> {
        let mut script = self.lock()?;
        script.calls.push(RecordedCall::GetNextQuestion(topic_id));
        next(&mut script.next_questions, "get_next_question")
    }

    async fn submit_answer(
        &self,
        question_id: QuestionId,
        selected: &[OptionId],
    ) -> Result<AnswerPayload, ApiError> {
        let mut script = self.lock()?;
        script.calls.push(RecordedCall::SubmitAnswer {
            question_id,
            selected: selected.to_vec(),
        });
        next(&mut script.answers, "submit_answer")
    }

    async fn get_history(&self, topic_id: TopicId) -> Result<HistoryPayload, ApiError> {
        let mut script = self.lock()?;
        script.calls.push(RecordedCall::GetHistory(topic_id));
        next(&mut script.histories, "get_history")
    }

    async fn reset_topic(&self, topic_id: TopicId) -> Result<(), ApiError> {
        let mut script = self.lock()?;
        script.calls.push(RecordedCall::ResetTopic(topic_id));
        next(&mut script.resets, "reset_topic")
    }
}
