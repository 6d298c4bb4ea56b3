//! Client side of the practice REST API.

mod http;
mod payload;
mod scripted;

use async_trait::async_trait;

use practice_core::model::{OptionId, QuestionId, TopicId};

use crate::error::ApiError;

pub use http::HttpPracticeApi;
pub use payload::{
    AnswerPayload, HistoryPayload, LastAnswerPayload, NextQuestionPayload, SubmitAnswerBody,
    TopicPayload,
};
pub use scripted::{RecordedCall, ScriptedPracticeApi};

/// Operations the practice session needs from the backend.
///
/// Every counter in a response is authoritative; callers copy it verbatim.
#[async_trait]
pub trait PracticeApi: Send + Sync {
    /// `GET /api/learning/topics/{id}/`
    async fn get_topic(&self, topic_id: TopicId) -> Result<TopicPayload, ApiError>;

    /// `GET /api/learning/topics/{id}/next-question/`
    async fn get_next_question(&self, topic_id: TopicId) -> Result<NextQuestionPayload, ApiError>;

    /// `POST /api/learning/questions/{id}/answer/`
    async fn submit_answer(
        &self,
        question_id: QuestionId,
        selected: &[OptionId],
    ) -> Result<AnswerPayload, ApiError>;

    /// `GET /api/learning/topics/{id}/history/`; rejected with 400 until the topic is finished.
    async fn get_history(&self, topic_id: TopicId) -> Result<HistoryPayload, ApiError>;

    /// `POST /api/learning/topics/{id}/reset/`
    async fn reset_topic(&self, topic_id: TopicId) -> Result<(), ApiError>;
}
