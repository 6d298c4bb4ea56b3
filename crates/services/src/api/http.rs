use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use practice_core::model::{OptionId, QuestionId, TopicId};

use super::payload::{AnswerPayload, HistoryPayload, NextQuestionPayload, SubmitAnswerBody, TopicPayload};
use super::PracticeApi;
use crate::config::ApiConfig;
use crate::error::ApiError;

/// `PracticeApi` over HTTP with an optional bearer token.
#[derive(Clone, Debug)]
pub struct HttpPracticeApi {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpPracticeApi {
    /// Build a client for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Url` when the base URL does not parse.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        Self::with_client(Client::new(), config)
    }

    /// # Errors
    ///
    /// Returns `ApiError::Url` when the base URL does not parse.
    pub fn with_client(client: Client, config: &ApiConfig) -> Result<Self, ApiError> {
        // `Url::join` drops the last path segment unless it ends in a slash.
        let mut base = config.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Ok(Self {
            client,
            base_url: Url::parse(&base)?,
            token: config.token.clone(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(path)?)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn read<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status();
        let url = response.url().clone();
        let body = response.bytes().await?;
        if status.is_success() {
            debug!(%url, %status, "practice api response");
            return Ok(serde_json::from_slice(&body)?);
        }
        warn!(%url, %status, "practice api request rejected");
        Err(error_for_status(status, &body))
    }
}

/// Map a non-2xx response onto `ApiError`, surfacing DRF's `detail` when present.
pub(crate) fn error_for_status(status: StatusCode, body: &[u8]) -> ApiError {
    let detail = serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("detail")?.as_str().map(str::to_string))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or_default().to_string());
    match status {
        StatusCode::NOT_FOUND => ApiError::NotFound { detail },
        StatusCode::FORBIDDEN => ApiError::Forbidden { detail },
        StatusCode::BAD_REQUEST => ApiError::BadRequest { detail },
        other => ApiError::Status(other),
    }
}

#[async_trait]
impl PracticeApi for HttpPracticeApi {
    async fn get_topic(&self, topic_id: TopicId) -> Result<TopicPayload, ApiError> {
        let url = self.endpoint(&format!("api/learning/topics/{topic_id}/"))?;
        let response = self.request(Method::GET, url).send().await?;
        Self::read(response).await
    }

    async fn get_next_question(&self, topic_id: TopicId) -> Result<NextQuestionPayload, ApiError> {
        let url = self.endpoint(&format!("api/learning/topics/{topic_id}/next-question/"))?;
        let response = self.request(Method::GET, url).send().await?;
        Self::read(response).await
    }

    async fn submit_answer(
        &self,
        question_id: QuestionId,
        selected: &[OptionId],
    ) -> Result<AnswerPayload, ApiError> {
        let url = self.endpoint(&format!("api/learning/questions/{question_id}/answer/"))?;
        let body = SubmitAnswerBody {
            selected_options: selected,
        };
        let response = self.request(Method::POST, url).json(&body).send().await?;
        Self::read(response).await
    }

    async fn get_history(&self, topic_id: TopicId) -> Result<HistoryPayload, ApiError> {
        let url = self.endpoint(&format!("api/learning/topics/{topic_id}/history/"))?;
        let response = self.request(Method::GET, url).send().await?;
        Self::read(response).await
    }

    async fn reset_topic(&self, topic_id: TopicId) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("api/learning/topics/{topic_id}/reset/"))?;
        let response = self.request(Method::POST, url).send().await?;
        let _ack: serde_json::Value = Self::read(response).await?;
        Ok(())
    }
}
