//! Shared error types for the services crate.

use thiserror::Error;

use practice_core::Error as ModelError;

/// Errors emitted by `PracticeApi` implementations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("not found: {detail}")]
    NotFound { detail: String },
    #[error("forbidden: {detail}")]
    Forbidden { detail: String },
    #[error("rejected: {detail}")]
    BadRequest { detail: String },
    #[error("practice api request failed with status {0}")]
    Status(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("invalid practice api url: {0}")]
    Url(#[from] url::ParseError),
    #[error("failed to decode practice api response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("practice api unavailable: {0}")]
    Unavailable(String),
}

impl ApiError {
    /// The `detail` message the server attached, if any.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::NotFound { detail } | Self::Forbidden { detail } | Self::BadRequest { detail } => {
                Some(detail.as_str())
            }
            _ => None,
        }
    }
}

/// Errors emitted by the practice session state machine.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no question is loaded")]
    NoQuestion,
    #[error("a request is already in flight")]
    Busy,
    #[error("select at least one option")]
    EmptySelection,
    #[error("the answer to this question is locked")]
    AnswerLocked,
    #[error("the practice test is not completed")]
    NotCompleted,
    #[error("there is nothing to continue to")]
    NothingToContinue,
    #[error("test history is disabled for this session")]
    HistoryDisabled,
    #[error("response belongs to a superseded request")]
    StaleResponse,
    #[error(transparent)]
    Selection(#[from] ModelError),
    #[error(transparent)]
    Api(#[from] ApiError),
}
