//! Errors raised by the practice domain model.

use thiserror::Error;

use crate::model::{OptionId, QuestionId};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("option {option} is not offered by question {question}")]
    InvalidSelection { question: QuestionId, option: OptionId },
    #[error("question {0} accepts a single option")]
    TooManyOptions(QuestionId),
}
