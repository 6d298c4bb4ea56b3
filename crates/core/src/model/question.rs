use serde::{Deserialize, Serialize};

use crate::model::ids::{OptionId, QuestionId};

/// How many options a learner may pick for a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    SingleChoice,
    MultipleChoice,
    /// Any type this client does not know; selection behaves like multiple choice.
    #[serde(other)]
    Code,
}

impl QuestionType {
    #[must_use]
    pub fn allows_multiple(self) -> bool {
        !matches!(self, Self::SingleChoice)
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::SingleChoice => "Single choice",
            Self::MultipleChoice => "Multiple choice",
            Self::Code => "Code",
        }
    }
}

/// An option as delivered during active answering.
///
/// No correctness field; only [`ReviewedOption`] carries one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub id: OptionId,
    pub text: String,
}

/// A single quiz item. Immutable once received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    #[serde(rename = "question_type")]
    pub kind: QuestionType,
    #[serde(default)]
    pub order: Option<u32>,
    #[serde(default)]
    pub max_score: Option<u32>,
    #[serde(default)]
    pub options: Vec<AnswerOption>,
}

impl Question {
    #[must_use]
    pub fn has_option(&self, id: OptionId) -> bool {
        self.options.iter().any(|option| option.id == id)
    }
}

/// An option inside a history payload, with the correct answers marked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewedOption {
    pub id: OptionId,
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

/// A question as returned by the history endpoint after the topic is finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewedQuestion {
    pub id: QuestionId,
    pub text: String,
    #[serde(rename = "question_type")]
    pub kind: QuestionType,
    #[serde(default)]
    pub options: Vec<ReviewedOption>,
    #[serde(default)]
    pub user_option_ids: Vec<OptionId>,
    /// `None` when the learner never answered this question.
    #[serde(default)]
    pub is_correct: Option<bool>,
}

impl ReviewedQuestion {
    #[must_use]
    pub fn was_selected(&self, id: OptionId) -> bool {
        self.user_option_ids.contains(&id)
    }
}

/// Strip leading dots, ellipses and whitespace that authors paste in front of option text.
#[must_use]
pub fn clean_option_text(text: &str) -> &str {
    text.trim_start_matches(|c: char| c == '.' || c == '…' || c.is_whitespace())
        .trim_end()
}
