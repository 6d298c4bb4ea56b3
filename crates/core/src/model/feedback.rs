/// Closed set of feedback kinds shown under a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedbackKind {
    /// Untimed answer graded correct.
    Success,
    /// Untimed answer graded wrong.
    Fail,
    /// Timed answer stored; correctness is not revealed.
    Neutral,
    /// Local validation or network failure.
    Error,
}

pub const CORRECT_ANSWER: &str = "Correct answer!";
pub const INCORRECT_ANSWER: &str = "Incorrect answer.";
pub const ANSWER_ACCEPTED: &str = "Answer accepted!";
pub const SELECT_AN_OPTION: &str = "Please select at least one option.";
pub const FAILED_TO_SUBMIT: &str = "Failed to submit the answer. Please try again.";
pub const FAILED_TO_LOAD_QUESTION: &str = "Failed to load the next question. Please try again.";
pub const FAILED_TO_RESTART: &str = "Failed to restart the test. Please try again.";
pub const NO_QUESTION_AVAILABLE: &str = "No question is available right now.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub kind: FeedbackKind,
    pub message: String,
    pub score: Option<u32>,
    /// The answer this feedback belongs to closed out the last question.
    pub is_last_question: bool,
}

impl Feedback {
    #[must_use]
    pub fn graded(is_correct: bool, score: Option<u32>, is_last_question: bool) -> Self {
        let (kind, message) = if is_correct {
            (FeedbackKind::Success, CORRECT_ANSWER)
        } else {
            (FeedbackKind::Fail, INCORRECT_ANSWER)
        };
        Self {
            kind,
            message: message.to_string(),
            score,
            is_last_question,
        }
    }

    #[must_use]
    pub fn accepted(score: Option<u32>, is_last_question: bool) -> Self {
        Self {
            kind: FeedbackKind::Neutral,
            message: ANSWER_ACCEPTED.to_string(),
            score,
            is_last_question,
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FeedbackKind::Error,
            message: message.into(),
            score: None,
            is_last_question: false,
        }
    }

    #[must_use]
    pub fn is(&self, kind: FeedbackKind) -> bool {
        self.kind == kind
    }
}
