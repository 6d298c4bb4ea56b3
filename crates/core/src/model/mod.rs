mod feedback;
mod ids;
mod progress;
mod question;
mod selection;
mod session;
mod topic;

pub use ids::{CourseId, OptionId, ParseIdError, QuestionId, TopicId};

pub use feedback::{Feedback, FeedbackKind};
pub mod messages {
    pub use super::feedback::{
        ANSWER_ACCEPTED, CORRECT_ANSWER, FAILED_TO_LOAD_QUESTION, FAILED_TO_RESTART,
        FAILED_TO_SUBMIT, INCORRECT_ANSWER, NO_QUESTION_AVAILABLE, SELECT_AN_OPTION,
    };
}
pub use progress::{Progress, accuracy_percent};
pub use question::{
    AnswerOption, Question, QuestionType, ReviewedOption, ReviewedQuestion, clean_option_text,
};
pub use selection::Selection;
pub use session::{Mode, Outcome, Phase, TopicUnavailable};
pub use topic::Topic;
