use serde::{Deserialize, Serialize};

use practice_core::model::{OptionId, Progress, Question, ReviewedQuestion, Topic};

/// Topic detail including the learner's aggregate progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicPayload {
    #[serde(flatten)]
    pub topic: Topic,
    #[serde(default)]
    pub total_questions: u32,
    #[serde(default)]
    pub answered_questions: u32,
    #[serde(default)]
    pub correct_answers: Option<u32>,
    #[serde(default)]
    pub progress_percent: i32,
}

impl TopicPayload {
    #[must_use]
    pub fn progress(&self) -> Progress {
        Progress {
            answered: self.answered_questions,
            correct: self.correct_answers.unwrap_or(self.answered_questions),
            total: self.total_questions,
            percent: self.progress_percent,
        }
    }
}

/// A previously stored answer replayed when resuming an untimed topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastAnswerPayload {
    pub is_correct: bool,
    #[serde(default)]
    pub selected_option_ids: Vec<OptionId>,
    #[serde(default)]
    pub score: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextQuestionPayload {
    #[serde(default)]
    pub question: Option<Question>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub timed_out: bool,
    #[serde(default)]
    pub passed: Option<bool>,
    #[serde(default)]
    pub is_timed: bool,
    #[serde(default)]
    pub time_limit_seconds: Option<u32>,
    #[serde(default)]
    pub remaining_seconds: Option<u32>,
    #[serde(default)]
    pub last_answer: Option<LastAnswerPayload>,
    #[serde(default)]
    pub answered_questions: u32,
    #[serde(default)]
    pub total_questions: u32,
    #[serde(default)]
    pub correct_answers: Option<u32>,
    #[serde(default)]
    pub progress_percent: i32,
    #[serde(default)]
    pub score_percent: Option<i32>,
}

impl NextQuestionPayload {
    #[must_use]
    pub fn progress(&self) -> Progress {
        Progress {
            answered: self.answered_questions,
            correct: self.correct_answers.unwrap_or(self.answered_questions),
            total: self.total_questions,
            percent: self.progress_percent,
        }
    }

    /// The run is over, either finished or out of time.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.completed || self.timed_out
    }
}

/// Grading result of a submitted answer. Timed runs still send `is_correct`,
/// but it is never shown before the results screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerPayload {
    #[serde(default)]
    pub is_correct: Option<bool>,
    #[serde(default)]
    pub score: Option<u32>,
    #[serde(default)]
    pub test_completed: bool,
    #[serde(default)]
    pub timed_out: bool,
    #[serde(default)]
    pub passed: Option<bool>,
    #[serde(default)]
    pub answered_questions: Option<u32>,
    #[serde(default)]
    pub total_questions: Option<u32>,
    #[serde(default)]
    pub topic_progress_percent: Option<i32>,
    #[serde(default)]
    pub score_percent: Option<i32>,
    #[serde(default)]
    pub correct_answers: Option<u32>,
    #[serde(default)]
    pub remaining_seconds: Option<u32>,
    #[serde(default)]
    pub time_limit_seconds: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryPayload {
    #[serde(default)]
    pub topic_title: String,
    #[serde(default)]
    pub questions: Vec<ReviewedQuestion>,
}

/// Request body of the answer endpoint.
#[derive(Debug, Serialize)]
pub struct SubmitAnswerBody<'a> {
    pub selected_options: &'a [OptionId],
}

#[cfg(test)]
mod tests {
    use super::*;
    use practice_core::model::{QuestionType, TopicId};

    #[test]
    fn topic_payload_reads_backend_detail() {
        let json = r#"{
            "id": 7,
            "title": "Borrowing",
            "content": "ignored",
            "course_id": 3,
            "course_title": "Rust",
            "module_id": 4,
            "module_title": "Memory",
            "status": "in_progress",
            "is_timed_test": true,
            "time_limit_seconds": 90,
            "total_questions": 4,
            "answered_questions": 1,
            "progress_percent": 25
        }"#;
        let payload: TopicPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.topic.id, TopicId::new(7));
        assert_eq!(payload.topic.time_limit(), Some(90));
        assert_eq!(payload.progress().correct, 1);
        assert_eq!(payload.progress().total, 4);
    }

    #[test]
    fn next_question_payload_tolerates_nulls() {
        let json = r#"{
            "completed": false,
            "is_timed": false,
            "timed_out": false,
            "passed": null,
            "total_questions": 2,
            "answered_questions": 0,
            "correct_answers": 0,
            "progress_percent": 0,
            "score_percent": 0,
            "time_limit_seconds": null,
            "remaining_seconds": null,
            "question": {
                "id": 11,
                "text": "Which are Copy?",
                "order": 1,
                "question_type": "multiple_choice",
                "max_score": 1,
                "options": [{"id": 1, "text": "u8"}, {"id": 2, "text": "String"}]
            },
            "last_answer": {"is_correct": false, "selected_option_ids": [2], "score": 0}
        }"#;
        let payload: NextQuestionPayload = serde_json::from_str(json).unwrap();
        let question = payload.question.as_ref().unwrap();
        assert_eq!(question.kind, QuestionType::MultipleChoice);
        assert_eq!(payload.passed, None);
        assert!(!payload.is_finished());
        assert_eq!(
            payload.last_answer.unwrap().selected_option_ids,
            vec![OptionId::new(2)]
        );
    }

    #[test]
    fn submit_body_serializes_plain_ids() {
        let ids = [OptionId::new(3), OptionId::new(5)];
        let body = serde_json::to_value(SubmitAnswerBody {
            selected_options: &ids,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"selected_options": [3, 5]}));
    }
}
