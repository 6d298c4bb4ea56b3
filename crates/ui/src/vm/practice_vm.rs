use practice_core::countdown::Tone;
use practice_core::model::{
    Feedback, FeedbackKind, Mode, OptionId, Outcome, Phase, Progress, QuestionType,
    ReviewedQuestion, accuracy_percent, clean_option_text,
};
use services::PracticeSession;
use services::sessions::RequestKind;

use crate::vm::time_fmt::format_countdown;

/// Everything the learner can ask the practice page to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PracticeIntent {
    Toggle(OptionId),
    Submit,
    Reload,
    Continue,
    FetchNext,
    Retry,
    ViewHistory,
    BackToResults,
}

pub const STATUS_TIME_UP: &str = "Test failed (time up)";
pub const STATUS_PASSED: &str = "Test passed";
pub const STATUS_NOT_PASSED: &str = "Test not passed";

const DESCRIPTION_TIME_UP: &str = "Time is up. Answers saved before the limit were counted.";
const DESCRIPTION_TIMED: &str = "Answer every question correctly within the time limit to pass.";
const DESCRIPTION_UNTIMED: &str = "You have answered all questions in this topic.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedbackVm {
    pub class: &'static str,
    pub message: String,
}

impl FeedbackVm {
    fn from_feedback(feedback: &Feedback, mode: Mode) -> Self {
        // Timed runs never reveal correctness before the end.
        let class = match (mode, feedback.kind) {
            (_, FeedbackKind::Error) => "topic-practice__feedback--error",
            (Mode::Timed, _) | (_, FeedbackKind::Neutral) => "topic-practice__feedback--neutral",
            (Mode::Untimed, FeedbackKind::Success) => "topic-practice__feedback--success",
            (Mode::Untimed, FeedbackKind::Fail) => "topic-practice__feedback--fail",
        };
        Self {
            class,
            message: feedback.message.clone(),
        }
    }

    fn verdict(is_correct: bool) -> Self {
        let (class, message) = if is_correct {
            ("topic-practice__feedback--success", "Correct answer!")
        } else {
            ("topic-practice__feedback--fail", "Incorrect answer.")
        };
        Self {
            class,
            message: message.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionVm {
    pub id: OptionId,
    pub text: String,
    pub selected: bool,
}

impl OptionVm {
    #[must_use]
    pub fn indicator(&self) -> &'static str {
        if self.selected { "●" } else { "○" }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitVm {
    pub label: &'static str,
    pub disabled: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionCardVm {
    pub type_label: &'static str,
    pub text: String,
    pub options: Vec<OptionVm>,
    pub options_disabled: bool,
    pub feedback: Option<FeedbackVm>,
    pub fetch_error: Option<String>,
    pub submit: Option<SubmitVm>,
    pub show_next: bool,
    pub show_finish: bool,
    pub continue_disabled: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimerVm {
    pub label: String,
    pub tone_class: &'static str,
}

impl TimerVm {
    fn from_session(session: &PracticeSession) -> Option<Self> {
        if !session.mode().is_timed() {
            return None;
        }
        let countdown = session.countdown()?;
        let timed_out = session.outcome().is_some_and(|outcome| outcome.timed_out);
        let seconds = if timed_out {
            Some(0)
        } else if session.phase() == Phase::Answering {
            countdown.remaining().or(countdown.limit())
        } else {
            return None;
        };
        let tone_class = match session.timer_tone().unwrap_or(Tone::Safe) {
            Tone::Safe => "practice-timer--safe",
            Tone::Warning => "practice-timer--warning",
            Tone::Danger => "practice-timer--danger",
        };
        Some(Self {
            label: format_countdown(seconds),
            tone_class,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionVm {
    pub title: String,
    pub description: &'static str,
    pub correct_label: String,
    pub answered_label: String,
    pub accuracy_label: String,
    pub history_available: bool,
    pub history_open: bool,
    pub history_loading: bool,
    pub history_error: Option<String>,
    pub error: Option<String>,
    pub retry_disabled: bool,
}

impl CompletionVm {
    fn from_session(session: &PracticeSession, outcome: Outcome) -> Self {
        let topic_title = session.topic().map_or("", |topic| topic.title.as_str());
        let Progress {
            answered,
            correct,
            total,
            ..
        } = session.progress();
        let accuracy = accuracy_percent(session.score_percent(), correct, total);
        let status = completion_status(outcome);
        let description = if outcome.timed_out {
            DESCRIPTION_TIME_UP
        } else if session.mode().is_timed() {
            DESCRIPTION_TIMED
        } else {
            DESCRIPTION_UNTIMED
        };
        Self {
            title: if topic_title.is_empty() {
                status.to_string()
            } else {
                format!("{topic_title} – {status}")
            },
            description,
            correct_label: format!("{correct}/{total}"),
            answered_label: format!("{answered}/{total}"),
            accuracy_label: format!("{accuracy}%"),
            history_available: session.history_enabled(),
            history_open: session.phase() == Phase::ReviewingHistory,
            history_loading: session.pending_request() == Some(RequestKind::History),
            history_error: session.history_error().map(str::to_string),
            error: session
                .feedback()
                .filter(|feedback| feedback.is(FeedbackKind::Error))
                .map(|feedback| feedback.message.clone()),
            retry_disabled: session.is_busy(),
        }
    }

    #[must_use]
    pub fn history_label(&self) -> &'static str {
        if self.history_open {
            "History opened"
        } else {
            "View test history"
        }
    }
}

#[must_use]
pub fn completion_status(outcome: Outcome) -> &'static str {
    if outcome.timed_out {
        STATUS_TIME_UP
    } else if outcome.passed {
        STATUS_PASSED
    } else {
        STATUS_NOT_PASSED
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryOptionVm {
    pub text: String,
    pub indicator: &'static str,
    pub class: &'static str,
    pub is_correct: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryItemVm {
    pub type_label: &'static str,
    pub text: String,
    pub options: Vec<HistoryOptionVm>,
    pub verdict: Option<FeedbackVm>,
}

impl HistoryItemVm {
    fn from_reviewed(question: &ReviewedQuestion) -> Self {
        let options = question
            .options
            .iter()
            .map(|option| {
                let selected = question.was_selected(option.id);
                let class = if option.is_correct {
                    "topic-practice__option-button--success"
                } else if selected {
                    "topic-practice__option-button--selected-history"
                } else {
                    ""
                };
                HistoryOptionVm {
                    text: clean_option_text(&option.text).to_string(),
                    indicator: if selected { "●" } else { "○" },
                    class,
                    is_correct: option.is_correct,
                }
            })
            .collect();
        Self {
            type_label: question_type_label(question.kind),
            text: question.text.clone(),
            options,
            verdict: question.is_correct.map(FeedbackVm::verdict),
        }
    }
}

#[must_use]
pub fn question_type_label(kind: QuestionType) -> &'static str {
    kind.label()
}

/// What the page body shows for the current phase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PracticeBody {
    Loading,
    Unavailable(&'static str),
    Empty,
    /// Answering without a question, after a failed or empty fetch.
    Stalled { feedback: Option<FeedbackVm>, retry_disabled: bool },
    Question(QuestionCardVm),
    Completed(CompletionVm),
    History {
        completion: CompletionVm,
        items: Vec<HistoryItemVm>,
    },
}

/// Render-ready snapshot of a practice session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PracticeVm {
    pub title: String,
    pub breadcrumb: String,
    pub progress_label: Option<String>,
    pub progress_percent: u8,
    pub timer: Option<TimerVm>,
    pub body: PracticeBody,
}

impl PracticeVm {
    #[must_use]
    pub fn from_session(session: &PracticeSession) -> Self {
        let (title, breadcrumb) = session.topic().map_or_else(
            || ("Practice".to_string(), String::new()),
            |topic| (topic.title.clone(), topic.breadcrumb()),
        );
        let progress = session.progress();
        let progress_label = (progress.total > 0).then(|| {
            format!(
                "Progress: {}/{} ({}%)",
                progress.answered,
                progress.total,
                progress.bar_percent()
            )
        });
        Self {
            title,
            breadcrumb,
            progress_label,
            progress_percent: progress.bar_percent(),
            timer: TimerVm::from_session(session),
            body: body_for(session),
        }
    }
}

fn body_for(session: &PracticeSession) -> PracticeBody {
    match session.phase() {
        Phase::LoadingTopic => PracticeBody::Loading,
        Phase::Unavailable(reason) => PracticeBody::Unavailable(reason.message()),
        Phase::Empty => PracticeBody::Empty,
        Phase::Answering => match question_card(session) {
            Some(card) => PracticeBody::Question(card),
            None if session.pending_request() == Some(RequestKind::NextQuestion) => {
                PracticeBody::Loading
            }
            None => PracticeBody::Stalled {
                feedback: session
                    .feedback()
                    .map(|feedback| FeedbackVm::from_feedback(feedback, session.mode())),
                retry_disabled: session.is_busy(),
            },
        },
        Phase::Completed | Phase::ReviewingHistory => {
            let outcome = session.outcome().unwrap_or(Outcome {
                timed_out: false,
                passed: false,
                score_percent: session.score_percent(),
            });
            let completion = CompletionVm::from_session(session, outcome);
            if session.phase() == Phase::ReviewingHistory {
                PracticeBody::History {
                    completion,
                    items: session
                        .history()
                        .iter()
                        .map(HistoryItemVm::from_reviewed)
                        .collect(),
                }
            } else {
                PracticeBody::Completed(completion)
            }
        }
    }
}

fn question_card(session: &PracticeSession) -> Option<QuestionCardVm> {
    let question = session.question()?;
    let mode = session.mode();
    let busy = session.is_busy();
    let selection = session.selection();
    let options = question
        .options
        .iter()
        .map(|option| OptionVm {
            id: option.id,
            text: clean_option_text(&option.text).to_string(),
            selected: selection.contains(option.id),
        })
        .collect();
    let feedback = session.feedback();
    let submit_visible = match mode {
        Mode::Untimed => !feedback.is_some_and(|feedback| feedback.is(FeedbackKind::Success)),
        Mode::Timed => !session.timed_answer_saved(),
    };
    let submit = submit_visible.then(|| SubmitVm {
        label: session.submit_label(),
        disabled: !session.can_submit(),
    });
    Some(QuestionCardVm {
        type_label: question_type_label(question.kind),
        text: question.text.clone(),
        options,
        options_disabled: session.is_answer_locked() || busy,
        feedback: feedback.map(|feedback| FeedbackVm::from_feedback(feedback, mode)),
        fetch_error: session.fetch_error().map(str::to_string),
        submit,
        show_next: session.show_next() || session.show_timed_next(),
        show_finish: session.show_finish(),
        continue_disabled: busy,
    })
}
