mod practice_vm;
mod time_fmt;

pub use practice_vm::{
    CompletionVm, FeedbackVm, HistoryItemVm, HistoryOptionVm, OptionVm, PracticeBody,
    PracticeIntent, PracticeVm, QuestionCardVm, STATUS_NOT_PASSED, STATUS_PASSED, STATUS_TIME_UP,
    SubmitVm, TimerVm, completion_status, question_type_label,
};
pub use time_fmt::{COUNTDOWN_PLACEHOLDER, format_countdown};
