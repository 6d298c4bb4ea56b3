/// Whether the practice quiz runs against a deadline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    #[default]
    Untimed,
    Timed,
}

impl Mode {
    #[must_use]
    pub fn from_timed(is_timed: bool) -> Self {
        if is_timed { Self::Timed } else { Self::Untimed }
    }

    #[must_use]
    pub fn is_timed(self) -> bool {
        matches!(self, Self::Timed)
    }
}

/// Why a topic page cannot offer practice at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopicUnavailable {
    NotFound,
    NotEnrolled,
    LoadFailed,
}

impl TopicUnavailable {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::NotFound => "Topic not found.",
            Self::NotEnrolled => "You are not enrolled in this course.",
            Self::LoadFailed => "Failed to load the topic.",
        }
    }
}

/// Where a practice session stands.
///
/// "Awaiting next" is not a phase of its own: it is `Answering` with
/// feedback present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Phase {
    #[default]
    LoadingTopic,
    Answering,
    Completed,
    ReviewingHistory,
    /// The topic has no practice questions.
    Empty,
    /// Terminal load failure; the learner can only navigate away.
    Unavailable(TopicUnavailable),
}

impl Phase {
    /// Completed or looking at the history of a completed run.
    #[must_use]
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Completed | Self::ReviewingHistory)
    }
}

/// Result of a finished run. Only exists once the session has completed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Outcome {
    pub timed_out: bool,
    pub passed: bool,
    pub score_percent: Option<i32>,
}

impl Outcome {
    /// Resolve the pass flag: the server's answer wins, otherwise a full score passes.
    #[must_use]
    pub fn resolve(timed_out: bool, server_passed: Option<bool>, score_percent: Option<i32>) -> Self {
        let passed = match server_passed {
            Some(passed) => passed,
            None => !timed_out && score_percent.is_some_and(|score| score >= 100),
        };
        Self {
            timed_out,
            passed,
            score_percent,
        }
    }
}
