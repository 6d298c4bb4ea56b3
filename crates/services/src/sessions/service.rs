use tracing::{debug, info, warn};

use practice_core::countdown::{self, Countdown, Tick, Tone};
use practice_core::model::messages::{
    FAILED_TO_LOAD_QUESTION, FAILED_TO_RESTART, FAILED_TO_SUBMIT, NO_QUESTION_AVAILABLE,
    SELECT_AN_OPTION,
};
use practice_core::model::{
    CourseId, Feedback, FeedbackKind, Mode, OptionId, Outcome, Phase, Progress, Question,
    QuestionId, ReviewedQuestion, Selection, Topic, TopicId, TopicUnavailable,
};

use crate::api::{AnswerPayload, HistoryPayload, NextQuestionPayload, TopicPayload};
use crate::error::{ApiError, SessionError};

pub const TIMED_TEST_LOCK_REASON: &str =
    "A timed test is in progress. Finish it before leaving this page.";
pub const HISTORY_AFTER_FINISH: &str = "History is available only after you finish the test.";
pub const HISTORY_FAILED: &str = "Failed to load the test history.";

//
// ─── REQUESTS ──────────────────────────────────────────────────────────────────
//

/// A backend call the session wants performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PracticeRequest {
    LoadTopic,
    NextQuestion,
    SubmitAnswer {
        question_id: QuestionId,
        selected: Vec<OptionId>,
    },
    History,
    Reset,
}

/// A request tagged with the session generation and sequence it was issued under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub generation: u64,
    pub seq: u64,
    pub topic_id: TopicId,
    pub request: PracticeRequest,
}

/// Backend result for a [`PracticeRequest`].
#[derive(Debug)]
pub enum PracticeResponse {
    Topic(Result<TopicPayload, ApiError>),
    NextQuestion(Result<NextQuestionPayload, ApiError>),
    Answer(Result<AnswerPayload, ApiError>),
    History(Result<HistoryPayload, ApiError>),
    Reset(Result<(), ApiError>),
}

/// A response carrying the tags of the ticket that produced it.
#[derive(Debug)]
pub struct Reply {
    pub generation: u64,
    pub seq: u64,
    pub response: PracticeResponse,
}

impl Reply {
    #[must_use]
    pub fn to(ticket: &Ticket, response: PracticeResponse) -> Self {
        Self {
            generation: ticket.generation,
            seq: ticket.seq,
            response,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    LoadTopic,
    NextQuestion,
    SubmitAnswer,
    History,
    Reset,
}

impl PracticeRequest {
    #[must_use]
    pub fn kind(&self) -> RequestKind {
        match self {
            Self::LoadTopic => RequestKind::LoadTopic,
            Self::NextQuestion => RequestKind::NextQuestion,
            Self::SubmitAnswer { .. } => RequestKind::SubmitAnswer,
            Self::History => RequestKind::History,
            Self::Reset => RequestKind::Reset,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pending {
    seq: u64,
    kind: RequestKind,
}

/// What the navigation guard should be armed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardRequest {
    pub reason: String,
    pub allowed_paths: Vec<String>,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Client-side state of one practice attempt on a topic.
///
/// The session never talks to the network. Intents return a [`Ticket`] to
/// execute; the resulting [`Reply`] goes back through [`PracticeSession::apply`],
/// which may hand out a follow-up ticket. At most one request is in flight.
#[derive(Debug, Clone)]
pub struct PracticeSession {
    topic_id: TopicId,
    course_id: Option<CourseId>,
    history_enabled: bool,
    generation: u64,
    seq: u64,
    pending: Option<Pending>,
    topic: Option<Topic>,
    mode: Mode,
    phase: Phase,
    question: Option<Question>,
    selection: Selection,
    feedback: Option<Feedback>,
    fetch_error: Option<String>,
    progress: Progress,
    countdown: Option<Countdown>,
    outcome: Option<Outcome>,
    score_percent: Option<i32>,
    server_passed: Option<bool>,
    timed_answer_saved: bool,
    expiry_deferred: bool,
    history: Vec<ReviewedQuestion>,
    history_error: Option<String>,
}

impl PracticeSession {
    #[must_use]
    pub fn new(topic_id: TopicId) -> Self {
        Self {
            topic_id,
            course_id: None,
            history_enabled: true,
            generation: 0,
            seq: 0,
            pending: None,
            topic: None,
            mode: Mode::Untimed,
            phase: Phase::LoadingTopic,
            question: None,
            selection: Selection::new(),
            feedback: None,
            fetch_error: None,
            progress: Progress::default(),
            countdown: None,
            outcome: None,
            score_percent: None,
            server_passed: None,
            timed_answer_saved: false,
            expiry_deferred: false,
            history: Vec::new(),
            history_error: None,
        }
    }

    #[must_use]
    pub fn with_course(mut self, course_id: Option<CourseId>) -> Self {
        self.course_id = course_id;
        self
    }

    /// Turn history review off; the simple practice page runs this way.
    #[must_use]
    pub fn with_history_enabled(mut self, enabled: bool) -> Self {
        self.history_enabled = enabled;
        self
    }

    // ─── snapshot ──────────────────────────────────────────────────────────

    #[must_use]
    pub fn topic_id(&self) -> TopicId {
        self.topic_id
    }

    /// Course from the route, else the one reported with the topic.
    #[must_use]
    pub fn course_id(&self) -> Option<CourseId> {
        self.course_id
            .or_else(|| self.topic.as_ref().and_then(|topic| topic.course_id))
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn topic(&self) -> Option<&Topic> {
        self.topic.as_ref()
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn question(&self) -> Option<&Question> {
        self.question.as_ref()
    }

    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    #[must_use]
    pub fn feedback(&self) -> Option<&Feedback> {
        self.feedback.as_ref()
    }

    /// A failed move to the next question, kept apart from the answer's feedback.
    #[must_use]
    pub fn fetch_error(&self) -> Option<&str> {
        self.fetch_error.as_deref()
    }

    #[must_use]
    pub fn progress(&self) -> Progress {
        self.progress
    }

    #[must_use]
    pub fn countdown(&self) -> Option<&Countdown> {
        self.countdown.as_ref()
    }

    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    #[must_use]
    pub fn score_percent(&self) -> Option<i32> {
        self.score_percent
    }

    #[must_use]
    pub fn timed_answer_saved(&self) -> bool {
        self.timed_answer_saved
    }

    #[must_use]
    pub fn history(&self) -> &[ReviewedQuestion] {
        &self.history
    }

    #[must_use]
    pub fn history_error(&self) -> Option<&str> {
        self.history_error.as_deref()
    }

    #[must_use]
    pub fn history_enabled(&self) -> bool {
        self.history_enabled
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    #[must_use]
    pub fn pending_request(&self) -> Option<RequestKind> {
        self.pending.map(|pending| pending.kind)
    }

    /// Path the learner is confined to while the run is timed.
    #[must_use]
    pub fn practice_path(&self) -> String {
        match self.course_id() {
            Some(course_id) => format!(
                "/learning/courses/{course_id}/topics/{}/practice",
                self.topic_id
            ),
            None => format!("/learning/topics/{}/practice", self.topic_id),
        }
    }

    // ─── derived affordances ───────────────────────────────────────────────

    fn feedback_is(&self, kind: FeedbackKind) -> bool {
        self.feedback.as_ref().is_some_and(|feedback| feedback.is(kind))
    }

    /// A timed question is on screen with time left.
    #[must_use]
    pub fn is_exit_locked(&self) -> bool {
        self.mode.is_timed()
            && self.phase == Phase::Answering
            && self.question.is_some()
            && self.countdown.as_ref().is_some_and(Countdown::is_running)
    }

    /// The countdown task should be ticking.
    #[must_use]
    pub fn timer_should_run(&self) -> bool {
        self.is_exit_locked()
    }

    #[must_use]
    pub fn guard_request(&self) -> Option<GuardRequest> {
        self.is_exit_locked().then(|| GuardRequest {
            reason: TIMED_TEST_LOCK_REASON.to_string(),
            allowed_paths: vec![self.practice_path()],
        })
    }

    /// Selection is frozen by graded feedback (untimed) or a saved answer (timed).
    #[must_use]
    pub fn is_answer_locked(&self) -> bool {
        match self.mode {
            Mode::Untimed => {
                self.feedback_is(FeedbackKind::Success) || self.feedback_is(FeedbackKind::Fail)
            }
            Mode::Timed => self.timed_answer_saved,
        }
    }

    /// The last answered question closed out the quiz.
    #[must_use]
    pub fn is_last_question(&self) -> bool {
        self.feedback
            .as_ref()
            .is_some_and(|feedback| feedback.is_last_question)
            || self.progress.all_answered()
    }

    #[must_use]
    pub fn can_submit(&self) -> bool {
        if self.phase != Phase::Answering || self.question.is_none() || self.is_busy() {
            return false;
        }
        match self.mode {
            Mode::Untimed => {
                self.feedback_is(FeedbackKind::Fail)
                    || (!self.feedback_is(FeedbackKind::Success) && !self.selection.is_empty())
            }
            Mode::Timed => !self.timed_answer_saved,
        }
    }

    #[must_use]
    pub fn submit_label(&self) -> &'static str {
        if self.pending_request() == Some(RequestKind::SubmitAnswer) {
            return if self.mode.is_timed() {
                "Saving..."
            } else {
                "Submitting..."
            };
        }
        if !self.mode.is_timed() && self.feedback_is(FeedbackKind::Fail) {
            "Try again"
        } else {
            "Submit answer"
        }
    }

    #[must_use]
    pub fn show_next(&self) -> bool {
        !self.mode.is_timed() && self.feedback_is(FeedbackKind::Success) && !self.is_last_question()
    }

    #[must_use]
    pub fn show_finish(&self) -> bool {
        if self.feedback.is_none() || !self.is_last_question() {
            return false;
        }
        match self.mode {
            Mode::Untimed => {
                self.feedback_is(FeedbackKind::Success) || self.feedback_is(FeedbackKind::Fail)
            }
            Mode::Timed => self.feedback_is(FeedbackKind::Neutral),
        }
    }

    #[must_use]
    pub fn show_timed_next(&self) -> bool {
        self.mode.is_timed() && self.timed_answer_saved && !self.show_finish()
    }

    #[must_use]
    pub fn timer_tone(&self) -> Option<Tone> {
        let countdown = self.countdown.as_ref()?;
        let timed_out = self.outcome.is_some_and(|outcome| outcome.timed_out);
        Some(countdown::tone(countdown, self.timer_should_run(), timed_out))
    }

    // ─── intents ───────────────────────────────────────────────────────────

    fn issue(&mut self, request: PracticeRequest) -> Ticket {
        if matches!(request, PracticeRequest::NextQuestion) {
            self.fetch_error = None;
        }
        self.seq += 1;
        self.pending = Some(Pending {
            seq: self.seq,
            kind: request.kind(),
        });
        debug!(
            topic_id = %self.topic_id,
            generation = self.generation,
            seq = self.seq,
            ?request,
            "practice request issued"
        );
        Ticket {
            generation: self.generation,
            seq: self.seq,
            topic_id: self.topic_id,
            request,
        }
    }

    fn ensure_idle(&self) -> Result<(), SessionError> {
        if self.is_busy() {
            Err(SessionError::Busy)
        } else {
            Ok(())
        }
    }

    /// Start over from `LoadingTopic`; anything in flight becomes stale.
    pub fn begin_load_topic(&mut self) -> Ticket {
        let fresh = Self::new(self.topic_id)
            .with_course(self.course_id)
            .with_history_enabled(self.history_enabled);
        *self = Self {
            generation: self.generation + 1,
            seq: self.seq,
            ..fresh
        };
        info!(topic_id = %self.topic_id, generation = self.generation, "loading practice topic");
        self.issue(PracticeRequest::LoadTopic)
    }

    /// Ask for the next question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Busy` while another request is in flight.
    pub fn begin_fetch_next(&mut self) -> Result<Ticket, SessionError> {
        self.ensure_idle()?;
        Ok(self.issue(PracticeRequest::NextQuestion))
    }

    /// Apply a click on an option. Returns whether the selection changed.
    pub fn toggle_option(&mut self, option_id: OptionId) -> bool {
        if self.phase != Phase::Answering || self.is_busy() || self.is_answer_locked() {
            return false;
        }
        let Some(question) = self.question.as_ref() else {
            return false;
        };
        if !question.has_option(option_id) {
            return false;
        }
        self.selection.toggle(question.kind, option_id);
        if self.feedback_is(FeedbackKind::Error) {
            self.feedback = None;
        }
        true
    }

    /// Clear a wrong untimed answer so the learner can pick again.
    pub fn retry_question(&mut self) -> bool {
        if self.mode.is_timed() || !self.feedback_is(FeedbackKind::Fail) || self.is_busy() {
            return false;
        }
        self.feedback = None;
        self.selection.clear();
        true
    }

    /// Submit the current selection.
    ///
    /// After an untimed wrong answer this acts as "Try again" and returns
    /// `Ok(None)` without a request.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Busy` while a request is in flight,
    /// `SessionError::NoQuestion` outside of answering, `SessionError::AnswerLocked`
    /// once the answer is graded or saved, `SessionError::EmptySelection` for an
    /// empty untimed submission (also shown as error feedback), and
    /// `SessionError::Selection` when the selection does not fit the question.
    pub fn begin_submit(&mut self) -> Result<Option<Ticket>, SessionError> {
        self.ensure_idle()?;
        if self.phase != Phase::Answering || self.question.is_none() {
            return Err(SessionError::NoQuestion);
        }
        match self.mode {
            Mode::Untimed => {
                if self.feedback_is(FeedbackKind::Fail) {
                    self.retry_question();
                    return Ok(None);
                }
                if self.feedback_is(FeedbackKind::Success) {
                    return Err(SessionError::AnswerLocked);
                }
                if self.selection.is_empty() {
                    self.feedback = Some(Feedback::error(SELECT_AN_OPTION));
                    return Err(SessionError::EmptySelection);
                }
            }
            Mode::Timed => {
                if self.timed_answer_saved {
                    return Err(SessionError::AnswerLocked);
                }
            }
        }
        let Some(question) = self.question.as_ref() else {
            return Err(SessionError::NoQuestion);
        };
        self.selection.validate(question)?;
        let question_id = question.id;
        let selected = self.selection.to_vec();
        if !self.mode.is_timed() {
            self.feedback = None;
        }
        Ok(Some(self.issue(PracticeRequest::SubmitAnswer {
            question_id,
            selected,
        })))
    }

    /// Move on after feedback: finish on the last question, otherwise fetch the next one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Busy` while a request is in flight and
    /// `SessionError::NothingToContinue` when no answered question is waiting.
    pub fn continue_session(&mut self) -> Result<Option<Ticket>, SessionError> {
        self.ensure_idle()?;
        if self.phase != Phase::Answering {
            return Err(SessionError::NothingToContinue);
        }
        let is_last = self.is_last_question();
        let answered = self.timed_answer_saved
            || self.feedback_is(FeedbackKind::Success)
            || self.feedback_is(FeedbackKind::Neutral)
            || (is_last && self.feedback_is(FeedbackKind::Fail));
        if !answered {
            return Err(SessionError::NothingToContinue);
        }
        if is_last {
            self.complete(Outcome::resolve(false, self.server_passed, self.score_percent));
            return Ok(None);
        }
        Ok(Some(self.issue(PracticeRequest::NextQuestion)))
    }

    /// Start the quiz over after it finished.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotCompleted` unless the run is finished and
    /// `SessionError::Busy` while a request is in flight.
    pub fn begin_reset(&mut self) -> Result<Ticket, SessionError> {
        if !self.phase.is_finished() {
            return Err(SessionError::NotCompleted);
        }
        self.ensure_idle()?;
        self.generation += 1;
        info!(topic_id = %self.topic_id, generation = self.generation, "resetting practice topic");
        Ok(self.issue(PracticeRequest::Reset))
    }

    /// Ask for the review list of a finished run.
    ///
    /// The backend decides whether the run is finished; a premature call comes
    /// back as `history_error` without changing the phase.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::HistoryDisabled` for sessions without review and
    /// `SessionError::Busy` while a request is in flight.
    pub fn begin_history(&mut self) -> Result<Ticket, SessionError> {
        if !self.history_enabled {
            return Err(SessionError::HistoryDisabled);
        }
        self.ensure_idle()?;
        self.history_error = None;
        Ok(self.issue(PracticeRequest::History))
    }

    pub fn back_to_results(&mut self) -> bool {
        if self.phase != Phase::ReviewingHistory {
            return false;
        }
        self.phase = Phase::Completed;
        true
    }

    /// Advance the countdown by one second on behalf of the timer task.
    ///
    /// Ticks from an older generation are ignored. On expiry a question
    /// fetch is issued so the backend can rule on the timeout; if a request
    /// is already in flight, that fetch waits for its reply.
    pub fn tick(&mut self, generation: u64) -> Option<Ticket> {
        if generation != self.generation || !self.timer_should_run() {
            return None;
        }
        let countdown = self.countdown.as_mut()?;
        match countdown.tick() {
            Tick::Idle | Tick::Running(_) => None,
            Tick::Expired => {
                info!(topic_id = %self.topic_id, "practice countdown expired");
                if self.is_busy() {
                    self.expiry_deferred = true;
                    None
                } else {
                    Some(self.issue(PracticeRequest::NextQuestion))
                }
            }
        }
    }

    // ─── responses ─────────────────────────────────────────────────────────

    /// Fold a backend reply into the session, returning a follow-up request if one is due.
    ///
    /// Replies from an older generation, or for a request that is no longer
    /// the one in flight, are dropped.
    pub fn apply(&mut self, reply: Reply) -> Option<Ticket> {
        let current = self.pending.is_some_and(|pending| pending.seq == reply.seq);
        if reply.generation != self.generation || !current {
            debug!(
                topic_id = %self.topic_id,
                generation = reply.generation,
                seq = reply.seq,
                current_generation = self.generation,
                "discarding stale practice response"
            );
            return None;
        }
        self.pending = None;

        let follow_up = match reply.response {
            PracticeResponse::Topic(result) => self.on_topic(result),
            PracticeResponse::NextQuestion(result) => {
                self.on_next_question(result);
                None
            }
            PracticeResponse::Answer(result) => {
                self.on_answer(result);
                None
            }
            PracticeResponse::History(result) => {
                self.on_history(result);
                None
            }
            PracticeResponse::Reset(result) => self.on_reset(result),
        };
        follow_up.or_else(|| self.deferred_expiry())
    }

    fn deferred_expiry(&mut self) -> Option<Ticket> {
        if !self.expiry_deferred {
            return None;
        }
        self.expiry_deferred = false;
        let out_of_time = self
            .countdown
            .as_ref()
            .is_some_and(|countdown| countdown.remaining() == Some(0));
        if self.mode.is_timed() && self.phase == Phase::Answering && out_of_time {
            Some(self.issue(PracticeRequest::NextQuestion))
        } else {
            None
        }
    }

    fn on_topic(&mut self, result: Result<TopicPayload, ApiError>) -> Option<Ticket> {
        let payload = match result {
            Ok(payload) => payload,
            Err(err) => {
                let reason = match &err {
                    ApiError::NotFound { .. } => TopicUnavailable::NotFound,
                    ApiError::Forbidden { .. } => TopicUnavailable::NotEnrolled,
                    _ => TopicUnavailable::LoadFailed,
                };
                warn!(topic_id = %self.topic_id, error = %err, "failed to load practice topic");
                self.phase = Phase::Unavailable(reason);
                return None;
            }
        };

        self.progress = payload.progress();
        self.mode = Mode::from_timed(payload.topic.is_timed_test);
        self.countdown = self
            .mode
            .is_timed()
            .then(|| Countdown::new(payload.topic.time_limit()));
        self.topic = Some(payload.topic);

        if self.progress.total == 0 {
            info!(topic_id = %self.topic_id, "topic has no practice questions");
            self.phase = Phase::Empty;
            return None;
        }
        if self.progress.percent >= 100 {
            self.score_percent = Some(self.progress.percent);
            self.complete(Outcome::resolve(false, None, self.score_percent));
            return None;
        }
        self.phase = Phase::Answering;
        Some(self.issue(PracticeRequest::NextQuestion))
    }

    fn on_next_question(&mut self, result: Result<NextQuestionPayload, ApiError>) {
        let payload = match result {
            Ok(payload) => payload,
            Err(err) => {
                warn!(topic_id = %self.topic_id, error = %err, "failed to load next question");
                // An answered question stays on screen so Continue can be tried again.
                if self.question.is_some() {
                    self.fetch_error = Some(FAILED_TO_LOAD_QUESTION.to_string());
                } else {
                    self.feedback = Some(Feedback::error(FAILED_TO_LOAD_QUESTION));
                }
                return;
            }
        };

        self.progress = payload.progress();
        if payload.score_percent.is_some() {
            self.score_percent = payload.score_percent;
        }
        self.server_passed = payload.passed;
        self.mode = Mode::from_timed(payload.is_timed);
        if self.mode.is_timed() {
            let limit = self.topic.as_ref().and_then(Topic::time_limit);
            let countdown = self.countdown.get_or_insert_with(|| Countdown::new(limit));
            countdown.set_limit(payload.time_limit_seconds);
            if let Some(remaining) = payload.remaining_seconds {
                countdown.reseed(remaining);
            }
        } else {
            self.countdown = None;
        }

        if payload.is_finished() {
            let outcome =
                Outcome::resolve(payload.timed_out, payload.passed, self.score_percent);
            self.complete(outcome);
            return;
        }

        self.phase = Phase::Answering;
        self.timed_answer_saved = false;
        let Some(question) = payload.question else {
            self.question = None;
            self.selection.clear();
            self.feedback = Some(Feedback::error(NO_QUESTION_AVAILABLE));
            return;
        };
        match payload.last_answer.filter(|_| !self.mode.is_timed()) {
            Some(last) => {
                self.selection = Selection::restore(&question, &last.selected_option_ids);
                self.feedback = Some(Feedback::graded(last.is_correct, last.score, false));
            }
            None => {
                self.selection.clear();
                self.feedback = None;
            }
        }
        debug!(topic_id = %self.topic_id, question_id = %question.id, "question loaded");
        self.question = Some(question);
    }

    fn on_answer(&mut self, result: Result<AnswerPayload, ApiError>) {
        let payload = match result {
            Ok(payload) => payload,
            Err(err) => {
                warn!(topic_id = %self.topic_id, error = %err, "failed to submit answer");
                self.feedback = Some(Feedback::error(FAILED_TO_SUBMIT));
                return;
            }
        };

        let answered = payload.answered_questions.unwrap_or(self.progress.answered);
        let total = payload.total_questions.unwrap_or(self.progress.total);
        let is_last = total > 0 && answered >= total;
        self.progress.answered = answered;
        self.progress.total = total;
        if let Some(correct) = payload.correct_answers {
            self.progress.correct = correct;
        }
        if let Some(percent) = payload.topic_progress_percent {
            self.progress.percent = percent;
        }
        if payload.score_percent.is_some() {
            self.score_percent = payload.score_percent;
        }
        self.server_passed = payload.passed;

        match self.mode {
            Mode::Timed => {
                if let Some(countdown) = self.countdown.as_mut() {
                    countdown.set_limit(payload.time_limit_seconds);
                    if let Some(remaining) = payload.remaining_seconds {
                        countdown.reseed(remaining);
                    }
                }
                let finished = payload.test_completed || payload.timed_out;
                if finished && (payload.timed_out || !is_last) {
                    let outcome =
                        Outcome::resolve(payload.timed_out, payload.passed, self.score_percent);
                    self.complete(outcome);
                    return;
                }
                self.feedback = Some(Feedback::accepted(payload.score, is_last));
                self.timed_answer_saved = true;
                info!(topic_id = %self.topic_id, answered, total, "timed answer saved");
            }
            Mode::Untimed => {
                let is_correct = payload.is_correct.unwrap_or(false);
                info!(topic_id = %self.topic_id, answered, total, is_correct, "answer graded");
                if payload.test_completed && !is_last {
                    let outcome = Outcome::resolve(false, payload.passed, self.score_percent);
                    self.complete(outcome);
                    return;
                }
                self.feedback = Some(Feedback::graded(is_correct, payload.score, is_last));
            }
        }
    }

    fn on_history(&mut self, result: Result<HistoryPayload, ApiError>) {
        match result {
            Ok(payload) => {
                self.history = payload.questions;
                if self.phase == Phase::Completed {
                    self.phase = Phase::ReviewingHistory;
                }
            }
            Err(err) => {
                warn!(topic_id = %self.topic_id, error = %err, "failed to load practice history");
                let message = match err {
                    ApiError::BadRequest { .. } => HISTORY_AFTER_FINISH,
                    _ => HISTORY_FAILED,
                };
                self.history_error = Some(message.to_string());
            }
        }
    }

    fn on_reset(&mut self, result: Result<(), ApiError>) -> Option<Ticket> {
        if let Err(err) = result {
            warn!(topic_id = %self.topic_id, error = %err, "failed to reset practice topic");
            self.feedback = Some(Feedback::error(FAILED_TO_RESTART));
            return None;
        }

        self.outcome = None;
        self.feedback = None;
        self.selection.clear();
        self.question = None;
        self.history.clear();
        self.history_error = None;
        self.score_percent = None;
        self.server_passed = None;
        self.timed_answer_saved = false;
        self.progress = Progress {
            total: self.progress.total,
            ..Progress::default()
        };
        if self.mode.is_timed() {
            let limit = self.countdown.as_ref().and_then(Countdown::limit);
            self.countdown = Some(Countdown::new(limit));
        }
        self.phase = Phase::Answering;
        Some(self.issue(PracticeRequest::NextQuestion))
    }

    fn complete(&mut self, outcome: Outcome) {
        info!(
            topic_id = %self.topic_id,
            timed_out = outcome.timed_out,
            passed = outcome.passed,
            "practice run completed"
        );
        self.phase = Phase::Completed;
        self.outcome = Some(outcome);
        self.fetch_error = None;
        self.question = None;
        self.selection.clear();
        self.feedback = None;
        self.timed_answer_saved = false;
        self.expiry_deferred = false;
        if let Some(countdown) = self.countdown.as_mut() {
            countdown.clear();
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use practice_core::model::{AnswerOption, QuestionType};

    fn topic_payload(timed: bool, total: u32, percent: i32) -> TopicPayload {
        TopicPayload {
            topic: Topic {
                id: TopicId::new(1),
                title: "Ownership".into(),
                course_id: Some(CourseId::new(9)),
                course_title: "Rust".into(),
                module_title: "Basics".into(),
                is_timed_test: timed,
                time_limit_seconds: timed.then_some(30),
            },
            total_questions: total,
            answered_questions: 0,
            correct_answers: None,
            progress_percent: percent,
        }
    }

    fn question(id: u64, kind: QuestionType) -> Question {
        Question {
            id: QuestionId::new(id),
            text: format!("Question {id}"),
            kind,
            order: None,
            max_score: Some(1),
            options: (1..=3)
                .map(|option| AnswerOption {
                    id: OptionId::new(id * 10 + option),
                    text: format!("Option {option}"),
                })
                .collect(),
        }
    }

    fn next(question: Option<Question>, timed: bool) -> NextQuestionPayload {
        NextQuestionPayload {
            question,
            is_timed: timed,
            remaining_seconds: timed.then_some(30),
            time_limit_seconds: timed.then_some(30),
            total_questions: 2,
            ..NextQuestionPayload::default()
        }
    }

    fn loaded(timed: bool, kind: QuestionType) -> PracticeSession {
        let mut session = PracticeSession::new(TopicId::new(1));
        let ticket = session.begin_load_topic();
        let follow = session
            .apply(Reply::to(&ticket, PracticeResponse::Topic(Ok(topic_payload(timed, 2, 0)))))
            .unwrap();
        assert_eq!(follow.request, PracticeRequest::NextQuestion);
        let done = session.apply(Reply::to(
            &follow,
            PracticeResponse::NextQuestion(Ok(next(Some(question(1, kind)), timed))),
        ));
        assert!(done.is_none());
        session
    }

    #[test]
    fn load_topic_without_questions_is_empty() {
        let mut session = PracticeSession::new(TopicId::new(1));
        let ticket = session.begin_load_topic();
        let follow =
            session.apply(Reply::to(&ticket, PracticeResponse::Topic(Ok(topic_payload(false, 0, 0)))));
        assert!(follow.is_none());
        assert_eq!(session.phase(), Phase::Empty);
    }

    #[test]
    fn load_topic_at_full_progress_completes() {
        let mut session = PracticeSession::new(TopicId::new(1));
        let ticket = session.begin_load_topic();
        let follow = session
            .apply(Reply::to(&ticket, PracticeResponse::Topic(Ok(topic_payload(false, 3, 100)))));
        assert!(follow.is_none());
        assert_eq!(session.phase(), Phase::Completed);
        assert!(session.outcome().unwrap().passed);
    }

    #[test]
    fn topic_errors_are_terminal_and_distinct() {
        for (err, expected) in [
            (ApiError::NotFound { detail: "Topic not found.".into() }, TopicUnavailable::NotFound),
            (ApiError::Forbidden { detail: "no".into() }, TopicUnavailable::NotEnrolled),
            (ApiError::Unavailable("down".into()), TopicUnavailable::LoadFailed),
        ] {
            let mut session = PracticeSession::new(TopicId::new(1));
            let ticket = session.begin_load_topic();
            session.apply(Reply::to(&ticket, PracticeResponse::Topic(Err(err))));
            assert_eq!(session.phase(), Phase::Unavailable(expected));
            assert!(!session.is_exit_locked());
        }
    }

    #[test]
    fn timer_exists_only_for_timed_sessions() {
        assert!(loaded(false, QuestionType::SingleChoice).countdown().is_none());
        let timed = loaded(true, QuestionType::SingleChoice);
        assert_eq!(timed.countdown().unwrap().remaining(), Some(30));
        assert!(timed.is_exit_locked());
        assert_eq!(
            timed.guard_request().unwrap().allowed_paths,
            vec!["/learning/courses/9/topics/1/practice".to_string()]
        );
    }

    #[test]
    fn single_choice_keeps_one_option() {
        let mut session = loaded(false, QuestionType::SingleChoice);
        assert!(session.toggle_option(OptionId::new(11)));
        assert!(session.toggle_option(OptionId::new(12)));
        assert_eq!(session.selection().as_slice(), &[OptionId::new(12)]);
    }

    #[test]
    fn toggle_ignores_foreign_options_and_missing_question() {
        let mut session = loaded(false, QuestionType::MultipleChoice);
        assert!(!session.toggle_option(OptionId::new(99)));

        let mut fresh = PracticeSession::new(TopicId::new(1));
        assert!(!fresh.toggle_option(OptionId::new(11)));
        assert!(fresh.selection().is_empty());
    }

    #[test]
    fn empty_untimed_submit_stays_local() {
        let mut session = loaded(false, QuestionType::SingleChoice);
        let err = session.begin_submit().unwrap_err();
        assert!(matches!(err, SessionError::EmptySelection));
        assert!(!session.is_busy());
        assert!(session.feedback().unwrap().is(FeedbackKind::Error));
    }

    #[test]
    fn busy_session_rejects_second_submit() {
        let mut session = loaded(false, QuestionType::SingleChoice);
        session.toggle_option(OptionId::new(11));
        let ticket = session.begin_submit().unwrap().unwrap();
        assert_eq!(session.submit_label(), "Submitting...");
        assert!(matches!(session.begin_submit(), Err(SessionError::Busy)));
        assert!(!session.toggle_option(OptionId::new(12)));
        assert!(matches!(ticket.request, PracticeRequest::SubmitAnswer { .. }));
    }

    #[test]
    fn wrong_untimed_answer_locks_until_retry() {
        let mut session = loaded(false, QuestionType::SingleChoice);
        session.toggle_option(OptionId::new(11));
        let ticket = session.begin_submit().unwrap().unwrap();
        session.apply(Reply::to(
            &ticket,
            PracticeResponse::Answer(Ok(AnswerPayload {
                is_correct: Some(false),
                answered_questions: Some(0),
                total_questions: Some(2),
                ..AnswerPayload::default()
            })),
        ));
        assert!(session.is_answer_locked());
        assert_eq!(session.submit_label(), "Try again");
        assert!(!session.toggle_option(OptionId::new(12)));

        assert!(matches!(session.begin_submit(), Ok(None)));
        assert!(session.feedback().is_none());
        assert!(session.selection().is_empty());
        assert!(session.toggle_option(OptionId::new(12)));
    }

    #[test]
    fn submit_failure_keeps_selection() {
        let mut session = loaded(false, QuestionType::MultipleChoice);
        session.toggle_option(OptionId::new(11));
        let ticket = session.begin_submit().unwrap().unwrap();
        session.apply(Reply::to(
            &ticket,
            PracticeResponse::Answer(Err(ApiError::Unavailable("offline".into()))),
        ));
        let feedback = session.feedback().unwrap();
        assert!(feedback.is(FeedbackKind::Error));
        assert_eq!(feedback.message, FAILED_TO_SUBMIT);
        assert_eq!(session.selection().as_slice(), &[OptionId::new(11)]);
        assert!(session.question().is_some());
    }

    #[test]
    fn untimed_resume_replays_last_answer() {
        let mut session = PracticeSession::new(TopicId::new(1));
        let ticket = session.begin_load_topic();
        let follow = session
            .apply(Reply::to(&ticket, PracticeResponse::Topic(Ok(topic_payload(false, 2, 50)))))
            .unwrap();
        let mut payload = next(Some(question(2, QuestionType::MultipleChoice)), false);
        payload.last_answer = Some(crate::api::LastAnswerPayload {
            is_correct: false,
            selected_option_ids: vec![OptionId::new(21), OptionId::new(99)],
            score: Some(0),
        });
        session.apply(Reply::to(&follow, PracticeResponse::NextQuestion(Ok(payload))));
        assert_eq!(session.selection().as_slice(), &[OptionId::new(21)]);
        assert!(session.feedback().unwrap().is(FeedbackKind::Fail));
    }

    #[test]
    fn timed_session_never_replays_last_answer() {
        let mut session = PracticeSession::new(TopicId::new(1));
        let ticket = session.begin_load_topic();
        let follow = session
            .apply(Reply::to(&ticket, PracticeResponse::Topic(Ok(topic_payload(true, 2, 0)))))
            .unwrap();
        let mut payload = next(Some(question(2, QuestionType::SingleChoice)), true);
        payload.last_answer = Some(crate::api::LastAnswerPayload {
            is_correct: true,
            selected_option_ids: vec![OptionId::new(21)],
            score: Some(1),
        });
        session.apply(Reply::to(&follow, PracticeResponse::NextQuestion(Ok(payload))));
        assert!(session.selection().is_empty());
        assert!(session.feedback().is_none());
    }

    #[test]
    fn stale_generation_is_discarded() {
        let mut session = loaded(false, QuestionType::SingleChoice);
        let old = session.begin_fetch_next().unwrap();
        let reload = session.begin_load_topic();
        assert!(reload.generation > old.generation);

        let follow = session.apply(Reply::to(
            &old,
            PracticeResponse::NextQuestion(Ok(next(Some(question(5, QuestionType::SingleChoice)), false))),
        ));
        assert!(follow.is_none());
        assert!(session.question().is_none());
        assert_eq!(session.phase(), Phase::LoadingTopic);
        assert_eq!(session.pending_request(), Some(RequestKind::LoadTopic));
    }

    #[test]
    fn expiry_during_submit_waits_for_reply() {
        let mut session = PracticeSession::new(TopicId::new(1));
        let ticket = session.begin_load_topic();
        let follow = session
            .apply(Reply::to(&ticket, PracticeResponse::Topic(Ok(topic_payload(true, 2, 0)))))
            .unwrap();
        let mut payload = next(Some(question(1, QuestionType::SingleChoice)), true);
        payload.remaining_seconds = Some(1);
        session.apply(Reply::to(&follow, PracticeResponse::NextQuestion(Ok(payload))));

        let submit = session.begin_submit().unwrap().unwrap();
        assert!(session.tick(session.generation()).is_none());

        let follow = session
            .apply(Reply::to(
                &submit,
                PracticeResponse::Answer(Ok(AnswerPayload {
                    answered_questions: Some(1),
                    total_questions: Some(2),
                    ..AnswerPayload::default()
                })),
            ))
            .unwrap();
        assert_eq!(follow.request, PracticeRequest::NextQuestion);
        assert!(session.timed_answer_saved());
    }

    #[test]
    fn ticks_from_old_generation_are_ignored() {
        let mut session = loaded(true, QuestionType::SingleChoice);
        let stale = session.generation() - 1;
        assert!(session.tick(stale).is_none());
        assert_eq!(session.countdown().unwrap().remaining(), Some(30));
    }

    #[test]
    fn history_disabled_sessions_refuse_review() {
        let mut session =
            PracticeSession::new(TopicId::new(1)).with_history_enabled(false);
        assert!(matches!(session.begin_history(), Err(SessionError::HistoryDisabled)));
    }
}
