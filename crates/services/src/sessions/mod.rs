mod runtime;
mod service;
mod timer;
mod workflow;

// Public API of the practice session subsystem.
pub use crate::error::SessionError;
pub use runtime::PracticeRuntime;
pub use service::{
    GuardRequest, HISTORY_AFTER_FINISH, HISTORY_FAILED, PracticeRequest, PracticeResponse,
    PracticeSession, Reply, RequestKind, TIMED_TEST_LOCK_REASON, Ticket,
};
pub use timer::{TICK_PERIOD, TimerController, TimerSignal};
pub use workflow::PracticeLoopService;
