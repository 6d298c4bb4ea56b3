#![forbid(unsafe_code)]

pub mod api;
pub mod config;
pub mod error;
pub mod navigation;
pub mod sessions;

pub use api::{HttpPracticeApi, PracticeApi, ScriptedPracticeApi};
pub use config::ApiConfig;
pub use error::{ApiError, SessionError};
pub use navigation::{LockState, NavigationLease, NavigationLock};
pub use sessions::{PracticeLoopService, PracticeRuntime, PracticeSession, TimerSignal};
