use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::navigation::{NavigationLease, NavigationLock};
use super::service::PracticeSession;
use super::timer::{TimerController, TimerSignal};

/// Side effects that follow a practice session around: the countdown task and
/// the navigation lease.
///
/// Dropping the runtime stops the timer and releases the lease, so leaving the
/// page can never strand the learner behind a lock.
#[derive(Debug)]
pub struct PracticeRuntime {
    timer: TimerController,
    lock: NavigationLock,
    lease: Option<NavigationLease>,
    signals: UnboundedSender<TimerSignal>,
}

impl PracticeRuntime {
    #[must_use]
    pub fn new(lock: NavigationLock) -> (Self, UnboundedReceiver<TimerSignal>) {
        let (signals, receiver) = mpsc::unbounded_channel();
        let runtime = Self {
            timer: TimerController::new(),
            lock,
            lease: None,
            signals,
        };
        (runtime, receiver)
    }

    /// Arm or disarm the timer and the guard after a session change.
    pub fn sync(&mut self, session: &PracticeSession) {
        self.timer.sync(session, &self.signals);
        match session.guard_request() {
            Some(request) => {
                if self.lease.is_none() {
                    self.lease = Some(self.lock.lock(request.reason, request.allowed_paths));
                }
            }
            None => {
                if let Some(lease) = self.lease.take() {
                    lease.release();
                }
            }
        }
    }

    #[must_use]
    pub fn is_timer_running(&self) -> bool {
        self.timer.is_running()
    }

    #[must_use]
    pub fn is_guard_armed(&self) -> bool {
        self.lease.is_some()
    }

    pub fn shutdown(&mut self) {
        self.timer.stop();
        if let Some(lease) = self.lease.take() {
            lease.release();
        }
    }
}

impl Drop for PracticeRuntime {
    fn drop(&mut self) {
        self.shutdown();
    }
}
