use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::debug;

use super::service::PracticeSession;

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// One elapsed second for the session generation the timer was started for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerSignal {
    pub generation: u64,
}

#[derive(Debug)]
struct RunningTimer {
    generation: u64,
    handle: JoinHandle<()>,
}

/// Owns the background task that emits a [`TimerSignal`] every second.
///
/// Missed ticks are delivered in a burst; the countdown clamps at zero, so a
/// suspended runtime never drives the remaining time negative.
#[derive(Debug, Default)]
pub struct TimerController {
    running: Option<RunningTimer>,
}

impl TimerController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    #[must_use]
    pub fn generation(&self) -> Option<u64> {
        self.running.as_ref().map(|timer| timer.generation)
    }

    /// Restart ticking for `generation`. Must be called inside a tokio runtime.
    pub fn start(&mut self, generation: u64, signals: UnboundedSender<TimerSignal>) {
        self.stop();
        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
            interval.set_missed_tick_behavior(MissedTickBehavior::Burst);
            loop {
                interval.tick().await;
                if signals.send(TimerSignal { generation }).is_err() {
                    break;
                }
            }
        });
        debug!(generation, "practice timer started");
        self.running = Some(RunningTimer { generation, handle });
    }

    pub fn stop(&mut self) {
        if let Some(timer) = self.running.take() {
            timer.handle.abort();
            debug!(generation = timer.generation, "practice timer stopped");
        }
    }

    /// Start, keep, or stop the task to match what the session needs.
    pub fn sync(&mut self, session: &PracticeSession, signals: &UnboundedSender<TimerSignal>) {
        if !session.timer_should_run() {
            self.stop();
        } else if self.generation() != Some(session.generation()) {
            self.start(session.generation(), signals.clone());
        }
    }
}

impl Drop for TimerController {
    fn drop(&mut self) {
        self.stop();
    }
}
