/// Result of advancing a [`Countdown`] by one second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Nothing to count: no remaining time known, or expiry already signalled.
    Idle,
    /// Still running with this many seconds left.
    Running(u32),
    /// Just reached zero. Raised once per server-supplied remaining value.
    Expired,
}

/// Remaining time of a timed practice run.
///
/// The remaining value only ever goes down locally; the sole way up is a
/// fresh value from the server via [`Countdown::reseed`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Countdown {
    limit: Option<u32>,
    remaining: Option<u32>,
    expiry_signalled: bool,
}

impl Countdown {
    #[must_use]
    pub fn new(limit: Option<u32>) -> Self {
        Self {
            limit,
            remaining: None,
            expiry_signalled: false,
        }
    }

    #[must_use]
    pub fn limit(&self) -> Option<u32> {
        self.limit
    }

    #[must_use]
    pub fn remaining(&self) -> Option<u32> {
        self.remaining
    }

    /// Seconds are known and above zero.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.remaining.is_some_and(|secs| secs > 0)
    }

    pub fn set_limit(&mut self, limit: Option<u32>) {
        if limit.is_some() {
            self.limit = limit;
        }
    }

    /// Take the server's remaining seconds. A positive value re-arms expiry.
    pub fn reseed(&mut self, remaining: u32) {
        self.remaining = Some(remaining);
        if remaining > 0 {
            self.expiry_signalled = false;
        }
    }

    /// Forget the remaining time, e.g. once the run is over.
    pub fn clear(&mut self) {
        self.remaining = None;
        self.expiry_signalled = false;
    }

    pub fn tick(&mut self) -> Tick {
        let Some(remaining) = self.remaining else {
            return Tick::Idle;
        };
        let next = remaining.saturating_sub(1);
        self.remaining = Some(next);
        if next > 0 {
            return Tick::Running(next);
        }
        if self.expiry_signalled {
            return Tick::Idle;
        }
        self.expiry_signalled = true;
        Tick::Expired
    }
}

/// Visual urgency of the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Safe,
    Warning,
    Danger,
}

pub const WARNING_THRESHOLD_SECS: u32 = 15;

#[must_use]
pub fn tone(countdown: &Countdown, active: bool, timed_out: bool) -> Tone {
    if timed_out {
        return Tone::Danger;
    }
    let limit = countdown.limit().unwrap_or(0);
    let remaining = countdown.remaining().unwrap_or(limit);
    if limit > 0 && active && remaining <= WARNING_THRESHOLD_SECS {
        Tone::Warning
    } else {
        Tone::Safe
    }
}
