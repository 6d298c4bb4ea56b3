//! Process-wide navigation lock used while a timed practice run is active.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::{debug, info};

pub const DEFAULT_LOCK_REASON: &str = "Navigation is locked during the current activity.";

/// Observable state of the [`NavigationLock`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockState {
    pub is_locked: bool,
    pub reason: Option<String>,
    pub allowed_paths: Vec<String>,
    holder: u64,
}

impl LockState {
    /// Whether navigating to `path` is allowed in this state.
    #[must_use]
    pub fn allows(&self, path: &str) -> bool {
        if !self.is_locked {
            return true;
        }
        let path = normalize(path);
        self.allowed_paths
            .iter()
            .any(|allowed| normalize(allowed) == path)
    }
}

fn normalize(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}

/// Route guard shared by the whole client.
///
/// Locking is last-writer-wins: a new `lock` replaces whatever holder was
/// there, and the displaced lease no longer unlocks on drop.
#[derive(Clone, Debug)]
pub struct NavigationLock {
    state: Arc<watch::Sender<LockState>>,
    holders: Arc<AtomicU64>,
}

impl NavigationLock {
    #[must_use]
    pub fn new() -> Self {
        let (state, _) = watch::channel(LockState::default());
        Self {
            state: Arc::new(state),
            holders: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Lock navigation to `allowed_paths`. An empty reason uses [`DEFAULT_LOCK_REASON`].
    pub fn lock(&self, reason: impl Into<String>, allowed_paths: Vec<String>) -> NavigationLease {
        let holder = self.holders.fetch_add(1, Ordering::Relaxed) + 1;
        let reason = reason.into();
        let reason = if reason.trim().is_empty() {
            DEFAULT_LOCK_REASON.to_string()
        } else {
            reason
        };
        info!(holder, ?allowed_paths, "navigation locked");
        self.state.send_replace(LockState {
            is_locked: true,
            reason: Some(reason),
            allowed_paths,
            holder,
        });
        NavigationLease {
            lock: self.clone(),
            holder,
            released: false,
        }
    }

    /// Unlock regardless of who holds the lock.
    pub fn unlock(&self) {
        let previous = self.state.send_replace(LockState::default());
        if previous.is_locked {
            info!(holder = previous.holder, "navigation unlocked");
        }
    }

    fn release(&self, holder: u64) {
        let released = self.state.send_if_modified(|state| {
            if state.is_locked && state.holder == holder {
                *state = LockState::default();
                true
            } else {
                false
            }
        });
        if released {
            info!(holder, "navigation lease released");
        } else {
            debug!(holder, "navigation lease already superseded");
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<LockState> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn state(&self) -> LockState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.state.borrow().is_locked
    }

    /// Where a navigation to `path` must go instead, if it is blocked.
    #[must_use]
    pub fn redirect_for(&self, path: &str) -> Option<String> {
        let state = self.state.borrow();
        if state.allows(path) {
            return None;
        }
        state.allowed_paths.first().cloned()
    }

    /// Message to show when the window is about to close while locked.
    #[must_use]
    pub fn close_warning(&self) -> Option<String> {
        let state = self.state.borrow();
        if state.is_locked {
            state.reason.clone()
        } else {
            None
        }
    }
}

impl Default for NavigationLock {
    fn default() -> Self {
        Self::new()
    }
}

/// Scoped hold on the [`NavigationLock`]; unlocks when dropped.
#[derive(Debug)]
pub struct NavigationLease {
    lock: NavigationLock,
    holder: u64,
    released: bool,
}

impl NavigationLease {
    #[must_use]
    pub fn holder(&self) -> u64 {
        self.holder
    }

    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if !self.released {
            self.released = true;
            self.lock.release(self.holder);
        }
    }
}

impl Drop for NavigationLease {
    fn drop(&mut self) {
        self.release_inner();
    }
}
