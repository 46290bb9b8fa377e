//! Single-flight latch for the scheduled sync.
//!
//! Two states: idle and running. A run may start only when idle and when at
//! least `min_spacing` has passed since the previous start. The permit handed
//! out on success puts the guard back to idle when dropped, so an early
//! return, an error or a panic inside the run cannot leave it stuck.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Why a tick did not start a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    /// A previous run still holds its permit.
    Running,
    /// The last run started less than `min_spacing` ago.
    TooSoon { remaining: Duration },
}

#[derive(Debug, Default)]
struct State {
    running: bool,
    last_start: Option<Instant>,
}

/// Owned by the scheduler; cheap to clone.
#[derive(Debug, Clone)]
pub struct SchedulerGuard {
    state: Arc<Mutex<State>>,
    min_spacing: Duration,
}

/// Proof that a run is in progress. Dropping it returns the guard to idle.
#[derive(Debug)]
#[must_use = "the run ends as soon as the permit is dropped"]
pub struct RunPermit {
    state: Arc<Mutex<State>>,
}

impl SchedulerGuard {
    pub fn new(min_spacing: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            min_spacing,
        }
    }

    /// Try to move from idle to running at `now`.
    pub fn try_acquire(&self, now: Instant) -> Result<RunPermit, Skip> {
        let mut state = lock(&self.state);
        if state.running {
            return Err(Skip::Running);
        }
        if let Some(last) = state.last_start {
            let elapsed = now.saturating_duration_since(last);
            if elapsed < self.min_spacing {
                return Err(Skip::TooSoon {
                    remaining: self.min_spacing - elapsed,
                });
            }
        }
        state.running = true;
        state.last_start = Some(now);
        Ok(RunPermit {
            state: self.state.clone(),
        })
    }

    pub fn is_running(&self) -> bool {
        lock(&self.state).running
    }
}

impl Drop for RunPermit {
    fn drop(&mut self) {
        lock(&self.state).running = false;
    }
}

// A panic while the lock is held can only come from this module's own
// bookkeeping, which leaves the state consistent, so poisoning is ignored.
fn lock(state: &Mutex<State>) -> MutexGuard<'_, State> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
