use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Monotonic simulation clock, advanced by the frame delta.
///
/// Timers are evaluated against this instead of wall time so that a paused
/// or stepped simulation keeps its deferred actions in sync with gameplay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimClock {
    elapsed: Duration,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by `dt` seconds. Non-finite or negative deltas are ignored.
    pub fn advance(&mut self, dt: f32) {
        if dt.is_finite() && dt > 0.0 {
            self.elapsed += Duration::from_secs_f32(dt);
        }
    }

    pub fn now(&self) -> Duration {
        self.elapsed
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Scheduled<T> {
    due: Duration,
    task: T,
}

/// Deferred tasks ordered by due time.
///
/// Nothing runs on its own: the owner polls [`Scheduler::take_due`] once per
/// tick and executes whatever comes back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scheduler<T> {
    tasks: Vec<Scheduled<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self { tasks: Vec::new() }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `task` to become due at absolute clock time `due`.
    pub fn schedule(&mut self, due: Duration, task: T) {
        // Equal due times run in scheduling order.
        let pos = self.tasks.partition_point(|s| s.due <= due);
        self.tasks.insert(pos, Scheduled { due, task });
    }

    /// Pop all tasks with `due <= now`, earliest first.
    pub fn take_due(&mut self, now: Duration) -> Vec<T> {
        let split = self.tasks.partition_point(|s| s.due <= now);
        self.tasks.drain(..split).map(|s| s.task).collect()
    }

    /// Drop every pending task.
    pub fn clear(&mut self) -> usize {
        let n = self.tasks.len();
        self.tasks.clear();
        n
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
