//! Aggregate counts for a run and the summary lines built from them

use std::fmt;
use std::hash::Hash;

use super::sync::{SyncState, TaskState};

/// Counts of tasks per state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStatistics {
    pub succeeded: usize,
    pub failed: usize,
    pub running: usize,
    pub pending: usize,
}

impl RunStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_state<K, R>(state: &SyncState<K, R>) -> Self
    where
        K: Clone + Eq + Hash + fmt::Display,
    {
        Self {
            succeeded: state.count(TaskState::Succeeded),
            failed: state.count(TaskState::Failed),
            running: state.count(TaskState::Running),
            pending: state.count(TaskState::Pending),
        }
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failed + self.running + self.pending
    }

    pub fn finished(&self) -> usize {
        self.succeeded + self.failed
    }

    /// Final line: `2 failed, 5 succeeded`, the failed part only when non-zero
    pub fn generate_summary(&self) -> String {
        if self.failed > 0 {
            format!("{} failed, {} succeeded", self.failed, self.succeeded)
        } else {
            format!("{} succeeded", self.succeeded)
        }
    }

    /// Live footer while tasks are still running
    pub fn generate_progress(&self) -> String {
        format!("{}/{} done", self.finished(), self.total())
    }

    /// Line printed when a run is cancelled
    pub fn generate_interrupted(&self) -> String {
        format!(
            "Interrupted: {} stopped, {} not started",
            self.running, self.pending
        )
    }
}
