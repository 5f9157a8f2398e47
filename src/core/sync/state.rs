//! Per-task progress state.
//!
//! Owned by the coordinating loop; nothing else mutates it.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use crate::error::{Error, Result};

/// Lifecycle of a single task: Pending → Running → Succeeded | Failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl TaskState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::Succeeded | TaskState::Failed)
    }

    /// Whether `next` is a legal successor of this state
    pub fn can_transition_to(&self, next: TaskState) -> bool {
        matches!(
            (self, next),
            (TaskState::Pending, TaskState::Running)
                | (TaskState::Running, TaskState::Succeeded)
                | (TaskState::Running, TaskState::Failed)
        )
    }

    pub fn text(&self) -> &'static str {
        match self {
            TaskState::Pending => "pending",
            TaskState::Running => "running",
            TaskState::Succeeded => "succeeded",
            TaskState::Failed => "failed",
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// State and results for every key of one run
#[derive(Debug)]
pub struct SyncState<K, R> {
    states: HashMap<K, TaskState>,
    results: HashMap<K, R>,
}

impl<K, R> SyncState<K, R>
where
    K: Clone + Eq + Hash + fmt::Display,
{
    /// Every key starts Pending
    pub fn new(keys: impl IntoIterator<Item = K>) -> Self {
        let states = keys
            .into_iter()
            .map(|key| (key, TaskState::Pending))
            .collect();
        Self {
            states,
            results: HashMap::new(),
        }
    }

    pub fn state(&self, key: &K) -> Option<TaskState> {
        self.states.get(key).copied()
    }

    /// The result, present only once the key is terminal
    pub fn result(&self, key: &K) -> Option<&R> {
        self.results.get(key)
    }

    /// Marks `key` Running
    pub fn start(&mut self, key: &K) -> Result<()> {
        self.transition(key, TaskState::Running)
    }

    /// Marks `key` Succeeded or Failed and records its result
    pub fn finish(&mut self, key: &K, succeeded: bool, result: R) -> Result<()> {
        let next = if succeeded {
            TaskState::Succeeded
        } else {
            TaskState::Failed
        };
        self.transition(key, next)?;
        self.results.insert(key.clone(), result);
        Ok(())
    }

    fn transition(&mut self, key: &K, next: TaskState) -> Result<()> {
        let current = self
            .states
            .get_mut(key)
            .ok_or_else(|| Error::InvalidTransition {
                key: key.to_string(),
                from: TaskState::Pending,
                to: next,
            })?;
        if !current.can_transition_to(next) {
            return Err(Error::InvalidTransition {
                key: key.to_string(),
                from: *current,
                to: next,
            });
        }
        *current = next;
        Ok(())
    }

    pub fn count(&self, state: TaskState) -> usize {
        self.states.values().filter(|s| **s == state).count()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// True once every key is terminal
    pub fn is_done(&self) -> bool {
        self.states.values().all(TaskState::is_terminal)
    }
}
