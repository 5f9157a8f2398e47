//! Public API for the core module.
//!
//! This module provides the stable public API for the orchestration engine:
//! - Task resolution
//! - Remote reconciliation and repository initialization
//! - Scheduling and the progress state machine
//! - Statistics tracking
//!
//! Internal implementation details are not exposed through this API.

// Tasks
pub use super::task::{resolve_tasks, Task, TaskKey};

// Phases
pub use super::init::{init_repo, needs_init, run_init, InitResult, RepoInit};
pub use super::reconcile::{reconcile_remotes, ReconcileError, ReconcileReport};
pub use super::scheduler::{adjust_pull_tasks, prepare_tasks, run_tasks, RunOptions};

// State machine and rendering
pub use super::sync::{
    ExecutionOrder, Job, Render, RunReport, SyncCoordinator, SyncState, TaskState,
    TerminalRenderer, View,
};
pub use super::stats::RunStatistics;

// Configuration
pub use super::config::{ALL_SELECTOR, CURRENT_DIR_SELECTOR};
pub use super::config::{CONFIG_DIR_NAME, CONFIG_FILE_NAME, INIT_TITLE};

// Terminal utilities (re-exported from utils)
pub use crate::utils::{set_terminal_title, set_terminal_title_and_flush};
