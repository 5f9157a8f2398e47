//! Shared sync coordinator, state machine and rendering.

pub mod coordinator;
pub mod renderer;
pub mod state;

pub use coordinator::{Event, ExecutionOrder, Job, RunReport, SyncCoordinator, View};
pub use renderer::{render_line, render_view, Render, TerminalRenderer};
pub use state::{SyncState, TaskState};
