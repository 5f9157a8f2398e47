//! Execution of resolved tasks against the git backend

use log::debug;
use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::sync::{ExecutionOrder, RunReport, SyncCoordinator, View};
use super::task::Task;
use crate::error::Result;
use crate::git::{GitExecutor, Operation};

/// Options for one scheduled run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub operation: Operation,
    /// Overwrite the remote on push
    pub force: bool,
    pub order: ExecutionOrder,
}

impl RunOptions {
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            force: false,
            order: ExecutionOrder::Parallel,
        }
    }

    /// Force only ever applies to push
    pub fn effective_force(&self) -> bool {
        self.force && self.operation == Operation::Push
    }
}

/// Downgrades every pull after the first one for a path to a fetch.
///
/// A working copy can only merge from one upstream, so the other remotes of
/// the same repository just get their objects fetched.
pub fn adjust_pull_tasks(tasks: Vec<Task>) -> Vec<Task> {
    let mut pulled = HashSet::new();
    tasks
        .into_iter()
        .map(|mut task| {
            if task.operation == Operation::Pull && !pulled.insert(task.path.clone()) {
                task.operation = Operation::Fetch;
            }
            task
        })
        .collect()
}

/// Applies the operation-specific sequencing rules
pub fn prepare_tasks(tasks: Vec<Task>, operation: Operation) -> Vec<Task> {
    match operation {
        Operation::Pull => adjust_pull_tasks(tasks),
        Operation::Push | Operation::Fetch => tasks,
    }
}

/// Runs `tasks` through `executor`, reporting progress to `view`.
///
/// Each task fails in isolation. The report holds the final state of every
/// task; an interrupted run is flagged rather than returned as an error.
pub async fn run_tasks<V>(
    executor: Arc<dyn GitExecutor>,
    tasks: Vec<Task>,
    options: &RunOptions,
    view: &mut V,
    cancel: CancellationToken,
) -> Result<RunReport<Task>>
where
    V: View<Task> + ?Sized,
{
    let tasks = prepare_tasks(tasks, options.operation);
    let force = options.effective_force();
    debug!(
        "running {} {} task(s) ({:?})",
        tasks.len(),
        options.operation,
        options.order
    );

    SyncCoordinator::new(tasks, options.order)
        .run(
            move |task: Task| {
                let executor = Arc::clone(&executor);
                async move {
                    executor
                        .execute(task.operation, &task.path, &task.remote_name, force)
                        .await
                }
            },
            view,
            cancel,
        )
        .await
}
