//! Remote URL reconciliation.
//!
//! Makes every existing working copy's remotes point at the URLs the
//! configuration expects before any operation runs.

use futures::future::join_all;
use log::{debug, warn};
use std::path::Path;

use super::task::{Task, TaskKey};
use crate::git::GitExecutor;

/// A remote that could not be brought in line with the configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileError {
    pub key: TaskKey,
    pub message: String,
}

/// What one reconciliation pass changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Remotes that were missing and got added
    pub added: Vec<TaskKey>,
    /// Remotes whose URL was replaced
    pub updated: Vec<TaskKey>,
    /// Paths that are not working copies yet
    pub skipped: Vec<String>,
    pub errors: Vec<ReconcileError>,
}

impl ReconcileReport {
    /// Number of remotes added or updated
    pub fn mutations(&self) -> usize {
        self.added.len() + self.updated.len()
    }

    fn merge(&mut self, other: ReconcileReport) {
        self.added.extend(other.added);
        self.updated.extend(other.updated);
        self.skipped.extend(other.skipped);
        self.errors.extend(other.errors);
    }
}

/// Reconciles the remotes of every distinct (path, remote) pair in `tasks`.
///
/// Paths are handled concurrently; the remotes of one path one after another,
/// since they write the same git config file. Failures are collected in the
/// report and never stop the pass.
pub async fn reconcile_remotes(executor: &dyn GitExecutor, tasks: &[Task]) -> ReconcileReport {
    let groups = group_by_path(tasks);
    debug!("reconciling remotes for {} path(s)", groups.len());

    let reports = join_all(
        groups
            .into_iter()
            .map(|(path, remotes)| reconcile_path(executor, path, remotes)),
    )
    .await;

    let mut report = ReconcileReport::default();
    for path_report in reports {
        report.merge(path_report);
    }
    for error in &report.errors {
        warn!("could not reconcile {}: {}", error.key, error.message);
    }
    report
}

/// Distinct remotes per path, both in first-seen order
fn group_by_path(tasks: &[Task]) -> Vec<(&Path, Vec<&Task>)> {
    let mut groups: Vec<(&Path, Vec<&Task>)> = Vec::new();
    for task in tasks {
        match groups.iter_mut().find(|(path, _)| *path == task.path) {
            Some((_, remotes)) => {
                if !remotes.iter().any(|t| t.remote_name == task.remote_name) {
                    remotes.push(task);
                }
            }
            None => groups.push((task.path.as_path(), vec![task])),
        }
    }
    groups
}

async fn reconcile_path(
    executor: &dyn GitExecutor,
    path: &Path,
    tasks: Vec<&Task>,
) -> ReconcileReport {
    let mut report = ReconcileReport::default();

    if !executor.is_valid_repo(path).await {
        debug!("{} is not a working copy yet, skipping", path.display());
        report.skipped.push(path.display().to_string());
        return report;
    }

    for task in tasks {
        let key = task.key();
        let result = match executor.get_remote_url(path, &task.remote_name).await {
            None => {
                let result = executor
                    .add_remote(path, &task.remote_name, &task.remote_url)
                    .await;
                if result.success() {
                    debug!("{key}: added {}", task.remote_url);
                    report.added.push(key.clone());
                }
                result
            }
            Some(current) if current != task.remote_url => {
                let result = executor
                    .set_remote_url(path, &task.remote_name, &task.remote_url)
                    .await;
                if result.success() {
                    debug!("{key}: {current} -> {}", task.remote_url);
                    report.updated.push(key.clone());
                }
                result
            }
            Some(_) => continue,
        };

        if !result.success() {
            report.errors.push(ReconcileError {
                key,
                message: result.first_line().to_string(),
            });
        }
    }

    report
}
