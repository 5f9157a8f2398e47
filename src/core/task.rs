//! Tasks and task resolution
//!
//! A task is one (repository, remote, operation) unit of work. Resolution
//! turns a repository selector and a remote selector list into an ordered
//! list of tasks with pairwise distinct keys.

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

use super::config::ALL_SELECTOR;
use super::sync::Job;
use crate::config::{is_wildcard, Config, Repo};
use crate::git::{Operation, OperationResult};

/// Identity of a task within one run: a remote of a working copy
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskKey {
    pub path: PathBuf,
    pub remote: String,
}

impl fmt::Display for TaskKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path.display(), self.remote)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Tracked name, e.g. `alice/tool`
    pub repo_name: String,
    /// Canonical remote name
    pub remote_name: String,
    pub remote_url: String,
    /// Expanded local path of the working copy
    pub path: PathBuf,
    pub operation: Operation,
}

impl Task {
    pub fn key(&self) -> TaskKey {
        TaskKey {
            path: self.path.clone(),
            remote: self.remote_name.clone(),
        }
    }

    /// Last segment of the repository name
    pub fn short_name(&self) -> &str {
        crate::utils::short_name(&self.repo_name)
    }
}

impl Job for Task {
    type Key = TaskKey;
    type Output = OperationResult;

    fn key(&self) -> TaskKey {
        Task::key(self)
    }

    fn is_success(output: &OperationResult) -> bool {
        output.success()
    }

    fn crashed(message: String) -> OperationResult {
        OperationResult::failed("", message, 1)
    }
}

/// Resolves selectors into tasks for `operation`.
///
/// Repositories are visited in sorted name order. With the wildcard remote
/// selector each repository contributes its remotes in configured order;
/// otherwise the selectors are alias-resolved and used in the given order.
/// Combinations without a configured URL are dropped, as are duplicate keys.
pub fn resolve_tasks(
    config: &Config,
    repo_selector: &str,
    remote_selectors: &[String],
    operation: Operation,
) -> Vec<Task> {
    let mut seen = HashSet::new();
    let mut tasks = Vec::new();

    for (repo_name, repo) in resolve_repos(config, repo_selector) {
        let path = repo.expand_path();
        for remote_name in resolve_remotes(config, repo, remote_selectors) {
            let Some(url) = repo.remote_url(&remote_name) else {
                continue;
            };
            let task = Task {
                repo_name: repo_name.to_string(),
                remote_url: url.to_string(),
                remote_name,
                path: path.clone(),
                operation,
            };
            if seen.insert(task.key()) {
                tasks.push(task);
            }
        }
    }

    tasks
}

fn resolve_repos<'a>(config: &'a Config, selector: &str) -> Vec<(&'a str, &'a Repo)> {
    if selector == ALL_SELECTOR {
        return config
            .repos
            .iter()
            .map(|(name, repo)| (name.as_str(), repo))
            .collect();
    }
    config.find_repo(selector).into_iter().collect()
}

fn resolve_remotes(config: &Config, repo: &Repo, selectors: &[String]) -> Vec<String> {
    if is_wildcard(selectors) {
        return repo.remotes.iter().map(|(name, _)| name.clone()).collect();
    }
    selectors
        .iter()
        .map(|selector| config.resolve_alias(selector))
        .collect()
}
