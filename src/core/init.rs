//! First-time repository initialization.
//!
//! Before a pull, every target path that is missing or is not a working copy
//! is cloned from its primary remote, and the remaining remotes are wired in
//! afterwards. All paths are initialised concurrently; remotes within one
//! path are added one after another.

use log::debug;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::sync::{ExecutionOrder, Job, RunReport, SyncCoordinator, View};
use super::task::Task;
use crate::error::{Error, Result};
use crate::git::{GitExecutor, DEFAULT_CLONE_REMOTE};

/// One working copy to create, with every remote it should end up with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoInit {
    pub name: String,
    pub path: PathBuf,
    /// Remote name → URL in configured order; the first is the primary
    pub remotes: Vec<(String, String)>,
}

impl RepoInit {
    /// The remote the initial clone is taken from
    pub fn primary(&self) -> Option<(&str, &str)> {
        self.remotes
            .first()
            .map(|(name, url)| (name.as_str(), url.as_str()))
    }

    pub fn short_name(&self) -> &str {
        crate::utils::short_name(&self.name)
    }
}

/// Outcome of initialising one path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitResult {
    pub output: String,
    pub error: Option<String>,
    pub success: bool,
    /// Remotes configured in the working copy before the run stopped
    pub wired: Vec<String>,
}

impl InitResult {
    pub fn succeeded(output: impl Into<String>, wired: Vec<String>) -> Self {
        Self {
            output: output.into(),
            error: None,
            success: true,
            wired,
        }
    }

    pub fn failed(message: impl Into<String>, wired: Vec<String>) -> Self {
        let message = message.into();
        Self {
            output: message.clone(),
            error: Some(message),
            success: false,
            wired,
        }
    }
}

impl Job for RepoInit {
    type Key = String;
    type Output = InitResult;

    fn key(&self) -> String {
        self.path.display().to_string()
    }

    fn is_success(output: &InitResult) -> bool {
        output.success
    }

    fn crashed(message: String) -> InitResult {
        InitResult::failed(message, Vec::new())
    }
}

/// Collects the paths among `tasks` that need initialising, one entry per
/// path in first-seen order
pub async fn needs_init(executor: &dyn GitExecutor, tasks: &[Task]) -> Vec<RepoInit> {
    let mut seen = HashSet::new();
    let mut inits = Vec::new();

    for task in tasks {
        if !seen.insert(task.path.as_path()) {
            continue;
        }
        if !executor.is_valid_repo(&task.path).await {
            debug!("{} needs initialising", task.path.display());
            inits.push(collect_repo_init(tasks, &task.path, &task.repo_name));
        }
    }

    inits
}

fn collect_repo_init(tasks: &[Task], path: &Path, name: &str) -> RepoInit {
    let mut remotes: Vec<(String, String)> = Vec::new();
    for task in tasks.iter().filter(|t| t.path == path) {
        if !remotes.iter().any(|(existing, _)| *existing == task.remote_name) {
            remotes.push((task.remote_name.clone(), task.remote_url.clone()));
        }
    }
    RepoInit {
        name: name.to_string(),
        path: path.to_path_buf(),
        remotes,
    }
}

/// Clones `init` from its primary remote and adds the rest.
///
/// Stops at the first failing step; `wired` in the result tells how far it got.
pub async fn init_repo(executor: &dyn GitExecutor, init: &RepoInit) -> InitResult {
    let Some((primary, primary_url)) = init.primary() else {
        return InitResult::failed("no remotes configured", Vec::new());
    };

    if let Some(parent) = init.path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = tokio::fs::create_dir_all(parent).await {
            return InitResult::failed(
                format!("could not create {}: {e}", parent.display()),
                Vec::new(),
            );
        }
    }

    let clone = executor.clone_repo(primary_url, &init.path).await;
    if !clone.success() {
        return InitResult::failed(clone.output, Vec::new());
    }
    let mut outputs = vec![format!("Cloned from {primary}")];

    if primary != DEFAULT_CLONE_REMOTE {
        let rename = executor
            .rename_remote(&init.path, DEFAULT_CLONE_REMOTE, primary)
            .await;
        if !rename.success() {
            return partially_wired(init, &rename.output, Vec::new());
        }
    }
    let mut wired = vec![primary.to_string()];

    for (name, url) in init.remotes.iter().skip(1) {
        let add = executor.add_remote(&init.path, name, url).await;
        if !add.success() {
            return partially_wired(init, &add.output, wired);
        }
        outputs.push(format!("Added remote {name}"));
        wired.push(name.clone());
    }

    InitResult::succeeded(outputs.join("\n"), wired)
}

/// Failure after the clone: `wired` holds the configured remotes already in
/// place and every other configured remote is listed as not added.
fn partially_wired(init: &RepoInit, output: &str, wired: Vec<String>) -> InitResult {
    let unwired: Vec<&str> = init
        .remotes
        .iter()
        .map(|(n, _)| n.as_str())
        .filter(|n| !wired.iter().any(|w| w == n))
        .collect();
    InitResult::failed(
        format!("{output}\nRemotes not added: {}", unwired.join(", ")),
        wired,
    )
}

/// Initialises every entry of `inits` concurrently, reporting to `view`.
///
/// Returns [`Error::InitFailed`] naming each repository that did not finish,
/// and [`Error::Interrupted`] if cancelled.
pub async fn run_init<V>(
    executor: Arc<dyn GitExecutor>,
    inits: Vec<RepoInit>,
    view: &mut V,
    cancel: CancellationToken,
) -> Result<RunReport<RepoInit>>
where
    V: View<RepoInit> + ?Sized,
{
    debug!("initialising {} repositories", inits.len());
    let report = SyncCoordinator::new(inits, ExecutionOrder::Parallel)
        .run(
            move |init: RepoInit| {
                let executor = Arc::clone(&executor);
                async move { init_repo(executor.as_ref(), &init).await }
            },
            view,
            cancel,
        )
        .await?;

    if report.interrupted {
        return Err(Error::Interrupted);
    }

    let failed: Vec<String> = report.failed_jobs().map(|init| init.name.clone()).collect();
    if !failed.is_empty() {
        return Err(Error::InitFailed { failed });
    }

    Ok(report)
}
