//! Git process execution
//!
//! [`GitExecutor`] is the seam between the orchestration engine and the git
//! binary. [`SystemGit`] shells out to `git`; tests substitute their own
//! implementation.

use async_trait::async_trait;
use log::debug;
use std::path::Path;
use tokio::process::Command;

use super::operation::Operation;
use super::result::OperationResult;

// Accept unknown host keys on first contact so fresh clones don't block on a prompt
const GIT_SSH_COMMAND: &str = "ssh -o StrictHostKeyChecking=accept-new";

// Git command arguments
const GIT_REV_PARSE_HEAD_ARGS: &[&str] = &["rev-parse", "--abbrev-ref", "HEAD"];
const GIT_SHOW_TOPLEVEL_ARGS: &[&str] = &["rev-parse", "--show-toplevel"];

/// Branch used for pulls when nothing is checked out
const DETACHED_HEAD_BRANCH: &str = "HEAD";

/// Name git gives the remote a repository was cloned from
pub const DEFAULT_CLONE_REMOTE: &str = "origin";

/// Operations the engine needs from a version-control backend.
///
/// Every call may block on network I/O. Dropping the returned future must
/// stop the underlying work.
#[async_trait]
pub trait GitExecutor: Send + Sync {
    /// Runs pull, push or fetch for `remote` inside the working copy at `path`
    async fn execute(
        &self,
        operation: Operation,
        path: &Path,
        remote: &str,
        force: bool,
    ) -> OperationResult;

    /// Clones `url` into `path`
    async fn clone_repo(&self, url: &str, path: &Path) -> OperationResult;

    async fn add_remote(&self, path: &Path, name: &str, url: &str) -> OperationResult;

    async fn rename_remote(&self, path: &Path, old: &str, new: &str) -> OperationResult;

    async fn set_remote_url(&self, path: &Path, name: &str, url: &str) -> OperationResult;

    /// Returns the configured URL of `name`, or `None` if the remote is absent
    async fn get_remote_url(&self, path: &Path, name: &str) -> Option<String>;

    /// Returns true if `path` is the top level of a git working copy
    async fn is_valid_repo(&self, path: &Path) -> bool;
}

/// Runs a git command and captures its combined output.
///
/// The child is killed if the returned future is dropped before completion.
pub async fn run_git(dir: Option<&Path>, args: &[&str]) -> OperationResult {
    debug!(
        "git {} ({})",
        args.join(" "),
        dir.map(|d| d.display().to_string())
            .unwrap_or_else(|| ".".to_string())
    );

    let mut command = Command::new("git");
    command
        .args(args)
        .env("GIT_SSH_COMMAND", GIT_SSH_COMMAND)
        .kill_on_drop(true);
    if let Some(dir) = dir {
        command.current_dir(dir);
    }

    match command.output().await {
        Ok(output) => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let stderr = String::from_utf8_lossy(&output.stderr);
            let combined = format!("{stdout}{stderr}").trim().to_string();
            if output.status.success() {
                OperationResult::ok(combined)
            } else {
                OperationResult::failed(
                    combined,
                    output.status.to_string(),
                    output.status.code().unwrap_or(1),
                )
            }
        }
        Err(e) => OperationResult::failed("", e.to_string(), 1),
    }
}

/// [`GitExecutor`] backed by the `git` binary on `PATH`
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemGit;

impl SystemGit {
    /// Current branch name, or `HEAD` when detached or unreadable
    async fn current_branch(path: &Path) -> String {
        let result = run_git(Some(path), GIT_REV_PARSE_HEAD_ARGS).await;
        let branch = result.output.trim();
        if result.success() && !branch.is_empty() {
            branch.to_string()
        } else {
            DETACHED_HEAD_BRANCH.to_string()
        }
    }
}

#[async_trait]
impl GitExecutor for SystemGit {
    async fn execute(
        &self,
        operation: Operation,
        path: &Path,
        remote: &str,
        force: bool,
    ) -> OperationResult {
        let branch = match operation {
            Operation::Pull => Self::current_branch(path).await,
            Operation::Push | Operation::Fetch => String::new(),
        };
        let args = operation.git_args(remote, &branch, force);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        run_git(Some(path), &args).await
    }

    async fn clone_repo(&self, url: &str, path: &Path) -> OperationResult {
        let target = path.to_string_lossy();
        run_git(None, &["clone", url, target.as_ref()]).await
    }

    async fn add_remote(&self, path: &Path, name: &str, url: &str) -> OperationResult {
        run_git(Some(path), &["remote", "add", name, url]).await
    }

    async fn rename_remote(&self, path: &Path, old: &str, new: &str) -> OperationResult {
        run_git(Some(path), &["remote", "rename", old, new]).await
    }

    async fn set_remote_url(&self, path: &Path, name: &str, url: &str) -> OperationResult {
        run_git(Some(path), &["remote", "set-url", name, url]).await
    }

    async fn get_remote_url(&self, path: &Path, name: &str) -> Option<String> {
        let result = run_git(Some(path), &["remote", "get-url", name]).await;
        let url = result.output.trim();
        (result.success() && !url.is_empty()).then(|| url.to_string())
    }

    async fn is_valid_repo(&self, path: &Path) -> bool {
        match tokio::fs::metadata(path).await {
            Ok(metadata) if metadata.is_dir() => {}
            _ => return false,
        }
        let result = run_git(Some(path), GIT_SHOW_TOPLEVEL_ARGS).await;
        if !result.success() {
            return false;
        }
        // A directory nested inside some other working copy is not one itself
        match (
            tokio::fs::canonicalize(path).await,
            tokio::fs::canonicalize(result.output.trim()).await,
        ) {
            (Ok(expected), Ok(toplevel)) => expected == toplevel,
            _ => false,
        }
    }
}
