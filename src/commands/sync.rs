//! Pull, push and fetch command implementation
//!
//! Drives one run through its phases: resolve tasks, reconcile remote URLs,
//! initialise missing working copies (pull only), then execute.

use anyhow::Result;
use log::debug;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::config::{default_path, is_wildcard, Config};
use crate::core::{
    needs_init, reconcile_remotes, resolve_tasks, run_init, run_tasks, set_terminal_title,
    set_terminal_title_and_flush, ExecutionOrder, ReconcileReport, RepoInit, RunOptions,
    RunReport, Task, TerminalRenderer, View, ALL_SELECTOR, INIT_TITLE,
};
use crate::error::Error;
use crate::git::{GitExecutor, Operation, SystemGit};

/// Everything a pull, push or fetch invocation asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncArgs {
    pub operation: Operation,
    /// Repository selector: a tracked name, a short name, `.` or `all`
    pub repo: String,
    /// Remote names or aliases; empty or `all` selects every remote
    pub remotes: Vec<String>,
    pub config_path: Option<PathBuf>,
    pub verbose: bool,
    pub force: bool,
    pub linear: bool,
}

impl SyncArgs {
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            repo: ALL_SELECTOR.to_string(),
            remotes: Vec::new(),
            config_path: None,
            verbose: false,
            force: false,
            linear: false,
        }
    }
}

/// What a completed run did
pub struct SyncOutcome {
    pub reconcile: ReconcileReport,
    /// Working copies created before the run
    pub initialized: usize,
    pub report: RunReport<Task>,
}

/// Fills in the config defaults the command line left open
pub fn apply_defaults(config: &Config, mut args: SyncArgs) -> SyncArgs {
    args.verbose |= config.defaults.verbose;
    args.linear |= config.defaults.linear;
    if is_wildcard(&args.remotes) {
        let defaults = config.defaults.remotes_for(args.operation);
        if !defaults.is_empty() {
            args.remotes = defaults.to_vec();
        }
    }
    args
}

/// Title of the live view for `operation`
pub fn run_title(operation: Operation) -> String {
    format!("{} {} repositories", operation.icon(), operation.verb())
}

/// Runs every phase of a sync against `executor`.
///
/// `args` must already carry the config defaults. Nothing is executed when
/// the selectors match no task, and no sync task runs if any working copy
/// fails to initialise.
pub async fn run_sync<IV, TV>(
    config: &Config,
    args: &SyncArgs,
    executor: Arc<dyn GitExecutor>,
    init_view: &mut IV,
    task_view: &mut TV,
    cancel: CancellationToken,
) -> crate::error::Result<SyncOutcome>
where
    IV: View<RepoInit> + ?Sized,
    TV: View<Task> + ?Sized,
{
    let tasks = resolve_tasks(config, &args.repo, &args.remotes, args.operation);
    if tasks.is_empty() {
        return Err(Error::NoMatchingTasks);
    }
    debug!("resolved {} task(s)", tasks.len());

    let reconcile = reconcile_remotes(executor.as_ref(), &tasks).await;
    for error in &reconcile.errors {
        eprintln!("⚠️  {}: {}", error.key, error.message);
    }

    let mut initialized = 0;
    if args.operation == Operation::Pull {
        let inits = needs_init(executor.as_ref(), &tasks).await;
        if !inits.is_empty() {
            initialized = inits.len();
            run_init(Arc::clone(&executor), inits, init_view, cancel.clone()).await?;
        }
    }

    let options = RunOptions {
        operation: args.operation,
        force: args.force,
        order: ExecutionOrder::from_linear(args.linear),
    };
    let report = run_tasks(executor, tasks, &options, task_view, cancel).await?;

    Ok(SyncOutcome {
        reconcile,
        initialized,
        report,
    })
}

/// Handles a pull, push or fetch command from the command line
pub async fn handle_sync_command(args: SyncArgs) -> Result<()> {
    let config_path = match &args.config_path {
        Some(path) => path.clone(),
        None => default_path()?,
    };
    let config = Config::load(&config_path)?;
    let args = apply_defaults(&config, args);

    set_terminal_title(&format!("{} remotes", args.operation.icon()));

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });

    let result: crate::error::Result<SyncOutcome> = async {
        let mut init_view = TerminalRenderer::new(INIT_TITLE, args.verbose)?.with_summary(false);
        let mut task_view = TerminalRenderer::new(run_title(args.operation), args.verbose)?;
        run_sync(
            &config,
            &args,
            Arc::new(SystemGit),
            &mut init_view,
            &mut task_view,
            cancel,
        )
        .await
    }
    .await;

    interrupt.abort();
    set_terminal_title_and_flush("✅ remotes");

    let outcome = result?;
    if outcome.report.interrupted {
        return Err(Error::Interrupted.into());
    }
    debug!(
        "{}: {} remote(s) added, {} updated, {} initialised, {} succeeded, {} failed",
        args.operation.past_tense(),
        outcome.reconcile.added.len(),
        outcome.reconcile.updated.len(),
        outcome.initialized,
        outcome.report.succeeded(),
        outcome.report.failed()
    );
    Ok(())
}
