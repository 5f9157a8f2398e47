//! In-memory git backend and a view that records what the loop did

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use goobits_remotes::core::{Job, SyncState, TaskState, View};
use goobits_remotes::git::{GitExecutor, Operation, OperationResult, DEFAULT_CLONE_REMOTE};

/// Scripted [`GitExecutor`].
///
/// Working copies exist only as entries in a map of path → remotes. Every
/// call is recorded as a short line such as `pull a github` or
/// `clone https://x a`, where `a` is the last component of the path.
#[derive(Default)]
pub struct FakeGit {
    repos: Mutex<HashMap<PathBuf, Vec<(String, String)>>>,
    calls: Mutex<Vec<String>>,
    failing: Mutex<HashSet<String>>,
    delay: Duration,
    running: AtomicUsize,
    max_running: AtomicUsize,
}

fn label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl FakeGit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every execute call sleeps for `millis`
    pub fn with_delay(mut self, millis: u64) -> Self {
        self.delay = Duration::from_millis(millis);
        self
    }

    /// Registers an existing working copy
    pub fn with_repo(self, path: &Path, remotes: &[(&str, &str)]) -> Self {
        self.repos.lock().unwrap().insert(
            path.to_path_buf(),
            remotes
                .iter()
                .map(|(name, url)| (name.to_string(), url.to_string()))
                .collect(),
        );
        self
    }

    /// Makes every call that names `target` (a remote name or URL) fail
    pub fn failing(self, target: &str) -> Self {
        self.failing.lock().unwrap().insert(target.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Recorded calls starting with `prefix`
    pub fn calls_starting_with(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| call.starts_with(prefix))
            .collect()
    }

    pub fn remotes_of(&self, path: &Path) -> Option<Vec<(String, String)>> {
        self.repos.lock().unwrap().get(path).cloned()
    }

    /// Highest number of execute calls in progress at once
    pub fn max_running(&self) -> usize {
        self.max_running.load(Ordering::SeqCst)
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn fails(&self, targets: &[&str]) -> bool {
        let failing = self.failing.lock().unwrap();
        targets.iter().any(|t| failing.contains(*t))
    }

    fn outcome(&self, targets: &[&str], output: &str) -> OperationResult {
        if self.fails(targets) {
            OperationResult::failed(format!("fatal: {} unreachable", targets[0]), "exit status: 1", 1)
        } else {
            OperationResult::ok(output)
        }
    }

    fn update_remotes<F>(&self, path: &Path, change: F) -> OperationResult
    where
        F: FnOnce(&mut Vec<(String, String)>) -> OperationResult,
    {
        match self.repos.lock().unwrap().get_mut(path) {
            Some(remotes) => change(remotes),
            None => OperationResult::failed("", "fatal: not a git repository", 128),
        }
    }
}

#[async_trait]
impl GitExecutor for FakeGit {
    async fn execute(
        &self,
        operation: Operation,
        path: &Path,
        remote: &str,
        force: bool,
    ) -> OperationResult {
        let flag = if force { " --force" } else { "" };
        self.record(format!("{operation}{flag} {} {remote}", label(path)));

        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_running.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.running.fetch_sub(1, Ordering::SeqCst);

        self.outcome(&[remote], "done")
    }

    async fn clone_repo(&self, url: &str, path: &Path) -> OperationResult {
        self.record(format!("clone {url} {}", label(path)));
        let result = self.outcome(&[url], "Cloning...");
        if result.success() {
            self.repos.lock().unwrap().insert(
                path.to_path_buf(),
                vec![(DEFAULT_CLONE_REMOTE.to_string(), url.to_string())],
            );
        }
        result
    }

    async fn add_remote(&self, path: &Path, name: &str, url: &str) -> OperationResult {
        self.record(format!("add {} {name}", label(path)));
        let result = self.outcome(&[name, url], "");
        if !result.success() {
            return result;
        }
        self.update_remotes(path, |remotes| {
            if remotes.iter().any(|(n, _)| n == name) {
                return OperationResult::failed("", format!("error: remote {name} already exists"), 3);
            }
            remotes.push((name.to_string(), url.to_string()));
            OperationResult::ok("")
        })
    }

    async fn rename_remote(&self, path: &Path, old: &str, new: &str) -> OperationResult {
        self.record(format!("rename {} {old} {new}", label(path)));
        if self.fails(&[new]) {
            return OperationResult::failed("", "error: could not rename config section", 128);
        }
        self.update_remotes(path, |remotes| match remotes.iter_mut().find(|(n, _)| n == old) {
            Some(entry) => {
                entry.0 = new.to_string();
                OperationResult::ok("")
            }
            None => OperationResult::failed("", format!("error: no such remote '{old}'"), 2),
        })
    }

    async fn set_remote_url(&self, path: &Path, name: &str, url: &str) -> OperationResult {
        self.record(format!("set-url {} {name}", label(path)));
        let result = self.outcome(&[name, url], "");
        if !result.success() {
            return result;
        }
        self.update_remotes(path, |remotes| match remotes.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => {
                entry.1 = url.to_string();
                OperationResult::ok("")
            }
            None => OperationResult::failed("", format!("error: no such remote '{name}'"), 2),
        })
    }

    async fn get_remote_url(&self, path: &Path, name: &str) -> Option<String> {
        self.repos
            .lock()
            .unwrap()
            .get(path)?
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, url)| url.clone())
    }

    async fn is_valid_repo(&self, path: &Path) -> bool {
        self.repos.lock().unwrap().contains_key(path)
    }
}

/// View that records start order, peak concurrency and every state it saw
pub struct RecordingView<J: Job> {
    pub started: Vec<J::Key>,
    pub max_running: usize,
    /// State changes that went backwards or skipped Running
    pub violations: Vec<String>,
    /// `Some(interrupted)` once the loop has finished
    pub finished: Option<bool>,
    last: HashMap<J::Key, TaskState>,
}

impl<J: Job> Default for RecordingView<J> {
    fn default() -> Self {
        Self {
            started: Vec::new(),
            max_running: 0,
            violations: Vec::new(),
            finished: None,
            last: HashMap::new(),
        }
    }
}

impl<J: Job> RecordingView<J> {
    pub fn new() -> Self {
        Self::default()
    }

    fn observe(&mut self, jobs: &[J], state: &SyncState<J::Key, J::Output>) {
        let mut running = 0;
        for job in jobs {
            let key = job.key();
            let Some(current) = state.state(&key) else {
                continue;
            };
            if current == TaskState::Running {
                running += 1;
                if !self.started.contains(&key) {
                    self.started.push(key.clone());
                }
            }
            if let Some(previous) = self.last.insert(key.clone(), current) {
                if previous != current && !previous.can_transition_to(current) {
                    self.violations.push(format!("{key}: {previous} -> {current}"));
                }
            }
        }
        self.max_running = self.max_running.max(running);
    }
}

impl<J: Job> View<J> for RecordingView<J> {
    fn refresh(&mut self, jobs: &[J], state: &SyncState<J::Key, J::Output>) {
        self.observe(jobs, state);
    }

    fn finish(&mut self, jobs: &[J], state: &SyncState<J::Key, J::Output>, interrupted: bool) {
        self.observe(jobs, state);
        self.finished = Some(interrupted);
    }
}
