//! Coordinating event loop for concurrent jobs.
//!
//! One loop owns the [`SyncState`] and the view. Each job runs as its own
//! tokio task and reports back with a single [`Event`]; the loop applies
//! events one at a time, so state mutation and rendering never interleave.

use futures::FutureExt;
use log::debug;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::state::{SyncState, TaskState};
use crate::core::config::TICK_INTERVAL_MS;
use crate::error::Result;

/// A unit of work the coordinator can schedule
pub trait Job: Clone + Send + 'static {
    type Key: Clone + Eq + Hash + fmt::Display + fmt::Debug + Send + 'static;
    type Output: Send + 'static;

    fn key(&self) -> Self::Key;

    /// Whether `output` moves the job to Succeeded rather than Failed
    fn is_success(output: &Self::Output) -> bool;

    /// Output recorded for a job whose worker died without reporting
    fn crashed(message: String) -> Self::Output;
}

/// How many jobs may be outstanding at once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionOrder {
    /// Every job is issued when the run starts
    #[default]
    Parallel,
    /// One job at a time, in list order
    Linear,
}

impl ExecutionOrder {
    pub fn from_linear(linear: bool) -> Self {
        if linear {
            ExecutionOrder::Linear
        } else {
            ExecutionOrder::Parallel
        }
    }
}

/// Completion message sent from a worker to the loop
#[derive(Debug)]
pub enum Event<K, O> {
    Finished { key: K, output: O },
}

/// Receives every state change the loop applies
pub trait View<J: Job> {
    /// Called after each batch of state changes
    fn refresh(&mut self, jobs: &[J], state: &SyncState<J::Key, J::Output>);

    /// Called on every spinner tick while jobs are running
    fn tick(&mut self, _jobs: &[J], _state: &SyncState<J::Key, J::Output>) {}

    /// Called once when the loop ends, normally or interrupted
    fn finish(&mut self, jobs: &[J], state: &SyncState<J::Key, J::Output>, interrupted: bool);
}

/// Final state of a run
pub struct RunReport<J: Job> {
    pub jobs: Vec<J>,
    pub state: SyncState<J::Key, J::Output>,
    /// True if cancellation ended the loop before every job finished
    pub interrupted: bool,
}

impl<J: Job> RunReport<J> {
    pub fn succeeded(&self) -> usize {
        self.state.count(TaskState::Succeeded)
    }

    pub fn failed(&self) -> usize {
        self.state.count(TaskState::Failed)
    }

    pub fn state_of(&self, job: &J) -> Option<TaskState> {
        self.state.state(&job.key())
    }

    pub fn output_of(&self, job: &J) -> Option<&J::Output> {
        self.state.result(&job.key())
    }

    /// Jobs that ended Failed, in list order
    pub fn failed_jobs(&self) -> impl Iterator<Item = &J> {
        self.jobs
            .iter()
            .filter(|job| self.state.state(&job.key()) == Some(TaskState::Failed))
    }
}

/// Schedules jobs and drives their state to completion
pub struct SyncCoordinator<J: Job> {
    jobs: Vec<J>,
    state: SyncState<J::Key, J::Output>,
    order: ExecutionOrder,
}

impl<J: Job> SyncCoordinator<J> {
    pub fn new(jobs: Vec<J>, order: ExecutionOrder) -> Self {
        let state = SyncState::new(jobs.iter().map(|job| job.key()));
        Self { jobs, state, order }
    }

    /// Runs every job through `work`, reporting to `view`, until all are
    /// terminal or `cancel` fires.
    ///
    /// On cancellation in-flight workers are aborted, which drops their
    /// futures and kills any child process they own. Jobs that never started
    /// stay Pending.
    pub async fn run<F, Fut, V>(
        mut self,
        work: F,
        view: &mut V,
        cancel: CancellationToken,
    ) -> Result<RunReport<J>>
    where
        F: Fn(J) -> Fut,
        Fut: Future<Output = J::Output> + Send + 'static,
        V: View<J> + ?Sized,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<Event<J::Key, J::Output>>();
        let mut in_flight: HashMap<J::Key, JoinHandle<()>> = HashMap::new();
        let mut next = 0;

        let initial = match self.order {
            ExecutionOrder::Parallel => self.jobs.len(),
            ExecutionOrder::Linear => self.jobs.len().min(1),
        };
        while next < initial {
            self.launch(next, &work, &tx, &mut in_flight)?;
            next += 1;
        }
        view.refresh(&self.jobs, &self.state);

        let mut ticker = tokio::time::interval(Duration::from_millis(TICK_INTERVAL_MS));
        let mut interrupted = false;

        while !self.state.is_done() {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("run cancelled with {} job(s) in flight", in_flight.len());
                    for (_, handle) in in_flight.drain() {
                        handle.abort();
                    }
                    interrupted = true;
                    break;
                }
                Some(event) = rx.recv() => {
                    match event {
                        Event::Finished { key, output } => {
                            in_flight.remove(&key);
                            let succeeded = J::is_success(&output);
                            debug!("{key} finished (success: {succeeded})");
                            self.state.finish(&key, succeeded, output)?;
                        }
                    }
                    if self.order == ExecutionOrder::Linear && next < self.jobs.len() {
                        self.launch(next, &work, &tx, &mut in_flight)?;
                        next += 1;
                    }
                    view.refresh(&self.jobs, &self.state);
                }
                _ = ticker.tick() => view.tick(&self.jobs, &self.state),
            }
        }

        view.finish(&self.jobs, &self.state, interrupted);

        Ok(RunReport {
            jobs: self.jobs,
            state: self.state,
            interrupted,
        })
    }

    fn launch<F, Fut>(
        &mut self,
        index: usize,
        work: &F,
        tx: &mpsc::UnboundedSender<Event<J::Key, J::Output>>,
        in_flight: &mut HashMap<J::Key, JoinHandle<()>>,
    ) -> Result<()>
    where
        F: Fn(J) -> Fut,
        Fut: Future<Output = J::Output> + Send + 'static,
    {
        let job = self.jobs[index].clone();
        let key = job.key();
        self.state.start(&key)?;
        debug!("{key} started");

        let future = work(job);
        let tx = tx.clone();
        let event_key = key.clone();
        let handle = tokio::spawn(async move {
            let output = match AssertUnwindSafe(future).catch_unwind().await {
                Ok(output) => output,
                Err(_) => J::crashed("worker panicked".to_string()),
            };
            // The loop may already be gone after cancellation
            let _ = tx.send(Event::Finished {
                key: event_key,
                output,
            });
        });
        in_flight.insert(key, handle);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug)]
    struct Sleep {
        name: &'static str,
        millis: u64,
        ok: bool,
    }

    impl Job for Sleep {
        type Key = &'static str;
        type Output = bool;

        fn key(&self) -> Self::Key {
            self.name
        }

        fn is_success(output: &bool) -> bool {
            *output
        }

        fn crashed(_message: String) -> bool {
            false
        }
    }

    #[derive(Default)]
    struct Trace {
        max_running: usize,
        started: Vec<&'static str>,
        finished: bool,
    }

    impl View<Sleep> for Trace {
        fn refresh(&mut self, jobs: &[Sleep], state: &SyncState<&'static str, bool>) {
            let running: Vec<_> = jobs
                .iter()
                .filter(|job| state.state(&job.name) == Some(TaskState::Running))
                .collect();
            self.max_running = self.max_running.max(running.len());
            for job in running {
                if !self.started.contains(&job.name) {
                    self.started.push(job.name);
                }
            }
        }

        fn finish(&mut self, _: &[Sleep], _: &SyncState<&'static str, bool>, _: bool) {
            self.finished = true;
        }
    }

    fn jobs() -> Vec<Sleep> {
        vec![
            Sleep { name: "one", millis: 30, ok: true },
            Sleep { name: "two", millis: 10, ok: false },
            Sleep { name: "three", millis: 20, ok: true },
        ]
    }

    async fn sleep_then(job: Sleep) -> bool {
        tokio::time::sleep(Duration::from_millis(job.millis)).await;
        job.ok
    }

    #[tokio::test]
    async fn test_linear_runs_one_at_a_time_in_order() {
        let mut trace = Trace::default();
        let report = SyncCoordinator::new(jobs(), ExecutionOrder::Linear)
            .run(sleep_then, &mut trace, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(trace.max_running, 1);
        assert_eq!(trace.started, vec!["one", "two", "three"]);
        assert!(trace.finished);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
        assert!(!report.interrupted);
    }

    #[tokio::test]
    async fn test_parallel_issues_everything_at_once() {
        let mut trace = Trace::default();
        let report = SyncCoordinator::new(jobs(), ExecutionOrder::Parallel)
            .run(sleep_then, &mut trace, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(trace.max_running, 3);
        assert_eq!(report.failed_jobs().map(|j| j.name).collect::<Vec<_>>(), vec!["two"]);
    }

    #[tokio::test]
    async fn test_empty_run_completes_immediately() {
        let mut trace = Trace::default();
        let report = SyncCoordinator::<Sleep>::new(Vec::new(), ExecutionOrder::Parallel)
            .run(sleep_then, &mut trace, CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(report.succeeded() + report.failed(), 0);
        assert!(trace.finished);
    }

    #[tokio::test]
    async fn test_panicking_worker_fails_only_its_job() {
        let mut trace = Trace::default();
        let report = SyncCoordinator::new(jobs(), ExecutionOrder::Parallel)
            .run(
                |job: Sleep| async move {
                    if job.name == "three" {
                        panic!("boom");
                    }
                    job.ok
                },
                &mut trace,
                CancellationToken::new(),
            )
            .await
            .unwrap();

        let three = &report.jobs[2];
        assert_eq!(report.state_of(three), Some(TaskState::Failed));
        assert_eq!(report.state_of(&report.jobs[0]), Some(TaskState::Succeeded));
    }

    #[tokio::test]
    async fn test_cancel_leaves_unstarted_jobs_pending() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        let mut trace = Trace::default();

        let slow = vec![
            Sleep { name: "a", millis: 10_000, ok: true },
            Sleep { name: "b", millis: 10_000, ok: true },
        ];
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let report = SyncCoordinator::new(slow, ExecutionOrder::Linear)
            .run(sleep_then, &mut trace, cancel)
            .await
            .unwrap();

        assert!(report.interrupted);
        assert_eq!(report.state_of(&report.jobs[0]), Some(TaskState::Running));
        assert_eq!(report.state_of(&report.jobs[1]), Some(TaskState::Pending));
        assert!(trace.finished);
    }
}
