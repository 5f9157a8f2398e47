//! Live view and final summary for sync and init runs.

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use super::coordinator::{Job, View};
use super::state::{SyncState, TaskState};
use crate::core::config::{FAILED_GLYPH, PENDING_GLYPH, SPINNER_FRAMES, SUCCEEDED_GLYPH};
use crate::core::init::{InitResult, RepoInit};
use crate::core::progress::{
    create_footer_progress_bar, create_progress_bar, create_progress_style,
    create_separator_progress_bar,
};
use crate::core::stats::RunStatistics;
use crate::core::task::Task;
use crate::error::Result;
use crate::git::OperationResult;
use crate::utils::{first_line, indent_output};

/// How a job is described on its line of the view
pub trait Render: Job {
    /// Text after the status glyph
    fn label(&self) -> String;

    /// Output appended to the line, if any. A leading newline puts it on
    /// the lines below.
    fn detail(output: &Self::Output, state: TaskState, verbose: bool) -> Option<String>;
}

impl Render for Task {
    fn label(&self) -> String {
        format!("{} → {}", self.short_name(), self.remote_name)
    }

    fn detail(output: &OperationResult, state: TaskState, verbose: bool) -> Option<String> {
        if output.output.is_empty() {
            None
        } else if verbose {
            Some(format!("\n{}", indent_output(&output.output)))
        } else if state == TaskState::Failed {
            Some(format!(" {}", output.first_line()))
        } else {
            None
        }
    }
}

impl Render for RepoInit {
    fn label(&self) -> String {
        self.short_name().to_string()
    }

    fn detail(output: &InitResult, _state: TaskState, verbose: bool) -> Option<String> {
        if !output.output.is_empty() && (verbose || !output.success) {
            Some(format!("\n{}", indent_output(&output.output)))
        } else {
            None
        }
    }
}

/// Status glyph; running tasks show the spinner frame
pub fn glyph(state: TaskState, frame: usize) -> &'static str {
    match state {
        TaskState::Pending => PENDING_GLYPH,
        TaskState::Running => SPINNER_FRAMES[frame % SPINNER_FRAMES.len()],
        TaskState::Succeeded => SUCCEEDED_GLYPH,
        TaskState::Failed => FAILED_GLYPH,
    }
}

/// One line of the view for `job`
pub fn render_line<J: Render>(
    job: &J,
    state: &SyncState<J::Key, J::Output>,
    verbose: bool,
    frame: usize,
) -> String {
    let key = job.key();
    let task_state = state.state(&key).unwrap_or(TaskState::Pending);
    let detail = state
        .result(&key)
        .and_then(|output| J::detail(output, task_state, verbose))
        .unwrap_or_default();
    format!("{} {}{}", glyph(task_state, frame), job.label(), detail)
}

/// Full text of the view: title, one line per job, optional summary
pub fn render_view<J: Render>(
    title: &str,
    jobs: &[J],
    state: &SyncState<J::Key, J::Output>,
    verbose: bool,
    summary: Option<&str>,
) -> String {
    let mut view = format!("{title}\n\n");
    for job in jobs {
        view.push_str(&render_line(job, state, verbose, 0));
        view.push('\n');
    }
    if let Some(summary) = summary {
        view.push('\n');
        view.push_str(summary);
        view.push('\n');
    }
    view
}

/// Draws the view with indicatif while the run is live, then prints the
/// final text once the loop ends
pub struct TerminalRenderer {
    title: String,
    verbose: bool,
    show_summary: bool,
    multi: MultiProgress,
    style: ProgressStyle,
    bars: Vec<ProgressBar>,
    footer: Option<ProgressBar>,
    frame: usize,
}

impl TerminalRenderer {
    pub fn new(title: impl Into<String>, verbose: bool) -> Result<Self> {
        Ok(Self {
            title: title.into(),
            verbose,
            show_summary: true,
            multi: MultiProgress::new(),
            style: create_progress_style()?,
            bars: Vec::new(),
            footer: None,
            frame: 0,
        })
    }

    /// Whether the final `N succeeded` line is printed
    pub fn with_summary(mut self, show_summary: bool) -> Self {
        self.show_summary = show_summary;
        self
    }

    fn ensure_bars<J: Render>(&mut self, jobs: &[J]) {
        if !self.bars.is_empty() || jobs.is_empty() {
            return;
        }
        create_progress_bar(&self.multi, &self.style, &self.title).finish();
        create_separator_progress_bar(&self.multi, &self.style);
        self.bars = jobs
            .iter()
            .map(|job| create_progress_bar(&self.multi, &self.style, &job.label()))
            .collect();
        create_separator_progress_bar(&self.multi, &self.style);
        self.footer = Some(create_footer_progress_bar(&self.multi, &self.style));
    }

    fn update<J: Render>(&mut self, jobs: &[J], state: &SyncState<J::Key, J::Output>) {
        self.ensure_bars(jobs);
        for (job, bar) in jobs.iter().zip(&self.bars) {
            // Live lines stay single-line; full output is printed at the end
            let line = render_line(job, state, self.verbose, self.frame);
            bar.set_message(first_line(&line).to_string());
        }
        if let Some(footer) = &self.footer {
            footer.set_message(RunStatistics::from_state(state).generate_progress());
        }
    }
}

impl<J: Render> View<J> for TerminalRenderer {
    fn refresh(&mut self, jobs: &[J], state: &SyncState<J::Key, J::Output>) {
        self.update(jobs, state);
    }

    fn tick(&mut self, jobs: &[J], state: &SyncState<J::Key, J::Output>) {
        self.frame = self.frame.wrapping_add(1);
        self.update(jobs, state);
    }

    fn finish(&mut self, jobs: &[J], state: &SyncState<J::Key, J::Output>, interrupted: bool) {
        for bar in self.bars.iter().chain(self.footer.iter()) {
            bar.finish();
        }
        let _ = self.multi.clear();

        let stats = RunStatistics::from_state(state);
        let summary = if interrupted {
            Some(stats.generate_interrupted())
        } else if self.show_summary {
            Some(stats.generate_summary())
        } else {
            None
        };
        print!(
            "{}",
            render_view(&self.title, jobs, state, self.verbose, summary.as_deref())
        );
        println!();
    }
}
