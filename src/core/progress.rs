//! Progress bar management for the live view

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use super::config::PROGRESS_TEMPLATE;
use crate::error::Result;

/// Creates the single-message style every line of the live view uses
pub(crate) fn create_progress_style() -> Result<ProgressStyle> {
    Ok(ProgressStyle::default_bar().template(PROGRESS_TEMPLATE)?)
}

/// Creates and configures a progress bar holding one line of text
pub(crate) fn create_progress_bar(
    multi: &MultiProgress,
    style: &ProgressStyle,
    message: &str,
) -> ProgressBar {
    let pb = multi.add(ProgressBar::new(0));
    pb.set_style(style.clone());
    pb.set_message(message.to_string());
    pb
}

/// Creates a separator progress bar for visual spacing between sections
/// Returns a finished ProgressBar that provides visual separation
pub(crate) fn create_separator_progress_bar(
    multi: &MultiProgress,
    style: &ProgressStyle,
) -> ProgressBar {
    let separator_pb = create_progress_bar(multi, style, " ");
    separator_pb.finish();
    separator_pb
}

/// Creates a footer progress bar for displaying summary information
pub(crate) fn create_footer_progress_bar(
    multi: &MultiProgress,
    style: &ProgressStyle,
) -> ProgressBar {
    create_progress_bar(multi, style, "")
}
