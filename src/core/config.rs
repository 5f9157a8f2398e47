//! Configuration constants and settings

// Selectors
pub const ALL_SELECTOR: &str = "all";
pub const CURRENT_DIR_SELECTOR: &str = ".";

// Config file location under the XDG config directory
pub const CONFIG_DIR_NAME: &str = "goobits-remotes";
pub const CONFIG_FILE_NAME: &str = "config.yaml";

// Live view refresh; drives the spinner on running tasks
pub const TICK_INTERVAL_MS: u64 = 100;

// Status glyphs
pub const PENDING_GLYPH: &str = "○";
pub const SUCCEEDED_GLYPH: &str = "✓";
pub const FAILED_GLYPH: &str = "✗";
pub const SPINNER_FRAMES: &[&str] = &["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

// UI Constants
pub const INIT_TITLE: &str = "Initialising repositories";
pub const PROGRESS_TEMPLATE: &str = "{wide_msg}";
