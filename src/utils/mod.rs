pub(crate) mod terminal;
pub(crate) mod text;

// Public API - utilities used by commands
pub use terminal::{set_terminal_title, set_terminal_title_and_flush};
pub use text::{first_line, indent_output, short_name};
