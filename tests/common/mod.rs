//! Common test utilities and helpers
#![allow(dead_code, unused_imports)]

pub mod fake;
pub mod fixtures;
pub mod git;

pub use self::fake::{FakeGit, RecordingView};
pub use self::fixtures::ConfigBuilder;
pub use self::git::{create_bare_remote, is_git_available, remote_urls, setup_git_repo};
