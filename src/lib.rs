//! # goobits-remotes
//!
//! `goobits-remotes` keeps local working copies in sync with several named
//! remotes at once. It powers the `remotes` CLI tool.
//!
//! ## Core Features
//!
//! - **Task Resolution**: Repository and remote selectors become one task per
//!   (working copy, remote) pair.
//! - **Remote Reconciliation**: Remote URLs are corrected before anything runs.
//! - **First-time Setup**: Missing working copies are cloned and wired to every
//!   configured remote on pull.
//! - **Concurrent Operations**: Pull, push and fetch run in parallel or one at a
//!   time, with a live progress view.
//!
//! ## Example
//!
//! ```rust,no_run
//! use goobits_remotes::config::Config;
//! use goobits_remotes::core::resolve_tasks;
//! use goobits_remotes::git::Operation;
//! use std::path::Path;
//!
//! let config = Config::load(Path::new("remotes.yaml")).unwrap();
//! for task in resolve_tasks(&config, "all", &[], Operation::Fetch) {
//!     println!("{} → {}", task.repo_name, task.remote_name);
//! }
//! ```

pub mod commands;
pub mod config;
pub mod core;
pub mod error;
pub mod git;
pub mod utils;

pub use error::{Error, Result};
