// Internal modules - not part of public API
pub(crate) mod config;
pub(crate) mod progress;
pub(crate) mod stats;

pub mod init;
pub mod reconcile;
pub mod scheduler;
pub mod sync;
pub mod task;


// Public API - curated exports only
pub mod api;

// Re-export key items at module level for convenience
pub use api::*;
