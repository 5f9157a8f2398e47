pub mod operation;
pub mod operations;
pub mod result;

// Re-export commonly used items
pub use operation::Operation;
pub use operations::{run_git, GitExecutor, SystemGit, DEFAULT_CLONE_REMOTE};
pub use result::OperationResult;
