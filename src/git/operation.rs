//! Sync operation enumeration and its per-operation behavior

use std::fmt;
use std::str::FromStr;

/// The version-control operation a task performs against one remote
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Fetch from the remote and merge into the current branch
    Pull,
    /// Push the current branch to the remote
    Push,
    /// Retrieve objects from the remote without touching the working copy
    Fetch,
}

impl Operation {
    pub const ALL: [Operation; 3] = [Operation::Pull, Operation::Push, Operation::Fetch];

    /// Returns the lowercase command name
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Pull => "pull",
            Operation::Push => "push",
            Operation::Fetch => "fetch",
        }
    }

    /// Returns the progressive verb used in headings
    pub fn verb(&self) -> &'static str {
        match self {
            Operation::Pull => "Pulling",
            Operation::Push => "Pushing",
            Operation::Fetch => "Fetching",
        }
    }

    /// Returns the past-tense label used in summaries
    pub fn past_tense(&self) -> &'static str {
        match self {
            Operation::Pull => "Pulled",
            Operation::Push => "Pushed",
            Operation::Fetch => "Fetched",
        }
    }

    /// Returns the emoji shown in the terminal title while running
    pub fn icon(&self) -> &'static str {
        match self {
            Operation::Pull => "🔽",
            Operation::Push => "🚀",
            Operation::Fetch => "📥",
        }
    }

    /// Builds the git arguments for this operation.
    ///
    /// `branch` is only consulted for pulls; `force` only for pushes.
    pub fn git_args(&self, remote: &str, branch: &str, force: bool) -> Vec<String> {
        match self {
            Operation::Pull => vec!["pull".into(), remote.into(), branch.into()],
            Operation::Push if force => vec!["push".into(), "--force".into(), remote.into()],
            Operation::Push => vec!["push".into(), remote.into()],
            Operation::Fetch => vec!["fetch".into(), remote.into()],
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| format!("unknown operation: {s}"))
    }
}
