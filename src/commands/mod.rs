//! Command implementations behind the `remotes` binary

pub mod sync;
