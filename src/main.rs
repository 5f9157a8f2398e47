//! remotes: keep working copies in sync with several remotes at once

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use goobits_remotes::commands::sync::{handle_sync_command, SyncArgs};
use goobits_remotes::core::ALL_SELECTOR;
use goobits_remotes::git::Operation;

#[derive(Parser)]
#[command(name = "remotes")]
#[command(about = "Pull, push and fetch tracked repositories across several remotes")]
#[command(version)]
struct Cli {
    /// Use an alternate config file
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Show the full output of every git command
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Run one operation at a time instead of all at once
    #[arg(short, long, global = true)]
    linear: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pull from every selected remote, cloning missing repositories first
    Pull(Selection),
    /// Push to every selected remote
    Push {
        /// Overwrite the remote branch
        #[arg(short, long)]
        force: bool,

        #[command(flatten)]
        selection: Selection,
    },
    /// Fetch from every selected remote
    Fetch(Selection),
}

#[derive(Args)]
struct Selection {
    /// Repository name, short name, `.` for the current directory, or `all`
    #[arg(default_value = ALL_SELECTOR)]
    repo: String,

    /// Remote names or aliases; every configured remote when omitted
    remotes: Vec<String>,
}

impl Cli {
    fn into_sync_args(self) -> SyncArgs {
        let (operation, force, selection) = match self.command {
            Commands::Pull(selection) => (Operation::Pull, false, selection),
            Commands::Push { force, selection } => (Operation::Push, force, selection),
            Commands::Fetch(selection) => (Operation::Fetch, false, selection),
        };
        SyncArgs {
            operation,
            repo: selection.repo,
            remotes: selection.remotes,
            config_path: self.config,
            verbose: self.verbose,
            force,
            linear: self.linear,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    if let Err(e) = handle_sync_command(cli.into_sync_args()).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
