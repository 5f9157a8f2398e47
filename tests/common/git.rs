//! Git testing utilities

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::process::Command;

fn git(dir: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git").args(args).current_dir(dir).output()?;
    if !output.status.success() {
        anyhow::bail!(
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Sets up a git repository with user config
/// Returns Ok(()) on success, or an error if git is not available
pub fn setup_git_repo(path: &Path) -> Result<()> {
    git(path, &["init"])?;
    git(path, &["config", "user.name", "Test User"])?;
    git(path, &["config", "user.email", "test@example.com"])?;
    // Disable commit signing for tests
    git(path, &["config", "commit.gpgsign", "false"])?;
    Ok(())
}

/// Creates a test commit in the repository
pub fn create_test_commit(path: &Path, file_name: &str, content: &str, message: &str) -> Result<()> {
    std::fs::write(path.join(file_name), content)?;
    git(path, &["add", file_name])?;
    git(path, &["commit", "-m", message])?;
    Ok(())
}

/// Creates a bare repository `<parent>/<name>.git` holding one commit,
/// usable as a remote through its file path
pub fn create_bare_remote(parent: &Path, name: &str) -> Result<PathBuf> {
    let seed = parent.join(format!("{name}-seed"));
    std::fs::create_dir_all(&seed)?;
    setup_git_repo(&seed)?;
    create_test_commit(&seed, "README.md", &format!("# {name}"), "Initial commit")?;

    let bare = parent.join(format!("{name}.git"));
    let bare_str = bare.to_string_lossy().into_owned();
    git(parent, &["clone", "--bare", &seed.to_string_lossy(), &bare_str])?;
    std::fs::remove_dir_all(&seed)?;
    Ok(bare)
}

/// Adds a git remote to a repository
pub fn add_git_remote(path: &Path, remote_name: &str, url: &str) -> Result<()> {
    git(path, &["remote", "add", remote_name, url])?;
    Ok(())
}

/// Every configured remote of the working copy at `path` with its URL, sorted by name
pub fn remote_urls(path: &Path) -> Result<Vec<(String, String)>> {
    let names = git(path, &["remote"])?;
    let mut remotes = Vec::new();
    for name in names.lines().filter(|n| !n.is_empty()) {
        let url = git(path, &["remote", "get-url", name])?;
        remotes.push((name.to_string(), url));
    }
    remotes.sort();
    Ok(remotes)
}

/// Checks if git is available in the system
pub fn is_git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}
