//! Small text helpers for rendering task output

/// Indentation applied to each line of captured git output
const OUTPUT_INDENT: &str = "    ";

/// Returns everything before the first newline
pub fn first_line(s: &str) -> &str {
    s.split('\n').next().unwrap_or_default().trim_end_matches('\r')
}

/// Indents every line of `s` for display beneath a task line
pub fn indent_output(s: &str) -> String {
    s.lines()
        .map(|line| format!("{OUTPUT_INDENT}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Display name of a repository: the last segment of `user/name`
pub fn short_name(repo_name: &str) -> &str {
    repo_name.rsplit('/').next().unwrap_or(repo_name)
}
