//! Captured outcome of a single git invocation

/// Output, error and exit code of one git process
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OperationResult {
    /// Trimmed stdout followed by stderr
    pub output: String,
    /// Set when the process failed to spawn or exited non-zero
    pub error: Option<String>,
    pub exit_code: i32,
}

impl OperationResult {
    /// A successful invocation with the given output
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            error: None,
            exit_code: 0,
        }
    }

    /// A failed invocation. An empty output is replaced by the error text so
    /// there is always something to show the user.
    pub fn failed(output: impl Into<String>, error: impl Into<String>, exit_code: i32) -> Self {
        let error = error.into();
        let mut output = output.into();
        if output.is_empty() {
            output = error.clone();
        }
        Self {
            output,
            error: Some(error),
            exit_code,
        }
    }

    pub fn success(&self) -> bool {
        self.error.is_none()
    }

    /// First line of the captured output
    pub fn first_line(&self) -> &str {
        crate::utils::first_line(&self.output)
    }
}
