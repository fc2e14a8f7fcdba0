//! Outcome records returned by the engine.

use crate::script::ScriptError;
use crate::status::Status;

/// Outcome of one `apply`/`reverse` invocation.
///
/// The status is [`Status::Passed`] when the operation succeeded and
/// [`Status::Failed`] when it raised an error, in which case the error is
/// available through [`ExecutionResult::error`].
#[derive(Debug)]
pub struct ExecutionResult {
    id: String,
    status: Status,
    error: Option<ScriptError>,
}

impl ExecutionResult {
    /// A successful invocation.
    pub fn passed(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: Status::Passed,
            error: None,
        }
    }

    /// A failed invocation carrying its error.
    pub fn failed(id: impl Into<String>, error: ScriptError) -> Self {
        Self {
            id: id.into(),
            status: Status::Failed,
            error: Some(error),
        }
    }

    /// Script identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Resulting status.
    pub fn status(&self) -> Status {
        self.status
    }

    /// Failure detail, if the invocation failed.
    pub fn error(&self) -> Option<&ScriptError> {
        self.error.as_ref()
    }

    /// Take ownership of the failure detail.
    pub fn into_error(self) -> Option<ScriptError> {
        self.error
    }

    /// Whether the invocation failed.
    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }

    /// Failure message, or an empty string on success.
    pub fn message(&self) -> &str {
        self.error.as_ref().map_or("", ScriptError::message)
    }
}

/// A discovered script and its recorded status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptState {
    /// Script identifier.
    pub id: String,
    /// Recorded status ([`Status::Pending`] when the cache has no entry).
    pub status: Status,
}

/// One-line summary of a batch, e.g. `2 passed, 1 failed`.
pub fn summarize(results: &[ExecutionResult]) -> String {
    if results.is_empty() {
        return "No scripts executed".to_string();
    }

    let failed = results.iter().filter(|r| r.is_failure()).count();
    let passed = results.len() - failed;

    let mut parts = Vec::new();
    if passed > 0 {
        parts.push(format!("{} passed", passed));
    }
    if failed > 0 {
        parts.push(format!("{} failed", failed));
    }
    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_result() {
        let result = ExecutionResult::failed("Foo\\Bar", ScriptError::new("test"));
        assert_eq!(result.id(), "Foo\\Bar");
        assert_eq!(result.status(), Status::Failed);
        assert!(result.is_failure());
        assert_eq!(result.message(), "test");
        assert_eq!(result.into_error().unwrap().message(), "test");
    }

    #[test]
    fn test_passed_result() {
        let result = ExecutionResult::passed("Version20240101000000");
        assert_eq!(result.status(), Status::Passed);
        assert!(!result.is_failure());
        assert!(result.error().is_none());
        assert_eq!(result.message(), "");
    }

    #[test]
    fn test_summarize() {
        assert_eq!(summarize(&[]), "No scripts executed");

        let results = vec![
            ExecutionResult::passed("a"),
            ExecutionResult::passed("b"),
            ExecutionResult::failed("c", ScriptError::new("boom")),
        ];
        assert_eq!(summarize(&results), "2 passed, 1 failed");
        assert_eq!(summarize(&results[..1]), "1 passed");
    }
}
