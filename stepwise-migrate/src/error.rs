//! Error types for the migration engine.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for migration operations.
pub type MigrateResult<T> = Result<T, MigrationError>;

/// Errors that abort a migration operation.
///
/// Failures raised by a script's own `apply`/`reverse` are not represented
/// here; those are carried as data inside an
/// [`ExecutionResult`](crate::result::ExecutionResult).
#[derive(Debug, Error)]
pub enum MigrationError {
    /// File system error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The migration source location is missing or not a directory.
    #[error("Migration folder not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// A discovered unit does not implement the script contract.
    #[error("Script '{id}' is not a valid migration script: {reason}")]
    NonConformingScript {
        /// Offending identifier.
        id: String,
        /// Why the unit was rejected.
        reason: String,
    },

    /// Two discovered units share an identifier.
    #[error("Duplicate migration script '{0}'")]
    DuplicateScript(String),

    /// The identifier is not among the discovered scripts.
    #[error("Migration script '{0}' not known")]
    UnknownScript(String),

    /// `up` was requested for a script already recorded as passed.
    #[error("Migration script '{0}' already in PASSED state")]
    AlreadyPassed(String),

    /// `down` was requested for a script not recorded as passed.
    #[error("Migration script '{0}' not found or not in PASSED state")]
    NotPassed(String),

    /// The script source cannot receive generated scripts.
    #[error("Migration source is not writable: {0}")]
    SourceNotWritable(String),

    /// A generated script would overwrite an existing definition.
    #[error("Migration script '{0}' already exists")]
    ScriptExists(String),

    /// The status cache failed.
    #[error("Cache error: {0}")]
    Cache(String),
}

impl MigrationError {
    /// Create a cache error.
    pub fn cache(msg: impl Into<String>) -> Self {
        Self::Cache(msg.into())
    }

    /// Create a non-conforming script error.
    pub fn non_conforming(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::NonConformingScript {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Check if this error reports a violated transition precondition.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::UnknownScript(_) | Self::AlreadyPassed(_) | Self::NotPassed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MigrationError::UnknownScript("Version20231215120000".to_string());
        assert!(err.to_string().contains("Version20231215120000"));
        assert!(err.to_string().contains("not known"));
    }

    #[test]
    fn test_non_conforming_display() {
        let err = MigrationError::non_conforming("Version1", "missing [reverse] table");
        let msg = err.to_string();
        assert!(msg.contains("Version1"));
        assert!(msg.contains("missing [reverse] table"));
    }

    #[test]
    fn test_source_not_found_display() {
        let err = MigrationError::SourceNotFound(PathBuf::from("/nowhere/migrations"));
        assert_eq!(
            err.to_string(),
            "Migration folder not found: /nowhere/migrations"
        );
    }

    #[test]
    fn test_is_precondition() {
        assert!(MigrationError::AlreadyPassed("a".into()).is_precondition());
        assert!(MigrationError::NotPassed("a".into()).is_precondition());
        assert!(MigrationError::UnknownScript("a".into()).is_precondition());
        assert!(!MigrationError::cache("disk full").is_precondition());
        assert!(!MigrationError::DuplicateScript("a".into()).is_precondition());
    }
}
