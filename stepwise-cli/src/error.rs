//! CLI error types and result alias.

use miette::Diagnostic;
use stepwise_migrate::MigrationError;
use thiserror::Error;

/// Result type alias for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// CLI error types
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// IO error
    #[error("IO error: {0}")]
    #[diagnostic(code(stepwise::io))]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    #[diagnostic(code(stepwise::config))]
    Config(String),

    /// Fatal engine error (bad source, unknown script, wrong state)
    #[error("{0}")]
    #[diagnostic(code(stepwise::migration))]
    Migration(#[from] MigrationError),

    /// One or more scripts reported a failure
    #[error("{0} migration script(s) failed")]
    #[diagnostic(code(stepwise::failed))]
    Failed(usize),
}

impl From<toml::de::Error> for CliError {
    fn from(err: toml::de::Error) -> Self {
        CliError::Config(format!("Failed to parse TOML: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_error_is_transparent() {
        let err: CliError = MigrationError::NotPassed("Version1".into()).into();
        assert_eq!(
            err.to_string(),
            "Migration script 'Version1' not found or not in PASSED state"
        );
    }

    #[test]
    fn test_failed_display() {
        assert_eq!(CliError::Failed(2).to_string(), "2 migration script(s) failed");
    }
}
