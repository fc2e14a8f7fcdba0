//! The script contract implemented by migration authors.

use std::error::Error as StdError;
use std::fmt;

/// Outcome of a single `apply`/`reverse` call.
pub type ScriptOutcome = Result<(), ScriptError>;

/// A unit of change that can be applied and reversed.
///
/// Implementations signal failure by returning a [`ScriptError`]; the engine
/// records the failure and never propagates it further.
#[async_trait::async_trait]
pub trait Script: Send + Sync {
    /// Commit the change.
    async fn apply(&self) -> ScriptOutcome;

    /// Roll the change back.
    async fn reverse(&self) -> ScriptOutcome;
}

#[async_trait::async_trait]
impl<S: Script + ?Sized> Script for std::sync::Arc<S> {
    async fn apply(&self) -> ScriptOutcome {
        (**self).apply().await
    }

    async fn reverse(&self) -> ScriptOutcome {
        (**self).reverse().await
    }
}

/// Failure raised by a script operation.
#[derive(Debug)]
pub struct ScriptError {
    message: String,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl ScriptError {
    /// Create an error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap an underlying error, using its display text as the message.
    pub fn from_error(err: impl StdError + Send + Sync + 'static) -> Self {
        Self {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }

    /// Attach an underlying cause while keeping the message.
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// The failure message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for ScriptError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn StdError + 'static))
    }
}

impl From<std::io::Error> for ScriptError {
    fn from(err: std::io::Error) -> Self {
        Self::from_error(err)
    }
}

impl From<String> for ScriptError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for ScriptError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}
