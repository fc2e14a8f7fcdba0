//! Script discovery.
//!
//! A [`ScriptSource`] enumerates the scripts available at some location and
//! checks that each one implements the [`Script`] contract. Two sources are
//! provided:
//!
//! - [`DirectorySource`] reads declarative `<id>.toml` definitions from a
//!   folder and can write freshly generated ones.
//! - [`ScriptRegistry`] holds scripts compiled into the binary.
//!
//! ```text
//! migrations/
//! ├── .stepwise-cache.json         # ignored (hidden)
//! ├── Version20231215120000.toml
//! └── Version20231216090000.toml
//! ```

use std::path::PathBuf;

use crate::error::{MigrateResult, MigrationError};
use crate::script::Script;

mod definition;
mod directory;
mod registry;

pub use definition::{
    CommandScript, SCRIPT_EXTENSION, SCRIPT_TEMPLATE, ScriptDefinition, Steps, render_template,
};
pub use directory::DirectorySource;
pub use registry::ScriptRegistry;

/// A script paired with its identifier.
pub struct DiscoveredScript {
    /// Unique identifier.
    pub id: String,
    /// The runnable script.
    pub script: Box<dyn Script>,
}

impl DiscoveredScript {
    /// Pair an identifier with a script.
    pub fn new(id: impl Into<String>, script: Box<dyn Script>) -> Self {
        Self {
            id: id.into(),
            script,
        }
    }
}

impl std::fmt::Debug for DiscoveredScript {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscoveredScript")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Origin of migration scripts.
#[async_trait::async_trait]
pub trait ScriptSource: Send + Sync {
    /// Human-readable description of the location, for messages.
    fn location(&self) -> String;

    /// Enumerate every script at the location.
    ///
    /// Order is irrelevant. Units that do not implement the script contract
    /// must be reported as [`MigrationError::NonConformingScript`].
    async fn discover(&self) -> MigrateResult<Vec<DiscoveredScript>>;

    /// Write an empty script named `id` and return where it was written.
    async fn write_script(&self, id: &str) -> MigrateResult<PathBuf> {
        let _ = id;
        Err(MigrationError::SourceNotWritable(self.location()))
    }
}
