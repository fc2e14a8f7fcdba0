//! # Stepwise
//!
//! Ordered, reversible script migrations with a pluggable status cache.
//!
//! Stepwise provides:
//! - Scripts discovered from a folder of TOML definitions or registered in code
//! - Lexicographic, fail-fast application of every script not yet passed
//! - Single-script `up` and `down` transitions guarded by recorded state
//! - In-memory, JSON file and (with the `sqlite` feature) SQLite caches
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stepwise::prelude::*;
//!
//! struct CreateUsers;
//!
//! #[async_trait]
//! impl Script for CreateUsers {
//!     async fn apply(&self) -> ScriptOutcome {
//!         // CREATE TABLE users ...
//!         Ok(())
//!     }
//!
//!     async fn reverse(&self) -> ScriptOutcome {
//!         // DROP TABLE users
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), MigrationError> {
//!     let registry = ScriptRegistry::new().with("Version20240101000000", CreateUsers);
//!     let engine = MigrationEngine::new(registry, JsonFileCache::new("migrations.json")).await?;
//!     engine.initialize().await?;
//!
//!     for result in engine.migrate().await? {
//!         println!("{} {}", result.id(), result.status());
//!     }
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// The migration engine, caches and script sources.
pub mod migrate {
    pub use stepwise_migrate::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::migrate::{
        Cache, ExecutionResult, JsonFileCache, MemoryCache, MigrateResult, MigrationEngine,
        MigrationError, Script, ScriptError, ScriptOutcome, ScriptRegistry, Status, async_trait,
    };
}

// Re-export key types at the crate root
pub use migrate::{
    DirectorySource, ExecutionResult, MigrationConfig, MigrationEngine, MigrationError, Script,
    ScriptRegistry, Status, async_trait,
};
