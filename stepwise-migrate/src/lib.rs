//! # stepwise-migrate
//!
//! Migration engine for stepwise.
//!
//! This crate provides:
//! - Discovery of migration scripts from a folder or a compiled registry
//! - A status cache contract with in-memory, JSON file and SQLite backends
//! - Ordered, fail-fast batch application (`migrate`)
//! - Single-script apply (`up`) and rollback (`down`) with state checks
//! - Generation of empty, timestamp-named scripts
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐  discover  ┌────────────────┐  apply/reverse  ┌──────────┐
//! │ ScriptSource │───────────▶│ MigrationEngine│────────────────▶│  Script  │
//! └──────────────┘            └────────────────┘                 └──────────┘
//!                                │        ▲
//!                      add/remove│        │read
//!                                ▼        │
//!                             ┌──────────────┐
//!                             │    Cache     │
//!                             └──────────────┘
//! ```
//!
//! Scripts run in lexicographic identifier order. A script's recorded status
//! is `PASSED`, `FAILED`, or absent (treated as `PENDING`). Only scripts not
//! yet passed are applied; only passed scripts can be reversed.
//!
//! ## Example
//!
//! ```rust,ignore
//! use stepwise_migrate::{MigrationConfig, MigrationEngine};
//!
//! async fn run_migrations() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = MigrationConfig::new().migrations_dir("./migrations");
//!     let engine = MigrationEngine::from_config(&config).await?;
//!
//!     // Creates the cache file on first use
//!     engine.initialize().await?;
//!
//!     for result in engine.migrate().await? {
//!         println!("{} {} {}", result.id(), result.status(), result.message());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Script Files
//!
//! A directory source holds one TOML definition per script:
//!
//! ```toml
//! description = "create the users table"
//!
//! [apply]
//! run = ["sqlite3 app.db < sql/create_users.sql"]
//!
//! [reverse]
//! run = ["sqlite3 app.db 'DROP TABLE users'"]
//! ```

pub mod cache;
pub mod engine;
pub mod error;
pub mod result;
pub mod script;
pub mod source;
pub mod status;

// Re-exports
#[cfg(feature = "sqlite")]
pub use cache::SqliteCache;
pub use cache::{Cache, CacheEntries, JsonFileCache, MemoryCache};
pub use engine::{CACHE_FILE_NAME, MigrationConfig, MigrationEngine, script_id_at};
pub use error::{MigrateResult, MigrationError};
pub use result::{ExecutionResult, ScriptState, summarize};
pub use script::{Script, ScriptError, ScriptOutcome};
pub use source::{
    CommandScript, DirectorySource, DiscoveredScript, ScriptDefinition, ScriptRegistry,
    ScriptSource,
};
pub use status::Status;

/// Attribute for implementing [`Script`], [`Cache`] and [`ScriptSource`].
pub use async_trait::async_trait;
