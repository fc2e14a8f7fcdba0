//! Script status persistence.
//!
//! The [`Cache`] trait is the only durable record of script state. The engine
//! reads a full snapshot once per operation and writes a single entry right
//! after each script invocation, so backends need per-entry durability but no
//! multi-key transactions.
//!
//! ```text
//! ┌──────────┐  read()   ┌────────────┐
//! │  Engine  │◀──────────│   Cache    │
//! │          │──────────▶│ (id→Status)│
//! └──────────┘ add/remove└────────────┘
//! ```

use std::collections::BTreeMap;

use crate::error::MigrateResult;
use crate::status::Status;

mod json;
mod memory;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use json::JsonFileCache;
pub use memory::MemoryCache;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteCache;

/// Snapshot of every cache entry, ordered by identifier.
pub type CacheEntries = BTreeMap<String, Status>;

/// Persistent mapping from script identifier to its last known status.
#[async_trait::async_trait]
pub trait Cache: Send + Sync {
    /// Check whether the backing store has been initialized.
    async fn exists(&self) -> MigrateResult<bool>;

    /// Initialize the backing store. Only called when [`Cache::exists`] is false.
    async fn create(&self) -> MigrateResult<()>;

    /// Read every entry.
    async fn read(&self) -> MigrateResult<CacheEntries>;

    /// Insert or overwrite the entry for `id`.
    async fn add(&self, id: &str, status: Status) -> MigrateResult<()>;

    /// Delete the entry for `id`. Missing entries are ignored.
    async fn remove(&self, id: &str) -> MigrateResult<()>;
}

#[async_trait::async_trait]
impl<C: Cache + ?Sized> Cache for Box<C> {
    async fn exists(&self) -> MigrateResult<bool> {
        (**self).exists().await
    }

    async fn create(&self) -> MigrateResult<()> {
        (**self).create().await
    }

    async fn read(&self) -> MigrateResult<CacheEntries> {
        (**self).read().await
    }

    async fn add(&self, id: &str, status: Status) -> MigrateResult<()> {
        (**self).add(id, status).await
    }

    async fn remove(&self, id: &str) -> MigrateResult<()> {
        (**self).remove(id).await
    }
}

#[async_trait::async_trait]
impl<C: Cache + ?Sized> Cache for std::sync::Arc<C> {
    async fn exists(&self) -> MigrateResult<bool> {
        (**self).exists().await
    }

    async fn create(&self) -> MigrateResult<()> {
        (**self).create().await
    }

    async fn read(&self) -> MigrateResult<CacheEntries> {
        (**self).read().await
    }

    async fn add(&self, id: &str, status: Status) -> MigrateResult<()> {
        (**self).add(id, status).await
    }

    async fn remove(&self, id: &str) -> MigrateResult<()> {
        (**self).remove(id).await
    }
}
