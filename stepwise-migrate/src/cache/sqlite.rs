//! SQLite-backed cache.

use std::path::Path;

use rusqlite::{OptionalExtension, params};
use tokio_rusqlite::Connection;
use tracing::debug;

use super::{Cache, CacheEntries};
use crate::error::{MigrateResult, MigrationError};
use crate::status::Status;

/// Name of the table holding script statuses.
pub const TABLE_NAME: &str = "_stepwise_migrations";

const INIT_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS "_stepwise_migrations" (
    id TEXT PRIMARY KEY NOT NULL,
    status INTEGER NOT NULL
);
"#;

const EXISTS_SQL: &str = "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1";
const SELECT_SQL: &str = r#"SELECT id, status FROM "_stepwise_migrations" ORDER BY id"#;
const UPSERT_SQL: &str = r#"
INSERT INTO "_stepwise_migrations" (id, status) VALUES (?1, ?2)
ON CONFLICT(id) DO UPDATE SET status = excluded.status
"#;
const DELETE_SQL: &str = r#"DELETE FROM "_stepwise_migrations" WHERE id = ?1"#;

/// Cache stored in a SQLite table.
///
/// Statements run on the connection's background thread. Each `add`/`remove`
/// is a single autocommit statement, so every entry is durable on return.
pub struct SqliteCache {
    conn: Connection,
}

impl SqliteCache {
    /// Open (or create) the database file at `path`.
    pub async fn open(path: impl AsRef<Path>) -> MigrateResult<Self> {
        let conn = Connection::open(path.as_ref())
            .await
            .map_err(sqlite_error)?;
        Ok(Self::from_connection(conn))
    }

    /// Open a private in-memory database.
    pub async fn open_in_memory() -> MigrateResult<Self> {
        let conn = Connection::open_in_memory().await.map_err(sqlite_error)?;
        Ok(Self::from_connection(conn))
    }

    /// Wrap an existing connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }
}

fn sqlite_error(err: tokio_rusqlite::Error) -> MigrationError {
    MigrationError::cache(format!("SQLite: {}", err))
}

#[async_trait::async_trait]
impl Cache for SqliteCache {
    async fn exists(&self) -> MigrateResult<bool> {
        self.conn
            .call(|conn| {
                let found: Option<i64> = conn
                    .query_row(EXISTS_SQL, params![TABLE_NAME], |row| row.get(0))
                    .optional()?;
                Ok(found.is_some())
            })
            .await
            .map_err(sqlite_error)
    }

    async fn create(&self) -> MigrateResult<()> {
        debug!(table = TABLE_NAME, "Creating cache table");
        self.conn
            .call(|conn| Ok(conn.execute_batch(INIT_SQL)?))
            .await
            .map_err(sqlite_error)
    }

    async fn read(&self) -> MigrateResult<CacheEntries> {
        let rows = self
            .conn
            .call(|conn| {
                let mut stmt = conn.prepare(SELECT_SQL)?;
                let rows = stmt
                    .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(sqlite_error)?;

        let mut entries = CacheEntries::new();
        for (id, code) in rows {
            let status = Status::from_code(code).ok_or_else(|| {
                MigrationError::cache(format!("Unknown status code {} for '{}'", code, id))
            })?;
            entries.insert(id, status);
        }
        Ok(entries)
    }

    async fn add(&self, id: &str, status: Status) -> MigrateResult<()> {
        debug!(id, %status, "Recording script status");
        let id = id.to_string();
        let code = status.code();
        self.conn
            .call(move |conn| {
                conn.execute(UPSERT_SQL, params![id, code])?;
                Ok(())
            })
            .await
            .map_err(sqlite_error)
    }

    async fn remove(&self, id: &str) -> MigrateResult<()> {
        debug!(id, "Removing script status");
        let id = id.to_string();
        self.conn
            .call(move |conn| {
                conn.execute(DELETE_SQL, params![id])?;
                Ok(())
            })
            .await
            .map_err(sqlite_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_table_lifecycle() {
        let cache = SqliteCache::open_in_memory().await.unwrap();
        assert!(!cache.exists().await.unwrap());

        cache.create().await.unwrap();
        assert!(cache.exists().await.unwrap());

        cache.add("Version1", Status::Failed).await.unwrap();
        cache.add("Version1", Status::Passed).await.unwrap();
        cache.add("Version2", Status::Failed).await.unwrap();

        let entries = cache.read().await.unwrap();
        assert_eq!(entries.get("Version1"), Some(&Status::Passed));
        assert_eq!(entries.get("Version2"), Some(&Status::Failed));

        cache.remove("Version1").await.unwrap();
        cache.remove("missing").await.unwrap();
        assert_eq!(cache.read().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_persists_across_connections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.db");

        let cache = SqliteCache::open(&path).await.unwrap();
        cache.create().await.unwrap();
        cache.add("Version1", Status::Passed).await.unwrap();
        drop(cache);

        let reopened = SqliteCache::open(&path).await.unwrap();
        assert!(reopened.exists().await.unwrap());
        assert_eq!(
            reopened.read().await.unwrap().get("Version1"),
            Some(&Status::Passed)
        );
    }
}
