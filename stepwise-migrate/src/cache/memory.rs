//! In-process cache.

use parking_lot::Mutex;

use super::{Cache, CacheEntries};
use crate::error::MigrateResult;
use crate::status::Status;

#[derive(Debug, Default)]
struct State {
    created: bool,
    entries: CacheEntries,
}

/// Cache that lives only as long as the process.
///
/// Useful for tests and for embedding the engine where persistence is
/// handled elsewhere.
#[derive(Debug, Default)]
pub struct MemoryCache {
    state: Mutex<State>,
}

impl MemoryCache {
    /// Create an uninitialized cache; [`Cache::exists`] reports false until
    /// [`Cache::create`] is called.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache that is already initialized.
    pub fn created() -> Self {
        Self::with_entries(CacheEntries::new())
    }

    /// Create an initialized cache holding `entries`.
    pub fn with_entries(entries: CacheEntries) -> Self {
        Self {
            state: Mutex::new(State {
                created: true,
                entries,
            }),
        }
    }

    /// Copy of the current entries.
    pub fn snapshot(&self) -> CacheEntries {
        self.state.lock().entries.clone()
    }
}

#[async_trait::async_trait]
impl Cache for MemoryCache {
    async fn exists(&self) -> MigrateResult<bool> {
        Ok(self.state.lock().created)
    }

    async fn create(&self) -> MigrateResult<()> {
        let mut state = self.state.lock();
        state.created = true;
        state.entries.clear();
        Ok(())
    }

    async fn read(&self) -> MigrateResult<CacheEntries> {
        Ok(self.snapshot())
    }

    async fn add(&self, id: &str, status: Status) -> MigrateResult<()> {
        self.state.lock().entries.insert(id.to_string(), status);
        Ok(())
    }

    async fn remove(&self, id: &str) -> MigrateResult<()> {
        self.state.lock().entries.remove(id);
        Ok(())
    }
}
