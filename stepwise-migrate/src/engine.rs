//! Migration engine implementation.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::path::PathBuf;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::cache::{Cache, CacheEntries, JsonFileCache};
use crate::error::{MigrateResult, MigrationError};
use crate::result::{ExecutionResult, ScriptState, summarize};
use crate::script::Script;
use crate::source::{DirectorySource, ScriptSource};
use crate::status::Status;

/// Prefix of generated script identifiers.
pub const ID_PREFIX: &str = "Version";

/// Timestamp layout of generated script identifiers.
pub const ID_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Default cache file name, hidden so directory discovery skips it.
pub const CACHE_FILE_NAME: &str = ".stepwise-cache.json";

/// Configuration for a directory-backed engine.
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    /// Path to the migrations directory.
    pub migrations_dir: PathBuf,
    /// Path to the JSON cache file.
    pub cache_file: PathBuf,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            migrations_dir: PathBuf::from("./migrations"),
            cache_file: PathBuf::from("./migrations").join(CACHE_FILE_NAME),
        }
    }
}

impl MigrationConfig {
    /// Create a new configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the migrations directory.
    pub fn migrations_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.migrations_dir = dir.into();
        self
    }

    /// Set the cache file path.
    pub fn cache_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_file = path.into();
        self
    }
}

/// Build the identifier a script generated at `at` receives.
pub fn script_id_at(at: DateTime<Utc>) -> String {
    format!("{}{}", ID_PREFIX, at.format(ID_TIMESTAMP_FORMAT))
}

/// The main migration engine.
///
/// Owns the scripts discovered at construction, ordered by identifier, and
/// drives their transitions against the cache.
pub struct MigrationEngine<C: Cache> {
    source: Box<dyn ScriptSource>,
    cache: C,
    scripts: BTreeMap<String, Box<dyn Script>>,
}

impl MigrationEngine<JsonFileCache> {
    /// Create an engine over a migrations directory and a JSON cache file.
    pub async fn from_config(config: &MigrationConfig) -> MigrateResult<Self> {
        Self::new(
            DirectorySource::new(&config.migrations_dir).ignoring(&config.cache_file),
            JsonFileCache::new(&config.cache_file),
        )
        .await
    }
}

impl<C: Cache> MigrationEngine<C> {
    /// Discover the scripts of `source` and bind them to `cache`.
    ///
    /// Fails if the source is missing, a unit does not implement the script
    /// contract, or two units share an identifier. No cache I/O happens here.
    pub async fn new(source: impl ScriptSource + 'static, cache: C) -> MigrateResult<Self> {
        let discovered = source.discover().await?;

        let mut scripts = BTreeMap::new();
        for item in discovered {
            match scripts.entry(item.id) {
                Entry::Vacant(slot) => {
                    slot.insert(item.script);
                }
                Entry::Occupied(slot) => {
                    return Err(MigrationError::DuplicateScript(slot.key().clone()));
                }
            }
        }

        debug!(
            source = %source.location(),
            count = scripts.len(),
            "Discovered migration scripts"
        );

        Ok(Self {
            source: Box::new(source),
            cache,
            scripts,
        })
    }

    /// Identifiers of the discovered scripts, in execution order.
    pub fn script_ids(&self) -> impl Iterator<Item = &str> {
        self.scripts.keys().map(String::as_str)
    }

    /// Whether `id` was discovered.
    pub fn contains(&self, id: &str) -> bool {
        self.scripts.contains_key(id)
    }

    /// The cache this engine records into.
    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Create the cache store if it does not exist yet.
    ///
    /// Returns `true` when the store was created by this call.
    pub async fn initialize(&self) -> MigrateResult<bool> {
        if self.cache.exists().await? {
            return Ok(false);
        }
        info!("Creating migration cache");
        self.cache.create().await?;
        Ok(true)
    }

    /// Write a new empty script named after the current time.
    ///
    /// The new script is not visible to this engine; build a new one to pick
    /// it up.
    pub async fn generate(&self) -> MigrateResult<String> {
        self.generate_at(Utc::now()).await
    }

    /// Write a new empty script named after `at`.
    pub async fn generate_at(&self, at: DateTime<Utc>) -> MigrateResult<String> {
        let id = script_id_at(at);
        let path = self.source.write_script(&id).await?;
        info!(id = %id, path = %path.display(), "Generated migration script");
        Ok(id)
    }

    /// Apply every script not yet passed, in identifier order.
    ///
    /// Stops after the first failed script; progress made before it stays
    /// recorded. Script failures are returned as results, never as errors.
    pub async fn migrate(&self) -> MigrateResult<Vec<ExecutionResult>> {
        let start = Instant::now();
        let entries = self.cache.read().await?;
        let mut results = Vec::new();

        for (id, script) in &self.scripts {
            if !is_applicable(&entries, id) {
                continue;
            }

            let result = self.go_up(id, script.as_ref()).await?;
            let failed = result.is_failure();
            results.push(result);

            if failed {
                break;
            }
        }

        info!(
            summary = %summarize(&results),
            duration_ms = start.elapsed().as_millis() as u64,
            "Migrate finished"
        );
        Ok(results)
    }

    /// Apply a single script that is pending or failed.
    pub async fn up(&self, id: &str) -> MigrateResult<ExecutionResult> {
        let script = self.find(id)?;
        let entries = self.cache.read().await?;

        if !is_applicable(&entries, id) {
            return Err(MigrationError::AlreadyPassed(id.to_string()));
        }

        self.go_up(id, script).await
    }

    /// Reverse a single script that is passed.
    pub async fn down(&self, id: &str) -> MigrateResult<ExecutionResult> {
        let script = self.find(id)?;
        let entries = self.cache.read().await?;

        if !is_reversible(&entries, id) {
            return Err(MigrationError::NotPassed(id.to_string()));
        }

        self.go_down(id, script).await
    }

    /// Recorded status of every discovered script, in identifier order.
    pub async fn status(&self) -> MigrateResult<Vec<ScriptState>> {
        let entries = self.cache.read().await?;

        Ok(self
            .scripts
            .keys()
            .map(|id| ScriptState {
                id: id.clone(),
                status: recorded_status(&entries, id),
            })
            .collect())
    }

    fn find(&self, id: &str) -> MigrateResult<&dyn Script> {
        self.scripts
            .get(id)
            .map(|s| s.as_ref())
            .ok_or_else(|| MigrationError::UnknownScript(id.to_string()))
    }

    /// Run `apply`, record the outcome and turn it into a result.
    async fn go_up(&self, id: &str, script: &dyn Script) -> MigrateResult<ExecutionResult> {
        let start = Instant::now();

        match script.apply().await {
            Ok(()) => {
                self.cache.add(id, Status::Passed).await?;
                info!(
                    id,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Applied migration script"
                );
                Ok(ExecutionResult::passed(id))
            }
            Err(error) => {
                self.cache.add(id, Status::Failed).await?;
                warn!(id, error = %error, "Migration script failed to apply");
                Ok(ExecutionResult::failed(id, error))
            }
        }
    }

    /// Run `reverse`; only a successful reversal touches the cache.
    async fn go_down(&self, id: &str, script: &dyn Script) -> MigrateResult<ExecutionResult> {
        let start = Instant::now();

        match script.reverse().await {
            Ok(()) => {
                self.cache.remove(id).await?;
                info!(
                    id,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Reversed migration script"
                );
                Ok(ExecutionResult::passed(id))
            }
            Err(error) => {
                warn!(id, error = %error, "Migration script failed to reverse");
                Ok(ExecutionResult::failed(id, error))
            }
        }
    }
}

/// Status recorded for `id`; no entry counts as pending.
fn recorded_status(entries: &CacheEntries, id: &str) -> Status {
    entries.get(id).copied().unwrap_or(Status::Pending)
}

fn is_applicable(entries: &CacheEntries, id: &str) -> bool {
    recorded_status(entries, id).can_apply()
}

fn is_reversible(entries: &CacheEntries, id: &str) -> bool {
    recorded_status(entries, id).can_reverse()
}
