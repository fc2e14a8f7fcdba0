//! CLI configuration handling.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CliError, CliResult};

/// Default config file name (lives in project root)
pub const CONFIG_FILE_NAME: &str = "stepwise.toml";

/// Default migrations directory (relative to project root)
pub const MIGRATIONS_DIR: &str = "migrations";

/// Default JSON cache file name (inside the migrations directory)
pub const JSON_CACHE_FILE: &str = stepwise_migrate::CACHE_FILE_NAME;

/// Default SQLite cache file name (inside the migrations directory)
pub const SQLITE_CACHE_FILE: &str = ".stepwise-cache.db";

/// Stepwise CLI configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Migration scripts configuration
    pub migrations: MigrationsConfig,

    /// Status cache configuration
    pub cache: CacheConfig,
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load `explicit` if given, else `stepwise.toml` in `cwd` if present,
    /// else the defaults.
    pub fn discover(cwd: &Path, explicit: Option<&Path>) -> CliResult<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let default_path = cwd.join(CONFIG_FILE_NAME);
        if default_path.is_file() {
            Self::load(&default_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Resolve the effective cache location.
    pub fn cache_path(&self) -> PathBuf {
        if let Some(path) = &self.cache.path {
            return path.clone();
        }

        let file = match self.cache.backend {
            CacheBackend::Json => JSON_CACHE_FILE,
            CacheBackend::Sqlite => SQLITE_CACHE_FILE,
        };
        self.migrations.directory.join(file)
    }
}

/// Migration scripts configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationsConfig {
    /// Directory holding the script definitions
    pub directory: PathBuf,
}

impl Default for MigrationsConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(MIGRATIONS_DIR),
        }
    }
}

/// Status cache configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Storage backend
    pub backend: CacheBackend,

    /// Location of the cache (defaults to a hidden file in the migrations directory)
    pub path: Option<PathBuf>,
}

/// Supported cache backends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// Single JSON document
    #[default]
    Json,
    /// SQLite database (requires the `sqlite` feature)
    Sqlite,
}

impl std::fmt::Display for CacheBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheBackend::Json => write!(f, "json"),
            CacheBackend::Sqlite => write!(f, "sqlite"),
        }
    }
}
