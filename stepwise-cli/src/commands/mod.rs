//! CLI command implementations.

pub mod generate;
pub mod migrate;
pub mod status;
pub mod transition;

use std::path::{Path, PathBuf};

use stepwise_migrate::{
    Cache, DirectorySource, ExecutionResult, JsonFileCache, MigrationEngine, MigrationError,
    summarize,
};

use crate::cli::GlobalArgs;
use crate::config::{CacheBackend, Config};
use crate::error::{CliError, CliResult};
use crate::output::{self, Cell, Table};

/// Engine over a directory source and whichever cache backend is configured
pub type Engine = MigrationEngine<Box<dyn Cache>>;

/// Merge configuration file and command-line overrides.
pub fn resolve_config(cwd: &Path, global: &GlobalArgs) -> CliResult<Config> {
    let mut config = Config::discover(cwd, global.config.as_deref())?;

    if let Some(dir) = &global.migrations {
        config.migrations.directory = dir.clone();
    }
    if let Some(backend) = global.backend {
        config.cache.backend = backend;
    }
    if let Some(path) = &global.cache {
        config.cache.path = Some(path.clone());
    }

    Ok(config)
}

/// Build the engine for the current project and make sure its cache exists.
pub async fn open_engine(global: &GlobalArgs) -> CliResult<Engine> {
    let cwd = std::env::current_dir()?;
    let config = resolve_config(&cwd, global)?;

    let dir = absolutize(&cwd, &config.migrations.directory);
    // Checked before the cache is touched, which could create the directory.
    if !dir.is_dir() {
        return Err(MigrationError::SourceNotFound(dir).into());
    }

    let cache_path = absolutize(&cwd, &config.cache_path());
    let cache = open_cache(config.cache.backend, cache_path.clone()).await?;
    tracing::debug!(
        migrations = %dir.display(),
        backend = %config.cache.backend,
        "Opening migration engine"
    );

    let source = DirectorySource::new(dir).ignoring(cache_path);
    let engine = MigrationEngine::new(source, cache).await?;
    engine.initialize().await?;
    Ok(engine)
}

async fn open_cache(backend: CacheBackend, path: PathBuf) -> CliResult<Box<dyn Cache>> {
    match backend {
        CacheBackend::Json => Ok(Box::new(JsonFileCache::new(path))),
        #[cfg(feature = "sqlite")]
        CacheBackend::Sqlite => Ok(Box::new(stepwise_migrate::SqliteCache::open(path).await?)),
        #[cfg(not(feature = "sqlite"))]
        CacheBackend::Sqlite => Err(CliError::Config(format!(
            "cache backend '{}' requires the `sqlite` feature (wanted {})",
            backend,
            path.display()
        ))),
    }
}

/// Render `Status | Message` rows, prefixed by an identifier column when
/// `with_id` is set.
pub fn results_table(results: &[ExecutionResult], with_id: bool) -> Table {
    let mut table = if with_id {
        Table::new(&["Script", "Status", "Message"])
    } else {
        Table::new(&["Status", "Message"])
    };

    for result in results {
        let mut row: Vec<Cell> = Vec::with_capacity(3);
        if with_id {
            row.push(result.id().into());
        }
        row.push(output::status_badge(result.status()));
        row.push(result.message().into());
        table.add_row(row);
    }
    table
}

/// Turn failed results into a non-zero exit.
pub fn report(results: &[ExecutionResult]) -> CliResult<()> {
    let failed = results.iter().filter(|r| r.is_failure()).count();
    if failed > 0 {
        return Err(CliError::Failed(failed));
    }
    output::success(&summarize(results));
    Ok(())
}

fn absolutize(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}
