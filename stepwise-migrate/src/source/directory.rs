//! Folder of script definition files.

use std::collections::HashSet;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::definition::{SCRIPT_EXTENSION, ScriptDefinition, render_template};
use super::{DiscoveredScript, ScriptSource};
use crate::error::{MigrateResult, MigrationError};

/// Scripts stored as `<id>.toml` files in a single directory.
///
/// Entries whose name starts with `.` are ignored, as are files registered
/// with [`DirectorySource::ignoring`]. Every other entry must be a `.toml`
/// file holding both an `[apply]` and a `[reverse]` table.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
    ignored: Vec<PathBuf>,
}

/// Files a cache may write next to its main file.
const COMPANION_SUFFIXES: [&str; 4] = [".tmp", "-journal", "-wal", "-shm"];

impl DirectorySource {
    /// Create a source reading from `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ignored: Vec::new(),
        }
    }

    /// Skip `path` during discovery, along with its `.tmp`, `-journal`,
    /// `-wal` and `-shm` companions.
    ///
    /// Used for a cache file kept inside the migrations directory. Paths
    /// outside the directory have no effect.
    pub fn ignoring(mut self, path: impl Into<PathBuf>) -> Self {
        self.ignored.push(path.into());
        self
    }

    /// The migrations directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the definition file for `id`.
    pub fn script_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", id, SCRIPT_EXTENSION))
    }

    async fn ensure_dir(&self) -> MigrateResult<()> {
        let is_dir = tokio::fs::metadata(&self.dir)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);

        if is_dir {
            Ok(())
        } else {
            Err(MigrationError::SourceNotFound(self.dir.clone()))
        }
    }

    /// File names inside the directory that discovery must skip.
    async fn ignored_names(&self) -> HashSet<OsString> {
        let mut names = HashSet::new();
        if self.ignored.is_empty() {
            return names;
        }

        let Ok(dir) = tokio::fs::canonicalize(&self.dir).await else {
            return names;
        };

        for path in &self.ignored {
            let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
                continue;
            };
            let parent = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };
            if tokio::fs::canonicalize(parent).await.ok().as_deref() != Some(dir.as_path()) {
                continue;
            }

            names.insert(name.to_os_string());
            names.extend(COMPANION_SUFFIXES.iter().map(|suffix| with_suffix(name, suffix)));
        }
        names
    }
}

fn with_suffix(name: &OsStr, suffix: &str) -> OsString {
    let mut out = name.to_os_string();
    out.push(suffix);
    out
}

#[async_trait::async_trait]
impl ScriptSource for DirectorySource {
    fn location(&self) -> String {
        self.dir.display().to_string()
    }

    async fn discover(&self) -> MigrateResult<Vec<DiscoveredScript>> {
        self.ensure_dir().await?;

        let ignored = self.ignored_names().await;
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut scripts = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name();
            let name = file_name.to_string_lossy();

            if name.starts_with('.') || ignored.contains(&file_name) {
                continue;
            }

            let path = entry.path();
            let id = match parse_script_name(&name) {
                Some(id) => id,
                None => {
                    return Err(MigrationError::non_conforming(
                        name.to_string(),
                        format!("expected a `<id>.{}` file", SCRIPT_EXTENSION),
                    ));
                }
            };

            if !tokio::fs::metadata(&path).await?.is_file() {
                return Err(MigrationError::non_conforming(id, "not a regular file"));
            }

            let content = tokio::fs::read_to_string(&path).await?;
            let definition = ScriptDefinition::parse(id, &content)?;

            debug!(id, path = %path.display(), "Discovered script");
            scripts.push(DiscoveredScript::new(
                id,
                Box::new(definition.into_script(id, &self.dir)),
            ));
        }

        Ok(scripts)
    }

    async fn write_script(&self, id: &str) -> MigrateResult<PathBuf> {
        self.ensure_dir().await?;

        let path = self.script_path(id);
        let mut file = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(MigrationError::ScriptExists(id.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        file.write_all(render_template(id).as_bytes()).await?;
        file.sync_all().await?;

        Ok(path)
    }
}

/// Extract the identifier from a `<id>.toml` file name.
fn parse_script_name(name: &str) -> Option<&str> {
    let id = name.strip_suffix(SCRIPT_EXTENSION)?.strip_suffix('.')?;
    if id.is_empty() { None } else { Some(id) }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMPTY_SCRIPT: &str = "[apply]\nrun = []\n\n[reverse]\nrun = []\n";

    #[test]
    fn test_parse_script_name() {
        assert_eq!(parse_script_name("Version1.toml"), Some("Version1"));
        assert_eq!(parse_script_name("a.b.toml"), Some("a.b"));
        assert_eq!(parse_script_name(".toml"), None);
        assert_eq!(parse_script_name("Version1.sql"), None);
        assert_eq!(parse_script_name("Version1toml"), None);
    }

    #[tokio::test]
    async fn test_missing_dir_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirectorySource::new(dir.path().join("absent"));
        let err = source.discover().await.unwrap_err();
        assert!(matches!(err, MigrationError::SourceNotFound(_)));
    }

    #[tokio::test]
    async fn test_file_instead_of_dir_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("migrations");
        std::fs::write(&file, "").unwrap();

        let err = DirectorySource::new(&file).discover().await.unwrap_err();
        assert!(matches!(err, MigrationError::SourceNotFound(_)));
    }

    #[tokio::test]
    async fn test_discovers_scripts_and_skips_hidden() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("B.toml"), EMPTY_SCRIPT).unwrap();
        std::fs::write(dir.path().join("A.toml"), EMPTY_SCRIPT).unwrap();
        std::fs::write(dir.path().join(".gitkeep"), "").unwrap();
        std::fs::write(dir.path().join(".stepwise-cache.json"), "{}").unwrap();

        let mut ids: Vec<_> = DirectorySource::new(dir.path())
            .discover()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        ids.sort();
        assert_eq!(ids, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_foreign_file_is_non_conforming() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("A.toml"), EMPTY_SCRIPT).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "hi").unwrap();

        let err = DirectorySource::new(dir.path()).discover().await.unwrap_err();
        match err {
            MigrationError::NonConformingScript { id, .. } => assert_eq!(id, "notes.txt"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_ignored_cache_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("A.toml"), EMPTY_SCRIPT).unwrap();
        std::fs::write(dir.path().join("cache.db"), "").unwrap();
        std::fs::write(dir.path().join("cache.db-journal"), "").unwrap();
        std::fs::write(dir.path().join("cache.db.tmp"), "").unwrap();

        let source = DirectorySource::new(dir.path()).ignoring(dir.path().join("cache.db"));
        let ids: Vec<_> = source
            .discover()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec!["A"]);
    }

    #[tokio::test]
    async fn test_ignoring_matches_equivalent_paths_only() {
        let dir = tempfile::tempdir().unwrap();
        let scripts = dir.path().join("scripts");
        std::fs::create_dir(&scripts).unwrap();
        std::fs::write(scripts.join("cache.json"), "{}").unwrap();

        // Same file reached through a different spelling of the directory
        let source = DirectorySource::new(&scripts)
            .ignoring(dir.path().join("scripts").join("..").join("scripts").join("cache.json"));
        assert!(source.discover().await.unwrap().is_empty());

        // Same name in another directory does not hide the file
        let source = DirectorySource::new(&scripts).ignoring(dir.path().join("cache.json"));
        let err = source.discover().await.unwrap_err();
        assert!(matches!(err, MigrationError::NonConformingScript { .. }));
    }

    #[tokio::test]
    async fn test_subdirectory_is_non_conforming() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("Nested.toml")).unwrap();

        let err = DirectorySource::new(dir.path()).discover().await.unwrap_err();
        assert!(matches!(err, MigrationError::NonConformingScript { .. }));
    }

    #[tokio::test]
    async fn test_write_script_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirectorySource::new(dir.path());

        let path = source.write_script("Version20240101120000").await.unwrap();
        assert_eq!(path, dir.path().join("Version20240101120000.toml"));
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("# Migration script Version20240101120000"));

        let err = source.write_script("Version20240101120000").await.unwrap_err();
        assert!(matches!(err, MigrationError::ScriptExists(_)));
    }
}
