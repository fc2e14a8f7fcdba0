//! Declarative script definitions executed as shell commands.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MigrateResult, MigrationError};
use crate::script::{Script, ScriptError, ScriptOutcome};

/// Template used for generated scripts. `{{id}}` is replaced by the identifier.
pub const SCRIPT_TEMPLATE: &str = include_str!("../../templates/script.toml");

/// File extension of script definitions.
pub const SCRIPT_EXTENSION: &str = "toml";

/// Render the empty script template for `id`.
pub fn render_template(id: &str) -> String {
    SCRIPT_TEMPLATE.replace("{{id}}", id)
}

/// Parsed contents of a script definition file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScriptDefinition {
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Variables exported to every command.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    /// Forward steps.
    #[serde(default)]
    pub apply: Option<Steps>,
    /// Backward steps.
    #[serde(default)]
    pub reverse: Option<Steps>,
}

/// Ordered shell commands of one direction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Steps {
    /// Commands run through `sh -c`.
    #[serde(default)]
    pub run: Vec<String>,
}

impl ScriptDefinition {
    /// Parse a definition, rejecting documents that lack either direction.
    pub fn parse(id: &str, content: &str) -> MigrateResult<Self> {
        let definition: Self = toml::from_str(content)
            .map_err(|e| MigrationError::non_conforming(id, format!("invalid TOML: {}", e)))?;

        if definition.apply.is_none() {
            return Err(MigrationError::non_conforming(id, "missing [apply] table"));
        }
        if definition.reverse.is_none() {
            return Err(MigrationError::non_conforming(id, "missing [reverse] table"));
        }

        Ok(definition)
    }

    /// Turn the definition into a runnable script rooted at `workdir`.
    pub fn into_script(self, id: impl Into<String>, workdir: impl Into<PathBuf>) -> CommandScript {
        CommandScript {
            id: id.into(),
            workdir: workdir.into(),
            env: self.env,
            apply: self.apply.unwrap_or_default().run,
            reverse: self.reverse.unwrap_or_default().run,
        }
    }
}

/// A script whose directions are lists of shell commands.
#[derive(Debug, Clone)]
pub struct CommandScript {
    id: String,
    workdir: PathBuf,
    env: BTreeMap<String, String>,
    apply: Vec<String>,
    reverse: Vec<String>,
}

impl CommandScript {
    /// Identifier of the script.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Forward commands.
    pub fn apply_commands(&self) -> &[String] {
        &self.apply
    }

    /// Backward commands.
    pub fn reverse_commands(&self) -> &[String] {
        &self.reverse
    }

    async fn run_all(&self, commands: &[String]) -> ScriptOutcome {
        for command in commands {
            run_command(command, &self.workdir, &self.env).await?;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Script for CommandScript {
    async fn apply(&self) -> ScriptOutcome {
        self.run_all(&self.apply).await
    }

    async fn reverse(&self) -> ScriptOutcome {
        self.run_all(&self.reverse).await
    }
}

async fn run_command(
    command: &str,
    workdir: &Path,
    env: &BTreeMap<String, String>,
) -> ScriptOutcome {
    debug!(command, workdir = %workdir.display(), "Running script command");

    let output = tokio::process::Command::new("sh")
        .arg("-c")
        .arg(command)
        .current_dir(workdir)
        .envs(env)
        .output()
        .await
        .map_err(|e| ScriptError::new(format!("failed to spawn `{}`: {}", command, e)).with_source(e))?;

    if output.status.success() {
        return Ok(());
    }

    let exit = match output.status.code() {
        Some(code) => format!("exit code {}", code),
        None => "a signal".to_string(),
    };
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();

    let message = if stderr.is_empty() {
        format!("`{}` terminated with {}", command, exit)
    } else {
        format!("`{}` terminated with {}: {}", command, exit, stderr)
    };
    Err(ScriptError::new(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_parses_as_empty_script() {
        let content = render_template("Version20240101120000");
        assert!(content.contains("Version20240101120000"));
        assert!(!content.contains("{{id}}"));

        let definition = ScriptDefinition::parse("Version20240101120000", &content).unwrap();
        assert_eq!(definition.apply, Some(Steps::default()));
        assert_eq!(definition.reverse, Some(Steps::default()));
        assert!(definition.env.is_empty());
    }

    #[test]
    fn test_missing_reverse_is_non_conforming() {
        let err = ScriptDefinition::parse("Version1", "[apply]\nrun = [\"true\"]\n").unwrap_err();
        match err {
            MigrationError::NonConformingScript { id, reason } => {
                assert_eq!(id, "Version1");
                assert!(reason.contains("[reverse]"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_toml_is_non_conforming() {
        let err = ScriptDefinition::parse("Version1", "apply = [").unwrap_err();
        assert!(matches!(err, MigrationError::NonConformingScript { .. }));
    }

    #[tokio::test]
    async fn test_commands_run_in_order_with_env() {
        let dir = tempfile::tempdir().unwrap();
        let definition = ScriptDefinition::parse(
            "Version1",
            r#"
            [env]
            GREETING = "hello"

            [apply]
            run = ["echo $GREETING > out.txt", "echo again >> out.txt"]

            [reverse]
            run = ["rm out.txt"]
            "#,
        )
        .unwrap();
        let script = definition.into_script("Version1", dir.path());

        script.apply().await.unwrap();
        let written = std::fs::read_to_string(dir.path().join("out.txt")).unwrap();
        assert_eq!(written, "hello\nagain\n");

        script.reverse().await.unwrap();
        assert!(!dir.path().join("out.txt").exists());
    }

    #[tokio::test]
    async fn test_failing_command_stops_and_reports() {
        let dir = tempfile::tempdir().unwrap();
        let script = ScriptDefinition {
            apply: Some(Steps {
                run: vec![
                    "echo boom >&2; exit 3".to_string(),
                    "touch never.txt".to_string(),
                ],
            }),
            reverse: Some(Steps::default()),
            ..Default::default()
        }
        .into_script("Version1", dir.path());

        let err = script.apply().await.unwrap_err();
        assert!(err.message().contains("exit code 3"));
        assert!(err.message().contains("boom"));
        assert!(!dir.path().join("never.txt").exists());
    }
}
