//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::CacheBackend;

/// Stepwise CLI - ordered, reversible script migrations
#[derive(Parser, Debug)]
#[command(name = "stepwise")]
#[command(version)]
#[command(about = "Stepwise CLI - ordered, reversible script migrations", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Options shared by every command
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Path to the configuration file (defaults to ./stepwise.toml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the migration scripts
    #[arg(short, long, global = true, env = "STEPWISE_MIGRATIONS")]
    pub migrations: Option<PathBuf>,

    /// Location of the status cache
    #[arg(long, global = true, env = "STEPWISE_CACHE")]
    pub cache: Option<PathBuf>,

    /// Status cache backend
    #[arg(long, global = true, value_enum)]
    pub backend: Option<CacheBackend>,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR", value_parser = clap::builder::FalseyValueParser::new())]
    pub no_color: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new empty migration script
    Generate,

    /// Apply every pending or failed script, stopping at the first failure
    Migrate,

    /// Apply a single pending or failed script
    Up(ScriptArgs),

    /// Reverse a single passed script
    Down(ScriptArgs),

    /// Show the recorded status of every script
    Status,
}

/// Arguments for commands targeting one script
#[derive(Args, Debug)]
pub struct ScriptArgs {
    /// Identifier of the script (its file name without `.toml`)
    pub id: String,
}
