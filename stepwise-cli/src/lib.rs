//! Stepwise CLI - Command-line interface for stepwise migrations.
//!
//! Loads `stepwise.toml`, builds a [`stepwise_migrate::MigrationEngine`] over
//! the migrations directory and renders the outcome of each command as a
//! table.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
