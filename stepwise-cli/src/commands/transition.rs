//! `stepwise up` / `stepwise down` - Move a single script.

use crate::cli::{GlobalArgs, ScriptArgs};
use crate::commands::{open_engine, report, results_table};
use crate::error::CliResult;

/// Apply one pending or failed script
pub async fn up(global: &GlobalArgs, args: ScriptArgs) -> CliResult<()> {
    let engine = open_engine(global).await?;
    let result = engine.up(&args.id).await?;

    let results = [result];
    results_table(&results, false).print();
    report(&results)
}

/// Reverse one passed script
pub async fn down(global: &GlobalArgs, args: ScriptArgs) -> CliResult<()> {
    let engine = open_engine(global).await?;
    let result = engine.down(&args.id).await?;

    let results = [result];
    results_table(&results, false).print();
    report(&results)
}
