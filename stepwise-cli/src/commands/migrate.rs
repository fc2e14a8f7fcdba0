//! `stepwise migrate` - Apply every pending or failed script.

use crate::cli::GlobalArgs;
use crate::commands::{open_engine, report, results_table};
use crate::error::CliResult;
use crate::output;

/// Run the migrate command
pub async fn run(global: &GlobalArgs) -> CliResult<()> {
    let engine = open_engine(global).await?;
    let results = engine.migrate().await?;

    if results.is_empty() {
        output::info("No pending migration scripts");
        return Ok(());
    }

    results_table(&results, true).print();
    report(&results)
}
