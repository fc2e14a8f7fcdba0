//! `stepwise status` - Show the recorded status of every script.

use crate::cli::GlobalArgs;
use crate::commands::open_engine;
use crate::error::CliResult;
use crate::output::{self, Table};

/// Run the status command
pub async fn run(global: &GlobalArgs) -> CliResult<()> {
    let engine = open_engine(global).await?;
    let states = engine.status().await?;

    if states.is_empty() {
        output::info("No migration scripts found");
        return Ok(());
    }

    let mut table = Table::new(&["Script", "Status"]);
    for state in states {
        table.add_row(vec![state.id.into(), output::status_badge(state.status)]);
    }
    table.print();
    Ok(())
}
