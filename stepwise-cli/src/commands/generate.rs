//! `stepwise generate` - Create an empty migration script.

use crate::cli::GlobalArgs;
use crate::commands::open_engine;
use crate::error::CliResult;
use crate::output;

/// Run the generate command
pub async fn run(global: &GlobalArgs) -> CliResult<()> {
    let engine = open_engine(global).await?;
    let id = engine.generate().await?;

    output::success(&format!("Generated migration script {}", id));
    Ok(())
}
