//! Stepwise CLI - Command-line interface for stepwise migrations.

use clap::Parser;

use stepwise_cli::cli::{Cli, Command};
use stepwise_cli::commands;
use stepwise_cli::error::CliResult;
use stepwise_cli::{logging, output};

#[tokio::main]
async fn main() {
    logging::init();

    if let Err(e) = run().await {
        output::newline();
        output::error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run() -> CliResult<()> {
    let cli = Cli::parse();
    output::set_color(!cli.global.no_color);

    let global = &cli.global;
    match cli.command {
        Command::Generate => commands::generate::run(global).await,
        Command::Migrate => commands::migrate::run(global).await,
        Command::Up(args) => commands::transition::up(global, args).await,
        Command::Down(args) => commands::transition::down(global, args).await,
        Command::Status => commands::status::run(global).await,
    }
}
