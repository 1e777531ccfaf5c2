//! Binary entry point that wires environment bootstrap, logging and the
//! command line, then dispatches to the assistant.

use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use nexa::assistant;
use nexa::cli::{Cli, Command};
use nexa::config;

#[tokio::main]
/// Loads `.env`, layers configuration, and runs the requested subcommand.
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter())),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let mut cfg = config::load_app_config(&cli.config);
    cfg.apply_env();
    cli.apply_overrides(&mut cfg);
    debug!(?cfg, "configuration resolved");

    match cli.command() {
        Command::Chat => assistant::run_assistant(&cfg, cli.seed).await,
        Command::Ask { words } => {
            assistant::ask_once(&cfg, cli.seed, &words.join(" ")).await?;
            Ok(())
        }
        Command::Rules => assistant::print_rules(&cfg),
        Command::Agenda => assistant::show_agenda(&cfg),
    }
}
