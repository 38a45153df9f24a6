mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod utils;

use crate::cli::{Cli, Commands};
use crate::error::Result;
use clap::Parser;
use tracing::{debug, error, info};

fn main() {
    if let Err(e) = run_app() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())?;

    info!("thermocal CLI v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let file_config = config::load(cli.config.as_deref(), &cli.set_values)?;
    let show_progress = !cli.quiet;

    let result = match cli.command {
        Commands::Heat(args) => {
            info!("Dispatching to 'heat' command.");
            commands::heat::run(args, file_config, show_progress)
        }
        Commands::Pvmin(args) => {
            info!("Dispatching to 'pvmin' command.");
            commands::pvmin::run(args, file_config, show_progress)
        }
    };

    match &result {
        Ok(()) => info!("Command completed successfully."),
        Err(e) => error!("Command failed: {}", e),
    }
    result
}
