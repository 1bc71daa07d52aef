//! `rexec`: run a task once on a remote build service.
use clap::Parser;
use rexec_api::ApiConfig;
use rexec_observe::{LoggerConfig, init_logger};

mod cli;
mod execute;
mod signals;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let logger = LoggerConfig {
        format: cli.log_format,
        level: cli.log_level.clone(),
        ..Default::default()
    };
    if let Err(e) = init_logger(&logger) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }

    let api = ApiConfig {
        endpoint: cli.endpoint,
        token: cli.token,
        ..Default::default()
    };

    let result = match cli.command {
        Commands::Execute(args) => execute::execute(args, api).await,
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::exit(1);
        }
    }
}
