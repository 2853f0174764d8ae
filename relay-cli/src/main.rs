//! Relay CLI
//!
//! Command-line interface for operating the relay handler.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;

#[derive(Parser)]
#[command(name = "relay")]
#[command(about = "CodePipeline to Bitbucket build-status relay CLI", long_about = None)]
struct Cli {
    /// Handler URL
    #[arg(long, env = "RELAY_HANDLER_URL", default_value = "http://localhost:8080")]
    handler_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config {
        handler_url: cli.handler_url,
    };

    handle_command(cli.command, &config).await
}
