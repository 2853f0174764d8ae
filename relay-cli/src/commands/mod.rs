//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod deploy;
mod event;

pub use deploy::DeployCommands;
pub use event::EventCommands;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Deployment description
    Deploy {
        #[command(subcommand)]
        command: DeployCommands,
    },
    /// Event inspection and delivery
    Event {
        #[command(subcommand)]
        command: EventCommands,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Deploy { command } => deploy::handle_deploy_command(command),
        Commands::Event { command } => event::handle_event_command(command, config).await,
    }
}
