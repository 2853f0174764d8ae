//! Event command handlers
//!
//! Inspects event files offline and delivers them to a running handler.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use relay_core::deploy::{EventPattern, REPORTED_STATES};
use relay_core::domain::build_status::{map_state, report_key};
use relay_core::domain::event::PipelineActionEvent;
use std::path::{Path, PathBuf};

use crate::config::Config;

/// Event subcommands
#[derive(Subcommand)]
pub enum EventCommands {
    /// Check how the relay would treat an event, without calling anything
    Check {
        /// Path to the event JSON
        file: PathBuf,
    },
    /// Deliver an event to the handler
    Send {
        /// Path to the event JSON
        file: PathBuf,
    },
}

/// Handle event commands
pub async fn handle_event_command(command: EventCommands, config: &Config) -> Result<()> {
    match command {
        EventCommands::Check { file } => check_event(&file),
        EventCommands::Send { file } => send_event(&file, config).await,
    }
}

fn read_event(file: &Path) -> Result<serde_json::Value> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    serde_json::from_str(&content).with_context(|| format!("{} is not valid JSON", file.display()))
}

/// Check an event against the rule and the handler's parsing and mapping
fn check_event(file: &Path) -> Result<()> {
    let raw = read_event(file)?;
    let pattern = EventPattern::action_state_change(&REPORTED_STATES);

    if pattern.matches(&raw) {
        println!("  Rule:         {}", "matches".green());
    } else {
        println!("  Rule:         {}", "does not match".yellow());
    }

    let event = match PipelineActionEvent::from_value(&raw) {
        Ok(event) => event,
        Err(e) => {
            println!("  Event:        {}", e.to_string().red());
            return Ok(());
        }
    };

    println!("  Pipeline:     {}", event.pipeline_name.bold());
    println!("  Execution:    {}", event.execution_id.dimmed());
    println!("  Action:       {} / {}", event.stage_name, event.action_name);
    println!("  Key:          {}", report_key(&event.pipeline_name, &event.action_name));

    match map_state(event.state) {
        Ok(state) => println!("  State:        {} -> {}", event.state, state.to_string().green()),
        Err(e) => println!("  State:        {}", e.to_string().red()),
    }

    Ok(())
}

/// Post an event to the handler and print the outcome
async fn send_event(file: &Path, config: &Config) -> Result<()> {
    let raw = read_event(file)?;
    let url = format!("{}/events", config.handler_url.trim_end_matches('/'));

    let response = reqwest::Client::new()
        .post(&url)
        .json(&raw)
        .send()
        .await
        .with_context(|| format!("Failed to reach handler at {}", url))?;

    let status = response.status();
    let body: serde_json::Value = response
        .json()
        .await
        .context("Failed to parse handler response")?;

    if status.is_success() {
        println!(
            "{} {} reported as {} on {}",
            "✔".green(),
            body["key"].as_str().unwrap_or_default().bold(),
            body["state"].as_str().unwrap_or_default(),
            body["revisionId"].as_str().unwrap_or_default()
        );
        Ok(())
    } else {
        println!(
            "{} failed while {} ({})",
            "✘".red(),
            body["state"].as_str().unwrap_or("?"),
            body["kind"].as_str().unwrap_or("?").yellow()
        );
        anyhow::bail!(
            "Handler answered {}: {}",
            status,
            body["error"].as_str().unwrap_or("unknown error")
        )
    }
}
