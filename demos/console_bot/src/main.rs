//! Console Bot Example
//!
//! Drives the Relay runtime from standard input so commands can be tried
//! without a chat platform.
//!
//! # Usage
//!
//! ```bash
//! cargo run --package console-bot -- --prefix '?'
//! ```
//!
//! Then type `?ping`, `?say hello 3 true`, `/say text:hi loud:true`,
//! `/note add text:milk` or `/note admin clear`.

mod commands;
mod console;

use std::io::BufRead;
use std::path::PathBuf;
use std::thread;

use anyhow::Result;
use clap::Parser;
use relay::prelude::*;
use tokio::sync::oneshot;
use tracing::{error, info};

use crate::console::{ConsoleBot, parse_line};

#[derive(Debug, Parser)]
#[command(name = "console-bot", about = "Try Relay commands from the terminal")]
struct Cli {
    /// Configuration file to load instead of searching for `relay.toml`.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Configuration profile, e.g. `development`.
    #[arg(long)]
    profile: Option<String>,

    /// Prefix command trigger.
    #[arg(short, long)]
    prefix: Option<String>,

    /// Also accept `@relay` as a trigger.
    #[arg(long)]
    mention: bool,
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder = RelayRuntime::builder().commands(commands::all());
    if let Some(path) = &cli.config {
        builder = builder.config_file(path);
    }
    if let Some(profile) = &cli.profile {
        builder = builder.profile(profile.clone());
    }
    if let Some(prefix) = &cli.prefix {
        builder = builder.set("commands.prefix", prefix.clone());
    }
    if cli.mention {
        builder = builder.set("commands.when_mention", true);
    }
    let runtime = builder.build()?;

    let bot = ConsoleBot::new();
    let sender = runtime.event_sender();
    sender.send(PlatformEvent::Ready, bot.clone());

    info!(
        prefix = %runtime.config().commands.prefix,
        "Type a command, or Ctrl+D to quit"
    );

    // Blocking stdin reads run on a plain thread.
    let (closed_tx, closed_rx) = oneshot::channel::<()>();
    thread::spawn(move || {
        let author = User::new(42, "you");
        let channel = Channel::text(1, "console");
        for line in std::io::stdin().lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    error!(error = %e, "Failed to read from stdin");
                    break;
                }
            };
            if let Some(event) = parse_line(&line, &author, &channel)
                && !sender.send(event, bot.clone())
            {
                break;
            }
        }
        let _ = closed_tx.send(());
    });

    runtime
        .run_until(async {
            tokio::select! {
                _ = closed_rx => info!("Input closed, shutting down"),
                _ = tokio::signal::ctrl_c() => info!("Received Ctrl+C, shutting down"),
            }
        })
        .await?;

    Ok(())
}
