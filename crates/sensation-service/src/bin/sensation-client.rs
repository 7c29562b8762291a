//! sensation-client - send commands to a running sensationd

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sensation_protocol::{DEFAULT_PRIORITY, Region, SensationClient};
use sensation_service::config::DEFAULT_PORT;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "sensation-client")]
#[command(about = "Send vibration commands and play requests to sensationd")]
#[command(version)]
struct Cli {
    /// Daemon host
    #[arg(long, global = true, default_value = "127.0.0.1")]
    host: String,

    /// Daemon port
    #[arg(short, long, global = true, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Set the intensity of one actor
    Vibrate {
        /// Region name, e.g. LEFT_HAND
        #[arg(long)]
        region: Region,
        /// Actor index inside the region
        #[arg(long)]
        actor: u32,
        /// Intensity in [0, 1]
        #[arg(long)]
        intensity: f32,
        /// Arbitration priority
        #[arg(long, default_value_t = DEFAULT_PRIORITY)]
        priority: i32,
    },

    /// Play a previously loaded pattern
    Play {
        /// Pattern identifier
        #[arg(long)]
        pattern: String,
        /// Priority of the generated commands
        #[arg(long, default_value_t = DEFAULT_PRIORITY)]
        priority: i32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let mut client = SensationClient::connect((cli.host.as_str(), cli.port))
        .await
        .with_context(|| format!("cannot reach sensationd at {}:{}", cli.host, cli.port))?;

    match &cli.command {
        Command::Vibrate {
            region,
            actor,
            intensity,
            priority,
        } => {
            client
                .vibrate(*region, *actor, *intensity, *priority)
                .await?;
            info!(%region, actor, intensity, priority, "vibration sent");
        }
        Command::Play { pattern, priority } => {
            client.play_pattern(pattern.as_str(), *priority).await?;
            info!(%pattern, priority, "play request sent");
        }
    }

    client.close().await?;
    Ok(())
}
