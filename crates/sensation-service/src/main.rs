//! sensationd - haptic vibration daemon

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use sensation_actors::{ActorConfig, DummyBus, Topology};
use sensation_service::{SensationGraph, SensationServer, ServiceConfig};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Log at info level
    Production,
    /// Log at debug level
    Debug,
}

#[derive(Debug, Parser)]
#[command(name = "sensationd")]
#[command(about = "Drives haptic vibration actuators from commands received over TCP")]
#[command(version)]
struct Cli {
    /// Service configuration (YAML or JSON); defaults apply if it does not exist
    #[arg(
        short,
        long,
        env = "SENSATIOND_CONFIG",
        default_value = "/etc/sensation/sensationd.yaml"
    )]
    config: PathBuf,

    /// Actor topology, overriding `actor_config` from the service configuration
    #[arg(short, long)]
    actors: Option<PathBuf>,

    /// Interface to listen on
    #[arg(long)]
    bind: Option<IpAddr>,

    /// TCP port
    #[arg(short, long)]
    port: Option<u16>,

    /// Logging preset
    #[arg(long, value_enum, default_value_t = Mode::Production)]
    mode: Mode,

    /// Raise verbosity (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn log_filter(&self) -> &'static str {
        let base: u8 = match self.mode {
            Mode::Production => 0,
            Mode::Debug => 1,
        };
        match base.saturating_add(self.verbose) {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    fn service_config(&self) -> Result<ServiceConfig> {
        let mut config = ServiceConfig::load(&self.config)
            .with_context(|| format!("failed to load {}", self.config.display()))?;
        if let Some(actors) = &self.actors {
            config.actor_config = Some(actors.clone());
        }
        if let Some(bind) = self.bind {
            config.bind_address = bind;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        config.validate()?;
        Ok(config)
    }
}

fn load_topology(config: &ServiceConfig) -> Result<Topology> {
    let actors = match &config.actor_config {
        Some(path) => ActorConfig::load(path)
            .with_context(|| format!("failed to load actor configuration {}", path.display()))?,
        None => {
            warn!("no actor configuration given, running without actors");
            ActorConfig::default()
        }
    };
    let topology = Topology::build(&actors, &DummyBus, config.pwm_frequency_hz);
    info!(
        drivers = topology.driver_count(),
        actors = topology.actor_count(),
        "actors configured"
    );
    Ok(topology)
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => info!("Received SIGTERM"),
                    _ = sigint.recv() => info!("Received SIGINT"),
                }
            }
            _ => {
                warn!("failed to register signal handlers, waiting for Ctrl+C");
                ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    ctrl_c().await;
}

async fn ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C"),
        Err(e) => error!(error = %e, "Error waiting for Ctrl+C"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "starting sensationd");

    let config = cli.service_config()?;
    let topology = load_topology(&config)?;
    let graph = SensationGraph::build(Arc::new(topology), &config)
        .context("failed to build the processing graph")?;

    let server = SensationServer::new(config, graph);
    server
        .run_until(shutdown_signal())
        .await
        .context("server failed")?;

    info!("sensationd stopped");
    Ok(())
}
