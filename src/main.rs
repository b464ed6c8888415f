//! LPX GW - Launchpad X gateway
//!
//! Bridges a Launchpad X to a downstream controller and a Carla-hosted
//! step sequencer: Session mode drives the sequencer grid over OSC, the
//! mixer views map the device's fader banks, and everything else passes
//! through between the two surfaces.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod launchpad;
mod midi;
mod ports;
mod router;
mod sequencer;
mod state;

use crate::config::AppConfig;
use crate::ports::{Ports, SurfaceEvent};
use crate::router::Router;
use crate::sequencer::SequencerBridge;

/// LPX Gateway - drive a Carla step sequencer and mixer views from a
/// Launchpad X
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// List available MIDI ports
    #[arg(long)]
    list_ports: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();

    init_logging(&args.log_level)?;

    if args.list_ports {
        return ports::list_ports();
    }

    info!("Starting LPX GW...");
    info!("Configuration file: {}", args.config);

    let config = AppConfig::load(&args.config).await?;

    run_app(config, shutdown_signal()).await?;

    info!("LPX GW shutdown complete");
    Ok(())
}

async fn run_app(config: AppConfig, shutdown: impl std::future::Future<Output = ()>) -> Result<()> {
    // One inbound pipeline, one outbound path
    let (event_tx, mut event_rx) = mpsc::channel::<SurfaceEvent>(1000);
    let (out_tx, mut out_rx) = mpsc::unbounded_channel();

    let mut ports = Ports::connect(&config.midi, event_tx)?;
    info!("MIDI ports connected");

    let bridge = Arc::new(SequencerBridge::new(config.osc.clone(), out_tx.clone()));
    bridge.clone().start().await?;

    let mut router = Router::new(bridge.clone(), out_tx);
    router.initialize();

    info!("Ready to process events");

    // Main event loop: surface events one at a time, device writes only
    // from here
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            Some(event) = event_rx.recv() => {
                router.on_surface_event(&event).await;
            }

            Some(outbound) = out_rx.recv() => {
                if let Err(e) = ports.send(&outbound) {
                    warn!("Device write failed: {}", e);
                }
            }

            _ = &mut shutdown => {
                info!("Shutdown signal received, stopping event loop");
                break;
            }
        }
    }

    bridge.stop().await;

    Ok(())
}

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false),
        )
        .init();

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
    info!("Shutdown signal received");
}
