//! Netwarden binary entry point.
//!
//! Wires settings, the background scheduler, and the HTTP API together.

use anyhow::Context;
use clap::Parser;
use netwarden::api::{self, ApiState};
use netwarden::cli::Cli;
use netwarden::config::AppSettings;
use netwarden::cycle::DiscoveryCycle;
use netwarden::probe::ProbeStrategy;
use netwarden::registry::Registry;
use netwarden::scheduler::Scheduler;
use netwarden::{banner, resolver};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut settings = match &cli.config {
        Some(path) => AppSettings::load_from(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => AppSettings::load().context("loading config")?,
    };
    if let Some(port) = cli.port {
        settings.listen_port = port;
    }
    if let Some(interval) = cli.interval {
        settings.scan_interval_secs = interval;
    }
    if cli.autostart {
        settings.autostart = true;
    }

    let registry = Arc::new(Registry::new());
    registry.set_enabled(settings.autostart);

    // The capability check happens exactly once; every cycle after this
    // uses the same strategy.
    let strategy = ProbeStrategy::detect();
    let cycle = Arc::new(DiscoveryCycle::new(&settings, strategy));

    let scheduler = Scheduler::new(
        Arc::clone(&registry),
        cycle,
        settings.scan_interval(),
        settings.idle_poll(),
    );
    tokio::spawn(scheduler.run());

    let local = resolver::resolve();
    let addr = SocketAddr::new(local.address, settings.listen_port);
    banner::print(addr);

    api::serve(addr, ApiState { registry }).await
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
