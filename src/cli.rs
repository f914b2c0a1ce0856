//! Command-line interface definitions for Netwarden.
//!
//! Uses `clap` derive macros for declarative argument parsing. Flags
//! override the settings file; the settings file supplies everything
//! else.

use clap::Parser;
use std::path::PathBuf;

/// Netwarden - continuous LAN discovery and presence monitoring.
///
/// Runs a background discovery loop over the local subnet and serves a
/// small HTTP API with live results, a Markdown report, and on-demand
/// deep inspection of individual hosts.
#[derive(Parser, Debug)]
#[command(name = "netwarden")]
#[command(author = "HueCodes <huecodes@proton.me>")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Continuous LAN discovery and presence monitoring", long_about = None)]
pub struct Cli {
    /// Port for the HTTP API
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Seconds between discovery cycles
    #[arg(short, long, value_name = "SECONDS")]
    pub interval: Option<u64>,

    /// Start scanning immediately instead of waiting for an API start
    #[arg(short = 's', long)]
    pub autostart: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to custom configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}
