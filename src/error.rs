//! Error types for Netwarden.
//!
//! Uses `thiserror` for ergonomic error definitions. Discovery is
//! best-effort: probe and enrichment errors are recovered close to where
//! they occur and reported through tracing, never as process failures.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while probing the subnet for hosts.
///
/// These never escape the discovery cycle; a failed strategy degrades to
/// the fallback strategy or to an empty observation list.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("failed to open link-layer channel on '{interface}': {reason}")]
    ChannelUnavailable { interface: String, reason: String },

    #[error("interface not found: {0}")]
    InterfaceNotFound(String),

    #[error("interface '{0}' has no hardware address")]
    NoHardwareAddress(String),

    #[error("failed to build probe packet: {0}")]
    PacketBuild(String),

    #[error("neighbor table read failed: {0}")]
    NeighborTable(String),

    #[error("probing requires an IPv4 subnet, got {0}")]
    NotIpv4(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for probe operations.
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors for configuration loading and saving.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine platform config directories")]
    DirectoryNotFound,

    #[error("failed to read config file {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("failed to write config file {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    #[error("invalid config format: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
