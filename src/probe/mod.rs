//! Host discovery probes.
//!
//! Coordinates the two discovery strategies: a link-layer broadcast sweep
//! (preferred, needs elevated privileges) and a reachability sweep plus
//! neighbor-table read (works unprivileged, approximate by design). The
//! strategy is chosen once at process start; a broadcast failure mid-cycle
//! still degrades to the fallback for that cycle.

pub mod broadcast;
pub mod sweep;

use ipnetwork::Ipv4Network;
use std::net::Ipv4Addr;
use tracing::{info, warn};

/// One raw sighting from a probe: who answered, and with which hardware
/// address. Everything else is filled in by enrichment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub address: Ipv4Addr,
    pub link_address: String,
}

impl Observation {
    pub fn new(address: Ipv4Addr, link_address: impl Into<String>) -> Self {
        Self {
            address,
            link_address: link_address.into(),
        }
    }
}

/// Discovery strategy selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStrategy {
    /// Link-layer broadcast requests over a raw channel.
    Broadcast,
    /// Reachability sweep followed by a neighbor-table read.
    Fallback,
}

impl ProbeStrategy {
    /// Pick a strategy from the privileges we actually have. Raw
    /// link-layer channels need root (or CAP_NET_RAW), so anything else
    /// routes every cycle to the fallback sweep.
    pub fn detect() -> Self {
        if link_layer_available() {
            info!("link-layer probing available, using broadcast discovery");
            Self::Broadcast
        } else {
            info!("link-layer probing unavailable, using fallback sweep discovery");
            Self::Fallback
        }
    }
}

#[cfg(unix)]
fn link_layer_available() -> bool {
    unsafe { libc::geteuid() == 0 }
}

#[cfg(not(unix))]
fn link_layer_available() -> bool {
    false
}

/// Subnet prober with a fixed strategy.
pub struct HostProbe {
    strategy: ProbeStrategy,
}

impl HostProbe {
    pub fn new(strategy: ProbeStrategy) -> Self {
        Self { strategy }
    }

    /// Run one discovery attempt over `subnet`.
    ///
    /// Best-effort: every failure degrades to the next strategy or to an
    /// empty list, never to an error. Completes in bounded time.
    pub async fn probe(&self, subnet: Ipv4Network, interface: &str) -> Vec<Observation> {
        match self.strategy {
            ProbeStrategy::Broadcast => match broadcast::sweep(subnet, interface).await {
                Ok(observations) => {
                    info!(count = observations.len(), "broadcast sweep completed");
                    observations
                }
                Err(e) => {
                    warn!(error = %e, "broadcast sweep failed, falling back to reachability sweep");
                    sweep::sweep(subnet).await
                }
            },
            ProbeStrategy::Fallback => sweep::sweep(subnet).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observation_construction() {
        let obs = Observation::new(Ipv4Addr::new(10, 0, 0, 5), "aa:aa:aa:aa:aa:aa");
        assert_eq!(obs.address, Ipv4Addr::new(10, 0, 0, 5));
        assert_eq!(obs.link_address, "aa:aa:aa:aa:aa:aa");
    }
}
