//! Fallback discovery: reachability sweep plus neighbor-table read.
//!
//! Usable without elevated privileges. Echo probes are fired at every
//! host address in the subnet to coax the OS into resolving neighbors;
//! the neighbor table is then read back and parsed. The result is
//! approximate by design: entries can be missed or stale.

use crate::error::{ProbeError, ProbeResult};
use crate::probe::Observation;
use futures::stream::{self, StreamExt};
use governor::{Quota, RateLimiter};
use ipnetwork::Ipv4Network;
use nonzero_ext::nonzero;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Per-probe echo timeout.
const PING_TIMEOUT: Duration = Duration::from_secs(1);
/// Ceiling on concurrent in-flight probes (a /24 minus its edges).
const MAX_IN_FLIGHT: usize = 254;
/// Single overall deadline for the whole sweep; probes still in flight
/// when it expires are abandoned, the neighbor table is read regardless.
const SWEEP_DEADLINE: Duration = Duration::from_secs(10);

/// Sweep `subnet` and read back whatever the neighbor table holds.
///
/// Never errors: a failed table read degrades to an empty list.
pub async fn sweep(subnet: Ipv4Network) -> Vec<Observation> {
    ping_sweep(subnet).await;

    match read_neighbor_table().await {
        Ok(observations) => {
            debug!(count = observations.len(), "neighbor table read");
            observations
        }
        Err(e) => {
            warn!(error = %e, "neighbor table unavailable");
            Vec::new()
        }
    }
}

/// Fire one bounded echo probe at every host address, rate limited and
/// bounded by one overall deadline. Individual results are irrelevant;
/// the point is the neighbor-table side effect.
async fn ping_sweep(subnet: Ipv4Network) {
    // 50 launches per second stands in for pausing briefly between
    // launch batches, so we do not exhaust sockets.
    let limiter = Arc::new(RateLimiter::direct(Quota::per_second(nonzero!(50u32))));

    let network = subnet.network();
    let broadcast = subnet.broadcast();
    let skip_edges = subnet.prefix() < 31;
    let targets: Vec<Ipv4Addr> = subnet
        .iter()
        .filter(|&ip| !skip_edges || (ip != network && ip != broadcast))
        .collect();

    let probes = stream::iter(targets)
        .map(|ip| {
            let limiter = Arc::clone(&limiter);
            async move {
                limiter.until_ready().await;
                let payload = [0u8; 56];
                let _ = timeout(PING_TIMEOUT, surge_ping::ping(IpAddr::V4(ip), &payload)).await;
            }
        })
        .buffer_unordered(MAX_IN_FLIGHT)
        .collect::<Vec<()>>();

    if timeout(SWEEP_DEADLINE, probes).await.is_err() {
        debug!("sweep deadline expired with probes still in flight");
    }
}

/// Read and parse the OS neighbor table (`arp -a`).
async fn read_neighbor_table() -> ProbeResult<Vec<Observation>> {
    let output = Command::new("arp")
        .arg("-a")
        .output()
        .await
        .map_err(|e| ProbeError::NeighborTable(e.to_string()))?;

    if !output.status.success() {
        return Err(ProbeError::NeighborTable(format!(
            "arp exited with {}",
            output.status
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(parse_neighbor_table(&stdout))
}

/// Parse `arp -a` output into observations.
///
/// Expected line shape: `name (192.168.1.1) at 0:11:22:33:44:55 on en0 ...`.
/// Multicast and broadcast addresses are excluded, as are entries whose
/// link address never resolved.
fn parse_neighbor_table(output: &str) -> Vec<Observation> {
    output.lines().filter_map(parse_neighbor_line).collect()
}

fn parse_neighbor_line(line: &str) -> Option<Observation> {
    let open = line.find('(')?;
    let close = line[open..].find(')')? + open;
    let address: Ipv4Addr = line[open + 1..close].parse().ok()?;

    let rest = line[close + 1..].strip_prefix(" at ")?;
    let link = rest.split_whitespace().next()?;

    if address.is_multicast() || address == Ipv4Addr::BROADCAST {
        return None;
    }
    if !is_link_address(link) {
        // Covers "(incomplete)" entries: the host never answered.
        return None;
    }

    Some(Observation::new(address, link.to_ascii_lowercase()))
}

/// Loose MAC shape check: six colon-separated groups of 1-2 hex digits.
/// Some platforms print single-digit groups, so a strict width check
/// would drop valid entries.
fn is_link_address(s: &str) -> bool {
    let groups: Vec<&str> = s.split(':').collect();
    groups.len() == 6
        && groups
            .iter()
            .all(|g| !g.is_empty() && g.len() <= 2 && g.chars().all(|c| c.is_ascii_hexdigit()))
}
