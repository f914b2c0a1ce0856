//! Per-host enrichment: latency, reverse DNS, and port probing.
//!
//! Every lookup is individually bounded and individually fallible;
//! failures collapse to sentinel values ("Unknown", `None`, empty set)
//! so one dead lookup never drags down the rest of the host, let alone
//! the cycle.

mod classify;

pub use classify::classify;

use futures::future::join_all;
use std::collections::BTreeSet;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::TokioAsyncResolver;

use crate::types::UNKNOWN;

/// Echo timeout for the latency probe.
const LATENCY_TIMEOUT: Duration = Duration::from_secs(1);
/// Connect timeout per probed port. Deliberately short: enrichment runs
/// against up to a subnet's worth of hosts each cycle.
const PORT_TIMEOUT: Duration = Duration::from_millis(200);

/// What enrichment could determine about one host.
#[derive(Debug, Clone, Default)]
pub struct Enrichment {
    pub latency_ms: Option<f64>,
    pub hostname: String,
    pub open_ports: BTreeSet<u16>,
}

/// Bounded-effort host enricher.
pub struct HostEnricher {
    resolver: TokioAsyncResolver,
    probe_ports: Vec<u16>,
}

impl HostEnricher {
    /// Create an enricher probing the given well-known port set.
    pub fn new(probe_ports: Vec<u16>) -> Self {
        let resolver =
            TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default());
        Self {
            resolver,
            probe_ports,
        }
    }

    /// Full enrichment: latency, hostname, and the port probe.
    pub async fn enrich(&self, address: IpAddr) -> Enrichment {
        let (latency_ms, hostname, open_ports) = tokio::join!(
            latency(address),
            self.hostname(address),
            self.scan_ports(address),
        );

        Enrichment {
            latency_ms,
            hostname,
            open_ports,
        }
    }

    /// Reduced enrichment for hosts beyond the per-cycle cap: latency and
    /// hostname only, ports skipped.
    pub async fn enrich_basic(&self, address: IpAddr) -> Enrichment {
        let (latency_ms, hostname) = tokio::join!(latency(address), self.hostname(address));

        Enrichment {
            latency_ms,
            hostname,
            open_ports: BTreeSet::new(),
        }
    }

    /// Reverse-resolve `address`, returning "Unknown" on any failure.
    async fn hostname(&self, address: IpAddr) -> String {
        match self.resolver.reverse_lookup(address).await {
            Ok(lookup) => lookup
                .iter()
                .next()
                .map(|name| name.to_string().trim_end_matches('.').to_string())
                .unwrap_or_else(|| UNKNOWN.to_string()),
            Err(_) => UNKNOWN.to_string(),
        }
    }

    /// Probe the configured port set; a port is open iff the connection
    /// attempt succeeds within the timeout. Failures are silent.
    async fn scan_ports(&self, address: IpAddr) -> BTreeSet<u16> {
        let attempts = self
            .probe_ports
            .iter()
            .map(|&port| async move {
                if port_open(address, port).await {
                    Some(port)
                } else {
                    None
                }
            })
            .collect::<Vec<_>>();

        join_all(attempts).await.into_iter().flatten().collect()
    }
}

/// One bounded echo probe; round-trip time in milliseconds, `None` when
/// the host did not answer in time.
pub async fn latency(address: IpAddr) -> Option<f64> {
    let payload = [0u8; 56];
    match timeout(LATENCY_TIMEOUT, surge_ping::ping(address, &payload)).await {
        Ok(Ok((_packet, rtt))) => Some(rtt.as_secs_f64() * 1000.0),
        _ => None,
    }
}

async fn port_open(address: IpAddr, port: u16) -> bool {
    let addr = SocketAddr::new(address, port);
    matches!(timeout(PORT_TIMEOUT, TcpStream::connect(addr)).await, Ok(Ok(_)))
}
