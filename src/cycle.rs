//! One full discovery pass.
//!
//! Resolve the local network, probe it, make sure we ourselves appear in
//! the results, then enrich. Any stage may degrade; none may fail the
//! cycle.

use crate::config::AppSettings;
use crate::enrich::{classify, HostEnricher};
use crate::probe::{HostProbe, Observation, ProbeStrategy};
use crate::resolver::{self, LocalNetwork};
use crate::scheduler::DiscoverySource;
use crate::types::{ObservedHost, ZERO_LINK_ADDRESS};
use crate::vendors::VendorDb;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use ipnetwork::Ipv4Network;
use std::net::{IpAddr, Ipv4Addr};
use tracing::{debug, info};

/// Vendor label for the injected self record.
const LOCALHOST_VENDOR: &str = "Localhost";

/// Hosts enriched concurrently within one cycle.
const ENRICH_FAN_OUT: usize = 8;

/// Orchestrates resolve → probe → enrich for the scheduler.
///
/// The probe half of a cycle can take several seconds; all of it happens
/// before [`crate::registry::Registry::reconcile`] and therefore outside
/// the registry lock.
pub struct DiscoveryCycle {
    probe: HostProbe,
    enricher: HostEnricher,
    vendors: VendorDb,
    enrichment_cap: usize,
}

impl DiscoveryCycle {
    pub fn new(settings: &AppSettings, strategy: ProbeStrategy) -> Self {
        Self {
            probe: HostProbe::new(strategy),
            enricher: HostEnricher::new(settings.probe_ports.clone()),
            vendors: VendorDb::load(),
            enrichment_cap: settings.enrichment_cap,
        }
    }

    /// Run one pass and return every host observed in it.
    pub async fn run(&self) -> Vec<ObservedHost> {
        let local = resolver::resolve();
        let subnet = effective_subnet(&local);
        debug!(address = %local.address, subnet = %subnet, "starting discovery cycle");

        let mut observations = self.probe.probe(subnet, &local.interface).await;
        ensure_local_present(&mut observations, &local);

        let count = observations.len();
        let observed = self.enrich_all(observations).await;
        info!(observed = count, "discovery cycle complete");
        observed
    }

    /// Enrich every observation, fully up to the cap and reduced beyond
    /// it, with bounded concurrency and stable ordering.
    async fn enrich_all(&self, observations: Vec<Observation>) -> Vec<ObservedHost> {
        stream::iter(observations.into_iter().enumerate())
            .map(|(index, observation)| self.enrich_one(index, observation))
            .buffered(ENRICH_FAN_OUT)
            .collect()
            .await
    }

    async fn enrich_one(&self, index: usize, observation: Observation) -> ObservedHost {
        let vendor = if observation.link_address == ZERO_LINK_ADDRESS {
            LOCALHOST_VENDOR.to_string()
        } else {
            self.vendors.lookup(&observation.link_address)
        };

        let mut host = ObservedHost::new(IpAddr::V4(observation.address), observation.link_address)
            .with_vendor(vendor);

        if index < self.enrichment_cap {
            let enrichment = self.enricher.enrich(host.address).await;
            host.latency_ms = enrichment.latency_ms;
            host.hostname = enrichment.hostname;
            host.open_ports = enrichment.open_ports;
            host.device_type = classify(&host.vendor, &host.open_ports);
        } else {
            // Beyond the cap: latency and hostname only, ports skipped,
            // classification left at Unknown.
            let enrichment = self.enricher.enrich_basic(host.address).await;
            host.latency_ms = enrichment.latency_ms;
            host.hostname = enrichment.hostname;
        }

        host
    }
}

#[async_trait]
impl DiscoverySource for DiscoveryCycle {
    async fn discover(&self) -> Vec<ObservedHost> {
        self.run().await
    }
}

/// The subnet a cycle should actually sweep. When detection only found
/// loopback, fall back to the conventional home subnet: a heuristic,
/// not a guarantee.
fn effective_subnet(local: &LocalNetwork) -> Ipv4Network {
    if local.is_loopback_only() {
        Ipv4Network::new(Ipv4Addr::new(192, 168, 1, 0), 24).expect("valid subnet literal")
    } else {
        local.subnet
    }
}

/// Guarantee the local host appears in the observation list even when
/// the probe missed it (it usually does: nobody answers their own ARP).
fn ensure_local_present(observations: &mut Vec<Observation>, local: &LocalNetwork) {
    let IpAddr::V4(local_v4) = local.address else {
        return;
    };

    if observations.iter().any(|o| o.address == local_v4) {
        return;
    }

    observations.push(Observation::new(local_v4, ZERO_LINK_ADDRESS));
}
