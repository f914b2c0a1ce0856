//! Host records and device classification tags.
//!
//! A [`Host`] is one IP-identified endpoint tracked by the registry. The
//! registry owns the authoritative copy; everything else works on deep
//! copies handed out by snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::net::IpAddr;

/// Link-address sentinel for the injected local-host record.
pub const ZERO_LINK_ADDRESS: &str = "00:00:00:00:00:00";

/// Sentinel used whenever a lookup could not resolve a value.
pub const UNKNOWN: &str = "Unknown";

/// Heuristic device classification.
///
/// Assigned by [`crate::enrich::classify`]; the tag is a best guess from
/// vendor label and open ports, not a statement of fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Mobile,
    Laptop,
    Printer,
    Desktop,
    Server,
    Router,
    Unknown,
}

impl Default for DeviceType {
    fn default() -> Self {
        Self::Unknown
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Self::Mobile => "mobile",
            Self::Laptop => "laptop",
            Self::Printer => "printer",
            Self::Desktop => "desktop",
            Self::Server => "server",
            Self::Router => "router",
            Self::Unknown => "unknown",
        };
        write!(f, "{}", tag)
    }
}

/// One discovered endpoint as produced by a single discovery cycle,
/// before reconciliation into the registry.
///
/// Carries every field the cycle can observe; the registry adds the
/// presence bookkeeping (`active`, `first_seen`, `last_seen`).
#[derive(Debug, Clone, PartialEq)]
pub struct ObservedHost {
    /// IPv4 address, the identity key.
    pub address: IpAddr,
    /// Hardware address as reported by the probe.
    pub link_address: String,
    /// Vendor label from the OUI database, "Unknown" if unresolved.
    pub vendor: String,
    /// Reverse-DNS name, "Unknown" if the lookup failed.
    pub hostname: String,
    /// Round-trip time in milliseconds, `None` if unreachable.
    pub latency_ms: Option<f64>,
    /// Ports observed open; empty when the host was beyond the enrichment cap.
    pub open_ports: BTreeSet<u16>,
    /// Heuristic classification.
    pub device_type: DeviceType,
}

impl ObservedHost {
    /// Create a bare observation with lookups still pending.
    pub fn new(address: IpAddr, link_address: impl Into<String>) -> Self {
        Self {
            address,
            link_address: link_address.into(),
            vendor: UNKNOWN.to_string(),
            hostname: UNKNOWN.to_string(),
            latency_ms: None,
            open_ports: BTreeSet::new(),
            device_type: DeviceType::Unknown,
        }
    }

    /// Set the vendor label.
    pub fn with_vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = vendor.into();
        self
    }
}

/// One tracked endpoint with its full presence history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Host {
    /// IP address, unique within the registry.
    pub address: IpAddr,
    /// Hardware address; [`ZERO_LINK_ADDRESS`] for the injected self record.
    pub link_address: String,
    /// Vendor label, "Unknown" if unresolved.
    pub vendor: String,
    /// Reverse-DNS name, "Unknown" if the lookup failed.
    pub hostname: String,
    /// Most recent round-trip time in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<f64>,
    /// Ports observed open in the most recent cycle that enriched this host.
    pub open_ports: BTreeSet<u16>,
    /// Heuristic classification from the most recent enrichment.
    pub device_type: DeviceType,
    /// Present in the most recently completed cycle.
    pub active: bool,
    /// First time this address was ever observed. Set once, never updated.
    pub first_seen: DateTime<Utc>,
    /// Last time this address was observed active.
    pub last_seen: DateTime<Utc>,
}

impl Host {
    /// Build a registry record from a fresh observation.
    pub fn from_observation(observed: ObservedHost, now: DateTime<Utc>) -> Self {
        Self {
            address: observed.address,
            link_address: observed.link_address,
            vendor: observed.vendor,
            hostname: observed.hostname,
            latency_ms: observed.latency_ms,
            open_ports: observed.open_ports,
            device_type: observed.device_type,
            active: true,
            first_seen: now,
            last_seen: now,
        }
    }

    /// Overwrite the observation-owned fields from a newer sighting.
    ///
    /// Presence bookkeeping (`active`, `first_seen`, `last_seen`) belongs
    /// to the reconciliation step and is deliberately not touched here.
    /// The field set is pinned: observations cannot introduce new fields.
    pub fn absorb(&mut self, observed: ObservedHost) {
        self.link_address = observed.link_address;
        self.vendor = observed.vendor;
        self.hostname = observed.hostname;
        self.latency_ms = observed.latency_ms;
        self.open_ports = observed.open_ports;
        self.device_type = observed.device_type;
    }

    /// Latency rendered for humans: `"12.3 ms"` or `"N/A"`.
    pub fn latency_display(&self) -> String {
        match self.latency_ms {
            Some(ms) => format!("{:.1} ms", ms),
            None => "N/A".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn observation(addr: &str) -> ObservedHost {
        ObservedHost::new(addr.parse::<IpAddr>().unwrap(), "aa:bb:cc:dd:ee:ff")
    }

    #[test]
    fn test_from_observation_sets_presence_fields() {
        let now = Utc::now();
        let host = Host::from_observation(observation("10.0.0.5"), now);
        assert!(host.active);
        assert_eq!(host.first_seen, now);
        assert_eq!(host.last_seen, now);
        assert_eq!(host.address, IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5)));
    }

    #[test]
    fn test_absorb_leaves_first_seen_untouched() {
        let created = Utc::now();
        let mut host = Host::from_observation(observation("10.0.0.5"), created);

        let mut newer = observation("10.0.0.5");
        newer.hostname = "printer.lan".to_string();
        newer.latency_ms = Some(3.2);
        host.absorb(newer);

        assert_eq!(host.first_seen, created);
        assert_eq!(host.hostname, "printer.lan");
        assert_eq!(host.latency_ms, Some(3.2));
    }

    #[test]
    fn test_latency_display() {
        let mut host = Host::from_observation(observation("10.0.0.5"), Utc::now());
        assert_eq!(host.latency_display(), "N/A");
        host.latency_ms = Some(12.34);
        assert_eq!(host.latency_display(), "12.3 ms");
    }

    #[test]
    fn test_device_type_serializes_lowercase() {
        let json = serde_json::to_string(&DeviceType::Mobile).unwrap();
        assert_eq!(json, "\"mobile\"");
        assert_eq!(DeviceType::Printer.to_string(), "printer");
    }
}
