//! Network quality scoring.
//!
//! Derives a 0–100 health score and a list of human-readable issues from
//! a registry snapshot. Only currently-active hosts count against the
//! score; history never does.

use crate::types::{Host, UNKNOWN};
use serde::Serialize;

/// Latency above this many milliseconds counts as an issue.
const HIGH_LATENCY_MS: f64 = 100.0;
/// Penalty per high-latency host.
const LATENCY_PENALTY: i32 = 5;
/// Penalty per active host with an unresolved vendor.
const UNKNOWN_VENDOR_PENALTY: i32 = 2;

/// Score plus the issues that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkQuality {
    pub score: u8,
    pub issues: Vec<String>,
}

/// Score a snapshot. Base 100, floored at 0; the latency issue (if any)
/// is listed before the vendor issue.
pub fn score(hosts: &[Host]) -> NetworkQuality {
    let active: Vec<&Host> = hosts.iter().filter(|h| h.active).collect();

    let mut score: i32 = 100;
    let mut issues = Vec::new();

    let high_latency = active
        .iter()
        .filter(|h| h.latency_ms.map_or(false, |ms| ms > HIGH_LATENCY_MS))
        .count() as i32;
    if high_latency > 0 {
        let penalty = high_latency * LATENCY_PENALTY;
        score -= penalty;
        issues.push(format!(
            "-{penalty}%: {high_latency} devices with high latency (>100ms)"
        ));
    }

    let unknown_vendors = active.iter().filter(|h| h.vendor == UNKNOWN).count() as i32;
    if unknown_vendors > 0 {
        let penalty = unknown_vendors * UNKNOWN_VENDOR_PENALTY;
        score -= penalty;
        issues.push(format!("-{penalty}%: {unknown_vendors} unknown vendors"));
    }

    NetworkQuality {
        score: score.max(0) as u8,
        issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ObservedHost;
    use chrono::Utc;
    use std::net::{IpAddr, Ipv4Addr};

    fn host(last_octet: u8, vendor: &str, latency_ms: Option<f64>, active: bool) -> Host {
        let observed = ObservedHost::new(
            IpAddr::V4(Ipv4Addr::new(10, 0, 0, last_octet)),
            "aa:bb:cc:dd:ee:ff",
        )
        .with_vendor(vendor);
        let mut host = Host::from_observation(observed, Utc::now());
        host.latency_ms = latency_ms;
        host.active = active;
        host
    }

    #[test]
    fn test_empty_set_is_perfect() {
        let quality = score(&[]);
        assert_eq!(quality.score, 100);
        assert!(quality.issues.is_empty());
    }

    #[test]
    fn test_healthy_hosts_keep_full_score() {
        let hosts = vec![
            host(1, "Apple Inc.", Some(2.0), true),
            host(2, "TP-Link", Some(80.0), true),
        ];
        assert_eq!(score(&hosts), NetworkQuality { score: 100, issues: vec![] });
    }

    #[test]
    fn test_one_slow_host_costs_exactly_five() {
        let healthy = vec![
            host(1, "Apple Inc.", Some(2.0), true),
            host(2, "TP-Link", Some(10.0), true),
        ];
        let baseline = score(&healthy);

        let mut with_slow = healthy.clone();
        with_slow.push(host(3, "Intel Corp", Some(150.0), true));
        let degraded = score(&with_slow);

        assert_eq!(degraded.score, baseline.score - 5);
        assert_eq!(degraded.issues.len(), 1);
        assert!(degraded.issues[0].contains("high latency"));
        assert!(degraded.issues[0].starts_with("-5%"));
    }

    #[test]
    fn test_unknown_vendor_costs_two() {
        let hosts = vec![host(1, "Unknown", Some(5.0), true)];
        let quality = score(&hosts);
        assert_eq!(quality.score, 98);
        assert_eq!(quality.issues, vec!["-2%: 1 unknown vendors".to_string()]);
    }

    #[test]
    fn test_latency_issue_listed_before_vendor_issue() {
        let hosts = vec![host(1, "Unknown", Some(200.0), true)];
        let quality = score(&hosts);
        assert_eq!(quality.score, 93);
        assert_eq!(quality.issues.len(), 2);
        assert!(quality.issues[0].contains("high latency"));
        assert!(quality.issues[1].contains("unknown vendors"));
    }

    #[test]
    fn test_score_never_goes_negative() {
        // 25 slow hosts: 125 points of penalty.
        let hosts: Vec<Host> = (1..=25)
            .map(|i| host(i, "Some Vendor", Some(500.0), true))
            .collect();
        let quality = score(&hosts);
        assert_eq!(quality.score, 0);
    }

    #[test]
    fn test_inactive_hosts_never_count() {
        let hosts = vec![
            host(1, "Unknown", Some(900.0), false),
            host(2, "Apple Inc.", Some(1.0), true),
        ];
        let quality = score(&hosts);
        assert_eq!(quality.score, 100);
        assert!(quality.issues.is_empty());
    }

    #[test]
    fn test_unreachable_hosts_are_not_slow() {
        // Latency N/A is not "high latency".
        let hosts = vec![host(1, "Apple Inc.", None, true)];
        assert_eq!(score(&hosts).score, 100);
    }

    #[test]
    fn test_boundary_latency_is_not_penalized() {
        let hosts = vec![host(1, "Apple Inc.", Some(100.0), true)];
        assert_eq!(score(&hosts).score, 100);
    }
}
