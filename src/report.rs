//! Markdown report generation.
//!
//! Renders a registry snapshot into the report served by the API:
//! header block, optional quality issues, and one table row per known
//! host in registry order.

use crate::scorer::NetworkQuality;
use crate::types::Host;
use chrono::{DateTime, Local};
use std::fmt::Write;

/// Render the full report.
pub fn render(hosts: &[Host], quality: &NetworkQuality, now: DateTime<Local>) -> String {
    let active = hosts.iter().filter(|h| h.active).count();

    let mut md = String::new();
    let _ = writeln!(md, "# Network Scan Report");
    let _ = writeln!(md, "**Date**: {}", now.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(md, "**Total Known Devices**: {}", hosts.len());
    let _ = writeln!(md, "**Active Devices**: {}", active);
    let _ = writeln!(md, "**Network Quality**: {}/100", quality.score);
    md.push('\n');

    if !quality.issues.is_empty() {
        let _ = writeln!(md, "## Quality Issues");
        for issue in &quality.issues {
            let _ = writeln!(md, "- {}", issue);
        }
        md.push('\n');
    }

    let _ = writeln!(md, "## Device List");
    let _ = writeln!(
        md,
        "| Status | Address | Hostname | Type | Latency | Vendor | MAC |"
    );
    let _ = writeln!(md, "|---|---|---|---|---|---|---|");

    for host in hosts {
        let status = if host.active { "ONLINE" } else { "OFFLINE" };
        let _ = writeln!(
            md,
            "| {} | {} | {} | {} | {} | {} | {} |",
            status,
            host.address,
            host.hostname,
            host.device_type.to_string().to_uppercase(),
            host.latency_display(),
            host.vendor,
            host.link_address,
        );
    }

    md
}
