//! On-demand deep host inspection.
//!
//! Shells out to `nmap` for service/OS fingerprinting of a single,
//! already-validated address. Runs entirely outside the discovery cycle
//! and never touches the registry lock. Tool absence, crashes, and
//! non-zero exits all come back as a structured failure value; callers
//! never see an `Err`.

use serde::Serialize;
use std::net::IpAddr;
use tokio::process::Command;
use tracing::debug;

/// Parsed inspection result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InspectionReport {
    pub os: String,
    pub services: Vec<String>,
    pub raw: String,
}

/// Structured failure: what went wrong plus whatever output exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InspectionFailure {
    pub error: String,
    pub raw: String,
}

/// Either a report or a failure; serializes to the matching JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum InspectionOutcome {
    Report(InspectionReport),
    Failure(InspectionFailure),
}

/// Inspect one host with `nmap -O -sV -T4 --top-ports 50`.
pub async fn inspect(address: IpAddr) -> InspectionOutcome {
    debug!(%address, "starting deep inspection");

    let output = Command::new("nmap")
        .args(["-O", "-sV", "-T4", "--top-ports", "50"])
        .arg(address.to_string())
        .output()
        .await;

    match output {
        Err(e) => InspectionOutcome::Failure(InspectionFailure {
            error: e.to_string(),
            raw: "nmap failed or is not installed.".to_string(),
        }),
        Ok(out) if !out.status.success() => {
            let mut raw = String::from_utf8_lossy(&out.stdout).into_owned();
            raw.push_str(&String::from_utf8_lossy(&out.stderr));
            InspectionOutcome::Failure(InspectionFailure {
                error: format!("nmap exited with {}", out.status),
                raw,
            })
        }
        Ok(out) => {
            let raw = String::from_utf8_lossy(&out.stdout).into_owned();
            InspectionOutcome::Report(parse_output(&raw))
        }
    }
}

/// Pull the OS guess and open services out of nmap's plain output.
fn parse_output(raw: &str) -> InspectionReport {
    let mut os = "Unknown".to_string();
    let mut services = Vec::new();

    for line in raw.lines() {
        if let Some(rest) = line.split_once("Running:").map(|(_, r)| r) {
            os = rest.trim().to_string();
        } else if let Some(rest) = line.split_once("OS details:").map(|(_, r)| r) {
            os = rest.trim().to_string();
        } else if line.contains("/tcp") && line.contains("open") {
            let parts: Vec<&str> = line.split_whitespace().collect();
            let port = parts[0];
            let service = parts.get(2).copied().unwrap_or("unknown");
            let version = parts.get(3..).map(|v| v.join(" ")).unwrap_or_default();
            if version.is_empty() {
                services.push(format!("{port}: {service}"));
            } else {
                services.push(format!("{port}: {service} {version}"));
            }
        }
    }

    InspectionReport {
        os,
        services,
        raw: raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Starting Nmap 7.94 ( https://nmap.org )
Nmap scan report for router.lan (192.168.1.1)
PORT    STATE SERVICE  VERSION
22/tcp  open  ssh      OpenSSH 8.9p1 Ubuntu
80/tcp  open  http     nginx 1.24.0
443/tcp closed https
Running: Linux 5.X
OS details: Linux 5.0 - 5.14
Service detection performed.";

    #[test]
    fn test_parse_extracts_open_services() {
        let report = parse_output(SAMPLE);
        assert_eq!(report.services.len(), 2);
        assert_eq!(report.services[0], "22/tcp: ssh OpenSSH 8.9p1 Ubuntu");
        assert_eq!(report.services[1], "80/tcp: http nginx 1.24.0");
    }

    #[test]
    fn test_os_details_wins_over_running() {
        // Both lines are present; the later, more specific one sticks.
        let report = parse_output(SAMPLE);
        assert_eq!(report.os, "Linux 5.0 - 5.14");
    }

    #[test]
    fn test_raw_output_is_retained() {
        let report = parse_output(SAMPLE);
        assert_eq!(report.raw, SAMPLE);
    }

    #[test]
    fn test_empty_output_yields_unknown_os() {
        let report = parse_output("");
        assert_eq!(report.os, "Unknown");
        assert!(report.services.is_empty());
    }

    #[test]
    fn test_failure_serializes_with_error_key() {
        let outcome = InspectionOutcome::Failure(InspectionFailure {
            error: "boom".to_string(),
            raw: "".to_string(),
        });
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["error"], "boom");
    }

    #[tokio::test]
    async fn test_missing_tool_is_a_structured_failure() {
        // Point the same plumbing at a binary that cannot exist.
        let output = Command::new("netwarden-test-no-such-tool")
            .arg("-h")
            .output()
            .await;
        assert!(output.is_err(), "spawn of a nonexistent binary must fail");
    }
}
