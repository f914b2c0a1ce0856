//! Device-type classification heuristic.
//!
//! First matching rule wins; the rule order is part of the contract and
//! pinned by the tests below. Guesses can be wrong (a Linux desktop
//! with sshd looks like a router here) and that is accepted.

use crate::types::DeviceType;
use std::collections::BTreeSet;

/// Mobile-device sync service seen on some phones.
const MOBILE_SYNC_PORT: u16 = 62078;

/// Classify a host from its vendor label and observed open ports.
pub fn classify(vendor: &str, open_ports: &BTreeSet<u16>) -> DeviceType {
    let vendor = vendor.to_lowercase();

    if vendor.contains("apple") {
        if open_ports.contains(&MOBILE_SYNC_PORT) {
            return DeviceType::Mobile;
        }
        return DeviceType::Laptop;
    }

    if ["samsung", "xiaomi", "pixel"].iter().any(|v| vendor.contains(v)) {
        return DeviceType::Mobile;
    }

    if open_ports.contains(&631) || ["hp", "epson", "canon"].iter().any(|v| vendor.contains(v)) {
        return DeviceType::Printer;
    }

    if open_ports.contains(&445) {
        return DeviceType::Desktop;
    }

    if [80, 443, 8080].iter().any(|p| open_ports.contains(p)) {
        return DeviceType::Server;
    }

    if open_ports.contains(&22) {
        return DeviceType::Router;
    }

    DeviceType::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ports(list: &[u16]) -> BTreeSet<u16> {
        list.iter().copied().collect()
    }

    #[test]
    fn test_apple_with_sync_port_is_mobile() {
        assert_eq!(
            classify("Apple Inc.", &ports(&[62078])),
            DeviceType::Mobile
        );
    }

    #[test]
    fn test_apple_without_sync_port_is_laptop() {
        assert_eq!(classify("Apple Inc.", &ports(&[])), DeviceType::Laptop);
    }

    #[test]
    fn test_mobile_vendors() {
        assert_eq!(classify("Samsung Electronics", &ports(&[])), DeviceType::Mobile);
        assert_eq!(classify("Xiaomi Communications", &ports(&[])), DeviceType::Mobile);
    }

    #[test]
    fn test_printer_by_port_or_vendor() {
        assert_eq!(classify("Unknown", &ports(&[631])), DeviceType::Printer);
        assert_eq!(classify("HP Inc.", &ports(&[])), DeviceType::Printer);
        assert_eq!(classify("Canon", &ports(&[])), DeviceType::Printer);
    }

    #[test]
    fn test_smb_is_desktop() {
        assert_eq!(classify("Unknown", &ports(&[445])), DeviceType::Desktop);
    }

    #[test]
    fn test_web_ports_are_server() {
        assert_eq!(classify("Unknown", &ports(&[443])), DeviceType::Server);
        assert_eq!(classify("Unknown", &ports(&[8080])), DeviceType::Server);
    }

    #[test]
    fn test_ssh_only_is_router() {
        assert_eq!(classify("TP-Link", &ports(&[22])), DeviceType::Router);
    }

    #[test]
    fn test_no_signal_is_unknown() {
        assert_eq!(classify("Unknown", &ports(&[])), DeviceType::Unknown);
    }

    #[test]
    fn test_rule_order_is_pinned() {
        // Apple wins over the printer port.
        assert_eq!(classify("Apple Inc.", &ports(&[631])), DeviceType::Laptop);
        // Printer port wins over SMB and web ports.
        assert_eq!(
            classify("Unknown", &ports(&[631, 445, 80])),
            DeviceType::Printer
        );
        // SMB wins over web ports, web ports win over ssh.
        assert_eq!(classify("Unknown", &ports(&[445, 80])), DeviceType::Desktop);
        assert_eq!(classify("Unknown", &ports(&[80, 22])), DeviceType::Server);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let input = ports(&[22, 80]);
        let first = classify("TP-Link", &input);
        for _ in 0..10 {
            assert_eq!(classify("TP-Link", &input), first);
        }
    }
}
