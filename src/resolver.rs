//! Local address-space detection.
//!
//! Works out which address, interface, and subnet the discovery cycle
//! should sweep. Detection is deliberately infallible: every failure
//! degrades one step further until, at worst, we report loopback/32 and
//! let the cycle substitute a conventional home subnet.

use ipnetwork::{IpNetwork, Ipv4Network};
use pnet::datalink;
use std::net::{IpAddr, Ipv4Addr, UdpSocket};
use tracing::debug;

/// The non-routable target the kernel is asked to "route toward" when
/// picking our outbound address. No packet is ever sent.
const PROBE_TARGET: &str = "10.255.255.255:1";

/// The local end of the network as far as discovery is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalNetwork {
    /// Our own address on the chosen interface.
    pub address: IpAddr,
    /// Interface name, `"unknown"` when enumeration failed.
    pub interface: String,
    /// Subnet the discovery cycle should sweep.
    pub subnet: Ipv4Network,
}

impl LocalNetwork {
    /// True when detection only managed to find loopback.
    pub fn is_loopback_only(&self) -> bool {
        self.address.is_loopback()
    }
}

/// Determine the local address, interface, and subnet.
///
/// Never fails; degrades to loopback/32 in the worst case.
pub fn resolve() -> LocalNetwork {
    let address = outbound_address();

    if let IpAddr::V4(v4) = address {
        if !v4.is_loopback() {
            if let Some((name, prefix)) = owning_interface(address) {
                let network = masked(v4, prefix);
                debug!(interface = %name, subnet = %network, "resolved local network");
                return LocalNetwork {
                    address,
                    interface: name,
                    subnet: network,
                };
            }

            // Interface enumeration failed but the address is usable.
            let network = masked(v4, 24);
            debug!(subnet = %network, "interface enumeration failed, assuming /24");
            return LocalNetwork {
                address,
                interface: "unknown".to_string(),
                subnet: network,
            };
        }
    }

    LocalNetwork {
        address: IpAddr::V4(Ipv4Addr::LOCALHOST),
        interface: "lo".to_string(),
        subnet: masked(Ipv4Addr::LOCALHOST, 32),
    }
}

/// Ask the kernel which local address it would use for an outbound
/// datagram. Connecting a UDP socket selects a source address without
/// sending anything.
fn outbound_address() -> IpAddr {
    let probe = || -> std::io::Result<IpAddr> {
        let socket = UdpSocket::bind(("0.0.0.0", 0))?;
        socket.connect(PROBE_TARGET)?;
        Ok(socket.local_addr()?.ip())
    };

    match probe() {
        Ok(addr) => addr,
        Err(e) => {
            debug!(error = %e, "outbound address probe failed, using loopback");
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        }
    }
}

/// Find the interface owning `address` and the prefix length of the
/// network it sits on.
fn owning_interface(address: IpAddr) -> Option<(String, u8)> {
    for iface in datalink::interfaces() {
        for net in &iface.ips {
            if let IpNetwork::V4(v4net) = net {
                if IpAddr::V4(v4net.ip()) == address {
                    return Some((iface.name.clone(), v4net.prefix()));
                }
            }
        }
    }
    None
}

/// Build the network `addr` belongs to, with host bits cleared.
fn masked(addr: Ipv4Addr, prefix: u8) -> Ipv4Network {
    let prefix = prefix.min(32);
    let mask: u32 = if prefix == 0 {
        0
    } else {
        u32::MAX << (32 - prefix as u32)
    };
    let base = Ipv4Addr::from(u32::from(addr) & mask);
    // prefix is clamped to a valid range above
    Ipv4Network::new(base, prefix).expect("prefix validated")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masked_clears_host_bits() {
        let net = masked(Ipv4Addr::new(192, 168, 1, 42), 24);
        assert_eq!(net.network(), Ipv4Addr::new(192, 168, 1, 0));
        assert_eq!(net.prefix(), 24);
        assert!(net.contains(Ipv4Addr::new(192, 168, 1, 200)));
        assert!(!net.contains(Ipv4Addr::new(192, 168, 2, 1)));
    }

    #[test]
    fn test_masked_host_route() {
        let net = masked(Ipv4Addr::LOCALHOST, 32);
        assert_eq!(net.size(), 1);
        assert!(net.contains(Ipv4Addr::LOCALHOST));
    }

    #[test]
    fn test_resolve_always_returns_usable_triple() {
        let local = resolve();
        // Whatever the environment, the result must be self-consistent.
        if let IpAddr::V4(v4) = local.address {
            if !v4.is_loopback() {
                assert!(local.subnet.contains(v4));
            }
        }
        assert!(!local.interface.is_empty());
    }
}
