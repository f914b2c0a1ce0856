//! Broadcast discovery over a raw link-layer channel.
//!
//! Sends one ARP request per subnet address and collects the replies.
//! Requires elevated privileges to open the channel; any failure here is
//! reported to the caller, which degrades to the fallback sweep.

use crate::error::{ProbeError, ProbeResult};
use crate::probe::Observation;
use ipnetwork::Ipv4Network;
use pnet::datalink::{self, Channel, Config, MacAddr, NetworkInterface};
use pnet::packet::arp::{ArpHardwareTypes, ArpOperations, ArpPacket, MutableArpPacket};
use pnet::packet::ethernet::{EtherTypes, EthernetPacket, MutableEthernetPacket};
use pnet::packet::Packet;
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::time::{Duration, Instant};

const ETH_HDR_LEN: usize = 14;
const ARP_LEN: usize = 28;
/// Minimum ethernet frame length without the frame check sequence.
const FRAME_LEN: usize = 60;

/// How long to collect replies after each send round.
const REPLY_WINDOW: Duration = Duration::from_secs(2);
/// Retransmissions to addresses that have not answered.
const RETRIES: usize = 1;
/// Read timeout on the channel; bounds each wait inside the reply window.
const READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Sweep `subnet` with broadcast ARP requests on `interface`.
///
/// The raw channel is blocking, so the whole exchange runs on the
/// blocking pool.
pub async fn sweep(subnet: Ipv4Network, interface: &str) -> ProbeResult<Vec<Observation>> {
    let interface = interface.to_string();
    match tokio::task::spawn_blocking(move || blocking_sweep(subnet, &interface)).await {
        Ok(result) => result,
        Err(e) => Err(ProbeError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("broadcast sweep task failed: {e}"),
        ))),
    }
}

fn blocking_sweep(subnet: Ipv4Network, interface: &str) -> ProbeResult<Vec<Observation>> {
    let iface = datalink::interfaces()
        .into_iter()
        .find(|i| i.name == interface)
        .ok_or_else(|| ProbeError::InterfaceNotFound(interface.to_string()))?;

    let src_mac = iface
        .mac
        .ok_or_else(|| ProbeError::NoHardwareAddress(interface.to_string()))?;
    let src_ip = interface_ipv4(&iface)
        .ok_or_else(|| ProbeError::NotIpv4(format!("interface {interface}")))?;

    let config = Config {
        read_timeout: Some(READ_TIMEOUT),
        ..Config::default()
    };
    let (mut tx, mut rx) = match datalink::channel(&iface, config) {
        Ok(Channel::Ethernet(tx, rx)) => (tx, rx),
        Ok(_) => {
            return Err(ProbeError::ChannelUnavailable {
                interface: interface.to_string(),
                reason: "unsupported channel type".to_string(),
            })
        }
        Err(e) => {
            return Err(ProbeError::ChannelUnavailable {
                interface: interface.to_string(),
                reason: e.to_string(),
            })
        }
    };

    let targets: Vec<Ipv4Addr> = subnet_hosts(subnet).collect();
    let mut answered: HashMap<Ipv4Addr, String> = HashMap::new();

    for _ in 0..=RETRIES {
        for &target in &targets {
            if answered.contains_key(&target) {
                continue;
            }
            let frame = build_request(src_mac, src_ip, target)?;
            if let Some(Err(e)) = tx.send_to(&frame, None) {
                tracing::debug!(target = %target, error = %e, "ARP send failed");
            }
        }

        let deadline = Instant::now() + REPLY_WINDOW;
        while Instant::now() < deadline {
            match rx.next() {
                Ok(frame) => {
                    if let Some((addr, mac)) = parse_reply(frame, subnet) {
                        answered.entry(addr).or_insert(mac);
                    }
                }
                // Read timeouts just mean silence; keep waiting out the window.
                Err(_) => continue,
            }
        }

        if answered.len() >= targets.len() {
            break;
        }
    }

    Ok(answered
        .into_iter()
        .map(|(address, link_address)| Observation::new(address, link_address))
        .collect())
}

/// All probeable host addresses of the subnet (network/broadcast excluded).
fn subnet_hosts(subnet: Ipv4Network) -> impl Iterator<Item = Ipv4Addr> {
    let network = subnet.network();
    let broadcast = subnet.broadcast();
    let skip_edges = subnet.prefix() < 31;
    subnet
        .iter()
        .filter(move |&ip| !skip_edges || (ip != network && ip != broadcast))
}

fn interface_ipv4(iface: &NetworkInterface) -> Option<Ipv4Addr> {
    iface.ips.iter().find_map(|net| match net {
        pnet::ipnetwork::IpNetwork::V4(v4) => Some(v4.ip()),
        _ => None,
    })
}

/// Build a broadcast ARP request frame for `target`.
fn build_request(src_mac: MacAddr, src_ip: Ipv4Addr, target: Ipv4Addr) -> ProbeResult<Vec<u8>> {
    let mut buffer = [0u8; FRAME_LEN];

    {
        let mut eth = MutableEthernetPacket::new(&mut buffer)
            .ok_or_else(|| ProbeError::PacketBuild("ethernet header".to_string()))?;
        eth.set_destination(MacAddr::broadcast());
        eth.set_source(src_mac);
        eth.set_ethertype(EtherTypes::Arp);
    }

    let mut arp = MutableArpPacket::new(&mut buffer[ETH_HDR_LEN..ETH_HDR_LEN + ARP_LEN])
        .ok_or_else(|| ProbeError::PacketBuild("arp payload".to_string()))?;
    arp.set_hardware_type(ArpHardwareTypes::Ethernet);
    arp.set_protocol_type(EtherTypes::Ipv4);
    arp.set_hw_addr_len(6);
    arp.set_proto_addr_len(4);
    arp.set_operation(ArpOperations::Request);
    arp.set_sender_hw_addr(src_mac);
    arp.set_sender_proto_addr(src_ip);
    arp.set_target_hw_addr(MacAddr::zero());
    arp.set_target_proto_addr(target);

    Ok(buffer.to_vec())
}

/// Extract `(sender address, sender MAC)` from an ARP reply inside the
/// swept subnet. Anything else is ignored.
fn parse_reply(frame: &[u8], subnet: Ipv4Network) -> Option<(Ipv4Addr, String)> {
    let eth = EthernetPacket::new(frame)?;
    if eth.get_ethertype() != EtherTypes::Arp {
        return None;
    }
    let arp = ArpPacket::new(eth.payload())?;
    if arp.get_operation() != ArpOperations::Reply {
        return None;
    }
    let sender = arp.get_sender_proto_addr();
    if !subnet.contains(sender) {
        return None;
    }
    Some((sender, arp.get_sender_hw_addr().to_string()))
}
