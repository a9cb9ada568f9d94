use local_ip_address::list_afinet_netifas;
use std::net::{IpAddr, Ipv4Addr};

/// One address bound to a network interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetInterface {
    pub name: String,
    pub addr: IpAddr,
    /// Loopback / host-only addresses that other machines cannot reach
    pub internal: bool,
}

impl NetInterface {
    pub fn new(name: impl Into<String>, addr: IpAddr, internal: bool) -> Self {
        Self {
            name: name.into(),
            addr,
            internal,
        }
    }
}

/// First IPv4 address not marked internal, in enumeration order.
/// Falls back to loopback when the machine has no such address.
pub fn first_external_ipv4(interfaces: &[NetInterface]) -> Ipv4Addr {
    interfaces
        .iter()
        .filter(|iface| !iface.internal)
        .find_map(|iface| match iface.addr {
            IpAddr::V4(v4) => Some(v4),
            IpAddr::V6(_) => None,
        })
        .unwrap_or(Ipv4Addr::LOCALHOST)
}

/// Enumerate the host's interfaces in OS order
pub fn list_interfaces() -> Vec<NetInterface> {
    match list_afinet_netifas() {
        Ok(ifas) => ifas
            .into_iter()
            .map(|(name, addr)| NetInterface::new(name, addr, addr.is_loopback()))
            .collect(),
        Err(e) => {
            log::warn!("Failed to enumerate network interfaces: {}", e);
            Vec::new()
        }
    }
}

pub fn discover_local_ipv4() -> Ipv4Addr {
    first_external_ipv4(&list_interfaces())
}
