use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// True if `addr` parses as an address in a private range
///
/// IPv4: 0/8, 10/8, 169.254/16, 172.16/12, 192.168/16. IPv6: fc00::/7.
pub fn is_private(addr: &str) -> bool {
    match addr.trim().parse::<IpAddr>() {
        Ok(IpAddr::V4(v4)) => is_private_v4(v4),
        Ok(IpAddr::V6(v6)) => is_private_v6(v6),
        Err(_) => false,
    }
}

fn is_private_v4(addr: Ipv4Addr) -> bool {
    let [a, b, ..] = addr.octets();
    a == 0 || addr.is_private() || (a == 169 && b == 254)
}

fn is_private_v6(addr: Ipv6Addr) -> bool {
    (addr.segments()[0] & 0xfe00) == 0xfc00
}
