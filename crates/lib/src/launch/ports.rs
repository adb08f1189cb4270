//! Port-publish arguments.

use crate::docker::host::bracket_ipv6;

/// `-p` value for a TCP port.
///
/// Without an offset the engine picks the host port (`ip::port`); with one the
/// host port is `offset + port` (`ip:host:port`).
pub fn port_mapping(ip: &str, offset: Option<u16>, port: u16) -> String {
  let ip = bracket_ipv6(ip);
  match offset {
    None => format!("{}::{}", ip, port),
    Some(offset) => format!("{}:{}:{}", ip, u32::from(offset) + u32::from(port), port),
  }
}

/// `-p` value for a UDP port.
pub fn udp_port_mapping(ip: &str, offset: Option<u16>, port: u16) -> String {
  format!("{}/udp", port_mapping(ip, offset, port))
}
