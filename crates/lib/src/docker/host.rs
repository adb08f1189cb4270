//! Engine host resolution.
//!
//! The engine may run on another machine (`DOCKER_HOST=tcp://10.0.0.5:2375`).
//! Published ports then live on that machine, and binding a specific local
//! address is meaningless, so launches need to know where the engine is.

use std::net::{IpAddr, Ipv4Addr, ToSocketAddrs};

/// Host address used when the engine is reached through a local socket.
pub fn loopback_address() -> String {
  Ipv4Addr::LOCALHOST.to_string()
}

/// Address or hostname of the engine host.
///
/// Takes the host part of a `DOCKER_HOST`-style URI. Unset values, socket URIs
/// (`unix:///var/run/docker.sock`) and values without a host fall back to the
/// loopback address.
pub fn engine_host(raw: Option<&str>) -> String {
  raw.and_then(uri_host).unwrap_or_else(loopback_address)
}

fn uri_host(uri: &str) -> Option<String> {
  let (_, rest) = uri.split_once("://")?;
  let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
  let authority = authority.rsplit_once('@').map_or(authority, |(_, host)| host);

  let host = if let Some(bracketed) = authority.strip_prefix('[') {
    bracketed.split_once(']')?.0
  } else {
    authority.split(':').next().unwrap_or_default()
  };

  if host.is_empty() { None } else { Some(host.to_string()) }
}

/// Whether `host` names this machine.
///
/// IP literals are checked directly; names are resolved and must map only to
/// loopback addresses. Unresolvable names count as remote.
pub fn is_loopback(host: &str) -> bool {
  let host = host.trim_start_matches('[').trim_end_matches(']');
  if let Ok(ip) = host.parse::<IpAddr>() {
    return ip.is_loopback();
  }

  match (host, 0).to_socket_addrs() {
    Ok(addrs) => {
      let addrs: Vec<_> = addrs.collect();
      !addrs.is_empty() && addrs.iter().all(|a| a.ip().is_loopback())
    }
    Err(_) => false,
  }
}

/// Wrap IPv6 literals in brackets, as the engine expects in port mappings.
pub fn bracket_ipv6(address: &str) -> String {
  if !address.starts_with('[') && address.parse::<std::net::Ipv6Addr>().is_ok() {
    format!("[{}]", address)
  } else {
    address.to_string()
  }
}
