//! Implementation of the `dockfix list` command.

use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use crate::cmd::load_registry;
use crate::output::{OutputFormat, print_info, print_json, print_stat};

#[derive(Debug, Serialize)]
struct FixtureItem<'a> {
  name: &'a str,
  id: &'a str,
  base: Option<&'a str>,
  ports: &'a [u16],
  udp_ports: &'a [u16],
  dynamic: bool,
}

pub fn cmd_list(manifest: &Path, output: OutputFormat) -> Result<()> {
  let registry = load_registry(manifest)?;

  let mut items = Vec::with_capacity(registry.len());
  for fixture in registry.iter() {
    let descriptor = fixture.descriptor()?;
    items.push(FixtureItem {
      name: fixture.name(),
      id: &descriptor.id,
      base: fixture.base(),
      ports: &descriptor.ports,
      udp_ports: &descriptor.udp_ports,
      dynamic: descriptor.dynamic,
    });
  }

  if output.is_json() {
    return print_json(&items);
  }

  if items.is_empty() {
    print_info("No fixtures defined.");
    return Ok(());
  }

  for item in &items {
    print_info(&format!("{} ({})", item.id, item.name));
    if let Some(base) = item.base {
      print_stat("Base", base);
    }
    if !item.ports.is_empty() {
      print_stat("Ports", &join(item.ports));
    }
    if !item.udp_ports.is_empty() {
      print_stat("UDP ports", &join(item.udp_ports));
    }
  }
  Ok(())
}

fn join(ports: &[u16]) -> String {
  ports.iter().map(u16::to_string).collect::<Vec<_>>().join(", ")
}
