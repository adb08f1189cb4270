//! Implementation of the `dockfix run` command.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use dockfix_lib::docker::host::bracket_ipv6;
use dockfix_lib::{ContainerHandle, Docker, FixtureRegistry};
use tracing::debug;

use crate::cmd::build::build;
use crate::cmd::{docker, load_registry, runtime};
use crate::output::{print_info, print_stat, print_success, print_warning};

#[derive(Debug, Clone)]
pub struct RunOptions {
  pub id: String,
  pub no_cache: bool,
  pub log: Option<PathBuf>,
  pub port_offset: Option<u16>,
  pub ip: Option<String>,
  pub duration: Option<Duration>,
  pub args: Vec<String>,
}

/// Build the fixture, start a container, and remove it again on Ctrl-C or after `--for`.
pub fn cmd_run(manifest: &Path, options: RunOptions) -> Result<()> {
  let registry = load_registry(manifest)?;
  let docker = docker(options.no_cache);
  let rt = runtime()?;

  rt.block_on(run(&docker, &registry, &options))
    .with_context(|| format!("Failed to run {}", options.id))
}

async fn run(docker: &Docker, registry: &FixtureRegistry, options: &RunOptions) -> Result<()> {
  let image = build(docker, registry, &options.id, None).await?;
  let fixture = registry.find_fixture(&options.id)?;

  let mut starter = image
    .starter(docker, fixture)?
    .with_args(options.args.iter().cloned());
  if options.port_offset.is_some() {
    starter = starter.with_port_offset(options.port_offset);
  }
  if let Some(ip) = &options.ip {
    starter = starter.with_ip_address(ip.clone());
  }
  if let Some(log) = &options.log {
    starter = starter.with_log(log);
  }

  let mut handle: ContainerHandle = starter.start().await?;
  print_success(&format!("Started {} from {}", handle.cid(), image));

  let ip = bracket_ipv6(&handle.ip_address());
  for port in &fixture.descriptor()?.ports {
    match handle.port(*port).await {
      Ok(host_port) => print_stat(&format!("{}/tcp", port), &format!("{}:{}", ip, host_port)),
      Err(e) => print_warning(&format!("Could not look up port {}: {}", port, e)),
    }
  }

  match options.duration {
    Some(duration) => {
      debug!(?duration, "running for a fixed time");
      tokio::time::sleep(duration).await;
    }
    None => {
      print_info("Press Ctrl-C to stop and remove the container");
      tokio::signal::ctrl_c().await.context("Failed to wait for Ctrl-C")?;
    }
  }

  handle.close().await?;
  print_success(&format!("Removed {}", handle.cid()));
  Ok(())
}
