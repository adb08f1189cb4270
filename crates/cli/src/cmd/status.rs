//! Implementation of the `dockfix status` command.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cmd::{docker, runtime};
use crate::output::{OutputFormat, print_info, print_json, print_success};

#[derive(Debug, Serialize)]
struct StatusOutput<'a> {
  cid: &'a str,
  running: bool,
}

pub fn cmd_status(cid: &str, output: OutputFormat) -> Result<()> {
  let docker = docker(false);
  let rt = runtime()?;

  let running = rt
    .block_on(docker.is_container_running(cid))
    .with_context(|| format!("Failed to query container {}", cid))?;

  if output.is_json() {
    print_json(&StatusOutput { cid, running })?;
  } else if running {
    print_success(&format!("{} is running", cid));
  } else {
    print_info(&format!("{} is not running", cid));
  }
  Ok(())
}
