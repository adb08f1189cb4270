//! Implementation of the `dockfix available` command.

use anyhow::Result;
use dockfix_lib::session::ensure_engine;

use crate::cmd::{docker, runtime};
use crate::output::{print_error, print_success};

/// Exit 0 when the engine answers, 1 otherwise.
pub fn cmd_available(local: bool) -> Result<()> {
  let docker = docker(false);
  let rt = runtime()?;

  match rt.block_on(ensure_engine(&docker, local)) {
    Ok(()) => {
      print_success(&format!("docker is available on {}", docker.host()));
      Ok(())
    }
    Err(e) => {
      print_error(&e.to_string());
      std::process::exit(1);
    }
  }
}
