mod available;
mod build;
mod list;
mod run;
mod status;

use std::path::Path;

use anyhow::{Context, Result};
use dockfix_lib::{Docker, DockerConfig, FixtureRegistry};

pub use available::cmd_available;
pub use build::cmd_build;
pub use list::cmd_list;
pub use run::{RunOptions, cmd_run};
pub use status::cmd_status;

fn load_registry(manifest: &Path) -> Result<FixtureRegistry> {
  FixtureRegistry::from_manifest(manifest).with_context(|| format!("Failed to load manifest {}", manifest.display()))
}

/// Engine configuration from the environment, with `--no-cache` applied on top.
fn docker(no_cache: bool) -> Docker {
  let config = DockerConfig::from_env();
  let no_cache = no_cache || config.no_cache;
  Docker::new(config.with_no_cache(no_cache))
}

fn runtime() -> Result<tokio::runtime::Runtime> {
  tokio::runtime::Runtime::new().context("Failed to create async runtime")
}
