//! Implementation of the `dockfix build` command.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use dockfix_lib::session::ensure_engine;
use dockfix_lib::{Docker, FixtureRegistry, Image, build_image, build_image_logged};

use crate::cmd::{docker, load_registry, runtime};
use crate::output::{format_elapsed, print_stat, print_success};

/// Build the fixture with descriptor id `id`, bases first, and print its tag.
pub fn cmd_build(manifest: &Path, id: &str, no_cache: bool, log: Option<&Path>) -> Result<()> {
  let registry = load_registry(manifest)?;
  let docker = docker(no_cache);
  let rt = runtime()?;

  let started = Instant::now();
  let image = rt
    .block_on(build(&docker, &registry, id, log))
    .with_context(|| format!("Failed to build {}", id))?;

  print_success(&format!("Built {}", image));
  print_stat("Took", &format_elapsed(started.elapsed()));
  Ok(())
}

pub(crate) async fn build(
  docker: &Docker,
  registry: &FixtureRegistry,
  id: &str,
  log: Option<&Path>,
) -> dockfix_lib::Result<Image> {
  ensure_engine(docker, false).await?;
  let fixture = registry.find_fixture(id)?;
  match log {
    Some(log) => build_image(docker, registry, fixture.name(), Some(log)).await,
    None => build_image_logged(docker, registry, fixture.name()).await,
  }
}
