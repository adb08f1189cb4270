//! Image building.
//!
//! Images are tagged by the content of their `Dockerfile`, so rebuilding an
//! unchanged fixture is answered by the engine's own layer cache while any
//! edit produces a new, distinguishable tag. There is no other cache.

use std::fs::OpenOptions;
use std::path::Path;
use std::process::Stdio;

use tracing::{debug, info, warn};

use crate::build::Image;
use crate::build::extract::extract;
use crate::consts::{DOCKERFILE, TAG_HASH_PREFIX_LEN};
use crate::docker::Docker;
use crate::error::{FixtureError, Result};
use crate::fixture::{FixtureRegistry, FixtureType, resolve_context};
use crate::util::dump::dump_log;
use crate::util::hash::hash_file;

/// Compute the image tag for a Dockerfile.
pub fn image_tag(namespace: &str, id: &str, dockerfile: &Path) -> Result<String> {
  let hash = hash_file(dockerfile)?;
  Ok(format!("{}/{}:{}", namespace, id, hash.prefix(TAG_HASH_PREFIX_LEN)))
}

/// Build the image of fixture `name`, building its base fixtures first.
///
/// Every link of the inheritance chain is built in order, root first, so the
/// `FROM` line of each Dockerfile finds its base image. Build output is appended
/// to `log` when given, and goes to the caller's stdout otherwise.
pub async fn build_image(docker: &Docker, registry: &FixtureRegistry, name: &str, log: Option<&Path>) -> Result<Image> {
  let lineage = registry.lineage(name)?;
  let (leaf, bases) = lineage
    .split_last()
    .ok_or_else(|| FixtureError::UnknownType(name.to_string()))?;

  for base in bases {
    build_layer(docker, registry, base, log).await?;
  }
  build_layer(docker, registry, leaf, log).await
}

/// Build into a temporary log that is printed if the build fails.
///
/// The log is deleted on every path.
pub async fn build_image_logged(docker: &Docker, registry: &FixtureRegistry, name: &str) -> Result<Image> {
  let fixture = registry.get(name)?;
  let log = tempfile::Builder::new()
    .prefix(&format!("docker-{}-build", fixture.simple_name()))
    .suffix(".log")
    .tempfile()?;

  let result = build_image(docker, registry, name, Some(log.path())).await;

  if result.is_err()
    && let Err(e) = dump_log(log.path())
  {
    warn!(error = %e, "failed to dump build log");
  }
  if let Err(e) = log.close() {
    warn!(error = %e, "failed to delete build log");
  }
  result
}

/// Build one link of the chain from its own freshly extracted context.
async fn build_layer(
  docker: &Docker,
  registry: &FixtureRegistry,
  fixture: &FixtureType,
  log: Option<&Path>,
) -> Result<Image> {
  let descriptor = fixture.descriptor()?;
  let location = resolve_context(fixture)?;
  let context = extract(fixture, &location, registry.resources_for(fixture))?;

  let result = build_context(docker, &descriptor.id, context.path(), log).await;

  // The context goes away whether or not the build succeeded.
  let cleanup = context.close();
  let image = result?;
  cleanup?;
  Ok(image)
}

/// Build an image from a prepared context directory.
pub async fn build_context(docker: &Docker, id: &str, dir: &Path, log: Option<&Path>) -> Result<Image> {
  let config = docker.config();
  let tag = image_tag(&config.image_namespace, id, &dir.join(DOCKERFILE))?;

  let mut cmd = docker.cmd("build").args(["-t", tag.as_str()]);
  if config.no_cache {
    cmd = cmd.arg("--no-cache=true");
  }
  let cmd = cmd.arg(dir.to_string_lossy());

  let mut command = cmd.to_command();
  match log {
    Some(log) => {
      info!(cmd = %cmd, log = %log.display(), "building docker image");
      let file = OpenOptions::new().create(true).append(true).open(log)?;
      command.stdout(Stdio::from(file.try_clone()?)).stderr(Stdio::from(file));
    }
    None => {
      info!(cmd = %cmd, "building docker image");
      command.stdout(Stdio::inherit()).stderr(Stdio::inherit());
    }
  }

  let status = command.status().await?;
  if !status.success() {
    return Err(FixtureError::BuildFailed {
      code: status.code(),
      tag,
    });
  }

  debug!(tag = %tag, "image built");
  Ok(Image::new(tag))
}
