//! Test-scoped fixture lifecycles.
//!
//! [`FixtureSession`] gives one test one container: it checks the engine,
//! builds the fixture chain, starts the container on first use, and on
//! [`finish`](FixtureSession::finish) removes it again, printing the build and
//! run logs if the test failed.
//!
//! [`ImageSession`] builds an image once and starts any number of containers
//! from it, for suites that share a fixture.

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::build::{Image, build_image, build_image_logged};
use crate::container::FixtureContainer;
use crate::docker::Docker;
use crate::error::{FixtureError, Result};
use crate::fixture::FixtureRegistry;
use crate::launch::Starter;
use crate::util::dump::dump_log;

/// Check that the engine answers and, if required, runs on this machine.
pub async fn ensure_engine(docker: &Docker, local_only: bool) -> Result<()> {
  if !docker.is_available().await {
    return Err(FixtureError::EngineUnavailable);
  }
  if local_only && !docker.is_local() {
    return Err(FixtureError::EngineNotLocal { host: docker.host() });
  }
  Ok(())
}

fn temp_log(simple_name: &str, phase: &str) -> Result<NamedTempFile> {
  Ok(
    tempfile::Builder::new()
      .prefix(&format!("docker-{}-{}", simple_name, phase))
      .suffix(".log")
      .tempfile()?,
  )
}

/// One container for the duration of one test.
pub struct FixtureSession<'a, T: FixtureContainer> {
  docker: Docker,
  registry: &'a FixtureRegistry,
  name: String,
  local_only: bool,
  build_log: Option<NamedTempFile>,
  run_log: Option<NamedTempFile>,
  container: Option<T>,
}

impl<'a, T: FixtureContainer> FixtureSession<'a, T> {
  pub fn new(docker: Docker, registry: &'a FixtureRegistry, name: impl Into<String>) -> Self {
    Self {
      docker,
      registry,
      name: name.into(),
      local_only: false,
      build_log: None,
      run_log: None,
      container: None,
    }
  }

  /// Refuse to run against an engine on another machine.
  pub fn local_only(mut self) -> Self {
    self.local_only = true;
    self
  }

  /// The container, started on first call.
  ///
  /// Fails with [`FixtureError::EngineUnavailable`] or
  /// [`FixtureError::EngineNotLocal`] when the test should be skipped.
  pub async fn get(&mut self) -> Result<&mut T> {
    if self.container.is_none() {
      let container = self.launch().await?;
      self.container = Some(container);
    }
    self
      .container
      .as_mut()
      .ok_or_else(|| FixtureError::UnknownType(self.name.clone()))
  }

  pub fn is_started(&self) -> bool {
    self.container.is_some()
  }

  async fn launch(&mut self) -> Result<T> {
    ensure_engine(&self.docker, self.local_only).await?;

    let registry = self.registry;
    let fixture = registry.get(&self.name)?;
    let build_log = temp_log(fixture.simple_name(), "build")?;
    let run_log = temp_log(fixture.simple_name(), "run")?;

    let built = build_image(&self.docker, registry, &self.name, Some(build_log.path())).await;
    let run_path = run_log.path().to_path_buf();
    self.build_log = Some(build_log);
    self.run_log = Some(run_log);

    let image = built?;
    image
      .starter(&self.docker, fixture)?
      .with_log(run_path)
      .start::<T>()
      .await
  }

  /// Remove the container and delete the logs, printing them first if `failed`.
  ///
  /// Calling this again is a no-op.
  pub async fn finish(&mut self, failed: bool) -> Result<()> {
    let closed = match self.container.take() {
      Some(mut container) => container.handle_mut().close().await,
      None => Ok(()),
    };

    for log in [self.build_log.take(), self.run_log.take()].into_iter().flatten() {
      if failed && let Err(e) = dump_log(log.path()) {
        warn!(error = %e, "failed to dump log");
      }
      if let Err(e) = log.close() {
        warn!(error = %e, "failed to delete log");
      }
    }
    closed
  }
}

/// One image, built once, with any number of containers started from it.
pub struct ImageSession<'a, T: FixtureContainer> {
  docker: Docker,
  registry: &'a FixtureRegistry,
  name: String,
  image: Option<Image>,
  containers: Vec<T>,
}

impl<'a, T: FixtureContainer> ImageSession<'a, T> {
  pub fn new(docker: Docker, registry: &'a FixtureRegistry, name: impl Into<String>) -> Self {
    Self {
      docker,
      registry,
      name: name.into(),
      image: None,
      containers: Vec::new(),
    }
  }

  /// Build the image if that has not happened yet.
  pub async fn build(&mut self) -> Result<&Image> {
    if self.image.is_none() {
      ensure_engine(&self.docker, false).await?;
      let image = build_image_logged(&self.docker, self.registry, &self.name).await?;
      debug!(image = %image, "session image ready");
      self.image = Some(image);
    }
    self
      .image
      .as_ref()
      .ok_or_else(|| FixtureError::UnknownType(self.name.clone()))
  }

  /// Start a container with the fixture's defaults.
  pub async fn create(&mut self) -> Result<&mut T> {
    self.create_with(|starter| starter).await
  }

  /// Start a container after adjusting the launch.
  pub async fn create_with<F>(&mut self, configure: F) -> Result<&mut T>
  where
    F: for<'s> FnOnce(Starter<'s>) -> Starter<'s>,
  {
    let image = self.build().await?.clone();
    let fixture = self.registry.get(&self.name)?;
    let container = configure(image.starter(&self.docker, fixture)?).start::<T>().await?;

    self.containers.push(container);
    self
      .containers
      .last_mut()
      .ok_or_else(|| FixtureError::UnknownType(self.name.clone()))
  }

  pub fn containers(&self) -> &[T] {
    &self.containers
  }

  /// Close every container, reporting the first failure.
  pub async fn close_all(&mut self) -> Result<()> {
    let mut first_err = None;
    for mut container in self.containers.drain(..) {
      if let Err(e) = container.handle_mut().close().await {
        warn!(cid = %container.cid(), error = %e, "failed to close container");
        first_err.get_or_insert(e);
      }
    }
    first_err.map_or(Ok(()), Err)
  }
}
