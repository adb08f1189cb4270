//! Running containers.
//!
//! A [`ContainerHandle`] is the live side of a launch: the engine-assigned
//! container id plus the `logs -f` process following it. Closing the handle
//! stops log following and removes the container; it does so at most once.
//!
//! Fixture-specific container types wrap a handle and implement
//! [`FixtureContainer`] so the launcher can construct them generically.

use std::path::{Path, PathBuf};

use tokio::process::Child;
use tracing::{debug, info, warn};

use crate::docker::Docker;
use crate::error::{BoxError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
  Running,
  Closed,
}

/// A started container.
///
/// Dropping a handle that was never closed removes the container with a blocking
/// `rm -f` on the dropping thread. In async code call [`ContainerHandle::close`]
/// instead so the removal does not stall a runtime worker.
#[derive(Debug)]
pub struct ContainerHandle {
  docker: Docker,
  cid: String,
  log_process: Option<Child>,
  log_file: Option<PathBuf>,
  state: HandleState,
}

impl ContainerHandle {
  pub fn new(docker: Docker, cid: impl Into<String>, log_process: Option<Child>, log_file: Option<PathBuf>) -> Self {
    Self {
      docker,
      cid: cid.into(),
      log_process,
      log_file,
      state: HandleState::Running,
    }
  }

  /// Container id as reported by the engine.
  pub fn cid(&self) -> &str {
    &self.cid
  }

  pub fn log_file(&self) -> Option<&Path> {
    self.log_file.as_deref()
  }

  pub fn state(&self) -> HandleState {
    self.state
  }

  pub fn is_closed(&self) -> bool {
    self.state == HandleState::Closed
  }

  /// Address published ports are reachable on.
  pub fn ip_address(&self) -> String {
    self.docker.host()
  }

  /// Host port published for `container_port`.
  pub async fn port(&self, container_port: u16) -> Result<u16> {
    self.docker.port(&self.cid, container_port).await
  }

  pub async fn is_running(&self) -> Result<bool> {
    if self.is_closed() {
      return Ok(false);
    }
    self.docker.is_container_running(&self.cid).await
  }

  /// Stop following logs and remove the container.
  ///
  /// Calling this again after it has run once is a no-op, even if the removal failed.
  pub async fn close(&mut self) -> Result<()> {
    if self.is_closed() {
      return Ok(());
    }
    self.state = HandleState::Closed;

    if let Some(mut log_process) = self.log_process.take()
      && let Err(e) = log_process.kill().await
    {
      debug!(cid = %self.cid, error = %e, "log follower already gone");
    }

    info!(cid = %self.cid, "removing docker container");
    self.docker.remove_container(&self.cid).await
  }
}

impl Drop for ContainerHandle {
  fn drop(&mut self) {
    if self.is_closed() {
      return;
    }
    self.state = HandleState::Closed;

    if let Some(log_process) = self.log_process.as_mut() {
      let _ = log_process.start_kill();
    }

    warn!(cid = %self.cid, "container handle dropped without close, removing container");
    let cmd = self.docker.cmd("rm").args(["-f", self.cid.as_str()]);
    match cmd
      .to_std_command()
      .stdout(std::process::Stdio::null())
      .stderr(std::process::Stdio::null())
      .status()
    {
      Ok(status) if status.success() => {}
      Ok(status) => warn!(cid = %self.cid, code = ?status.code(), "failed to remove container"),
      Err(e) => warn!(cid = %self.cid, error = %e, "failed to remove container"),
    }
  }
}

/// Returned by [`FixtureContainer::from_handle`] on failure, handing the handle
/// back so the launcher can clean the container up.
#[derive(Debug)]
pub struct InitError {
  pub handle: ContainerHandle,
  pub source: BoxError,
}

impl InitError {
  pub fn new(handle: ContainerHandle, source: impl Into<BoxError>) -> Self {
    Self {
      handle,
      source: source.into(),
    }
  }
}

/// A container type the launcher can construct from a fresh handle.
pub trait FixtureContainer: Sized {
  fn from_handle(handle: ContainerHandle) -> Result<Self, InitError>;

  fn handle(&self) -> &ContainerHandle;

  fn handle_mut(&mut self) -> &mut ContainerHandle;

  fn cid(&self) -> &str {
    self.handle().cid()
  }
}

impl FixtureContainer for ContainerHandle {
  fn from_handle(handle: ContainerHandle) -> Result<Self, InitError> {
    Ok(handle)
  }

  fn handle(&self) -> &ContainerHandle {
    self
  }

  fn handle_mut(&mut self) -> &mut ContainerHandle {
    self
  }
}
