//! Configurable container launch.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::io::AsyncRead;
use tokio::process::Child;
use tracing::{debug, info, warn};

use crate::build::Image;
use crate::container::{ContainerHandle, FixtureContainer, InitError};
use crate::docker::host::is_loopback;
use crate::docker::{Docker, DockerCommand};
use crate::error::{FixtureError, Result};
use crate::fixture::{FixtureDescriptor, FixtureType};
use crate::launch::ports::{port_mapping, udp_port_mapping};

impl Image {
  /// Prepare a launch of this image with defaults taken from `fixture`'s descriptor.
  pub fn starter<'a>(&'a self, docker: &'a Docker, fixture: &FixtureType) -> Result<Starter<'a>> {
    Ok(Starter::new(docker, self, fixture.name(), fixture.descriptor()?))
  }
}

/// Builder for one `run -d` of an image.
///
/// Every setter replaces the previous value; nothing is sent to the engine
/// until [`Starter::start`].
#[derive(Debug, Clone)]
pub struct Starter<'a> {
  docker: &'a Docker,
  image: &'a Image,
  fixture: String,
  bind_ip: String,
  default_bind: bool,
  ports: Vec<u16>,
  udp_ports: Vec<u16>,
  port_offset: Option<u16>,
  ip_address: Option<String>,
  options: Vec<String>,
  args: Vec<String>,
  log: Option<PathBuf>,
  network: Option<String>,
}

impl<'a> Starter<'a> {
  pub fn new(docker: &'a Docker, image: &'a Image, fixture: &str, descriptor: &FixtureDescriptor) -> Self {
    Self {
      docker,
      image,
      fixture: fixture.to_string(),
      bind_ip: descriptor.bind_ip.clone(),
      default_bind: descriptor.has_default_bind_ip(),
      ports: descriptor.ports.clone(),
      udp_ports: descriptor.udp_ports.clone(),
      port_offset: descriptor.match_host_ports.then_some(0),
      ip_address: None,
      options: Vec::new(),
      args: Vec::new(),
      log: None,
      network: docker.config().network.clone(),
    }
  }

  pub fn with_ports(mut self, ports: &[u16]) -> Self {
    self.ports = ports.to_vec();
    self
  }

  pub fn with_udp_ports(mut self, ports: &[u16]) -> Self {
    self.udp_ports = ports.to_vec();
    self
  }

  /// Publish each port on `offset + port` instead of an engine-chosen port.
  pub fn with_port_offset(mut self, offset: Option<u16>) -> Self {
    self.port_offset = offset;
    self
  }

  /// Host address to publish on, overriding the descriptor and the engine host.
  pub fn with_ip_address(mut self, ip: impl Into<String>) -> Self {
    self.ip_address = Some(ip.into());
    self
  }

  /// Extra `run` options placed before the image tag.
  pub fn with_options<I, S>(mut self, options: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.options = options.into_iter().map(Into::into).collect();
    self
  }

  /// Arguments passed to the container's entry point.
  pub fn with_args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args = args.into_iter().map(Into::into).collect();
    self
  }

  /// Write container output to `log` instead of the caller's stdout.
  pub fn with_log(mut self, log: impl Into<PathBuf>) -> Self {
    self.log = Some(log.into());
    self
  }

  pub fn with_network(mut self, network: Option<String>) -> Self {
    self.network = network;
    self
  }

  /// Address the ports will be published on.
  ///
  /// A descriptor bind address other than the default requires a local engine.
  pub fn bind_address(&self) -> Result<String> {
    if let Some(ip) = &self.ip_address {
      return Ok(ip.clone());
    }
    if self.default_bind {
      return Ok(self.docker.host());
    }

    let host = self.docker.host();
    if !is_loopback(&host) {
      return Err(FixtureError::RemoteBindNotSupported {
        fixture: self.fixture.clone(),
        bind_ip: self.bind_ip.clone(),
        host,
      });
    }
    Ok(self.bind_ip.clone())
  }

  /// The `run` command line this starter would execute.
  pub fn command(&self) -> Result<DockerCommand> {
    let ip = self.bind_address()?;

    let mut cmd = self.docker.cmd("run").arg("-d");
    if let Some(network) = &self.network {
      cmd = cmd.args(["--network", network.as_str()]);
    }
    for port in &self.ports {
      cmd = cmd.arg("-p").arg(port_mapping(&ip, self.port_offset, *port));
    }
    for port in &self.udp_ports {
      cmd = cmd.arg("-p").arg(udp_port_mapping(&ip, self.port_offset, *port));
    }

    Ok(
      cmd
        .args(self.options.iter().cloned())
        .arg(self.image.tag())
        .args(self.args.iter().cloned()),
    )
  }

  /// Run the container and wrap it as `T`.
  ///
  /// If log following cannot be started or `T` rejects the handle, the
  /// container is removed before the error is returned.
  pub async fn start<T: FixtureContainer>(self) -> Result<T> {
    let cmd = self.command()?;
    match &self.log {
      Some(log) => info!(cmd = %cmd, log = %log.display(), "launching docker container"),
      None => info!(cmd = %cmd, "launching docker container"),
    }

    let cid = container_id(self.docker, &cmd).await?;
    debug!(cid = %cid, fixture = %self.fixture, "container started");

    let log_process = match follow_logs(self.docker, &cid, self.log.as_deref()) {
      Ok(child) => child,
      Err(e) => {
        if let Err(rm) = self.docker.remove_container(&cid).await {
          warn!(cid = %cid, error = %rm, "failed to remove container");
        }
        return Err(e);
      }
    };

    let handle = ContainerHandle::new(self.docker.clone(), cid, Some(log_process), self.log);
    match T::from_handle(handle) {
      Ok(container) => Ok(container),
      Err(InitError { mut handle, source }) => {
        let cid = handle.cid().to_string();
        if let Err(e) = handle.close().await {
          warn!(cid = %cid, error = %e, "failed to clean up container");
        }
        Err(FixtureError::HandleInitFailed { cid, source })
      }
    }
  }
}

/// Run `cmd` and read the container id it prints.
async fn container_id(docker: &Docker, cmd: &DockerCommand) -> Result<String> {
  let out = docker.output(cmd).await?;
  if !out.status.success() {
    return Err(FixtureError::LaunchFailed {
      code: out.status.code(),
      cmd: cmd.to_string(),
      output: out.combined(),
    });
  }

  let cid = out.stdout.trim();
  if cid.is_empty() {
    return Err(FixtureError::NoContainerId { cmd: cmd.to_string() });
  }
  Ok(cid.to_string())
}

/// Spawn `logs -f` for the container, into `log` or onto our stdout.
fn follow_logs(docker: &Docker, cid: &str, log: Option<&Path>) -> Result<Child> {
  let mut command = docker.cmd("logs").args(["-f", cid]).to_command();
  command.kill_on_drop(true);

  match log {
    Some(log) => {
      let file = File::create(log)?;
      command.stdout(Stdio::from(file.try_clone()?)).stderr(Stdio::from(file));
      Ok(command.spawn()?)
    }
    None => {
      command.stdout(Stdio::piped()).stderr(Stdio::piped());
      let mut child = command.spawn()?;
      if let Some(stdout) = child.stdout.take() {
        tokio::spawn(copy_to_stdout(stdout));
      }
      if let Some(stderr) = child.stderr.take() {
        tokio::spawn(copy_to_stdout(stderr));
      }
      Ok(child)
    }
  }
}

async fn copy_to_stdout<R: AsyncRead + Unpin>(mut reader: R) {
  let mut stdout = tokio::io::stdout();
  if let Err(e) = tokio::io::copy(&mut reader, &mut stdout).await {
    warn!(error = %e, "failed to copy container output");
  }
}
