//! Engine access.
//!
//! [`Docker`] wraps the configured engine executable. Everything that talks to the
//! engine goes through it: image builds, container launches, and the small
//! queries (`ps`, `port`, `rm`) used for availability checks and teardown.
//!
//! # Submodules
//!
//! - [`command`] - Command lines as data
//! - [`host`] - Engine host resolution and loopback checks

pub mod command;
pub mod host;

use std::process::ExitStatus;

use tracing::{debug, warn};

use crate::config::DockerConfig;
use crate::error::{FixtureError, Result};

pub use command::DockerCommand;

/// Captured output of a finished engine command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
  pub status: ExitStatus,
  pub stdout: String,
  pub stderr: String,
}

impl CommandOutput {
  /// Stdout followed by stderr.
  pub fn combined(&self) -> String {
    let mut combined = self.stdout.clone();
    if !self.stderr.is_empty() {
      if !combined.is_empty() && !combined.ends_with('\n') {
        combined.push('\n');
      }
      combined.push_str(&self.stderr);
    }
    combined
  }
}

#[derive(Debug, Clone, Default)]
pub struct Docker {
  config: DockerConfig,
}

impl Docker {
  pub fn new(config: DockerConfig) -> Self {
    Self { config }
  }

  pub fn from_env() -> Self {
    Self::new(DockerConfig::from_env())
  }

  pub fn config(&self) -> &DockerConfig {
    &self.config
  }

  /// Start a command line for `subcommand`.
  pub fn cmd(&self, subcommand: &str) -> DockerCommand {
    DockerCommand::new(&self.config.program).arg(subcommand)
  }

  /// Address or hostname of the engine host.
  pub fn host(&self) -> String {
    host::engine_host(self.config.host.as_deref())
  }

  /// Whether the engine runs on this machine.
  pub fn is_local(&self) -> bool {
    host::is_loopback(&self.host())
  }

  /// Run a command to completion with stdin from the null device, capturing output.
  pub async fn output(&self, cmd: &DockerCommand) -> Result<CommandOutput> {
    debug!(cmd = %cmd, "running engine command");
    let output = cmd.to_command().output().await?;
    Ok(CommandOutput {
      status: output.status,
      stdout: String::from_utf8_lossy(&output.stdout).to_string(),
      stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    })
  }

  /// Checks if the engine answers at all.
  pub async fn is_available(&self) -> bool {
    match self.output(&self.cmd("ps")).await {
      Ok(out) => out.status.success(),
      Err(e) => {
        debug!(error = %e, "engine not available");
        false
      }
    }
  }

  /// Checks if a given container is currently running.
  ///
  /// A failing `ps` is logged and reported as not running: `ps` does not fail
  /// merely because nothing matched.
  pub async fn is_container_running(&self, cid: &str) -> Result<bool> {
    let cmd = self.cmd("ps").args(["-q", "--filter", &format!("id={}", cid)]);
    let out = self.output(&cmd).await?;
    if out.status.success() {
      let short = short_id(cid);
      return Ok(!short.is_empty() && out.stdout.contains(short));
    }
    warn!(code = ?out.status.code(), output = %out.combined(), "docker ps failed");
    Ok(false)
  }

  /// Host port the engine published for a container's TCP port.
  pub async fn port(&self, cid: &str, container_port: u16) -> Result<u16> {
    let cmd = self.cmd("port").arg(cid).arg(format!("{}/tcp", container_port));
    let out = self.output(&cmd).await?;
    let parsed = out
      .status
      .success()
      .then(|| parse_port_output(&out.stdout))
      .flatten();
    parsed.ok_or_else(|| FixtureError::CommandFailed {
      cmd: cmd.to_string(),
      code: out.status.code(),
      output: out.combined(),
    })
  }

  /// Stop and remove a container.
  pub async fn remove_container(&self, cid: &str) -> Result<()> {
    let cmd = self.cmd("rm").args(["-f", cid]);
    let out = self.output(&cmd).await?;
    if !out.status.success() {
      return Err(FixtureError::CommandFailed {
        cmd: cmd.to_string(),
        code: out.status.code(),
        output: out.combined(),
      });
    }
    Ok(())
  }
}

/// Parse `port` output such as `0.0.0.0:49153` (first mapping wins).
fn parse_port_output(stdout: &str) -> Option<u16> {
  stdout
    .lines()
    .map(str::trim)
    .find(|l| !l.is_empty())
    .and_then(|line| line.rsplit_once(':'))
    .and_then(|(_, port)| port.trim().parse().ok())
}

/// The 12-character prefix `ps -q` prints for a container id.
fn short_id(cid: &str) -> &str {
  cid.char_indices().nth(12).map_or(cid, |(i, _)| &cid[..i])
}
