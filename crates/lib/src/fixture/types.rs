use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_BIND_IP;
use crate::error::{FixtureError, Result};
use crate::fixture::transform::TransformFactory;

/// Declarative description of a fixture: what to build and how to run it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureDescriptor {
  /// Image name below the namespace, e.g. `sshd`.
  pub id: String,

  /// Build-context location overriding the one derived from the fixture's identity.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub dockerfile_folder: Option<String>,

  /// TCP ports to publish, in order.
  #[serde(default)]
  pub ports: Vec<u16>,

  #[serde(default)]
  pub udp_ports: Vec<u16>,

  /// Address published ports bind to. Anything but the default requires a local engine.
  #[serde(default = "default_bind_ip")]
  pub bind_ip: String,

  /// Publish each port on the same host port (offset zero).
  #[serde(default)]
  pub match_host_ports: bool,

  /// The build context must be rewritten by a transform before building.
  #[serde(default)]
  pub dynamic: bool,
}

fn default_bind_ip() -> String {
  DEFAULT_BIND_IP.to_string()
}

impl FixtureDescriptor {
  pub fn new(id: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      dockerfile_folder: None,
      ports: Vec::new(),
      udp_ports: Vec::new(),
      bind_ip: default_bind_ip(),
      match_host_ports: false,
      dynamic: false,
    }
  }

  pub fn with_dockerfile_folder(mut self, folder: impl Into<String>) -> Self {
    self.dockerfile_folder = Some(folder.into());
    self
  }

  pub fn with_ports(mut self, ports: &[u16]) -> Self {
    self.ports = ports.to_vec();
    self
  }

  pub fn with_udp_ports(mut self, ports: &[u16]) -> Self {
    self.udp_ports = ports.to_vec();
    self
  }

  pub fn with_bind_ip(mut self, bind_ip: impl Into<String>) -> Self {
    self.bind_ip = bind_ip.into();
    self
  }

  pub fn with_match_host_ports(mut self, match_host_ports: bool) -> Self {
    self.match_host_ports = match_host_ports;
    self
  }

  pub fn with_dynamic(mut self, dynamic: bool) -> Self {
    self.dynamic = dynamic;
    self
  }

  pub fn has_default_bind_ip(&self) -> bool {
    self.bind_ip == DEFAULT_BIND_IP
  }
}

/// A registered fixture type.
///
/// The `name` is the fixture's fully-qualified identity (`fixtures::sshd::SshdContainer`).
/// `base` names the fixture whose image this one builds `FROM`; `None` ends the chain.
#[derive(Clone)]
pub struct FixtureType {
  name: String,
  descriptor: Option<FixtureDescriptor>,
  base: Option<String>,
  resources: Option<PathBuf>,
  transform: Option<TransformFactory>,
}

impl FixtureType {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      descriptor: None,
      base: None,
      resources: None,
      transform: None,
    }
  }

  pub fn with_descriptor(mut self, descriptor: FixtureDescriptor) -> Self {
    self.descriptor = Some(descriptor);
    self
  }

  pub fn with_base(mut self, base: impl Into<String>) -> Self {
    self.base = Some(base.into());
    self
  }

  /// Resource root (directory tree or zip archive) holding this fixture's build context.
  pub fn with_resources(mut self, resources: impl Into<PathBuf>) -> Self {
    self.resources = Some(resources.into());
    self
  }

  pub fn with_transform(mut self, transform: TransformFactory) -> Self {
    self.transform = Some(transform);
    self
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  /// Last segment of the identity, e.g. `SshdContainer`.
  pub fn simple_name(&self) -> &str {
    self.name.rsplit("::").next().unwrap_or(&self.name)
  }

  pub fn descriptor(&self) -> Result<&FixtureDescriptor> {
    self.descriptor.as_ref().ok_or_else(|| FixtureError::MissingDescriptor {
      fixture: self.name.clone(),
    })
  }

  pub fn base(&self) -> Option<&str> {
    self.base.as_deref()
  }

  pub fn resources(&self) -> Option<&Path> {
    self.resources.as_deref()
  }

  pub fn transform(&self) -> Option<&TransformFactory> {
    self.transform.as_ref()
  }
}

impl fmt::Debug for FixtureType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("FixtureType")
      .field("name", &self.name)
      .field("descriptor", &self.descriptor)
      .field("base", &self.base)
      .field("resources", &self.resources)
      .field("transform", &self.transform.as_ref().map(|_| "<factory>"))
      .finish()
  }
}
