//! Engine configuration.
//!
//! A [`DockerConfig`] is built once (usually with [`DockerConfig::from_env`]) and
//! passed by reference to every build and launch. Toggling the build cache for a
//! run means constructing a config with `no_cache` set, not flipping a global.

use serde::{Deserialize, Serialize};

use crate::consts::{
  DEFAULT_DOCKER_PROGRAM, DEFAULT_IMAGE_NAMESPACE, DOCKER_HOST_ENV, DOCKER_PROGRAM_ENV, IMAGE_NAMESPACE_ENV,
  NETWORK_ENV, NO_CACHE_ENV,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DockerConfig {
  /// Engine executable (`docker` unless overridden).
  pub program: String,

  /// Namespace for image tags (`<namespace>/<id>:<hash>`).
  pub image_namespace: String,

  /// Pass `--no-cache=true` to every build.
  pub no_cache: bool,

  /// Raw engine host URI, as found in `DOCKER_HOST`.
  pub host: Option<String>,

  /// Network every launched container is attached to.
  pub network: Option<String>,
}

impl Default for DockerConfig {
  fn default() -> Self {
    Self {
      program: DEFAULT_DOCKER_PROGRAM.to_string(),
      image_namespace: DEFAULT_IMAGE_NAMESPACE.to_string(),
      no_cache: false,
      host: None,
      network: None,
    }
  }
}

impl DockerConfig {
  /// Build a configuration from the process environment.
  ///
  /// Empty variables are treated as unset.
  pub fn from_env() -> Self {
    let defaults = Self::default();
    Self {
      program: non_empty_var(DOCKER_PROGRAM_ENV).unwrap_or(defaults.program),
      image_namespace: non_empty_var(IMAGE_NAMESPACE_ENV).unwrap_or(defaults.image_namespace),
      no_cache: non_empty_var(NO_CACHE_ENV).is_some_and(|v| is_truthy(&v)),
      host: non_empty_var(DOCKER_HOST_ENV),
      network: non_empty_var(NETWORK_ENV),
    }
  }

  pub fn with_program(mut self, program: impl Into<String>) -> Self {
    self.program = program.into();
    self
  }

  pub fn with_image_namespace(mut self, namespace: impl Into<String>) -> Self {
    self.image_namespace = namespace.into();
    self
  }

  pub fn with_no_cache(mut self, no_cache: bool) -> Self {
    self.no_cache = no_cache;
    self
  }

  pub fn with_host(mut self, host: Option<String>) -> Self {
    self.host = host;
    self
  }

  pub fn with_network(mut self, network: Option<String>) -> Self {
    self.network = network;
    self
  }
}

fn non_empty_var(name: &str) -> Option<String> {
  std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn is_truthy(value: &str) -> bool {
  matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
