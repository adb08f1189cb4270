//! Error types for dockfix-lib.

use std::path::PathBuf;

use thiserror::Error;

use crate::util::hash::DirHashError;

/// Boxed error returned by user-supplied hooks and container constructors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub type Result<T, E = FixtureError> = std::result::Result<T, E>;

/// Errors produced while resolving, building, launching, or closing fixtures.
#[derive(Debug, Error)]
pub enum FixtureError {
  /// The fixture type was registered without a descriptor. This is a programming error.
  #[error("{fixture} is missing a fixture descriptor")]
  MissingDescriptor { fixture: String },

  #[error("no such fixture type: {0}")]
  UnknownType(String),

  #[error("no such docker fixture found: {0}")]
  UnknownFixture(String),

  #[error("fixture type registered twice: {0}")]
  DuplicateType(String),

  #[error("fixture inheritance cycle through {0}")]
  InheritanceCycle(String),

  #[error("the fixture directory does not exist: {location}")]
  MissingBuildContext { location: String },

  #[error("could not transform Dockerfile of {fixture}: {source}")]
  DynamicTransformFailed {
    fixture: String,
    #[source]
    source: BoxError,
  },

  #[error("failed to build image ({code:?}): {tag}")]
  BuildFailed { code: Option<i32>, tag: String },

  /// A specific bind address only makes sense when the engine runs on this machine.
  #[error(
    "{fixture} binds {bind_ip} but docker runs on {host}; use a local engine or drop the bind address"
  )]
  RemoteBindNotSupported {
    fixture: String,
    bind_ip: String,
    host: String,
  },

  #[error("docker died unexpectedly with return code {code:?}: {cmd}\n{output}")]
  LaunchFailed {
    code: Option<i32>,
    cmd: String,
    output: String,
  },

  #[error("docker didn't output a container id or have a non-zero exit status: {cmd}")]
  NoContainerId { cmd: String },

  #[error("failed to initialize container {cid}: {source}")]
  HandleInitFailed {
    cid: String,
    #[source]
    source: BoxError,
  },

  #[error("command failed with exit code {code:?}: {cmd}\n{output}")]
  CommandFailed {
    cmd: String,
    code: Option<i32>,
    output: String,
  },

  #[error("docker is needed for the test")]
  EngineUnavailable,

  #[error("docker is needed locally for the test but is running on {host}")]
  EngineNotLocal { host: String },

  #[error("failed to read archive {path}: {source}")]
  Archive {
    path: PathBuf,
    #[source]
    source: zip::result::ZipError,
  },

  #[error("invalid fixture manifest {path}: {message}")]
  Manifest { path: PathBuf, message: String },

  #[error("hash error: {0}")]
  Hash(#[from] DirHashError),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

impl FixtureError {
  /// Whether the error means "cannot run here" rather than "broken".
  ///
  /// Test harnesses turn these into skips; everything else is a failure.
  pub fn is_skip(&self) -> bool {
    matches!(self, FixtureError::EngineUnavailable | FixtureError::EngineNotLocal { .. })
  }
}
