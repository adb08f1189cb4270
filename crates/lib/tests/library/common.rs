//! Shared helpers for library integration tests.
//!
//! [`FakeDocker`] is a shell script standing in for the engine. It appends every
//! invocation to a `calls` file, records the `Dockerfile` of every build context
//! it is handed, and answers each subcommand from `<sub>.out`, `<sub>.err` and
//! `<sub>.code` files in its state directory.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use dockfix_lib::{Docker, DockerConfig, FixtureDescriptor, FixtureRegistry, FixtureType};
use tempfile::TempDir;

pub const CID: &str = "4f3c2b1a0e9d8c7b6a5f";

const SCRIPT: &str = r#"#!/bin/sh
state="$(dirname "$0")"
printf '%s\n' "$*" >> "$state/calls"
sub="$1"
if [ "$sub" = "build" ]; then
  for ctx; do :; done
  cat "$ctx/Dockerfile" >> "$state/dockerfiles"
  printf '%s\n' '---' >> "$state/dockerfiles"
fi
[ -f "$state/$sub.out" ] && cat "$state/$sub.out"
[ -f "$state/$sub.err" ] && cat "$state/$sub.err" >&2
[ -f "$state/$sub.code" ] && exit "$(cat "$state/$sub.code")"
exit 0
"#;

pub struct FakeDocker {
  state: TempDir,
  program: PathBuf,
}

impl FakeDocker {
  pub fn new() -> Self {
    let state = TempDir::new().unwrap();
    let program = state.path().join("docker");
    fs::write(&program, SCRIPT).unwrap();
    fs::set_permissions(&program, fs::Permissions::from_mode(0o755)).unwrap();

    let fake = Self { state, program };
    fake.respond("run", &format!("{}\n", CID));
    fake.respond("logs", "container output\n");
    fake.respond("port", "0.0.0.0:49153\n");
    fake
  }

  /// Set the stdout of `sub`.
  pub fn respond(&self, sub: &str, stdout: &str) {
    fs::write(self.state.path().join(format!("{}.out", sub)), stdout).unwrap();
  }

  /// Make `sub` exit with `code` after printing `stderr`.
  pub fn fail(&self, sub: &str, code: i32, stderr: &str) {
    fs::write(self.state.path().join(format!("{}.err", sub)), stderr).unwrap();
    fs::write(self.state.path().join(format!("{}.code", sub)), code.to_string()).unwrap();
  }

  pub fn config(&self) -> DockerConfig {
    DockerConfig::default().with_program(self.program.to_string_lossy())
  }

  pub fn docker(&self) -> Docker {
    Docker::new(self.config())
  }

  /// Every invocation so far, split into arguments.
  pub fn calls(&self) -> Vec<Vec<String>> {
    fs::read_to_string(self.state.path().join("calls"))
      .unwrap_or_default()
      .lines()
      .map(|line| line.split_whitespace().map(String::from).collect())
      .collect()
  }

  pub fn calls_to(&self, sub: &str) -> Vec<Vec<String>> {
    self.calls().into_iter().filter(|c| c.first().map(String::as_str) == Some(sub)).collect()
  }

  /// Dockerfiles seen by `build`, in build order.
  pub fn dockerfiles(&self) -> Vec<String> {
    fs::read_to_string(self.state.path().join("dockerfiles"))
      .unwrap_or_default()
      .split("---\n")
      .filter(|s| !s.is_empty())
      .map(String::from)
      .collect()
  }
}

pub fn write_file(root: &Path, name: &str, content: &str) {
  let path = root.join(name);
  fs::create_dir_all(path.parent().unwrap()).unwrap();
  fs::write(path, content).unwrap();
}

/// A resource tree with a base image and a fixture built on it.
pub fn resources() -> TempDir {
  let dir = TempDir::new().unwrap();
  write_file(dir.path(), "base/Java/Dockerfile", "FROM alpine\n");
  write_file(dir.path(), "web/Sshd/Dockerfile", "FROM dockfix/java\nEXPOSE 22\n");
  write_file(dir.path(), "web/Sshd/sshd_config", "PermitRootLogin no\n");
  dir
}

pub fn registry(resources: &Path) -> FixtureRegistry {
  let mut registry = FixtureRegistry::new(resources);
  registry
    .register(FixtureType::new("base::Java").with_descriptor(FixtureDescriptor::new("java")))
    .unwrap()
    .register(
      FixtureType::new("web::Sshd")
        .with_base("base::Java")
        .with_descriptor(FixtureDescriptor::new("sshd").with_ports(&[22])),
    )
    .unwrap();
  registry
}

/// Wait until `path` has content, for output written by a background process.
pub fn wait_for_content(path: &Path) -> String {
  let deadline = Instant::now() + Duration::from_secs(5);
  loop {
    let content = fs::read_to_string(path).unwrap_or_default();
    if !content.is_empty() || Instant::now() > deadline {
      return content;
    }
    std::thread::sleep(Duration::from_millis(20));
  }
}
