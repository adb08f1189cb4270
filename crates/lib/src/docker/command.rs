//! Engine command lines.

use std::fmt;
use std::process::Stdio;

use tokio::process::Command;

/// An engine invocation: the program plus its arguments.
///
/// Kept as data so the exact command line can be logged and attached to errors
/// before (and independently of) spawning it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockerCommand {
  program: String,
  args: Vec<String>,
}

impl DockerCommand {
  pub fn new(program: impl Into<String>) -> Self {
    Self {
      program: program.into(),
      args: Vec::new(),
    }
  }

  pub fn arg(mut self, arg: impl Into<String>) -> Self {
    self.args.push(arg.into());
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  pub fn program(&self) -> &str {
    &self.program
  }

  pub fn get_args(&self) -> &[String] {
    &self.args
  }

  /// A process builder with stdin from the null device.
  pub fn to_command(&self) -> Command {
    let mut command = Command::new(&self.program);
    command.args(&self.args).stdin(Stdio::null());
    command
  }

  /// A blocking process builder, for cleanup paths that cannot await.
  pub fn to_std_command(&self) -> std::process::Command {
    let mut command = std::process::Command::new(&self.program);
    command.args(&self.args).stdin(Stdio::null());
    command
  }
}

impl fmt::Display for DockerCommand {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", quote(&self.program))?;
    for arg in &self.args {
      write!(f, " {}", quote(arg))?;
    }
    Ok(())
  }
}

fn quote(arg: &str) -> String {
  let plain = !arg.is_empty()
    && arg
      .chars()
      .all(|c| !c.is_whitespace() && !matches!(c, '\'' | '"' | '\\' | '$' | '`' | ';' | '&' | '|'));
  if plain {
    arg.to_string()
  } else {
    format!("'{}'", arg.replace('\'', r"'\''"))
  }
}
