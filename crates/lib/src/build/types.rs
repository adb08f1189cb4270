use std::fmt;

use serde::{Deserialize, Serialize};

/// A built image, identified by its content-addressed tag.
///
/// # Format
///
/// `<namespace>/<fixture-id>:<hash>`, where `<hash>` is the first 12 hex
/// characters of the SHA-256 of the fixture's `Dockerfile`, e.g.
/// `"dockfix/sshd:3f2a9c0b11de"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Image {
  pub tag: String,
}

impl Image {
  pub fn new(tag: impl Into<String>) -> Self {
    Self { tag: tag.into() }
  }

  pub fn tag(&self) -> &str {
    &self.tag
  }

  /// Repository part of the tag (`dockfix/sshd`).
  pub fn repository(&self) -> &str {
    self.split().0
  }

  /// Content hash part of the tag, if the tag has one.
  pub fn content_hash(&self) -> Option<&str> {
    self.split().1
  }

  // A ':' before the last '/' belongs to a registry host, not the tag.
  fn split(&self) -> (&str, Option<&str>) {
    let name_start = self.tag.rfind('/').map_or(0, |i| i + 1);
    match self.tag[name_start..].rfind(':') {
      Some(i) => (&self.tag[..name_start + i], Some(&self.tag[name_start + i + 1..])),
      None => (&self.tag, None),
    }
  }
}

impl fmt::Display for Image {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.tag)
  }
}
