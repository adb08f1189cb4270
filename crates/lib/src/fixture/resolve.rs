//! Build-context location resolution.

use crate::error::Result;
use crate::fixture::FixtureType;

/// Location of a fixture's build context below its resource root.
///
/// An explicit `dockerfile_folder` wins; otherwise the location mirrors the
/// fixture's identity, so `fixtures::sshd::SshdContainer` resolves to
/// `fixtures/sshd/SshdContainer`. No I/O happens here.
pub fn resolve_context(fixture: &FixtureType) -> Result<String> {
  let descriptor = fixture.descriptor()?;

  let location = match descriptor.dockerfile_folder.as_deref() {
    Some(folder) if !folder.trim().is_empty() => normalize(folder),
    _ => normalize(fixture.name()),
  };
  Ok(location)
}

/// Map `::` and `\` separators to `/` and strip surrounding slashes.
fn normalize(location: &str) -> String {
  location
    .trim()
    .replace("::", "/")
    .replace('\\', "/")
    .trim_matches('/')
    .to_string()
}
