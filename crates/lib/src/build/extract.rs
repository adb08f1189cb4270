//! Build-context extraction.
//!
//! A fixture's build context lives below a resource root, which is either a
//! plain directory tree or a zip archive the fixtures were packaged into. The
//! context is copied into a fresh temporary directory so the build (and any
//! dynamic transform) can work on a private copy.

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Component, Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;
use walkdir::WalkDir;

use crate::consts::{BUILD_DIR_PREFIX, DOCKERFILE};
use crate::error::{BoxError, FixtureError, Result};
use crate::fixture::FixtureType;

/// Materialize the build context at `location` below `resources` into a new temp directory.
///
/// The returned directory is deleted when dropped. Dynamic fixtures have their
/// transform applied to the extracted `Dockerfile` before this returns.
pub fn extract(fixture: &FixtureType, location: &str, resources: &Path) -> Result<TempDir> {
  let dir = tempfile::Builder::new().prefix(BUILD_DIR_PREFIX).tempdir()?;

  if resources.is_file() {
    debug!(archive = ?resources, location, "extracting packaged build context");
    extract_packaged(resources, location, dir.path())?;
  } else {
    debug!(root = ?resources, location, "copying local build context");
    extract_local(resources, location, dir.path())?;
  }

  if fixture.descriptor()?.dynamic {
    apply_transform(fixture, dir.path())?;
  }

  Ok(dir)
}

fn extract_packaged(archive: &Path, location: &str, dest: &Path) -> Result<()> {
  let archive_err = |source| FixtureError::Archive {
    path: archive.to_path_buf(),
    source,
  };

  let file = File::open(archive)?;
  let mut zip = zip::ZipArchive::new(BufReader::new(file)).map_err(archive_err)?;
  let prefix = format!("{}/", location);
  let mut matched = false;

  for i in 0..zip.len() {
    let mut entry = zip.by_index(i).map_err(archive_err)?;
    let name = entry.name().to_string();
    let Some(relative) = name.strip_prefix(&prefix) else {
      continue;
    };
    matched = true;

    if relative.is_empty() {
      continue;
    }

    let dest_path = dest.join(contained(relative)?);
    if entry.is_dir() {
      fs::create_dir_all(&dest_path)?;
    } else {
      if let Some(parent) = dest_path.parent() {
        fs::create_dir_all(parent)?;
      }
      let mut out = File::create(&dest_path)?;
      io::copy(&mut entry, &mut out)?;

      #[cfg(unix)]
      {
        use std::os::unix::fs::PermissionsExt;
        if let Some(mode) = entry.unix_mode() {
          fs::set_permissions(&dest_path, fs::Permissions::from_mode(mode))?;
        }
      }
    }
  }

  if !matched {
    return Err(FixtureError::MissingBuildContext {
      location: location.to_string(),
    });
  }
  Ok(())
}

/// Reject archive entry names that would escape the build directory.
fn contained(relative: &str) -> Result<PathBuf> {
  let path = Path::new(relative);
  if path.components().all(|c| matches!(c, Component::Normal(_) | Component::CurDir)) {
    Ok(path.to_path_buf())
  } else {
    Err(FixtureError::Io(io::Error::new(
      io::ErrorKind::InvalidData,
      format!("archive entry escapes the build context: {}", relative),
    )))
  }
}

fn extract_local(root: &Path, location: &str, dest: &Path) -> Result<()> {
  let src = root.join(location);
  if !src.is_dir() {
    return Err(FixtureError::MissingBuildContext {
      location: location.to_string(),
    });
  }

  for entry in WalkDir::new(&src).follow_links(true) {
    let entry = entry.map_err(io::Error::from)?;
    let relative = entry.path().strip_prefix(&src).unwrap_or(entry.path());
    if relative.as_os_str().is_empty() {
      continue;
    }

    let dest_path = dest.join(relative);
    if entry.file_type().is_dir() {
      fs::create_dir_all(&dest_path)?;
    } else {
      fs::copy(entry.path(), &dest_path)?;
    }
  }
  Ok(())
}

fn apply_transform(fixture: &FixtureType, dir: &Path) -> Result<()> {
  let failed = |source: BoxError| FixtureError::DynamicTransformFailed {
    fixture: fixture.name().to_string(),
    source,
  };

  let factory = fixture
    .transform()
    .ok_or_else(|| failed("fixture is dynamic but has no transform".into()))?;
  let transform = factory().map_err(failed)?;

  debug!(fixture = %fixture.name(), "transforming Dockerfile");
  transform.process(&dir.join(DOCKERFILE)).map_err(failed)
}
