//! Fixture registry.
//!
//! Fixtures are registered explicitly, from code or from a JSON manifest, and
//! looked up by identity or by descriptor id. The registry also owns the default
//! resource root that build contexts are extracted from.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{FixtureError, Result};
use crate::fixture::transform::TransformSpec;
use crate::fixture::{FixtureDescriptor, FixtureType};

#[derive(Debug, Clone)]
pub struct FixtureRegistry {
  types: BTreeMap<String, FixtureType>,
  resources: PathBuf,
}

impl FixtureRegistry {
  /// Create an empty registry whose fixtures default to `resources`
  /// (a directory tree, or a zip archive of one).
  pub fn new(resources: impl Into<PathBuf>) -> Self {
    Self {
      types: BTreeMap::new(),
      resources: resources.into(),
    }
  }

  pub fn register(&mut self, fixture: FixtureType) -> Result<&mut Self> {
    if self.types.contains_key(fixture.name()) {
      return Err(FixtureError::DuplicateType(fixture.name().to_string()));
    }
    debug!(name = %fixture.name(), base = ?fixture.base(), "registering fixture");
    self.types.insert(fixture.name().to_string(), fixture);
    Ok(self)
  }

  pub fn get(&self, name: &str) -> Result<&FixtureType> {
    self
      .types
      .get(name)
      .ok_or_else(|| FixtureError::UnknownType(name.to_string()))
  }

  /// Finds the fixture type whose descriptor has the given id.
  pub fn find_fixture(&self, id: &str) -> Result<&FixtureType> {
    self
      .types
      .values()
      .find(|t| t.descriptor().is_ok_and(|d| d.id == id))
      .ok_or_else(|| FixtureError::UnknownFixture(id.to_string()))
  }

  /// The immediate base fixture, if any.
  pub fn base_of(&self, name: &str) -> Result<Option<&FixtureType>> {
    match self.get(name)?.base() {
      Some(base) => self.get(base).map(Some),
      None => Ok(None),
    }
  }

  /// The inheritance chain ending at `name`, root first.
  pub fn lineage(&self, name: &str) -> Result<Vec<&FixtureType>> {
    let mut chain = Vec::new();
    let mut seen = BTreeSet::new();
    let mut current = Some(name);

    while let Some(n) = current {
      if !seen.insert(n) {
        return Err(FixtureError::InheritanceCycle(n.to_string()));
      }
      let fixture = self.get(n)?;
      chain.push(fixture);
      current = fixture.base();
    }

    chain.reverse();
    Ok(chain)
  }

  /// Resource root for `fixture`: its own override or the registry default.
  pub fn resources_for<'a>(&'a self, fixture: &'a FixtureType) -> &'a Path {
    fixture.resources().unwrap_or(&self.resources)
  }

  pub fn resources(&self) -> &Path {
    &self.resources
  }

  pub fn iter(&self) -> impl Iterator<Item = &FixtureType> {
    self.types.values()
  }

  pub fn len(&self) -> usize {
    self.types.len()
  }

  pub fn is_empty(&self) -> bool {
    self.types.is_empty()
  }

  /// Load a registry from a JSON manifest.
  ///
  /// Relative paths in the manifest are resolved against its directory, which is
  /// also the default resource root.
  pub fn from_manifest(path: &Path) -> Result<Self> {
    let manifest_err = |message: String| FixtureError::Manifest {
      path: path.to_path_buf(),
      message,
    };

    let content = std::fs::read_to_string(path).map_err(|e| manifest_err(e.to_string()))?;
    let manifest: ManifestFile = serde_json::from_str(&content).map_err(|e| manifest_err(e.to_string()))?;

    let base_dir = path
      .parent()
      .map(|p| dunce::canonicalize(p).unwrap_or_else(|_| p.to_path_buf()))
      .unwrap_or_default();
    let anchor = |p: PathBuf| if p.is_absolute() { p } else { base_dir.join(p) };

    let mut registry = Self::new(manifest.resources.map(anchor).unwrap_or_else(|| base_dir.clone()));
    for entry in manifest.fixtures {
      let mut fixture = FixtureType::new(entry.name).with_descriptor(entry.descriptor);
      if let Some(base) = entry.base {
        fixture = fixture.with_base(base);
      }
      if let Some(resources) = entry.resources {
        fixture = fixture.with_resources(anchor(resources));
      }
      if let Some(transform) = entry.transform {
        fixture = fixture.with_transform(transform.into_factory());
      }
      registry.register(fixture)?;
    }

    for fixture in registry.iter() {
      registry.lineage(fixture.name()).map_err(|e| manifest_err(e.to_string()))?;
    }

    Ok(registry)
  }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestFile {
  #[serde(default)]
  resources: Option<PathBuf>,
  #[serde(default)]
  fixtures: Vec<ManifestFixture>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestFixture {
  name: String,
  #[serde(default)]
  base: Option<String>,
  #[serde(default)]
  resources: Option<PathBuf>,
  #[serde(default)]
  transform: Option<TransformSpec>,
  descriptor: FixtureDescriptor,
}
