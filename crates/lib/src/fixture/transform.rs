//! Build-time Dockerfile transforms for dynamic fixtures.
//!
//! Some fixtures need facts about the machine running the tests baked into their
//! image, such as the current user's public key. Such fixtures set `dynamic` in
//! their descriptor and register a [`TransformFactory`]; the extractor creates a
//! fresh transform for every build and lets it rewrite the extracted `Dockerfile`.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::BoxError;

/// Rewrites a freshly extracted `Dockerfile` in place.
pub trait DockerfileTransform: Send + Sync {
  fn process(&self, dockerfile: &Path) -> Result<(), BoxError>;
}

/// Creates the transform used for one build. Construction may fail.
pub type TransformFactory = Arc<dyn Fn() -> Result<Box<dyn DockerfileTransform>, BoxError> + Send + Sync>;

/// Wrap a constructor function as a [`TransformFactory`].
pub fn factory<T, F>(make: F) -> TransformFactory
where
  T: DockerfileTransform + 'static,
  F: Fn() -> Result<T, BoxError> + Send + Sync + 'static,
{
  Arc::new(move || make().map(|t| Box::new(t) as Box<dyn DockerfileTransform>))
}

/// Replaces tokens in the Dockerfile.
///
/// A value written as `${NAME}` is read from the environment when the transform
/// runs; an unset variable fails the transform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaceTransform {
  pub replacements: BTreeMap<String, String>,
}

impl ReplaceTransform {
  pub fn new(replacements: BTreeMap<String, String>) -> Self {
    Self { replacements }
  }

  pub fn with(mut self, token: impl Into<String>, value: impl Into<String>) -> Self {
    self.replacements.insert(token.into(), value.into());
    self
  }

  fn resolve(value: &str) -> Result<String, BoxError> {
    match value.strip_prefix("${").and_then(|v| v.strip_suffix('}')) {
      Some(var) => std::env::var(var).map_err(|e| format!("environment variable {}: {}", var, e).into()),
      None => Ok(value.to_string()),
    }
  }
}

impl DockerfileTransform for ReplaceTransform {
  fn process(&self, dockerfile: &Path) -> Result<(), BoxError> {
    let mut content = std::fs::read_to_string(dockerfile)?;
    for (token, value) in &self.replacements {
      content = content.replace(token.as_str(), &Self::resolve(value)?);
    }
    std::fs::write(dockerfile, content)?;
    Ok(())
  }
}

/// Transforms expressible in a fixture manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformSpec {
  Replace(BTreeMap<String, String>),
}

impl TransformSpec {
  pub fn into_factory(self) -> TransformFactory {
    match self {
      TransformSpec::Replace(replacements) => {
        let transform = ReplaceTransform::new(replacements);
        factory(move || Ok(transform.clone()))
      }
    }
  }
}
