//! Fixture definitions.
//!
//! A fixture is a declarative description of a container for tests: a build
//! context (a `Dockerfile` plus assets), runtime parameters (ports, bind address),
//! and optionally a base fixture whose image it builds on.
//!
//! # Submodules
//!
//! - [`registry`] - Explicit registration and lookup, inheritance chains, manifests
//! - [`resolve`] - Build-context location resolution
//! - [`transform`] - Dockerfile rewriting for dynamic fixtures

pub mod registry;
pub mod resolve;
pub mod transform;
mod types;

pub use registry::FixtureRegistry;
pub use resolve::resolve_context;
pub use transform::{DockerfileTransform, ReplaceTransform, TransformFactory, TransformSpec};
pub use types::*;
