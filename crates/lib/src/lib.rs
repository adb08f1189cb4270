//! dockfix-lib: Docker-backed test fixtures
//!
//! A fixture is a container image described by a `Dockerfile` plus a small
//! descriptor (id, published ports, bind address). This crate provides:
//! - `fixture`: fixture types, their inheritance chains, and the registry that resolves them
//! - `build`: build-context extraction and content-addressed image builds
//! - `launch`: turning a built image into a running container
//! - `container`: handles to running containers and their cleanup
//! - `session`: per-test and per-suite lifecycles around the above
//!
//! All engine access goes through the `docker` executable (see [`docker::Docker`]).

pub mod build;
pub mod config;
pub mod consts;
pub mod container;
pub mod docker;
pub mod error;
pub mod fixture;
pub mod launch;
pub mod session;
pub mod util;

pub use build::{Image, build_image, build_image_logged};
pub use config::DockerConfig;
pub use container::{ContainerHandle, FixtureContainer, InitError};
pub use docker::Docker;
pub use error::{FixtureError, Result};
pub use fixture::{FixtureDescriptor, FixtureRegistry, FixtureType};
pub use launch::Starter;
pub use session::{FixtureSession, ImageSession};
