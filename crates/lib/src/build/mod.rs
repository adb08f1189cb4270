//! Image building.
//!
//! Every fixture is built from its own private copy of its build context and
//! tagged by a content hash of its `Dockerfile`, so identical definitions always
//! map to the same image and any edit maps to a new one.
//!
//! # Submodules
//!
//! - [`extract`] - Build-context extraction from directory trees and zip archives
//! - [`execute`] - Tag computation and build execution along the inheritance chain

pub mod execute;
pub mod extract;
mod types;

pub use execute::{build_context, build_image, build_image_logged, image_tag};
pub use extract::extract;
pub use types::*;
