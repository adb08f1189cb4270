//! Container launch.
//!
//! A built [`Image`](crate::build::Image) is started through a [`Starter`],
//! which turns the fixture descriptor (ports, bind address, host-port matching)
//! plus caller overrides into a single `run -d` invocation and then follows the
//! container's logs.
//!
//! # Submodules
//!
//! - [`ports`] - `-p` publish values
//! - [`starter`] - Launch builder

pub mod ports;
pub mod starter;

pub use ports::{port_mapping, udp_port_mapping};
pub use starter::Starter;
