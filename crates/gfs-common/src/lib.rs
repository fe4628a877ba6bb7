//! # gfs-common
//!
//! Shared types for the GlusterFS volume plugin.
//!
//! This crate provides:
//! - The plugin-wide error taxonomy
//! - Well-known host paths (marker file, mount root, plugin socket)

#![warn(missing_docs)]

pub mod error;
pub mod paths;

pub use error::{PluginError, PluginResult};
pub use paths::HostPaths;
