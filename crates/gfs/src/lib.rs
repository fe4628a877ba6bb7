//! # gfs
//!
//! GlusterFS managed volume plugin.
//!
//! A volume's mount arguments come from exactly one of three sources:
//! - A static server list configured on the plugin (`SERVERS`)
//! - A per-volume `servers` option
//! - A per-volume `glusteropts` option holding raw mount arguments
//!
//! [`resolver`] decides which source applies and rejects ambiguous or
//! incomplete requests; [`args`] renders the `glusterfs` argument vector;
//! [`driver`] plugs both into the generic [`gfs_mount`] driver.
//!
//! ## Usage
//!
//! ```
//! use gfs::{ServerList, build_args};
//! use gfs_mount::VolumeOptions;
//!
//! let servers = ServerList::parse("h1,h2");
//! let args = build_args(&servers, &VolumeOptions::from([("acl", "true")]), "vol1/sub");
//! assert_eq!(
//!     args.as_slice(),
//!     [
//!         "-s", "h1", "-s", "h2", "--acl",
//!         "--volfile-id=vol1", "--subdir-mount=/sub", "--logger=syslog",
//!     ]
//! );
//! ```

#![warn(missing_docs)]

pub mod args;
pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod driver;
pub mod resolver;

pub use args::{MountArgs, VolumeName, build_args};
pub use config::{HostConfig, ServerList};
pub use driver::GlusterDriver;
pub use resolver::{ConfigSource, resolve, validate};
