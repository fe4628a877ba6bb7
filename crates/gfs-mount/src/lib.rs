//! # gfs-mount
//!
//! A generic, mount-binary based volume driver.
//!
//! The driver owns everything that is not specific to one filesystem:
//! - An in-memory registry of created volumes
//! - Reference counting of containers using a mounted volume
//! - Serialization of create/mount/unmount/remove calls
//! - Running the mount executable and `umount`
//! - Serving the volume plugin protocol on a Unix socket
//!
//! Filesystem-specific behaviour plugs in through [`MountHooks`].

#![warn(missing_docs)]

pub mod driver;
pub mod hooks;
pub mod protocol;
pub mod runner;
pub mod server;

pub use driver::{DriverConfig, MountedVolumeDriver, VolumeInfo};
pub use hooks::MountHooks;
pub use protocol::{CreateRequest, MountRequest, VolumeOptions};
pub use runner::{CommandRunner, MountRunner};
pub use server::{router, serve_unix};
