//! Filesystem-specific lifecycle hooks.

use gfs_common::PluginResult;

use crate::protocol::{CreateRequest, MountRequest};

/// Hooks a filesystem plugs into [`MountedVolumeDriver`](crate::MountedVolumeDriver).
///
/// Implementations are shared across concurrent requests and must not rely
/// on the driver's serialization for their own state.
pub trait MountHooks: Send + Sync + 'static {
    /// Check a create request before the volume is recorded.
    ///
    /// # Errors
    ///
    /// Returns the validation error to report to the runtime; the create is
    /// rejected and not retried.
    fn validate(&self, request: &CreateRequest) -> PluginResult<()>;

    /// Argument vector for the mount executable, excluding the mountpoint.
    fn mount_options(&self, request: &CreateRequest) -> Vec<String>;

    /// Runs after the mountpoint exists and before the mount executable.
    ///
    /// # Errors
    ///
    /// An error aborts the mount.
    fn pre_mount(&self, request: &MountRequest) -> PluginResult<()>;

    /// Runs after a successful mount.
    fn post_mount(&self, request: &MountRequest);
}
