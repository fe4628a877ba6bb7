//! Well-known host paths for the plugin.

use std::path::PathBuf;

use once_cell::sync::Lazy;

/// Marker file whose existence turns on TLS for the GlusterFS management path.
pub const SECURE_ACCESS_FILE: &str = "/var/lib/glusterd/secure-access";

/// Default directory under which plugin sockets are created.
pub const DEFAULT_SOCKET_DIR: &str = "/run/docker/plugins";

/// Default parent directory for volume mountpoints.
pub static MOUNT_ROOT: Lazy<PathBuf> = Lazy::new(|| PathBuf::from("/var/lib/docker-volumes"));

/// Paths used by one plugin instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPaths {
    /// Directory holding one mountpoint per mounted volume.
    pub mount_root: PathBuf,
    /// Directory holding the plugin's Unix socket.
    pub socket_dir: PathBuf,
    /// Secure-management marker file.
    pub secure_access: PathBuf,
}

impl HostPaths {
    /// Default locations for a plugin with the given name.
    #[must_use]
    pub fn new(plugin_name: &str) -> Self {
        Self {
            mount_root: MOUNT_ROOT.join(plugin_name),
            socket_dir: PathBuf::from(DEFAULT_SOCKET_DIR),
            secure_access: PathBuf::from(SECURE_ACCESS_FILE),
        }
    }

    /// Relocate every path under `root`, keeping their relative layout.
    #[must_use]
    pub fn with_root(root: impl Into<PathBuf>, plugin_name: &str) -> Self {
        let root = root.into();
        Self {
            mount_root: root.join("volumes").join(plugin_name),
            socket_dir: root.join("plugins"),
            secure_access: root.join("glusterd").join("secure-access"),
        }
    }

    /// Unix socket the plugin listens on.
    #[must_use]
    pub fn socket(&self, plugin_name: &str) -> PathBuf {
        self.socket_dir.join(format!("{plugin_name}.sock"))
    }
}
