//! Host configuration, built once at startup.

use std::path::PathBuf;
use std::sync::Arc;

use gfs_common::HostPaths;
use gfs_mount::DriverConfig;

/// Executable used to mount GlusterFS volumes.
pub const GLUSTER_EXECUTABLE: &str = "glusterfs";

/// Default plugin name.
pub const PLUGIN_NAME: &str = "gfs";

/// Servers configured on the plugin for every volume.
///
/// Order is preserved; an empty list means volumes must bring their own
/// `servers` or `glusteropts` option.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerList(Vec<String>);

impl ServerList {
    /// Wrap an explicit list.
    #[must_use]
    pub const fn new(servers: Vec<String>) -> Self {
        Self(servers)
    }

    /// Parse a comma-separated value; an empty value gives an empty list.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value.is_empty() {
            return Self::default();
        }
        value.split(',').map(str::to_string).collect()
    }

    /// Servers in configured order.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Whether no servers are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of servers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<S: Into<String>> FromIterator<S> for ServerList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Plugin configuration.
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Static servers, shared with the driver.
    pub servers: Arc<ServerList>,
    /// Whether to create the secure-access marker at startup.
    pub secure_management: bool,
    /// Whether to start the syslog relay at startup.
    pub log_relay: bool,
    /// Plugin name (socket name and mount root suffix).
    pub plugin_name: String,
    /// Mount executable.
    pub mount_executable: String,
    /// Capability scope reported to the runtime.
    pub scope: String,
    /// Host paths.
    pub paths: HostPaths,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            servers: Arc::new(ServerList::default()),
            secure_management: false,
            log_relay: true,
            plugin_name: PLUGIN_NAME.to_string(),
            mount_executable: GLUSTER_EXECUTABLE.to_string(),
            scope: "local".to_string(),
            paths: HostPaths::new(PLUGIN_NAME),
        }
    }
}

impl HostConfig {
    /// Set the static servers.
    #[must_use]
    pub fn with_servers(mut self, servers: ServerList) -> Self {
        self.servers = Arc::new(servers);
        self
    }

    /// Turn on secure management.
    #[must_use]
    pub const fn with_secure_management(mut self, enabled: bool) -> Self {
        self.secure_management = enabled;
        self
    }

    /// Turn the syslog relay on or off.
    #[must_use]
    pub const fn with_log_relay(mut self, enabled: bool) -> Self {
        self.log_relay = enabled;
        self
    }

    /// Set the plugin name.
    #[must_use]
    pub fn with_plugin_name(mut self, name: impl Into<String>) -> Self {
        self.plugin_name = name.into();
        self
    }

    /// Set the host paths.
    #[must_use]
    pub fn with_paths(mut self, paths: HostPaths) -> Self {
        self.paths = paths;
        self
    }

    /// Set the mount root.
    #[must_use]
    pub fn with_mount_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.paths.mount_root = root.into();
        self
    }

    /// Settings for the generic mount driver.
    #[must_use]
    pub fn driver_config(&self) -> DriverConfig {
        DriverConfig::new(self.mount_executable.clone(), self.plugin_name.clone())
            .with_scope(self.scope.clone())
            .with_mount_root(self.paths.mount_root.clone())
    }

    /// Socket the plugin listens on.
    #[must_use]
    pub fn socket(&self) -> PathBuf {
        self.paths.socket(&self.plugin_name)
    }
}

/// Whether an environment-style flag is set (any non-empty value).
#[must_use]
pub fn flag_is_set(value: &str) -> bool {
    !value.is_empty()
}
