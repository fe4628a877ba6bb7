//! GlusterFS hooks for the generic mount driver.

use std::sync::Arc;

use gfs_common::PluginResult;
use gfs_mount::{CreateRequest, MountHooks, MountRequest, MountRunner, MountedVolumeDriver};

use crate::args::build_args;
use crate::config::{HostConfig, ServerList};
use crate::resolver;

/// GlusterFS-specific [`MountHooks`].
#[derive(Debug, Clone)]
pub struct GlusterDriver {
    servers: Arc<ServerList>,
}

impl GlusterDriver {
    /// Create hooks using the plugin's static servers.
    #[must_use]
    pub const fn new(servers: Arc<ServerList>) -> Self {
        Self { servers }
    }

    /// Static servers.
    #[must_use]
    pub fn servers(&self) -> &ServerList {
        &self.servers
    }

    /// Mount driver running real commands.
    #[must_use]
    pub fn into_volume_driver(self, config: &HostConfig) -> MountedVolumeDriver<Self> {
        MountedVolumeDriver::new(config.driver_config(), self)
    }

    /// Mount driver using `runner`.
    pub fn into_volume_driver_with<R: MountRunner>(
        self,
        config: &HostConfig,
        runner: R,
    ) -> MountedVolumeDriver<Self, R> {
        MountedVolumeDriver::with_runner(config.driver_config(), self, runner)
    }
}

impl From<&HostConfig> for GlusterDriver {
    fn from(config: &HostConfig) -> Self {
        Self::new(Arc::clone(&config.servers))
    }
}

impl MountHooks for GlusterDriver {
    fn validate(&self, request: &CreateRequest) -> PluginResult<()> {
        resolver::validate(&self.servers, &request.options)
    }

    fn mount_options(&self, request: &CreateRequest) -> Vec<String> {
        build_args(&self.servers, &request.options, &request.name).into_vec()
    }

    fn pre_mount(&self, _request: &MountRequest) -> PluginResult<()> {
        Ok(())
    }

    fn post_mount(&self, _request: &MountRequest) {}
}
