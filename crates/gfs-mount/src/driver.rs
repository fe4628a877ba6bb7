//! Mount-lifecycle driver.
//!
//! Tracks created volumes in memory, reference-counts the containers using
//! each mounted volume and serializes every lifecycle call behind one lock.
//! Nothing is persisted; a restarted plugin starts with an empty registry.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use gfs_common::paths::MOUNT_ROOT;
use gfs_common::{PluginError, PluginResult};
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use crate::hooks::MountHooks;
use crate::protocol::{CreateRequest, MountRequest};
use crate::runner::{CommandRunner, MountRunner};

/// Static driver settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    /// Executable invoked to mount a volume.
    pub mount_executable: String,
    /// Plugin name, used for the socket and default mount root.
    pub plugin_name: String,
    /// Capability scope reported to the runtime (`local` or `global`).
    pub scope: String,
    /// Parent directory of all mountpoints.
    pub mount_root: PathBuf,
}

impl DriverConfig {
    /// Local-scoped driver mounting under the default mount root.
    pub fn new(mount_executable: impl Into<String>, plugin_name: impl Into<String>) -> Self {
        let plugin_name = plugin_name.into();
        Self {
            mount_executable: mount_executable.into(),
            mount_root: MOUNT_ROOT.join(&plugin_name),
            plugin_name,
            scope: "local".to_string(),
        }
    }

    /// Set the capability scope.
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Set the mount root.
    #[must_use]
    pub fn with_mount_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.mount_root = root.into();
        self
    }
}

/// Snapshot of one volume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeInfo {
    /// Volume name.
    pub name: String,
    /// Mountpoint while mounted.
    pub mountpoint: Option<PathBuf>,
    /// Number of containers using the volume.
    pub users: usize,
}

#[derive(Debug)]
struct VolumeRecord {
    request: CreateRequest,
    mountpoint: PathBuf,
    users: BTreeSet<String>,
}

impl VolumeRecord {
    fn info(&self) -> VolumeInfo {
        VolumeInfo {
            name: self.request.name.clone(),
            mountpoint: (!self.users.is_empty()).then(|| self.mountpoint.clone()),
            users: self.users.len(),
        }
    }
}

/// Volume driver that mounts by running an executable.
pub struct MountedVolumeDriver<H, R = CommandRunner> {
    config: DriverConfig,
    hooks: H,
    runner: R,
    volumes: Mutex<BTreeMap<String, VolumeRecord>>,
}

impl<H: MountHooks> MountedVolumeDriver<H, CommandRunner> {
    /// Create a driver that runs real mount commands.
    pub fn new(config: DriverConfig, hooks: H) -> Self {
        Self::with_runner(config, hooks, CommandRunner::default())
    }
}

impl<H: MountHooks, R: MountRunner> MountedVolumeDriver<H, R> {
    /// Create a driver with a custom runner.
    pub fn with_runner(config: DriverConfig, hooks: H, runner: R) -> Self {
        Self {
            config,
            hooks,
            runner,
            volumes: Mutex::new(BTreeMap::new()),
        }
    }

    /// Driver settings.
    pub const fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Installed hooks.
    pub const fn hooks(&self) -> &H {
        &self.hooks
    }

    /// Capability scope.
    pub fn scope(&self) -> &str {
        &self.config.scope
    }

    /// Mountpoint used for `name`.
    ///
    /// Names may contain `/`, so the directory is the hex SHA-256 of the name.
    pub fn mountpoint_for(&self, name: &str) -> PathBuf {
        self.config
            .mount_root
            .join(hex::encode(Sha256::digest(name.as_bytes())))
    }

    /// Record a new volume after the hooks accept it.
    ///
    /// # Errors
    ///
    /// Returns the hook's validation error, or
    /// [`PluginError::VolumeExists`] for a duplicate name.
    pub async fn create(&self, request: CreateRequest) -> PluginResult<()> {
        if let Err(err) = self.hooks.validate(&request) {
            if err.is_validation() {
                tracing::warn!(volume = %request.name, error = %err, "Volume rejected");
            } else {
                tracing::error!(volume = %request.name, error = %err, "Volume validation failed");
            }
            return Err(err);
        }

        let mut volumes = self.volumes.lock().await;
        if volumes.contains_key(&request.name) {
            return Err(PluginError::VolumeExists { name: request.name });
        }

        let mountpoint = self.mountpoint_for(&request.name);
        tracing::info!(volume = %request.name, "Volume created");
        volumes.insert(
            request.name.clone(),
            VolumeRecord {
                request,
                mountpoint,
                users: BTreeSet::new(),
            },
        );
        Ok(())
    }

    /// Forget a volume.
    ///
    /// # Errors
    ///
    /// Fails if the volume is unknown or still mounted.
    pub async fn remove(&self, name: &str) -> PluginResult<()> {
        let mut volumes = self.volumes.lock().await;
        let record = volumes.get(name).ok_or_else(|| not_found(name))?;
        if !record.users.is_empty() {
            return Err(PluginError::VolumeInUse {
                name: name.to_string(),
                users: record.users.len(),
            });
        }

        if let Some(record) = volumes.remove(name) {
            remove_mountpoint(&record.mountpoint).await;
        }
        tracing::info!(volume = name, "Volume removed");
        Ok(())
    }

    /// Mount a volume for one container and return its mountpoint.
    ///
    /// Only the first user triggers the mount; later users share it.
    ///
    /// # Errors
    ///
    /// Fails if the volume is unknown, a hook rejects the mount, or the
    /// mount executable fails.
    pub async fn mount(&self, request: &MountRequest) -> PluginResult<PathBuf> {
        let mut volumes = self.volumes.lock().await;
        let record = volumes
            .get_mut(&request.name)
            .ok_or_else(|| not_found(&request.name))?;

        if !record.users.is_empty() {
            record.users.insert(request.id.clone());
            tracing::debug!(
                volume = %request.name,
                users = record.users.len(),
                "Volume already mounted"
            );
            return Ok(record.mountpoint.clone());
        }

        tokio::fs::create_dir_all(&record.mountpoint).await?;
        self.hooks.pre_mount(request)?;

        let args = self.hooks.mount_options(&record.request);
        tracing::debug!(volume = %request.name, ?args, "Mounting volume");
        self.runner
            .mount(&self.config.mount_executable, &args, &record.mountpoint)
            .await?;

        self.hooks.post_mount(request);
        record.users.insert(request.id.clone());

        tracing::info!(
            volume = %request.name,
            mountpoint = %record.mountpoint.display(),
            "Volume mounted"
        );
        Ok(record.mountpoint.clone())
    }

    /// Release one container's use of a volume, unmounting after the last.
    ///
    /// # Errors
    ///
    /// Fails if the volume is unknown or the unmount fails; on failure the
    /// caller remains registered.
    pub async fn unmount(&self, request: &MountRequest) -> PluginResult<()> {
        let mut volumes = self.volumes.lock().await;
        let record = volumes
            .get_mut(&request.name)
            .ok_or_else(|| not_found(&request.name))?;

        if !record.users.remove(&request.id) {
            tracing::debug!(volume = %request.name, id = %request.id, "Unknown caller, ignoring");
            return Ok(());
        }
        if !record.users.is_empty() {
            return Ok(());
        }

        if let Err(err) = self.runner.unmount(&record.mountpoint).await {
            record.users.insert(request.id.clone());
            return Err(err);
        }

        tracing::info!(volume = %request.name, "Volume unmounted");
        Ok(())
    }

    /// Mountpoint of a volume, `None` while unmounted.
    ///
    /// # Errors
    ///
    /// Fails if the volume is unknown.
    pub async fn path(&self, name: &str) -> PluginResult<Option<PathBuf>> {
        Ok(self.get(name).await?.mountpoint)
    }

    /// Snapshot of one volume.
    ///
    /// # Errors
    ///
    /// Fails if the volume is unknown.
    pub async fn get(&self, name: &str) -> PluginResult<VolumeInfo> {
        let volumes = self.volumes.lock().await;
        volumes
            .get(name)
            .map(VolumeRecord::info)
            .ok_or_else(|| not_found(name))
    }

    /// Snapshot of all volumes, ordered by name.
    pub async fn list(&self) -> Vec<VolumeInfo> {
        let volumes = self.volumes.lock().await;
        volumes.values().map(VolumeRecord::info).collect()
    }
}

fn not_found(name: &str) -> PluginError {
    PluginError::VolumeNotFound {
        name: name.to_string(),
    }
}

async fn remove_mountpoint(mountpoint: &Path) {
    match tokio::fs::remove_dir(mountpoint).await {
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => {
            tracing::warn!(
                mountpoint = %mountpoint.display(),
                error = %err,
                "Failed to remove mountpoint"
            );
        }
    }
}
