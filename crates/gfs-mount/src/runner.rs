//! Mount and unmount execution.

use std::path::Path;
use std::process::Output;

use async_trait::async_trait;
use gfs_common::{PluginError, PluginResult};
use tokio::process::Command;

/// Runs the external mount and unmount programs.
#[async_trait]
pub trait MountRunner: Send + Sync + 'static {
    /// Mount using `program`, passing `args` then `mountpoint`.
    async fn mount(&self, program: &str, args: &[String], mountpoint: &Path) -> PluginResult<()>;

    /// Unmount `mountpoint`.
    async fn unmount(&self, mountpoint: &Path) -> PluginResult<()>;
}

/// [`MountRunner`] backed by child processes.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    unmount_program: String,
}

impl CommandRunner {
    /// Use `program` instead of `umount` for unmounting.
    #[must_use]
    pub fn with_unmount_program(program: impl Into<String>) -> Self {
        Self {
            unmount_program: program.into(),
        }
    }
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self::with_unmount_program("umount")
    }
}

#[async_trait]
impl MountRunner for CommandRunner {
    async fn mount(&self, program: &str, args: &[String], mountpoint: &Path) -> PluginResult<()> {
        tracing::debug!(program, ?args, mountpoint = %mountpoint.display(), "Running mount");

        let output = Command::new(program)
            .args(args)
            .arg(mountpoint)
            .output()
            .await?;

        check_output(program, mountpoint, &output)
    }

    async fn unmount(&self, mountpoint: &Path) -> PluginResult<()> {
        tracing::debug!(
            program = %self.unmount_program,
            mountpoint = %mountpoint.display(),
            "Running unmount"
        );

        let output = Command::new(&self.unmount_program)
            .arg(mountpoint)
            .output()
            .await?;

        check_output(&self.unmount_program, mountpoint, &output)
    }
}

fn check_output(program: &str, mountpoint: &Path, output: &Output) -> PluginResult<()> {
    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    Err(PluginError::MountFailed {
        program: program.to_string(),
        mountpoint: mountpoint.display().to_string(),
        message: format!("{}: {}", output.status, stderr.trim()),
    })
}
