//! Command-line interface.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::Result;
use gfs_common::paths::{DEFAULT_SOCKET_DIR, SECURE_ACCESS_FILE};
use gfs_common::HostPaths;

use crate::bootstrap;
use crate::config::{GLUSTER_EXECUTABLE, HostConfig, PLUGIN_NAME, ServerList, flag_is_set};
use crate::driver::GlusterDriver;

/// GlusterFS managed volume plugin
#[derive(Parser, Debug)]
#[command(name = "gfs-volume-plugin")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Comma-separated GlusterFS servers used for every volume
    #[arg(long, env = "SERVERS", default_value = "")]
    pub servers: String,

    /// Create the glusterd secure-access marker when non-empty
    #[arg(long, env = "SECURE_MANAGEMENT", default_value = "")]
    pub secure_management: String,

    /// Plugin name, used for the socket file
    #[arg(long, default_value = PLUGIN_NAME)]
    pub plugin_name: String,

    /// Executable used to mount volumes
    #[arg(long, default_value = GLUSTER_EXECUTABLE)]
    pub mount_executable: String,

    /// Volume scope reported to the container runtime
    #[arg(long, default_value = "local")]
    pub scope: String,

    /// Directory holding volume mountpoints
    #[arg(long)]
    pub mount_root: Option<PathBuf>,

    /// Directory holding the plugin socket
    #[arg(long, default_value = DEFAULT_SOCKET_DIR)]
    pub socket_dir: PathBuf,

    /// Secure-access marker file
    #[arg(long, default_value = SECURE_ACCESS_FILE)]
    pub secure_access_file: PathBuf,

    /// Do not start rsyslogd
    #[arg(long)]
    pub no_log_relay: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Host configuration described by the arguments.
    #[must_use]
    pub fn host_config(&self) -> HostConfig {
        let mut paths = HostPaths::new(&self.plugin_name);
        if let Some(root) = &self.mount_root {
            paths.mount_root.clone_from(root);
        }
        paths.socket_dir.clone_from(&self.socket_dir);
        paths.secure_access.clone_from(&self.secure_access_file);

        HostConfig {
            servers: Arc::new(ServerList::parse(&self.servers)),
            secure_management: flag_is_set(&self.secure_management),
            log_relay: !self.no_log_relay,
            plugin_name: self.plugin_name.clone(),
            mount_executable: self.mount_executable.clone(),
            scope: self.scope.clone(),
            paths,
        }
    }

    /// Bootstrap the host and serve the plugin until interrupted.
    ///
    /// # Errors
    ///
    /// Fails if bootstrap fails or the socket cannot be served.
    pub async fn execute(self) -> Result<()> {
        let config = self.host_config();
        tracing::info!(
            servers = config.servers.len(),
            secure_management = config.secure_management,
            "Starting GlusterFS volume plugin"
        );

        bootstrap::run(&config)?;

        let driver = Arc::new(GlusterDriver::from(&config).into_volume_driver(&config));
        tracing::info!(
            executable = %driver.config().mount_executable,
            mount_root = %driver.config().mount_root.display(),
            scope = driver.scope(),
            "Mount driver ready"
        );
        gfs_mount::serve_unix(driver, &config.socket(), shutdown_signal()).await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    tracing::info!("Shutdown requested");
}
