//! One-time host setup before serving requests.

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::Path;
use std::process::Stdio;

use gfs_common::{PluginError, PluginResult};
use tokio::process::Command;
use tokio::task::JoinHandle;

use crate::config::HostConfig;

/// Syslog daemon relaying the mount client's `--logger=syslog` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRelay {
    program: String,
    args: Vec<String>,
}

impl Default for LogRelay {
    fn default() -> Self {
        Self::new("rsyslogd", ["-n"])
    }
}

impl LogRelay {
    /// Relay started as `program args...`.
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Start the relay in the background without waiting for it.
    ///
    /// The returned task reaps the process once it exits. Failure to start
    /// is logged and tolerated. Must be called inside a tokio runtime.
    pub fn spawn(&self) -> Option<JoinHandle<()>> {
        let mut child = match Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .spawn()
        {
            Ok(child) => child,
            Err(err) => {
                tracing::warn!(program = %self.program, error = %err, "Log relay not started");
                return None;
            }
        };
        tracing::debug!(program = %self.program, pid = child.id(), "Log relay started");

        let program = self.program.clone();
        Some(tokio::spawn(async move {
            match child.wait().await {
                Ok(status) => tracing::warn!(%program, %status, "Log relay exited"),
                Err(err) => tracing::warn!(%program, error = %err, "Log relay lost"),
            }
        }))
    }
}

/// Create the secure-access marker if it does not exist yet.
///
/// Returns `true` when the file was created by this call. The parent
/// directory is not created: a missing glusterd state directory means the
/// host is not set up for GlusterFS.
///
/// # Errors
///
/// Returns [`PluginError::Config`] if the file cannot be created.
pub fn ensure_secure_access(path: &Path) -> PluginResult<bool> {
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(_) => {
            tracing::info!(path = %path.display(), "Secure management enabled");
            Ok(true)
        }
        Err(err) if err.kind() == ErrorKind::AlreadyExists => Ok(false),
        Err(err) => Err(PluginError::Config {
            message: format!(
                "could not create secure-access file {}: {err}",
                path.display()
            ),
        }),
    }
}

/// Run startup side effects: start the log relay, then write the marker.
///
/// Must be called inside a tokio runtime when the log relay is enabled.
///
/// # Errors
///
/// Fails only if the secure-access marker is required and cannot be written.
pub fn run(config: &HostConfig) -> PluginResult<()> {
    if config.log_relay {
        // Detached: the reaper task runs until the relay exits.
        drop(LogRelay::default().spawn());
    }
    if config.secure_management {
        ensure_secure_access(&config.paths.secure_access)?;
    }
    Ok(())
}
