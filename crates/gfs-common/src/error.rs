//! Error types for the volume plugin.

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias using [`PluginError`].
pub type PluginResult<T> = Result<T, PluginError>;

/// Errors surfaced by the plugin and its mount driver.
#[derive(Error, Diagnostic, Debug)]
pub enum PluginError {
    /// Two configuration sources apply to the same request.
    #[error("{message}")]
    #[diagnostic(
        code(gfs::config::conflicting_source),
        help("Use only one of SERVERS, the servers option, or the glusteropts option")
    )]
    ConflictingSource {
        /// Which sources collided.
        message: String,
    },

    /// No configuration source applies to the request.
    #[error(
        "exactly one of static servers, servers option, or glusteropts option must be specified"
    )]
    #[diagnostic(
        code(gfs::config::missing_source),
        help("Set SERVERS on the plugin, or pass -o servers=... or -o glusteropts=...")
    )]
    MissingSource,

    /// Volume not known to the driver.
    #[error("Volume not found: {name}")]
    #[diagnostic(code(gfs::volume::not_found))]
    VolumeNotFound {
        /// The volume name.
        name: String,
    },

    /// Volume already created.
    #[error("Volume already exists: {name}")]
    #[diagnostic(code(gfs::volume::exists))]
    VolumeExists {
        /// The volume name.
        name: String,
    },

    /// Volume still mounted by at least one container.
    #[error("Volume {name} is in use by {users} container(s)")]
    #[diagnostic(
        code(gfs::volume::in_use),
        help("Stop the containers using the volume before removing it")
    )]
    VolumeInUse {
        /// The volume name.
        name: String,
        /// Number of active users.
        users: usize,
    },

    /// The mount or unmount invocation failed.
    #[error("{program} failed on {mountpoint}: {message}")]
    #[diagnostic(code(gfs::mount::failed))]
    MountFailed {
        /// Executable that was run.
        program: String,
        /// Target mountpoint.
        mountpoint: String,
        /// Exit status and captured stderr.
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    #[diagnostic(code(gfs::io))]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    #[diagnostic(code(gfs::serialization))]
    Serialization(String),

    /// Host configuration error.
    #[error("Configuration error: {message}")]
    #[diagnostic(code(gfs::config))]
    Config {
        /// The error message.
        message: String,
    },
}

impl PluginError {
    /// Build a [`PluginError::ConflictingSource`].
    pub fn conflicting(message: impl Into<String>) -> Self {
        Self::ConflictingSource {
            message: message.into(),
        }
    }

    /// Whether this error comes from request validation rather than the host.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::ConflictingSource { .. } | Self::MissingSource)
    }
}

impl From<serde_json::Error> for PluginError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
