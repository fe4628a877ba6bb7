//! Configuration source resolution.
//!
//! Only the presence of the `servers` and `glusteropts` keys matters here,
//! never their values: `servers=""` still selects the `servers` source.

use gfs_common::{PluginError, PluginResult};
use gfs_mount::VolumeOptions;

use crate::config::ServerList;

/// Option holding a comma-separated server list.
pub const SERVERS_OPTION: &str = "servers";

/// Option holding raw, space-separated mount arguments.
pub const GLUSTEROPTS_OPTION: &str = "glusteropts";

/// Option enabling POSIX ACL support.
pub const ACL_OPTION: &str = "acl";

/// The configuration source that is authoritative for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource<'a> {
    /// Servers configured on the plugin.
    StaticServers(&'a [String]),
    /// Servers from the request's `servers` option.
    RequestServers(Vec<&'a str>),
    /// Raw arguments from the request's `glusteropts` option.
    RawOptions(&'a str),
}

impl<'a> ConfigSource<'a> {
    /// Pick the source by precedence: static servers, then `servers`, then
    /// `glusteropts`.
    ///
    /// Does not check for conflicts; call [`validate`] first. A request with
    /// no source at all selects empty raw options.
    #[must_use]
    pub fn select(static_servers: &'a ServerList, options: &'a VolumeOptions) -> Self {
        if !static_servers.is_empty() {
            return Self::StaticServers(static_servers.as_slice());
        }
        if let Some(servers) = options.get(SERVERS_OPTION) {
            return Self::RequestServers(servers.split(',').collect());
        }
        Self::RawOptions(options.get(GLUSTEROPTS_OPTION).unwrap_or_default())
    }

    /// Hosts to pass with `-s`, or `None` for raw options.
    #[must_use]
    pub fn hosts(&self) -> Option<Vec<&'a str>> {
        match self {
            Self::StaticServers(servers) => Some((*servers).iter().map(String::as_str).collect()),
            Self::RequestServers(servers) => Some(servers.clone()),
            Self::RawOptions(_) => None,
        }
    }
}

/// Check that exactly one configuration source applies.
///
/// # Errors
///
/// Returns [`PluginError::ConflictingSource`] when two sources apply and
/// [`PluginError::MissingSource`] when none does.
pub fn validate(static_servers: &ServerList, options: &VolumeOptions) -> PluginResult<()> {
    let has_servers = options.contains(SERVERS_OPTION);
    let has_glusteropts = options.contains(GLUSTEROPTS_OPTION);

    if !static_servers.is_empty() && (has_servers || has_glusteropts) {
        return Err(PluginError::conflicting(
            "static server list set; per-request options are not allowed",
        ));
    }
    if has_servers && has_glusteropts {
        return Err(PluginError::conflicting(
            "servers and glusteropts are mutually exclusive",
        ));
    }
    if static_servers.is_empty() && !has_servers && !has_glusteropts {
        return Err(PluginError::MissingSource);
    }
    Ok(())
}

/// [`validate`] then [`ConfigSource::select`].
///
/// # Errors
///
/// Same as [`validate`].
pub fn resolve<'a>(
    static_servers: &'a ServerList,
    options: &'a VolumeOptions,
) -> PluginResult<ConfigSource<'a>> {
    validate(static_servers, options)?;
    Ok(ConfigSource::select(static_servers, options))
}
