//! `glusterfs` argument rendering.

use gfs_mount::VolumeOptions;

use crate::config::ServerList;
use crate::resolver::{ACL_OPTION, ConfigSource};

/// Always the last argument: route client logs to syslog.
pub const LOGGER_ARG: &str = "--logger=syslog";

/// Ordered argument vector for the mount executable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MountArgs(Vec<String>);

impl MountArgs {
    /// Append one argument.
    pub fn push(&mut self, arg: impl Into<String>) {
        self.0.push(arg.into());
    }

    /// Arguments in order.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Take the arguments.
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl<S: Into<String>> Extend<S> for MountArgs {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.0.extend(iter.into_iter().map(Into::into));
    }
}

impl From<MountArgs> for Vec<String> {
    fn from(args: MountArgs) -> Self {
        args.0
    }
}

/// A volume name, optionally naming a sub-directory: `volume[/subdir]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeName<'a> {
    /// Server-side volume to mount.
    pub volfile_id: &'a str,
    /// Sub-directory inside the volume, without its leading `/`.
    pub subdir: Option<&'a str>,
}

impl<'a> VolumeName<'a> {
    /// Split on the first `/`; later slashes stay in the sub-directory.
    #[must_use]
    pub fn parse(name: &'a str) -> Self {
        match name.split_once('/') {
            Some((volfile_id, subdir)) => Self {
                volfile_id,
                subdir: Some(subdir),
            },
            None => Self {
                volfile_id: name,
                subdir: None,
            },
        }
    }

    fn append_to(self, args: &mut MountArgs) {
        args.push(format!("--volfile-id={}", self.volfile_id));
        if let Some(subdir) = self.subdir {
            args.push(format!("--subdir-mount=/{subdir}"));
        }
    }
}

/// Parse `1 t T TRUE true True` as true and `0 f F FALSE false False` as false.
#[must_use]
pub fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Render the mount arguments for `volume_name`.
///
/// Expects [`validate`](crate::validate) to have accepted the same inputs.
/// Server-list sources get one `-s host` pair per host, `--acl` when the
/// `acl` option is true, then `--volfile-id` and optional `--subdir-mount`.
/// `glusteropts` is split on single spaces and used as-is, so irregular
/// spacing yields empty arguments. `--logger=syslog` always comes last.
#[must_use]
pub fn build_args(
    static_servers: &ServerList,
    options: &VolumeOptions,
    volume_name: &str,
) -> MountArgs {
    let mut args = MountArgs::default();

    match ConfigSource::select(static_servers, options) {
        ConfigSource::RawOptions(raw) => args.extend(raw.split(' ')),
        source => {
            for host in source.hosts().unwrap_or_default() {
                args.push("-s");
                args.push(host);
            }
            let acl = options
                .get(ACL_OPTION)
                .and_then(parse_bool)
                .unwrap_or(false);
            if acl {
                args.push("--acl");
            }
            VolumeName::parse(volume_name).append_to(&mut args);
        }
    }

    args.push(LOGGER_ARG);
    args
}
