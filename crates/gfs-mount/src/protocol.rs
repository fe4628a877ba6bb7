//! Volume plugin protocol messages.
//!
//! Field names follow the runtime's wire format (`Name`, `Opts`, `ID`, ...).

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Per-request driver options.
///
/// Lookups distinguish a missing key from a key present with an empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VolumeOptions(BTreeMap<String, String>);

impl VolumeOptions {
    /// Create an empty option set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Value for `key`, if the key was supplied.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Whether `key` was supplied, regardless of its value.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Set an option.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Number of options.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no options were supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for VolumeOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<const N: usize> From<[(&str, &str); N]> for VolumeOptions {
    fn from(pairs: [(&str, &str); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// Volume create request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRequest {
    /// Volume name, optionally `volume/subdir`.
    #[serde(rename = "Name")]
    pub name: String,
    /// Driver options; `null` is treated as empty.
    #[serde(rename = "Opts", default, deserialize_with = "null_as_default")]
    pub options: VolumeOptions,
}

impl CreateRequest {
    /// Create a request for `name` with `options`.
    pub fn new(name: impl Into<String>, options: impl Into<VolumeOptions>) -> Self {
        Self {
            name: name.into(),
            options: options.into(),
        }
    }
}

/// Volume mount or unmount request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountRequest {
    /// Volume name.
    #[serde(rename = "Name")]
    pub name: String,
    /// Identifier of the container using the volume.
    #[serde(rename = "ID", default)]
    pub id: String,
}

impl MountRequest {
    /// Create a request for volume `name` on behalf of caller `id`.
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }
}

/// Request carrying only a volume name (remove, path, get).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameRequest {
    /// Volume name.
    #[serde(rename = "Name")]
    pub name: String,
}

/// Response carrying only an error string (empty on success).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message, empty on success.
    #[serde(rename = "Err")]
    pub err: String,
}

impl ErrorResponse {
    /// Successful response.
    #[must_use]
    pub fn ok() -> Self {
        Self::default()
    }

    /// Failed response.
    pub fn err(err: impl ToString) -> Self {
        Self {
            err: err.to_string(),
        }
    }
}

/// Mount and path response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountResponse {
    /// Host path of the mounted volume.
    #[serde(rename = "Mountpoint")]
    pub mountpoint: String,
    /// Error message, empty on success.
    #[serde(rename = "Err")]
    pub err: String,
}

/// A volume as reported by get and list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeEntry {
    /// Volume name.
    #[serde(rename = "Name")]
    pub name: String,
    /// Mountpoint, present only while mounted.
    #[serde(rename = "Mountpoint", default, skip_serializing_if = "String::is_empty")]
    pub mountpoint: String,
}

/// Get response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetResponse {
    /// The volume, absent on error.
    #[serde(rename = "Volume", default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<VolumeEntry>,
    /// Error message, empty on success.
    #[serde(rename = "Err")]
    pub err: String,
}

/// List response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResponse {
    /// All known volumes.
    #[serde(rename = "Volumes")]
    pub volumes: Vec<VolumeEntry>,
    /// Error message, empty on success.
    #[serde(rename = "Err")]
    pub err: String,
}

/// Driver capabilities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capability {
    /// `local` or `global`.
    #[serde(rename = "Scope")]
    pub scope: String,
}

/// Capabilities response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitiesResponse {
    /// Driver capabilities.
    #[serde(rename = "Capabilities")]
    pub capabilities: Capability,
}

/// Plugin activation response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivateResponse {
    /// Implemented plugin subsystems.
    #[serde(rename = "Implements")]
    pub implements: Vec<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_presence_is_not_truthiness() {
        let opts = VolumeOptions::from([("servers", "")]);
        assert!(opts.contains("servers"));
        assert_eq!(opts.get("servers"), Some(""));
        assert!(!opts.contains("glusteropts"));
        assert_eq!(opts.get("glusteropts"), None);
    }

    #[test]
    fn create_request_from_wire() {
        let req: CreateRequest =
            serde_json::from_str(r#"{"Name":"vol1/sub","Opts":{"servers":"a,b","acl":"true"}}"#)
                .unwrap();
        assert_eq!(req.name, "vol1/sub");
        assert_eq!(req.options.get("servers"), Some("a,b"));
        assert_eq!(req.options.len(), 2);
    }

    #[test]
    fn create_request_null_or_missing_opts() {
        let req: CreateRequest = serde_json::from_str(r#"{"Name":"v","Opts":null}"#).unwrap();
        assert!(req.options.is_empty());

        let req: CreateRequest = serde_json::from_str(r#"{"Name":"v"}"#).unwrap();
        assert!(req.options.is_empty());
    }

    #[test]
    fn mount_request_uses_id_field() {
        let req: MountRequest = serde_json::from_str(r#"{"Name":"v","ID":"c1"}"#).unwrap();
        assert_eq!(req, MountRequest::new("v", "c1"));
    }

    #[test]
    fn responses_use_wire_names() {
        let json = serde_json::to_value(MountResponse {
            mountpoint: "/mnt/x".to_string(),
            err: String::new(),
        })
        .unwrap();
        assert_eq!(json["Mountpoint"], "/mnt/x");
        assert_eq!(json["Err"], "");

        let json = serde_json::to_value(GetResponse {
            volume: Some(VolumeEntry {
                name: "v".to_string(),
                mountpoint: String::new(),
            }),
            err: String::new(),
        })
        .unwrap();
        assert_eq!(json["Volume"]["Name"], "v");
        assert!(json["Volume"].get("Mountpoint").is_none());
    }
}
