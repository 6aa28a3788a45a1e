//! Declarative device and attribute list configuration

use std::path::Path;

use serde::Deserialize;
use snafu::{ResultExt, Snafu};

use crate::attributes::AttributeSpec;

/// Error returned when loading configuration
#[derive(Debug, Snafu)]
pub enum ConfigError {
    /// IO failure reading a configuration file
    #[snafu(display("IO error loading {path}: {source:?}"))]
    Io {
        /// Path of the file that failed to load
        path: String,
        /// The underlying IO error
        source: std::io::Error,
    },
    /// The document is not well formed
    #[snafu(display("Error parsing TOML: {source}"))]
    TomlDeserialization {
        /// The underlying parse error
        source: toml::de::Error,
    },
}

/// The declarative list of attributes to create at startup
///
/// A TOML document of `[[attribute]]` tables, structurally identical to the payload of
/// the runtime add command repeated once per attribute:
///
/// ```toml
/// [[attribute]]
/// name = "StatusWord"
/// register = "0x6041"
/// data_type = "integer"
/// unit = "counts"
/// ```
///
/// The document itself must be well formed TOML. Individual entries that fail to decode
/// are skipped with a log line, so one bad entry does not block the rest of the list.
#[derive(Debug, Clone)]
pub struct AttributeList(Vec<AttributeSpec>);

impl AttributeList {
    /// Read an attribute list from a file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<AttributeList, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).context(IoSnafu {
            path: path.to_string_lossy(),
        })?;
        Self::load_from_str(&content)
    }

    /// Read an attribute list from a string
    pub fn load_from_str(s: &str) -> Result<AttributeList, ConfigError> {
        let raw: AttributeListSerializer = toml::from_str(s).context(TomlDeserializationSnafu)?;

        let mut specs = Vec::with_capacity(raw.attribute.len());
        for (n, entry) in raw.attribute.into_iter().enumerate() {
            match entry.try_into::<AttributeSpec>() {
                Ok(spec) => specs.push(spec),
                Err(e) => log::warn!("Skipping malformed attribute entry {n}: {e}"),
            }
        }

        Ok(AttributeList(specs))
    }

    /// The parsed attribute descriptors
    pub fn specs(&self) -> &[AttributeSpec] {
        &self.0
    }
}

#[derive(Debug, Deserialize)]
struct AttributeListSerializer {
    #[serde(default)]
    attribute: Vec<toml::Value>,
}

/// Static configuration for one bridge device, supplied by the hosting process
///
/// Field defaults mirror a socketcan setup on `can0`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeviceConfig {
    /// CAN channel identifier, e.g. `"can0"`
    #[serde(default = "default_channel")]
    pub channel: String,
    /// Network driver name
    #[serde(default = "default_interface")]
    pub interface: String,
    /// Bus bitrate. Zero leaves the interface's configured rate untouched.
    #[serde(default)]
    pub bitrate: u32,
    /// Object dictionary description for the remote node
    #[serde(default)]
    pub dictionary: String,
    /// Node ID of the remote node on the bus
    pub node_id: u8,
    /// TOML payload holding the `[[attribute]]` list to create at startup; empty for none
    #[serde(default)]
    pub init_attributes: String,
}

impl DeviceConfig {
    /// Configuration for `node_id` with socketcan defaults and no startup attributes
    pub fn new(node_id: u8) -> Self {
        Self {
            channel: default_channel(),
            interface: default_interface(),
            bitrate: 0,
            dictionary: String::new(),
            node_id,
            init_attributes: String::new(),
        }
    }

    /// Read a device configuration from a file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<DeviceConfig, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).context(IoSnafu {
            path: path.to_string_lossy(),
        })?;
        Self::load_from_str(&content)
    }

    /// Read a device configuration from a string
    pub fn load_from_str(s: &str) -> Result<DeviceConfig, ConfigError> {
        toml::from_str(s).context(TomlDeserializationSnafu)
    }
}

fn default_channel() -> String {
    "can0".to_string()
}

fn default_interface() -> String {
    "socketcan".to_string()
}
