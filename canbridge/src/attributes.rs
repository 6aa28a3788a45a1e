//! Declarative attribute descriptions and the typed shells built from them

use serde::Deserialize;

/// Scalar type of an exposed attribute
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AttributeType {
    /// Boolean
    Bool,
    /// Signed integer
    Integer,
    /// Double precision float
    Double,
    /// Single precision float
    Float,
    /// Text
    #[default]
    String,
}

impl AttributeType {
    /// Parse a type name from a descriptor
    ///
    /// Accepts plain names (`"integer"`) as well as the Tango style names used by older
    /// configuration sources (`"DevLong"`). Anything unrecognized, including the empty
    /// string, falls back to `String`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "boolean" | "bool" | "DevBoolean" => Self::Bool,
            "integer" | "int" | "DevLong" => Self::Integer,
            "double" | "DevDouble" => Self::Double,
            "float" | "DevFloat" => Self::Float,
            _ => Self::String,
        }
    }
}

/// Write access mode of an exposed attribute
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AccessMode {
    /// Clients may only read
    ReadOnly,
    /// Clients may only write
    WriteOnly,
    /// Clients may read and write
    #[default]
    ReadWrite,
    /// Read attribute paired with a separate write attribute
    ReadWithWrite,
}

impl AccessMode {
    /// Parse a write mode name from a descriptor
    ///
    /// Accepts plain names (`"read-only"`) as well as the Tango style names
    /// (`"READ_WRITE"`). Anything unrecognized, including the empty string, falls back to
    /// `ReadWrite`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "read-only" | "READ" => Self::ReadOnly,
            "write-only" | "WRITE" => Self::WriteOnly,
            "read-write" | "READ_WRITE" => Self::ReadWrite,
            "read-with-write" | "READ_WITH_WRITE" => Self::ReadWithWrite,
            _ => Self::ReadWrite,
        }
    }

    /// Whether reads are served in this mode
    pub fn is_readable(&self) -> bool {
        !matches!(self, Self::WriteOnly)
    }

    /// Whether writes are accepted in this mode
    pub fn is_writable(&self) -> bool {
        !matches!(self, Self::ReadOnly)
    }
}

/// Declarative description of one dynamic attribute
///
/// This is the wire format, as one entry of the startup attribute list or the payload of
/// the runtime add command. Optional fields use the empty string for "not set" on the
/// wire; [AttributeDefinition] is the built form with explicit absence.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AttributeSpec {
    /// Unique attribute name
    pub name: String,
    /// Object dictionary address; empty means the descriptor is skipped
    #[serde(alias = "register")]
    pub address: String,
    /// Scalar type name; empty means string
    #[serde(default, alias = "data_type")]
    pub value_type: String,
    /// Write mode name; empty means read-write
    #[serde(default, alias = "write_type")]
    pub write_mode: String,
    /// Engineering unit
    #[serde(default)]
    pub unit: String,
    /// Lower limit; applied only together with an unequal `max_value`
    #[serde(default)]
    pub min_value: String,
    /// Upper limit; applied only together with an unequal `min_value`
    #[serde(default)]
    pub max_value: String,
    /// Lower alarm threshold
    #[serde(default)]
    pub min_alarm: String,
    /// Upper alarm threshold
    #[serde(default)]
    pub max_alarm: String,
    /// Lower warning threshold
    #[serde(default)]
    pub min_warning: String,
    /// Upper warning threshold
    #[serde(default)]
    pub max_warning: String,
}

/// A fully built, typed attribute shell ready to hand to the framework
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDefinition {
    /// Attribute name
    pub name: String,
    /// Scalar type
    pub value_type: AttributeType,
    /// Write access mode
    pub access: AccessMode,
    /// Engineering unit, if set
    pub unit: Option<String>,
    /// Lower limit; present only when `max_value` is too
    pub min_value: Option<String>,
    /// Upper limit; present only when `min_value` is too
    pub max_value: Option<String>,
    /// Lower alarm threshold, if set
    pub min_alarm: Option<String>,
    /// Upper alarm threshold, if set
    pub max_alarm: Option<String>,
    /// Lower warning threshold, if set
    pub min_warning: Option<String>,
    /// Upper warning threshold, if set
    pub max_warning: Option<String>,
}

impl AttributeDefinition {
    /// Build the typed shell for a descriptor
    ///
    /// Unknown type and mode names fall back to their defaults rather than failing. The
    /// min/max pair is applied only when both are set and differ; equal bounds mean no
    /// constraint was supplied.
    pub fn from_spec(spec: &AttributeSpec) -> Self {
        fn set(s: &str) -> Option<String> {
            if s.is_empty() {
                None
            } else {
                Some(s.to_string())
            }
        }

        let limits_apply = !spec.min_value.is_empty()
            && !spec.max_value.is_empty()
            && spec.min_value != spec.max_value;

        Self {
            name: spec.name.clone(),
            value_type: AttributeType::from_name(&spec.value_type),
            access: AccessMode::from_name(&spec.write_mode),
            unit: set(&spec.unit),
            min_value: limits_apply.then(|| spec.min_value.clone()),
            max_value: limits_apply.then(|| spec.max_value.clone()),
            min_alarm: set(&spec.min_alarm),
            max_alarm: set(&spec.max_alarm),
            min_warning: set(&spec.min_warning),
            max_warning: set(&spec.max_warning),
        }
    }
}
