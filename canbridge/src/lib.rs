//! Expose a remote CANopen node's object dictionary as named device server attributes
//!
//! The crate is the registry and dispatch layer of a bridge device server:
//!
//! - An [ObjectAddress] grammar covering the three addressing styles operators use
//!   (hexadecimal index with optional sub-index, decimal index, symbolic entry name)
//! - An [AttributeRegistry] mapping attribute names to addresses and serving their reads
//!   and writes as SDO transactions
//! - An [AttributeSpec]/[AttributeDefinition] pair for declaring attributes as data, at
//!   startup via a TOML [AttributeList] or at runtime via an add command
//! - A [Device] orchestrating startup and teardown around those pieces
//!
//! What the crate does not do: talk to a CAN bus or present attributes to control system
//! clients. Both collaborators sit behind the narrow traits in [traits], and the only
//! CANopen knowledge here is how an address string selects a dictionary entry.
#![warn(missing_docs, missing_copy_implementations)]

mod address;
mod attributes;
mod config;
mod device;
mod registry;
pub mod traits;
mod value;

pub use address::{
    resolve_read, resolve_write, AddressError, EntryKey, ObjectAddress, ResolveError,
};
pub use attributes::{AccessMode, AttributeDefinition, AttributeSpec, AttributeType};
pub use config::{AttributeList, ConfigError, DeviceConfig};
pub use device::{Device, DeviceError, DeviceState};
pub use registry::{AccessError, AttributeRegistry};
pub use value::Value;
