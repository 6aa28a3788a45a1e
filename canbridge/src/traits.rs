//! Boundary traits for the external collaborators
//!
//! This crate deliberately implements neither a CAN transport nor a device server
//! framework. [ObjectClient] and [CanBackend] are the narrow surface it requires from a
//! CANopen stack; [AttributeServer] is the surface it requires from the framework that
//! presents attributes to control system clients.

use snafu::Snafu;

use crate::address::EntryKey;
use crate::attributes::AttributeDefinition;
use crate::value::Value;

/// Error raised by the CANopen stack for a failed connection or SDO transaction
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
pub enum TransportError {
    /// The node did not respond within the transport's deadline
    #[snafu(display("No response from node"))]
    NoResponse,
    /// The node's SDO server aborted the transaction
    #[snafu(display("SDO abort from node: {code:#010x}"))]
    ServerAbort {
        /// The abort code reported by the node
        code: u32,
    },
    /// No dictionary entry exists at the requested key
    #[snafu(display("No dictionary entry for '{key}'"))]
    NoSuchEntry {
        /// The lookup key that missed
        key: String,
    },
    /// Bus level failure
    #[snafu(display("Bus failure: {message}"))]
    Bus {
        /// Driver supplied detail
        message: String,
    },
}

/// Blocking access to one remote node's object dictionary
///
/// Implementations perform the actual SDO transactions; a call may take a full bus round
/// trip and there is no timeout or cancellation at this level. Implementations must
/// serialize concurrent transactions against the same node.
pub trait ObjectClient {
    /// Read the scalar value of the entry at `key`
    fn upload(&self, key: EntryKey<'_>) -> Result<Value, TransportError>;
    /// Write a scalar value to the entry at `key`
    fn download(&self, key: EntryKey<'_>, value: Value) -> Result<(), TransportError>;
}

/// The CANopen stack boundary used during device startup and teardown
pub trait CanBackend {
    /// The object dictionary client type produced for an attached node
    type Node: ObjectClient;

    /// Open the network connection
    fn connect(
        &mut self,
        channel: &str,
        interface: &str,
        bitrate: u32,
    ) -> Result<(), TransportError>;

    /// Materialize a remote node from its dictionary description and attach it to the
    /// network
    fn attach_node(&mut self, node_id: u8, dictionary: &str) -> Result<Self::Node, TransportError>;

    /// Close the network connection
    ///
    /// Must be safe to call when no connection is open.
    fn disconnect(&mut self);
}

/// Error returned by the framework when it refuses to create an attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameworkError {
    /// Name of the refused attribute
    pub name: String,
    /// Reason given by the framework
    pub reason: String,
}

impl core::fmt::Display for FrameworkError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Attribute '{}' rejected: {}", self.name, self.reason)
    }
}

impl std::error::Error for FrameworkError {}

/// The device server framework boundary
///
/// The framework owns attribute presentation and client transport. This crate hands it
/// fully built attribute definitions and serves the reads and writes for them through
/// [AttributeRegistry](crate::AttributeRegistry).
pub trait AttributeServer {
    /// Create a named attribute on the server from a built definition
    fn add_attribute(&mut self, definition: AttributeDefinition) -> Result<(), FrameworkError>;
}
