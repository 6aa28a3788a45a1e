//! The name to address map backing all dynamic attributes of one device

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use snafu::{OptionExt, ResultExt, Snafu};

use crate::address::{resolve_read, resolve_write, ResolveError};
use crate::traits::ObjectClient;
use crate::value::Value;

/// Error for a failed attribute access
#[derive(Debug, Clone, PartialEq, Snafu)]
pub enum AccessError {
    /// Dispatch was invoked for a name that was never registered
    #[snafu(display("No attribute named '{name}' is registered"))]
    UnknownAttribute {
        /// The unregistered name
        name: String,
    },
    /// Address resolution or the SDO transaction failed
    #[snafu(display("Access to attribute '{name}' failed: {source}"))]
    Dispatch {
        /// The attribute being accessed
        name: String,
        /// The underlying failure
        source: ResolveError,
    },
}

/// Maps attribute names to object dictionary addresses and serves their reads and writes
///
/// Registration is rare (a startup burst, the occasional runtime command) while dispatch
/// is frequent, so the map sits behind a reader writer lock. One registry is shared via
/// `Arc` between the device, which registers names, and the framework's dispatch path,
/// which calls [handle_read](Self::handle_read) and [handle_write](Self::handle_write).
pub struct AttributeRegistry<C> {
    addresses: RwLock<HashMap<String, String>>,
    client: Arc<C>,
}

impl<C> core::fmt::Debug for AttributeRegistry<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AttributeRegistry")
            .field("addresses", &self.addresses)
            .finish()
    }
}

impl<C: ObjectClient> AttributeRegistry<C> {
    /// Create a registry dispatching against `client`
    pub fn new(client: Arc<C>) -> Self {
        Self {
            addresses: RwLock::new(HashMap::new()),
            client,
        }
    }

    /// Record the address for a named attribute
    ///
    /// An empty address is a no-op. Registering an existing name overwrites its address.
    /// Never fails; a bad address surfaces later, on the access that tries to resolve it.
    pub fn register(&self, name: &str, address: &str) {
        if address.is_empty() {
            return;
        }
        self.addresses
            .write()
            .unwrap()
            .insert(name.to_string(), address.to_string());
    }

    /// Read the current value of a registered attribute from the node
    pub fn handle_read(&self, name: &str) -> Result<Value, AccessError> {
        let address = self
            .address_of(name)
            .context(UnknownAttributeSnafu { name })?;
        let value =
            resolve_read(self.client.as_ref(), &address).context(DispatchSnafu { name })?;
        log::debug!("Read value {name}: {value}");
        Ok(value)
    }

    /// Write a value to a registered attribute on the node
    pub fn handle_write(&self, name: &str, value: Value) -> Result<(), AccessError> {
        let address = self
            .address_of(name)
            .context(UnknownAttributeSnafu { name })?;
        resolve_write(self.client.as_ref(), &address, value.clone())
            .context(DispatchSnafu { name })?;
        log::debug!("Write value {name}: {value}");
        Ok(())
    }

    /// Get the address registered for `name`, if any
    pub fn address_of(&self, name: &str) -> Option<String> {
        self.addresses.read().unwrap().get(name).cloned()
    }

    /// Whether an attribute with this name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.addresses.read().unwrap().contains_key(name)
    }

    /// Number of registered attributes
    pub fn len(&self) -> usize {
        self.addresses.read().unwrap().len()
    }

    /// True when no attributes are registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
