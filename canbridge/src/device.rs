//! Device lifecycle orchestration

use std::sync::Arc;

use snafu::{OptionExt, ResultExt, Snafu};

use crate::attributes::{AttributeDefinition, AttributeSpec};
use crate::config::{AttributeList, DeviceConfig};
use crate::registry::AttributeRegistry;
use crate::traits::{AttributeServer, CanBackend, FrameworkError};

/// Lifecycle state of a bridge device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    /// Constructed, not yet brought up
    Uninitialized,
    /// Startup in progress; no attribute traffic is served yet
    Initializing,
    /// Connected and serving attribute reads and writes
    Operational,
    /// Startup failed; see [Device::fault_reason]
    Fault,
}

/// Error from the runtime add attribute command
#[derive(Debug, Clone, PartialEq, Snafu)]
pub enum DeviceError {
    /// The device has no node attached yet
    #[snafu(display("Device is not initialized"))]
    NotInitialized,
    /// The framework refused to create the attribute
    #[snafu(display("{source}"))]
    Rejected {
        /// The framework's refusal
        source: FrameworkError,
    },
}

/// A bridge device exposing one remote CANopen node's object dictionary as dynamic
/// attributes
///
/// Generic over the CANopen stack (`B`) and the device server framework (`F`), both
/// reached only through their boundary traits. The device owns the attribute registry
/// for its lifetime; the framework's dispatch path holds a shared handle to it, obtained
/// from [registry](Self::registry) once initialization has completed.
pub struct Device<B: CanBackend, F> {
    backend: B,
    server: F,
    config: DeviceConfig,
    state: DeviceState,
    fault_reason: Option<String>,
    registry: Option<Arc<AttributeRegistry<B::Node>>>,
    connected: bool,
}

impl<B: CanBackend, F: AttributeServer> Device<B, F> {
    /// Create a device in the [DeviceState::Uninitialized] state
    pub fn new(backend: B, server: F, config: DeviceConfig) -> Self {
        Self {
            backend,
            server,
            config,
            state: DeviceState::Uninitialized,
            fault_reason: None,
            registry: None,
            connected: false,
        }
    }

    /// Bring the device up: connect the bus, attach the remote node, and create the
    /// startup attributes
    ///
    /// Runs to completion before any attribute traffic is served. Transport failures
    /// during startup do not propagate; they leave the device in [DeviceState::Fault]
    /// with a reason, so it stays inspectable without restarting the process. A broken
    /// attribute list is logged and skipped, and the device still becomes operational
    /// with whichever attributes did parse.
    pub fn initialize(&mut self) {
        self.state = DeviceState::Initializing;
        self.fault_reason = None;

        if let Err(e) = self.backend.connect(
            &self.config.channel,
            &self.config.interface,
            self.config.bitrate,
        ) {
            self.fail(format!(
                "Failed to connect CAN channel {}: {e}",
                self.config.channel
            ));
            return;
        }
        self.connected = true;

        let node = match self
            .backend
            .attach_node(self.config.node_id, &self.config.dictionary)
        {
            Ok(node) => node,
            Err(e) => {
                self.fail(format!("Failed to attach node {}: {e}", self.config.node_id));
                return;
            }
        };
        log::info!("Attached node {}", self.config.node_id);
        self.registry = Some(Arc::new(AttributeRegistry::new(Arc::new(node))));

        if !self.config.init_attributes.is_empty() {
            let parsed = AttributeList::load_from_str(&self.config.init_attributes);
            match parsed {
                Ok(list) => {
                    // Strictly sequential; no overlapping registrations are issued
                    for spec in list.specs() {
                        if let Err(e) = self.add_dynamic_attribute(spec) {
                            log::error!("Failed to create attribute '{}': {e}", spec.name);
                        }
                    }
                }
                Err(e) => log::error!("Failed to parse attribute list: {e}"),
            }
        }

        self.state = DeviceState::Operational;
    }

    /// Create one dynamic attribute from its descriptor
    ///
    /// The body of the runtime add command, also applied per entry of the startup list.
    /// A descriptor with an empty address is silently ignored. The registry entry is
    /// recorded only after the framework accepts the attribute, so a refused attribute
    /// never leaves a dangling registry entry.
    pub fn add_dynamic_attribute(&mut self, spec: &AttributeSpec) -> Result<(), DeviceError> {
        if spec.address.is_empty() {
            return Ok(());
        }
        let registry = self.registry.clone().context(NotInitializedSnafu)?;

        let definition = AttributeDefinition::from_spec(spec);
        self.server.add_attribute(definition).context(RejectedSnafu)?;
        registry.register(&spec.name, &spec.address);
        log::info!("Added dynamic attribute {} at {}", spec.name, spec.address);
        Ok(())
    }

    /// Tear the device down: disconnect the bus and release the node
    ///
    /// Idempotent; a second call, or a call on a device that never initialized, does
    /// nothing and never fails.
    pub fn shutdown(&mut self) {
        if self.connected {
            self.backend.disconnect();
            self.connected = false;
        }
        self.registry = None;
        self.state = DeviceState::Uninitialized;
    }

    /// Current lifecycle state
    pub fn state(&self) -> DeviceState {
        self.state
    }

    /// Diagnostic message for a startup failure, when the state is [DeviceState::Fault]
    pub fn fault_reason(&self) -> Option<&str> {
        self.fault_reason.as_deref()
    }

    /// Shared handle to the attribute registry for the framework's dispatch path
    ///
    /// `None` until the device has attached its node.
    pub fn registry(&self) -> Option<Arc<AttributeRegistry<B::Node>>> {
        self.registry.clone()
    }

    /// The static configuration this device was created with
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    fn fail(&mut self, reason: String) {
        log::error!("{reason}");
        self.fault_reason = Some(reason);
        self.state = DeviceState::Fault;
    }
}
