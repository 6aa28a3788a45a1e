//! A recording stand-in for the device server framework

use std::sync::{Arc, Mutex};

use canbridge::traits::{AttributeServer, FrameworkError};
use canbridge::AttributeDefinition;

/// Records every attribute definition the device hands to the framework
///
/// Names added via [reject](Self::reject) are refused, simulating a framework level
/// collision.
#[derive(Default)]
pub struct RecordingServer {
    definitions: Arc<Mutex<Vec<AttributeDefinition>>>,
    rejects: Vec<String>,
}

impl RecordingServer {
    /// A server accepting every attribute
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse attributes with this name
    pub fn reject(mut self, name: &str) -> Self {
        self.rejects.push(name.to_string());
        self
    }

    /// Handle to the recorded definitions; grab a clone before moving the server into a
    /// device
    pub fn definitions(&self) -> Arc<Mutex<Vec<AttributeDefinition>>> {
        self.definitions.clone()
    }
}

impl AttributeServer for RecordingServer {
    fn add_attribute(&mut self, definition: AttributeDefinition) -> Result<(), FrameworkError> {
        if self.rejects.contains(&definition.name) {
            return Err(FrameworkError {
                name: definition.name,
                reason: "attribute already defined".to_string(),
            });
        }
        log::debug!("Framework accepted attribute {}", definition.name);
        self.definitions.lock().unwrap().push(definition);
        Ok(())
    }
}
