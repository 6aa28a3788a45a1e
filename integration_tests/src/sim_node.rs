//! In-memory stand-ins for the CANopen stack boundary

use std::collections::HashMap;
use std::sync::atomic::AtomicUsize;
use std::sync::{Arc, Mutex};

use canbridge::traits::{CanBackend, ObjectClient, TransportError};
use canbridge::{resolve_write, EntryKey, ObjectAddress, Value};

/// One sub entry slot in the simulated dictionary
type SlotKey = (u64, Option<u8>);

/// An in-memory remote node
///
/// Stores scalar values per entry slot, created on first write. The dictionary
/// description passed at attach time is a line-per-entry `Name = address` listing which
/// populates the symbolic name table, standing in for a real EDS description.
pub struct SimNode {
    slots: Mutex<HashMap<SlotKey, Value>>,
    names: HashMap<String, SlotKey>,
}

impl SimNode {
    /// Build a node from a dictionary description
    pub fn new(dictionary: &str) -> Self {
        let mut names = HashMap::new();
        for line in dictionary.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let Some((name, address)) = line.split_once('=') else {
                log::warn!("Ignoring dictionary line without '=': {line}");
                continue;
            };
            match address.trim().parse::<ObjectAddress>() {
                Ok(parsed) => match parsed.entry_key() {
                    EntryKey::Index { index, sub } => {
                        names.insert(name.trim().to_string(), (index, sub));
                    }
                    EntryKey::Name(_) => {
                        log::warn!("Ignoring dictionary entry with non-numeric address: {line}")
                    }
                },
                Err(e) => log::warn!("Ignoring malformed dictionary line: {e}"),
            }
        }
        Self {
            slots: Mutex::new(HashMap::new()),
            names,
        }
    }

    fn slot(&self, key: EntryKey<'_>) -> Result<SlotKey, TransportError> {
        match key {
            EntryKey::Index { index, sub } => Ok((index, sub)),
            EntryKey::Name(name) => {
                self.names
                    .get(name)
                    .copied()
                    .ok_or(TransportError::NoSuchEntry {
                        key: name.to_string(),
                    })
            }
        }
    }
}

impl ObjectClient for SimNode {
    fn upload(&self, key: EntryKey<'_>) -> Result<Value, TransportError> {
        let slot = self.slot(key)?;
        self.slots
            .lock()
            .unwrap()
            .get(&slot)
            .cloned()
            .ok_or(TransportError::NoSuchEntry {
                key: key.to_string(),
            })
    }

    fn download(&self, key: EntryKey<'_>, value: Value) -> Result<(), TransportError> {
        let slot = self.slot(key)?;
        self.slots.lock().unwrap().insert(slot, value);
        Ok(())
    }
}

/// Counters observable from a test after the backend has moved into a device
#[derive(Debug, Default)]
pub struct BackendStats {
    /// Number of successful connect calls
    pub connects: AtomicUsize,
    /// Number of disconnect calls
    pub disconnects: AtomicUsize,
}

/// CANopen stack stand-in handing out [SimNode]s
#[derive(Default)]
pub struct SimBackend {
    stats: Arc<BackendStats>,
    seeds: Vec<(String, Value)>,
    fail_connect: bool,
    fail_attach: bool,
}

impl SimBackend {
    /// A backend that connects and attaches successfully
    pub fn new() -> Self {
        Self::default()
    }

    /// Make connect fail, simulating a bus that is not present
    pub fn failing_connect(mut self) -> Self {
        self.fail_connect = true;
        self
    }

    /// Make node attachment fail, simulating an unreachable node
    pub fn failing_attach(mut self) -> Self {
        self.fail_attach = true;
        self
    }

    /// Pre-load an entry value into the node created at attach time
    pub fn seed(mut self, address: &str, value: Value) -> Self {
        self.seeds.push((address.to_string(), value));
        self
    }

    /// Handle to the call counters; grab a clone before moving the backend into a device
    pub fn stats(&self) -> Arc<BackendStats> {
        self.stats.clone()
    }
}

impl CanBackend for SimBackend {
    type Node = SimNode;

    fn connect(
        &mut self,
        channel: &str,
        _interface: &str,
        _bitrate: u32,
    ) -> Result<(), TransportError> {
        if self.fail_connect {
            return Err(TransportError::Bus {
                message: format!("no such device {channel}"),
            });
        }
        self.stats
            .connects
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        Ok(())
    }

    fn attach_node(
        &mut self,
        _node_id: u8,
        dictionary: &str,
    ) -> Result<Self::Node, TransportError> {
        if self.fail_attach {
            return Err(TransportError::NoResponse);
        }
        let node = SimNode::new(dictionary);
        for (address, value) in &self.seeds {
            resolve_write(&node, address, value.clone()).expect("failed to seed entry");
        }
        Ok(node)
    }

    fn disconnect(&mut self) {
        self.stats
            .disconnects
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
    }
}
