use std::sync::atomic::Ordering;

use canbridge::{AttributeSpec, Device, DeviceConfig, DeviceError, DeviceState, Value};
use integration_tests::sim_node::SimBackend;
use integration_tests::stub_server::RecordingServer;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

const ATTRIBUTE_LIST: &str = r#"
[[attribute]]
name = "StatusWord"
register = "0x6041"
data_type = "integer"
unit = "counts"
min_value = "0"
max_value = "65535"

[[attribute]]
name = "Placeholder"
register = ""
"#;

#[test]
fn test_startup_with_attribute_list() {
    init_logging();
    let backend = SimBackend::new();
    let stats = backend.stats();
    let server = RecordingServer::new();
    let definitions = server.definitions();

    let mut config = DeviceConfig::new(5);
    config.init_attributes = ATTRIBUTE_LIST.to_string();

    let mut device = Device::new(backend, server, config);
    device.initialize();

    assert_eq!(DeviceState::Operational, device.state());
    assert_eq!(1, stats.connects.load(Ordering::Relaxed));

    // The empty-address placeholder is skipped without complaint
    let registry = device.registry().unwrap();
    assert_eq!(1, registry.len());
    assert!(registry.contains("StatusWord"));
    assert!(!registry.contains("Placeholder"));

    let definitions = definitions.lock().unwrap();
    assert_eq!(1, definitions.len());
    assert_eq!("StatusWord", definitions[0].name);
    assert_eq!(Some("counts".to_string()), definitions[0].unit);
    assert_eq!(Some("0".to_string()), definitions[0].min_value);
    assert_eq!(Some("65535".to_string()), definitions[0].max_value);
}

#[test]
fn test_startup_without_attribute_list() {
    let mut device = Device::new(SimBackend::new(), RecordingServer::new(), DeviceConfig::new(5));
    device.initialize();

    assert_eq!(DeviceState::Operational, device.state());
    assert!(device.registry().unwrap().is_empty());
}

#[test]
fn test_malformed_list_still_reaches_operational() {
    init_logging();
    let mut config = DeviceConfig::new(5);
    config.init_attributes = "[[attribute]\nname=".to_string();

    let mut device = Device::new(SimBackend::new(), RecordingServer::new(), config);
    device.initialize();

    assert_eq!(DeviceState::Operational, device.state());
    assert!(device.registry().unwrap().is_empty());
}

#[test]
fn test_malformed_entry_registers_the_rest() {
    let mut config = DeviceConfig::new(5);
    config.init_attributes = r#"
    [[attribute]]
    register = "0x6044"

    [[attribute]]
    name = "StatusWord"
    register = "0x6041"
    "#
    .to_string();

    let mut device = Device::new(SimBackend::new(), RecordingServer::new(), config);
    device.initialize();

    assert_eq!(DeviceState::Operational, device.state());
    let registry = device.registry().unwrap();
    assert_eq!(1, registry.len());
    assert!(registry.contains("StatusWord"));
}

#[test]
fn test_connect_failure_goes_to_fault() {
    let backend = SimBackend::new().failing_connect();
    let stats = backend.stats();

    let mut device = Device::new(backend, RecordingServer::new(), DeviceConfig::new(5));
    device.initialize();

    assert_eq!(DeviceState::Fault, device.state());
    assert!(device.fault_reason().unwrap().contains("can0"));
    assert!(device.registry().is_none());

    // Teardown after a failed connect must not call disconnect
    device.shutdown();
    assert_eq!(0, stats.disconnects.load(Ordering::Relaxed));
}

#[test]
fn test_attach_failure_goes_to_fault() {
    let backend = SimBackend::new().failing_attach();
    let stats = backend.stats();

    let mut device = Device::new(backend, RecordingServer::new(), DeviceConfig::new(5));
    device.initialize();

    assert_eq!(DeviceState::Fault, device.state());
    assert!(device.fault_reason().unwrap().contains("node 5"));

    // The connection did open, so teardown closes it
    device.shutdown();
    assert_eq!(1, stats.disconnects.load(Ordering::Relaxed));
}

#[test]
fn test_shutdown_is_idempotent() {
    let backend = SimBackend::new();
    let stats = backend.stats();

    let mut device = Device::new(backend, RecordingServer::new(), DeviceConfig::new(5));
    device.initialize();
    assert_eq!(DeviceState::Operational, device.state());

    device.shutdown();
    device.shutdown();

    assert_eq!(1, stats.disconnects.load(Ordering::Relaxed));
    assert_eq!(DeviceState::Uninitialized, device.state());
    assert!(device.registry().is_none());
}

#[test]
fn test_shutdown_before_initialize_does_nothing() {
    let backend = SimBackend::new();
    let stats = backend.stats();

    let mut device = Device::new(backend, RecordingServer::new(), DeviceConfig::new(5));
    device.shutdown();

    assert_eq!(0, stats.disconnects.load(Ordering::Relaxed));
    assert_eq!(DeviceState::Uninitialized, device.state());
}

#[test]
fn test_framework_rejection_leaves_no_registry_entry() {
    init_logging();
    let server = RecordingServer::new().reject("StatusWord");

    let mut config = DeviceConfig::new(5);
    config.init_attributes = r#"
    [[attribute]]
    name = "StatusWord"
    register = "0x6041"

    [[attribute]]
    name = "ControlWord"
    register = "0x6040"
    "#
    .to_string();

    let mut device = Device::new(SimBackend::new(), server, config);
    device.initialize();

    // A refused attribute does not stop the rest of the list, and leaves no
    // name behind for dispatch to trip over
    assert_eq!(DeviceState::Operational, device.state());
    let registry = device.registry().unwrap();
    assert!(!registry.contains("StatusWord"));
    assert!(registry.contains("ControlWord"));

    // The same refusal surfaces directly from the runtime command
    let err = device
        .add_dynamic_attribute(&AttributeSpec {
            name: "StatusWord".to_string(),
            address: "0x6041".to_string(),
            ..Default::default()
        })
        .unwrap_err();
    assert!(matches!(err, DeviceError::Rejected { .. }));
}

#[test]
fn test_add_dynamic_attribute_before_initialize() {
    let mut device = Device::new(SimBackend::new(), RecordingServer::new(), DeviceConfig::new(5));

    let err = device
        .add_dynamic_attribute(&AttributeSpec {
            name: "StatusWord".to_string(),
            address: "0x6041".to_string(),
            ..Default::default()
        })
        .unwrap_err();
    assert_eq!(DeviceError::NotInitialized, err);
}

#[test]
fn test_runtime_add_after_operational() {
    let server = RecordingServer::new();
    let definitions = server.definitions();

    let mut device = Device::new(SimBackend::new(), server, DeviceConfig::new(5));
    device.initialize();

    device
        .add_dynamic_attribute(&AttributeSpec {
            name: "TargetPosition".to_string(),
            address: "0x607A".to_string(),
            value_type: "integer".to_string(),
            ..Default::default()
        })
        .unwrap();

    let registry = device.registry().unwrap();
    registry
        .handle_write("TargetPosition", Value::Integer(90_000))
        .unwrap();
    assert_eq!(
        Value::Integer(90_000),
        registry.handle_read("TargetPosition").unwrap()
    );
    assert_eq!(1, definitions.lock().unwrap().len());
}

#[test]
fn test_empty_address_runtime_add_is_a_noop() {
    let server = RecordingServer::new();
    let definitions = server.definitions();

    let mut device = Device::new(SimBackend::new(), server, DeviceConfig::new(5));
    device.initialize();

    device
        .add_dynamic_attribute(&AttributeSpec {
            name: "Unrouted".to_string(),
            address: String::new(),
            ..Default::default()
        })
        .unwrap();

    assert!(device.registry().unwrap().is_empty());
    assert!(definitions.lock().unwrap().is_empty());
}
