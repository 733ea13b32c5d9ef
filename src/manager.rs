//! # Connection Manager
//!
//! Port discovery across the three transport classes, plus the
//! longer-lived connection session retained between print jobs.
//!
//! ## Discovery Normalization
//!
//! Drivers report raw [`PortInfo`] records; discovery normalizes them
//! into caller-facing descriptors:
//!
//! - Bluetooth ports are identified as `BT:<mac>` — radio port *names*
//!   are ephemeral (they follow pairing order), hardware addresses are
//!   stable, so the address is the identifier and the advertised name is
//!   demoted to the model field.
//! - USB ports carry the serial-number suffix of the raw port name so a
//!   specific device can be re-found after replugging.
//!
//! ## The Session Slot
//!
//! At most one session is live per service instance. Establishing a new
//! session always tears down the old one first; the slot is a guarded
//! single-slot registry with an explicit swap-and-teardown, not an
//! implicit process-wide singleton.

use std::sync::Mutex;
use std::time::Duration;

use serde::Serialize;

use crate::error::LuceroError;
use crate::transport::{Port, PortDriver, PortInfo, TransportClass};

/// Port acquisition timeout shared by discovery-adjacent opens.
const CONNECT_TIMEOUT: Duration = Duration::from_millis(10_000);

// ============================================================================
// DISCOVERY
// ============================================================================

/// A normalized, caller-facing port descriptor.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PortDescriptor {
    #[serde(rename = "portName")]
    pub port_name: String,
    #[serde(rename = "macAddress", skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<String>,
    #[serde(rename = "modelName", skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(rename = "USBSerialNumber", skip_serializing_if = "Option::is_none")]
    pub usb_serial_number: Option<String>,
}

/// Which transport classes a discovery selector names.
///
/// Unknown selectors select nothing (an empty result, not an error).
pub fn selector_classes(selector: &str) -> &'static [TransportClass] {
    match selector {
        "LAN" => &[TransportClass::Lan],
        "Bluetooth" => &[TransportClass::Bluetooth],
        "USB" => &[TransportClass::Usb],
        "All" => &[
            TransportClass::Lan,
            TransportClass::Bluetooth,
            TransportClass::Usb,
        ],
        _ => &[],
    }
}

/// Discover ports for a selector (`"LAN"`, `"Bluetooth"`, `"USB"`,
/// `"All"`).
///
/// Classes are searched sequentially — discovery runs on constrained
/// hardware and fan-out buys nothing against radio inquiry times — and
/// results concatenate in class order.
pub fn discover(
    driver: &dyn PortDriver,
    selector: &str,
) -> Result<Vec<PortDescriptor>, LuceroError> {
    let mut descriptors = Vec::new();
    for class in selector_classes(selector) {
        for info in driver.search(*class)? {
            descriptors.push(normalize(*class, info));
        }
    }
    Ok(descriptors)
}

/// Normalize one raw enumeration record.
fn normalize(class: TransportClass, info: PortInfo) -> PortDescriptor {
    let is_radio = info.port_name.starts_with("BT:");

    let port_name = if is_radio {
        format!("BT:{}", info.mac_address)
    } else {
        info.port_name.clone()
    };

    let mut descriptor = PortDescriptor {
        port_name,
        mac_address: None,
        model_name: None,
        usb_serial_number: None,
    };

    if !info.mac_address.is_empty() {
        descriptor.mac_address = Some(info.mac_address.clone());
        if is_radio {
            // The advertised radio name is the closest thing to a model.
            descriptor.model_name = Some(info.port_name);
        } else if !info.model_name.is_empty() {
            descriptor.model_name = Some(info.model_name);
        }
    } else if class == TransportClass::Usb {
        if !info.model_name.is_empty() {
            descriptor.model_name = Some(info.model_name);
        }
        let serial = info
            .port_name
            .strip_prefix("USB:")
            .unwrap_or_default();
        if !serial.is_empty() {
            descriptor.usb_serial_number = Some(serial.to_string());
        }
    }

    descriptor
}

// ============================================================================
// SESSION SLOT
// ============================================================================

/// A live persistent connection.
pub struct Session {
    pub port_name: String,
    pub settings: String,
    /// Whether the session negotiated the barcode-reader capability set.
    pub with_barcode_reader: bool,
    port: Box<dyn Port>,
}

/// The guarded single-slot session registry.
#[derive(Default)]
pub struct SessionSlot {
    inner: Mutex<Option<Session>>,
}

impl SessionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Establish a session, tearing down any existing one first.
    ///
    /// A driver report of "already connected" counts as success. The
    /// teardown of the previous session is best-effort; its failure is
    /// logged and does not block the new connection.
    pub fn connect(
        &self,
        driver: &dyn PortDriver,
        port_name: &str,
        settings: &str,
        with_barcode_reader: bool,
    ) -> Result<(), LuceroError> {
        let mut slot = self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(mut old) = slot.take() {
            if let Err(e) = old.port.release() {
                log::warn!("failed to release previous session on {}: {e}", old.port_name);
            }
        }

        match driver.open(port_name, settings, CONNECT_TIMEOUT) {
            Ok(port) => {
                if with_barcode_reader {
                    log::debug!("session on {port_name} negotiated barcode reader support");
                }
                *slot = Some(Session {
                    port_name: port_name.to_string(),
                    settings: settings.to_string(),
                    with_barcode_reader,
                    port,
                });
                Ok(())
            }
            // The device already considers us connected; nothing to store,
            // but the caller's intent is satisfied.
            Err(LuceroError::AlreadyConnected) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Tear down the session, if any. Returns whether one existed.
    pub fn disconnect(&self) -> Result<bool, LuceroError> {
        let mut slot = self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match slot.take() {
            Some(mut session) => {
                session.port.release()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Whether a session is currently live.
    pub fn is_connected(&self) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_some()
    }

    /// The connected port name, if any.
    pub fn port_name(&self) -> Option<String> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .as_ref()
            .map(|s| s.port_name.clone())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockDriver;

    fn bt_info() -> PortInfo {
        PortInfo {
            port_name: "BT:Star Micronics".into(),
            mac_address: "00:11:62:AA:BB:CC".into(),
            model_name: String::new(),
        }
    }

    fn lan_info() -> PortInfo {
        PortInfo {
            port_name: "TCP:192.168.1.20".into(),
            mac_address: "00:11:62:DD:EE:FF".into(),
            model_name: "TSP654II".into(),
        }
    }

    fn usb_info() -> PortInfo {
        PortInfo {
            port_name: "USB:0001".into(),
            mac_address: String::new(),
            model_name: "mPOP".into(),
        }
    }

    #[test]
    fn test_bluetooth_identifier_is_mac_based() {
        let descriptor = normalize(TransportClass::Bluetooth, bt_info());
        assert_eq!(descriptor.port_name, "BT:00:11:62:AA:BB:CC");
        assert_eq!(descriptor.mac_address.as_deref(), Some("00:11:62:AA:BB:CC"));
        // The ephemeral radio name survives only as the model.
        assert_eq!(descriptor.model_name.as_deref(), Some("BT:Star Micronics"));
    }

    #[test]
    fn test_lan_keeps_port_name() {
        let descriptor = normalize(TransportClass::Lan, lan_info());
        assert_eq!(descriptor.port_name, "TCP:192.168.1.20");
        assert_eq!(descriptor.model_name.as_deref(), Some("TSP654II"));
        assert_eq!(descriptor.usb_serial_number, None);
    }

    #[test]
    fn test_usb_serial_extraction() {
        let descriptor = normalize(TransportClass::Usb, usb_info());
        assert_eq!(descriptor.port_name, "USB:0001");
        assert_eq!(descriptor.mac_address, None);
        assert_eq!(descriptor.model_name.as_deref(), Some("mPOP"));
        assert_eq!(descriptor.usb_serial_number.as_deref(), Some("0001"));
    }

    #[test]
    fn test_discover_all_searches_each_class_once_in_order() {
        let driver = MockDriver::new()
            .with_ports(TransportClass::Lan, vec![lan_info()])
            .with_ports(TransportClass::Bluetooth, vec![bt_info()])
            .with_ports(TransportClass::Usb, vec![usb_info()]);

        let descriptors = discover(&driver, "All").unwrap();
        assert_eq!(
            driver.searches(),
            vec![
                TransportClass::Lan,
                TransportClass::Bluetooth,
                TransportClass::Usb
            ]
        );
        // Concatenation preserves per-class order.
        assert_eq!(descriptors[0].port_name, "TCP:192.168.1.20");
        assert_eq!(descriptors[1].port_name, "BT:00:11:62:AA:BB:CC");
        assert_eq!(descriptors[2].port_name, "USB:0001");
    }

    #[test]
    fn test_discover_single_class() {
        let driver = MockDriver::new().with_ports(TransportClass::Usb, vec![usb_info()]);
        let descriptors = discover(&driver, "USB").unwrap();
        assert_eq!(driver.searches(), vec![TransportClass::Usb]);
        assert_eq!(descriptors.len(), 1);
    }

    #[test]
    fn test_discover_unknown_selector_is_empty() {
        let driver = MockDriver::new();
        assert!(discover(&driver, "Serial").unwrap().is_empty());
        assert!(driver.searches().is_empty());
    }

    #[test]
    fn test_session_swap_releases_old() {
        let driver = MockDriver::new();
        let slot = SessionSlot::new();

        slot.connect(&driver, "TCP:192.168.1.20", "escpos", false)
            .unwrap();
        assert!(slot.is_connected());
        assert_eq!(driver.release_count(), 0);

        // Second connect tears down the first session.
        slot.connect(&driver, "BT:00:11:62:AA:BB:CC", "Portable;l", true)
            .unwrap();
        assert_eq!(driver.release_count(), 1);
        assert_eq!(slot.port_name().as_deref(), Some("BT:00:11:62:AA:BB:CC"));

        assert!(slot.disconnect().unwrap());
        assert_eq!(driver.release_count(), 2);
        assert!(!slot.is_connected());
        // Disconnecting again is a quiet no-op.
        assert!(!slot.disconnect().unwrap());
    }

    #[test]
    fn test_already_connected_counts_as_success() {
        let driver = MockDriver::new().already_connected();
        let slot = SessionSlot::new();
        assert!(slot.connect(&driver, "TCP:192.168.1.20", "escpos", false).is_ok());
        // The device-side session exists, but we hold no handle to tear
        // down later.
        assert!(!slot.is_connected());
    }

    #[test]
    fn test_connect_failure_leaves_slot_empty() {
        let driver = MockDriver::new().fail_open("port busy");
        let slot = SessionSlot::new();
        assert!(slot.connect(&driver, "USB:0001", "StarLine", false).is_err());
        assert!(!slot.is_connected());
    }

    #[test]
    fn test_serialized_descriptor_keys() {
        let descriptor = normalize(TransportClass::Usb, usb_info());
        let value = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(value["portName"], "USB:0001");
        assert_eq!(value["USBSerialNumber"], "0001");
        assert!(value.get("macAddress").is_none());
    }
}
