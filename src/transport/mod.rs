//! # Printer Transport Layer
//!
//! The seam between lucero and the physical world. A [`PortDriver`]
//! enumerates ports and opens them; a [`Port`] is the exclusive,
//! non-shareable handle to one live connection.
//!
//! ## Available Drivers
//!
//! - [`mock`]: in-memory driver with scripted statuses and write capture,
//!   for tests and dry runs
//! - [`rfcomm`]: Bluetooth RFCOMM serial for Star printers (Linux, behind
//!   the `rfcomm` feature)
//!
//! TCP and USB drivers plug in through the same traits.
//!
//! ## Handle Discipline
//!
//! A [`Port`] is used for at most one status query or one write
//! transaction and must be released exactly once, on every exit path.
//! Leaking a handle blocks all subsequent access to that port; releasing
//! twice is a driver-contract violation. The transaction executor owns
//! this discipline — drivers only have to make `release` idempotent
//! *detection* cheap (returning an error on a double release is fine).

use std::time::Duration;

use crate::error::LuceroError;
use crate::status::{FirmwareInfo, PrinterStatus};

pub mod mock;
#[cfg(all(unix, feature = "rfcomm"))]
pub mod rfcomm;

pub use mock::MockDriver;

// ============================================================================
// TRANSPORT CLASSES
// ============================================================================

/// The three physical transport classes lucero discovers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportClass {
    /// Network-attached printers
    Lan,
    /// Short-range radio (Bluetooth SPP)
    Bluetooth,
    /// USB-attached printers
    Usb,
}

impl TransportClass {
    /// The port-name prefix for this class (`TCP:`, `BT:`, `USB:`).
    pub fn prefix(&self) -> &'static str {
        match self {
            TransportClass::Lan => "TCP:",
            TransportClass::Bluetooth => "BT:",
            TransportClass::Usb => "USB:",
        }
    }
}

// ============================================================================
// PORT INFORMATION
// ============================================================================

/// Raw enumeration record produced by a driver's search.
///
/// Fields the transport cannot determine stay empty; normalization into
/// the caller-facing descriptor happens in [`crate::manager`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortInfo {
    /// Driver-native port name (e.g. `TCP:192.168.1.20`, `BT:Star Micronics`,
    /// `USB:0001`)
    pub port_name: String,
    /// Hardware address, when the transport exposes one
    pub mac_address: String,
    /// Device model name, when known
    pub model_name: String,
}

// ============================================================================
// CAPABILITY TRAITS
// ============================================================================

/// An exclusive handle to one live printer connection.
pub trait Port: Send {
    /// Transmit the full buffer.
    fn write_all(&mut self, data: &[u8]) -> Result<(), LuceroError>;

    /// Open a device-side guarded transaction and return the current
    /// status snapshot.
    fn begin_checked_block(&mut self) -> Result<PrinterStatus, LuceroError>;

    /// Close the guarded transaction and return the final status
    /// snapshot.
    fn end_checked_block(&mut self) -> Result<PrinterStatus, LuceroError>;

    /// Extend the wait applied when closing the checked block, to cover
    /// slow mechanical operations (cutting, feeding).
    fn set_end_checked_block_timeout(&mut self, timeout: Duration);

    /// Read a fresh status snapshot outside any transaction.
    fn retrieve_status(&mut self) -> Result<PrinterStatus, LuceroError>;

    /// Read model/firmware identification.
    fn firmware_information(&mut self) -> Result<FirmwareInfo, LuceroError>;

    /// Release the underlying transport resource. Must be called exactly
    /// once; the handle is unusable afterwards.
    fn release(&mut self) -> Result<(), LuceroError>;
}

/// A transport backend: port enumeration plus port opening.
pub trait PortDriver: Send + Sync {
    /// Enumerate ports of one transport class.
    fn search(&self, class: TransportClass) -> Result<Vec<PortInfo>, LuceroError>;

    /// Open an exclusive handle to `port_name` with the given
    /// configuration string and acquisition timeout.
    fn open(
        &self,
        port_name: &str,
        settings: &str,
        timeout: Duration,
    ) -> Result<Box<dyn Port>, LuceroError>;
}
