//! # Transaction Executor
//!
//! The checked-block write path and the status-query path. Both follow
//! the same skeleton — acquire, settle, talk, release — with the write
//! path adding a device-side guarded transaction around the data:
//!
//! ```text
//! Idle ──► PortAcquired ──► TransactionOpen ──► Validated-Pre ──► Writing
//!                                                     │               │
//!                                (fault: abort)  ◄────┘               ▼
//!                                                            Validated-Post
//!                                                                    │
//!                     Closed (release, always, exactly once) ◄───────┘
//! ```
//!
//! Pre-write validation reads status inside the freshly opened checked
//! block and aborts before a single byte is written if the device cannot
//! safely print. The post-write read happens under an extended timeout so
//! slow mechanics (cutting, feeding) do not register as failures. Release
//! runs on every exit path; a release failure is logged and never
//! overwrites an already-determined outcome. No mid-transaction
//! cancellation exists — a transaction runs to completion or first
//! failure.

use std::thread;
use std::time::Duration;

use crate::error::LuceroError;
use crate::status::{PrintResponse, StatusResponse};
use crate::transport::{Port, PortDriver};

/// Port acquisition timeout.
pub const ACQUIRE_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Settle delay between acquisition and the first checked-block status
/// read, letting transport negotiation finish.
pub const WRITE_SETTLE: Duration = Duration::from_millis(100);

/// Settle delay for the status-only path, which queries immediately
/// after acquisition and needs the longer margin.
pub const STATUS_SETTLE: Duration = Duration::from_millis(500);

/// Extended checked-block close timeout covering cut/feed mechanics.
pub const POST_WRITE_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Write `data` to `port_name` inside a checked block.
///
/// Acquisition failure is fatal to the call. A pre-write device fault
/// produces a *successful return* carrying a failure payload — the
/// transport worked, the printer just cannot print — so callers can tell
/// "call failed" from "device is in a bad physical state".
pub fn send_checked(
    driver: &dyn PortDriver,
    port_name: &str,
    settings: &str,
    data: &[u8],
) -> Result<PrintResponse, LuceroError> {
    let mut port = driver.open(port_name, settings, ACQUIRE_TIMEOUT)?;
    let outcome = run_checked_block(port.as_mut(), data);
    release(port.as_mut());
    outcome
}

/// The body of the checked-block state machine, with the port already
/// acquired. Never releases; the caller owns that.
fn run_checked_block(port: &mut dyn Port, data: &[u8]) -> Result<PrintResponse, LuceroError> {
    thread::sleep(WRITE_SETTLE);

    let status = port.begin_checked_block()?;
    if let Some(fault) = status.first_fault() {
        // Do not write; report the offending condition.
        return Ok(PrintResponse::failure(&status, fault.message()));
    }

    port.write_all(data)?;
    port.set_end_checked_block_timeout(POST_WRITE_TIMEOUT);
    let status = port.end_checked_block()?;

    Ok(PrintResponse::success(&status))
}

/// Query status and firmware identification from `port_name`.
///
/// Same acquire → settle → read → release pattern, without a checked
/// block. The firmware read is best-effort: its failure rides along in
/// the payload instead of failing the call.
pub fn query_status(
    driver: &dyn PortDriver,
    port_name: &str,
    settings: &str,
) -> Result<StatusResponse, LuceroError> {
    let mut port = driver.open(port_name, settings, ACQUIRE_TIMEOUT)?;
    let outcome = read_status(port.as_mut());
    release(port.as_mut());
    outcome
}

fn read_status(port: &mut dyn Port) -> Result<StatusResponse, LuceroError> {
    thread::sleep(STATUS_SETTLE);
    let status = port.retrieve_status()?;
    let firmware = port.firmware_information().map_err(|e| e.to_string());
    Ok(StatusResponse::new(&status, firmware))
}

/// Release a port, reporting but never propagating failure: by the time
/// release runs the print outcome is already determined and must not be
/// masked.
fn release(port: &mut dyn Port) {
    if let Err(e) = port.release() {
        log::warn!("port release failed: {e}");
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::{FirmwareInfo, PrinterStatus};
    use crate::transport::MockDriver;

    #[test]
    fn test_successful_write_sequence() {
        let driver = MockDriver::new();
        let response = send_checked(&driver, "TCP:10.0.0.5", "escpos", &[1, 2, 3]).unwrap();

        assert!(response.is_success);
        assert!(response.error_message.is_none());
        assert_eq!(driver.written(), vec![1, 2, 3]);
        // One begin, one end, the extended timeout applied in between.
        assert_eq!(driver.checked_blocks(), (1, 1));
        assert_eq!(driver.end_timeouts(), vec![POST_WRITE_TIMEOUT]);
        // Exactly one acquisition, exactly one release.
        assert_eq!(driver.open_count(), 1);
        assert_eq!(driver.release_count(), 1);
    }

    #[test]
    fn test_pre_write_fault_blocks_write() {
        let driver = MockDriver::new().with_status(PrinterStatus {
            receipt_paper_empty: true,
            ..PrinterStatus::READY
        });
        let response = send_checked(&driver, "TCP:10.0.0.5", "escpos", &[1, 2, 3]).unwrap();

        assert!(!response.is_success);
        assert_eq!(response.error_message.as_deref(), Some("Paper empty"));
        assert!(response.receipt_paper_empty);
        // The write step never happened, but release still did.
        assert!(driver.written().is_empty());
        assert_eq!(driver.checked_blocks(), (1, 0));
        assert_eq!(driver.release_count(), 1);
    }

    #[test]
    fn test_fault_priority_in_response() {
        let driver = MockDriver::new().with_status(PrinterStatus {
            offline: true,
            cover_open: true,
            receipt_paper_empty: true,
            ..PrinterStatus::READY
        });
        let response = send_checked(&driver, "TCP:10.0.0.5", "escpos", &[0]).unwrap();
        assert_eq!(response.error_message.as_deref(), Some("Printer is offline"));
    }

    #[test]
    fn test_acquisition_failure_is_fatal_and_leak_free() {
        let driver = MockDriver::new().fail_open("port busy");
        let result = send_checked(&driver, "TCP:10.0.0.5", "escpos", &[0]);
        assert!(result.is_err());
        // Nothing was acquired, so nothing to release.
        assert_eq!(driver.open_count(), 0);
        assert_eq!(driver.release_count(), 0);
    }

    #[test]
    fn test_write_failure_still_releases_once() {
        let driver = MockDriver::new().fail_write("link dropped");
        let result = send_checked(&driver, "TCP:10.0.0.5", "escpos", &[0]);
        assert!(result.is_err());
        assert_eq!(driver.open_count(), 1);
        assert_eq!(driver.release_count(), 1);
    }

    #[test]
    fn test_release_failure_does_not_mask_success() {
        let driver = MockDriver::new().fail_release("hangup");
        let response = send_checked(&driver, "TCP:10.0.0.5", "escpos", &[9]).unwrap();
        assert!(response.is_success);
        assert_eq!(driver.written(), vec![9]);
    }

    #[test]
    fn test_status_query_reads_firmware() {
        let driver = MockDriver::new().with_firmware(Some(FirmwareInfo {
            model_name: "TSP654II".into(),
            firmware_version: "2.4".into(),
        }));
        let response = query_status(&driver, "BT:00:11:62:AA:BB:CC", "StarLine").unwrap();
        assert!(response.is_success);
        assert_eq!(response.model_name.as_deref(), Some("TSP654II"));
        assert_eq!(response.firmware_version.as_deref(), Some("2.4"));
        // No checked block on the status path.
        assert_eq!(driver.checked_blocks(), (0, 0));
        assert_eq!(driver.release_count(), 1);
    }

    #[test]
    fn test_status_query_firmware_failure_rides_along() {
        let driver = MockDriver::new().with_firmware(None);
        let response = query_status(&driver, "USB:0001", "StarLine").unwrap();
        assert!(response.is_success);
        assert!(response.model_name.is_none());
        assert!(
            response
                .error_message
                .as_deref()
                .is_some_and(|m| m.contains("firmware"))
        );
    }
}
