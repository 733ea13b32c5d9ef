//! # Printer Status Model
//!
//! Snapshot of device condition flags plus the classification rules that
//! turn a snapshot into a go/no-go decision and a caller-facing payload.
//!
//! ## Flag Semantics
//!
//! | Flag | Meaning |
//! |------|---------|
//! | `offline` | Printer is not accepting data |
//! | `cover_open` | Print head cover is open |
//! | `over_temp` | Thermal head over-temperature |
//! | `cutter_error` | Auto-cutter fault |
//! | `receipt_paper_empty` | Paper-out sensor triggered |
//! | `paper_jam` | Presenter paper jam |
//!
//! A snapshot is read fresh from the device on every query; nothing here is
//! cached. Classification uses a fixed precedence so that when several
//! flags are raised at once the most fundamental fault wins:
//! offline > cover open > paper empty > paper jam.

use serde::Serialize;

/// A point-in-time snapshot of printer condition flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrinterStatus {
    pub offline: bool,
    pub cover_open: bool,
    pub over_temp: bool,
    pub cutter_error: bool,
    pub receipt_paper_empty: bool,
    pub paper_jam: bool,
}

impl PrinterStatus {
    /// A status with every flag clear (printer ready).
    pub const READY: Self = Self {
        offline: false,
        cover_open: false,
        over_temp: false,
        cutter_error: false,
        receipt_paper_empty: false,
        paper_jam: false,
    };

    /// The highest-precedence fault that blocks printing, if any.
    ///
    /// Only the four conditions that make a write unsafe participate;
    /// `over_temp` and `cutter_error` are reported to callers but do not
    /// veto a transaction on their own.
    pub fn first_fault(&self) -> Option<StatusFault> {
        if self.offline {
            Some(StatusFault::Offline)
        } else if self.cover_open {
            Some(StatusFault::CoverOpen)
        } else if self.receipt_paper_empty {
            Some(StatusFault::PaperEmpty)
        } else if self.paper_jam {
            Some(StatusFault::PaperJam)
        } else {
            None
        }
    }

    /// Whether a write transaction may proceed.
    #[inline]
    pub fn ready_to_print(&self) -> bool {
        self.first_fault().is_none()
    }
}

/// A blocking device fault, ordered by classification precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFault {
    Offline,
    CoverOpen,
    PaperEmpty,
    PaperJam,
}

impl StatusFault {
    /// Human-readable message reported to callers.
    pub fn message(&self) -> &'static str {
        match self {
            StatusFault::Offline => "Printer is offline",
            StatusFault::CoverOpen => "Printer cover is open",
            StatusFault::PaperEmpty => "Paper empty",
            StatusFault::PaperJam => "Paper jam",
        }
    }
}

// ============================================================================
// FIRMWARE INFORMATION
// ============================================================================

/// Model/firmware identification read from the device, best-effort.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FirmwareInfo {
    pub model_name: String,
    pub firmware_version: String,
}

// ============================================================================
// CALLER-FACING PAYLOADS
// ============================================================================

/// Terminal outcome of a print call.
///
/// Produced once per call and never mutated after return. Field names
/// match the wire format of the call surface.
#[derive(Debug, Clone, Serialize)]
pub struct PrintResponse {
    pub offline: bool,
    #[serde(rename = "coverOpen")]
    pub cover_open: bool,
    #[serde(rename = "cutterError")]
    pub cutter_error: bool,
    #[serde(rename = "receiptPaperEmpty")]
    pub receipt_paper_empty: bool,
    pub is_success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info_message: Option<String>,
}

impl PrintResponse {
    /// Successful outcome carrying the post-write status flags.
    pub fn success(status: &PrinterStatus) -> Self {
        Self::from_status(status, true, None)
    }

    /// Failed outcome carrying the offending condition message.
    pub fn failure(status: &PrinterStatus, message: &str) -> Self {
        Self::from_status(status, false, Some(message.to_string()))
    }

    /// The short-circuit result for an empty command list. No transport
    /// interaction has occurred; all flags are reported clear.
    pub fn nothing_to_print() -> Self {
        Self {
            info_message: Some("No data to print".to_string()),
            ..Self::from_status(&PrinterStatus::READY, true, None)
        }
    }

    fn from_status(status: &PrinterStatus, is_success: bool, error_message: Option<String>) -> Self {
        Self {
            offline: status.offline,
            cover_open: status.cover_open,
            cutter_error: status.cutter_error,
            receipt_paper_empty: status.receipt_paper_empty,
            is_success,
            error_message,
            info_message: None,
        }
    }
}

/// Terminal outcome of a status query.
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub is_success: bool,
    pub offline: bool,
    #[serde(rename = "coverOpen")]
    pub cover_open: bool,
    #[serde(rename = "overTemp")]
    pub over_temp: bool,
    #[serde(rename = "cutterError")]
    pub cutter_error: bool,
    #[serde(rename = "receiptPaperEmpty")]
    pub receipt_paper_empty: bool,
    #[serde(rename = "ModelName", skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(rename = "FirmwareVersion", skip_serializing_if = "Option::is_none")]
    pub firmware_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl StatusResponse {
    /// Build a response from a fresh snapshot plus the optional firmware
    /// query result. A firmware read failure does not fail the call; its
    /// message rides along in `error_message`.
    pub fn new(status: &PrinterStatus, firmware: Result<FirmwareInfo, String>) -> Self {
        let (model_name, firmware_version, error_message) = match firmware {
            Ok(info) => (Some(info.model_name), Some(info.firmware_version), None),
            Err(message) => (None, None, Some(message)),
        };
        Self {
            is_success: true,
            offline: status.offline,
            cover_open: status.cover_open,
            over_temp: status.over_temp,
            cutter_error: status.cutter_error,
            receipt_paper_empty: status.receipt_paper_empty,
            model_name,
            firmware_version,
            error_message,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_status_has_no_fault() {
        assert_eq!(PrinterStatus::READY.first_fault(), None);
        assert!(PrinterStatus::READY.ready_to_print());
    }

    #[test]
    fn test_fault_precedence() {
        // All four blocking flags raised: offline wins.
        let status = PrinterStatus {
            offline: true,
            cover_open: true,
            receipt_paper_empty: true,
            paper_jam: true,
            ..PrinterStatus::READY
        };
        assert_eq!(status.first_fault(), Some(StatusFault::Offline));

        // Cover open beats paper conditions.
        let status = PrinterStatus {
            cover_open: true,
            receipt_paper_empty: true,
            paper_jam: true,
            ..PrinterStatus::READY
        };
        assert_eq!(status.first_fault(), Some(StatusFault::CoverOpen));

        // Paper empty beats jam.
        let status = PrinterStatus {
            receipt_paper_empty: true,
            paper_jam: true,
            ..PrinterStatus::READY
        };
        assert_eq!(status.first_fault(), Some(StatusFault::PaperEmpty));

        let status = PrinterStatus {
            paper_jam: true,
            ..PrinterStatus::READY
        };
        assert_eq!(status.first_fault(), Some(StatusFault::PaperJam));
    }

    #[test]
    fn test_non_blocking_flags() {
        // Over-temperature and cutter errors are reported but do not veto.
        let status = PrinterStatus {
            over_temp: true,
            cutter_error: true,
            ..PrinterStatus::READY
        };
        assert!(status.ready_to_print());
    }

    #[test]
    fn test_fault_messages() {
        assert_eq!(StatusFault::Offline.message(), "Printer is offline");
        assert_eq!(StatusFault::CoverOpen.message(), "Printer cover is open");
        assert_eq!(StatusFault::PaperEmpty.message(), "Paper empty");
        assert_eq!(StatusFault::PaperJam.message(), "Paper jam");
    }

    #[test]
    fn test_nothing_to_print_payload() {
        let response = PrintResponse::nothing_to_print();
        assert!(response.is_success);
        assert_eq!(response.info_message.as_deref(), Some("No data to print"));

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["is_success"], true);
        assert_eq!(value["info_message"], "No data to print");
        assert_eq!(value["receiptPaperEmpty"], false);
        // Absent optional fields must not serialize at all.
        assert!(value.get("error_message").is_none());
    }

    #[test]
    fn test_status_response_firmware_failure_rides_along() {
        let response = StatusResponse::new(
            &PrinterStatus::READY,
            Err("Firmware query unsupported".to_string()),
        );
        assert!(response.is_success);
        assert_eq!(
            response.error_message.as_deref(),
            Some("Firmware query unsupported")
        );
        assert!(response.model_name.is_none());
    }

    #[test]
    fn test_print_response_wire_keys() {
        let status = PrinterStatus {
            receipt_paper_empty: true,
            ..PrinterStatus::READY
        };
        let value =
            serde_json::to_value(PrintResponse::failure(&status, "Paper empty")).unwrap();
        assert_eq!(value["receiptPaperEmpty"], true);
        assert_eq!(value["coverOpen"], false);
        assert_eq!(value["is_success"], false);
        assert_eq!(value["error_message"], "Paper empty");
    }
}
