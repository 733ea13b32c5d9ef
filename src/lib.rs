//! # Lucero - Receipt Printer Driver Library
//!
//! Lucero drives Star Micronics receipt printers (and ESC/POS
//! compatibles) over network, Bluetooth and USB ports. It provides:
//!
//! - **Command compiler**: declarative print commands → exact binary
//!   command streams, per emulation dialect
//! - **Protocol implementation**: Star line mode and ESC/POS command
//!   builders
//! - **Connection management**: port discovery, persistent sessions
//! - **Checked transactions**: status-validated writes with guaranteed
//!   port release
//!
//! ## Quick Start
//!
//! ```no_run
//! use lucero::{raster::FsImageSource, service::PrinterService};
//! use serde_json::json;
//!
//! # #[cfg(all(unix, feature = "rfcomm"))]
//! # fn main() -> Result<(), lucero::error::ClassifiedError> {
//! let service = PrinterService::new(
//!     lucero::transport::rfcomm::RfcommDriver,
//!     Box::new(FsImageSource),
//! );
//!
//! // Find printers, then print a small receipt.
//! let ports = service.port_discovery(&json!({"type": "Bluetooth"}).as_object().cloned().unwrap())?;
//! println!("{ports}");
//!
//! let result = service.print(
//!     &json!({
//!         "portName": "BT:00:11:62:AA:BB:CC",
//!         "emulation": "StarPRNT",
//!         "printCommands": [
//!             {"appendAlignment": "Center", "data": "LUCERO CAFE\n"},
//!             {"append": "1x espresso          2.50\n"},
//!             {"appendBarcode": "12345678", "BarcodeSymbology": "Code128"},
//!             {"appendCutPaper": "PartialCutWithFeed"}
//!         ]
//!     })
//!     .as_object()
//!     .cloned()
//!     .unwrap(),
//! )?;
//! println!("{result}");
//! # Ok(())
//! # }
//! # #[cfg(not(all(unix, feature = "rfcomm")))]
//! # fn main() {}
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`command`] | Print command model, resolvers, compiler |
//! | [`protocol`] | Star line mode / ESC/POS command builders |
//! | [`emulation`] | Dialect selection (opcodes + port settings) |
//! | [`raster`] | Image acquisition, dithering, bit packing |
//! | [`transport`] | Port drivers (mock, RFCOMM) |
//! | [`manager`] | Discovery normalization, session slot |
//! | [`transaction`] | Checked-block executor |
//! | [`service`] | The four-operation call surface |
//! | [`status`] | Status flags and result payloads |
//! | [`error`] | Error types |
//!
//! ## Supported Emulations
//!
//! StarPRNT, StarPRNTL, StarLine, StarGraphic, StarDotImpact (Star line
//! mode opcodes); EscPos, EscPosMobile (ESC/POS opcodes).

pub mod command;
pub mod emulation;
pub mod error;
pub mod manager;
pub mod protocol;
pub mod raster;
pub mod service;
pub mod status;
pub mod transaction;
pub mod transport;

// Re-exports for convenience
pub use emulation::Emulation;
pub use error::{ClassifiedError, LuceroError};
pub use service::PrinterService;
pub use status::PrinterStatus;
