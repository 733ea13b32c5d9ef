//! # Printer Service
//!
//! The call surface: four operations taking flat argument maps and
//! returning flat result payloads or classified errors. This is where
//! the subsystems meet:
//!
//! | Operation | Path |
//! |-----------|------|
//! | `port_discovery` | driver search → [`crate::manager::discover`] |
//! | `check_status` | acquire → settle → status (+ firmware) → release |
//! | `connect` / `disconnect` | [`crate::manager::SessionSlot`] swap-and-teardown |
//! | `print` | boundary parse → compile → checked-block write |
//!
//! The outer RPC shim (threading, marshalling, delivering the result back
//! to the caller's context) lives outside this crate; these methods are
//! synchronous and expect to be called from a worker. Argument errors
//! fail before any hardware is touched.

use serde_json::{Map, Value};

use crate::command;
use crate::emulation::Emulation;
use crate::error::{ClassifiedError, ErrorCode, LuceroError};
use crate::manager::{self, SessionSlot};
use crate::raster::ImageSource;
use crate::status::PrintResponse;
use crate::transaction;
use crate::transport::PortDriver;

/// Flat argument map, as delivered by the RPC layer.
pub type Args = Map<String, Value>;

/// The lucero service facade.
pub struct PrinterService<D: PortDriver> {
    driver: D,
    images: Box<dyn ImageSource + Send + Sync>,
    session: SessionSlot,
}

impl<D: PortDriver> PrinterService<D> {
    pub fn new(driver: D, images: Box<dyn ImageSource + Send + Sync>) -> Self {
        Self {
            driver,
            images,
            session: SessionSlot::new(),
        }
    }

    /// Discover printer ports.
    ///
    /// `type` is one of `"LAN"`, `"Bluetooth"`, `"USB"`, `"All"`
    /// (default `"All"`).
    pub fn port_discovery(&self, args: &Args) -> Result<Value, ClassifiedError> {
        let selector = args
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("All")
            .to_string();

        let descriptors = manager::discover(&self.driver, &selector)
            .map_err(|e| ClassifiedError::new(ErrorCode::PortDiscovery, e))?;
        serde_json::to_value(descriptors)
            .map_err(|e| ClassifiedError::new(ErrorCode::PortDiscovery, e))
    }

    /// Query a fresh status snapshot (plus best-effort firmware info)
    /// from a port.
    pub fn check_status(&self, args: &Args) -> Result<Value, ClassifiedError> {
        let code = ErrorCode::CheckStatus;
        let port_name = require_str(args, "portName").map_err(|e| ClassifiedError::new(code, e))?;
        let emulation = require_str(args, "emulation").map_err(|e| ClassifiedError::new(code, e))?;
        let settings = Emulation::resolve(&emulation).port_settings();

        let response = transaction::query_status(&self.driver, &port_name, settings)
            .map_err(|e| ClassifiedError::new(code, e))?;
        serde_json::to_value(response).map_err(|e| ClassifiedError::new(code, e))
    }

    /// Establish the persistent session, replacing any existing one.
    pub fn connect(&self, args: &Args) -> Result<Value, ClassifiedError> {
        let code = ErrorCode::Connect;
        let port_name = require_str(args, "portName").map_err(|e| ClassifiedError::new(code, e))?;
        let emulation = require_str(args, "emulation").map_err(|e| ClassifiedError::new(code, e))?;
        let has_barcode_reader = args
            .get("hasBarcodeReader")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let settings = Emulation::resolve(&emulation).port_settings();

        self.session
            .connect(&self.driver, &port_name, settings, has_barcode_reader)
            .map_err(|e| ClassifiedError::new(code, e))?;
        Ok(Value::String("Printer Connected".to_string()))
    }

    /// Tear down the persistent session, if any.
    pub fn disconnect(&self) -> Result<Value, ClassifiedError> {
        self.session
            .disconnect()
            .map_err(|e| ClassifiedError::new(ErrorCode::Connect, e))?;
        Ok(Value::String("Printer Disconnected".to_string()))
    }

    /// Compile and print a descriptor list.
    ///
    /// An empty `printCommands` list short-circuits to success with
    /// `info_message: "No data to print"` — the transport is never
    /// touched.
    pub fn print(&self, args: &Args) -> Result<Value, ClassifiedError> {
        let code = ErrorCode::Print;
        let port_name = require_str(args, "portName").map_err(|e| ClassifiedError::new(code, e))?;
        let emulation = require_str(args, "emulation").map_err(|e| ClassifiedError::new(code, e))?;
        let descriptors = args
            .get("printCommands")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                ClassifiedError::new(code, LuceroError::MissingArgument("printCommands"))
            })?;

        if descriptors.is_empty() {
            return serde_json::to_value(PrintResponse::nothing_to_print())
                .map_err(|e| ClassifiedError::new(code, e));
        }

        let dialect = Emulation::resolve(&emulation);
        let commands = command::parse_commands(descriptors);
        let data = command::compile(dialect, &commands, self.images.as_ref());

        let response =
            transaction::send_checked(&self.driver, &port_name, dialect.port_settings(), &data)
                .map_err(|e| ClassifiedError::new(code, e))?;
        serde_json::to_value(response).map_err(|e| ClassifiedError::new(code, e))
    }
}

/// Extract a required string argument, tolerating numeric values the way
/// the wire format does.
fn require_str(args: &Args, key: &'static str) -> Result<String, LuceroError> {
    match args.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(other) => Err(LuceroError::InvalidArgument(key, other.to_string())),
        None => Err(LuceroError::MissingArgument(key)),
    }
}

// ============================================================================
// TESTS
// ============================================================================
