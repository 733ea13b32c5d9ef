//! # Lucero CLI
//!
//! Command-line interface for driving receipt printers.
//!
//! ## Usage
//!
//! ```bash
//! # Find printers
//! lucero discover --type Bluetooth
//!
//! # Query device status
//! lucero status BT:00:11:62:AA:BB:CC --emulation StarPRNT
//!
//! # Print a job described as JSON print commands
//! lucero print BT:00:11:62:AA:BB:CC --emulation StarPRNT job.json
//!
//! # Compile a job without touching hardware
//! lucero print ANY --dry-run job.json
//! ```
//!
//! A job file is a JSON array of print command descriptors:
//!
//! ```json
//! [
//!   {"appendAlignment": "Center", "data": "LUCERO CAFE\n"},
//!   {"append": "1x espresso          2.50\n"},
//!   {"appendBarcode": "12345678", "BarcodeSymbology": "Code128"},
//!   {"appendCutPaper": "PartialCutWithFeed"}
//! ]
//! ```

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::{Map, Value, json};

use lucero::error::ClassifiedError;
use lucero::raster::FsImageSource;
use lucero::service::PrinterService;
use lucero::transport::MockDriver;

/// Lucero - receipt printer utility
#[derive(Parser, Debug)]
#[command(name = "lucero")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Discover printer ports
    Discover {
        /// Transport class: LAN, Bluetooth, USB or All
        #[arg(long = "type", default_value = "All")]
        class: String,
    },

    /// Query printer status
    Status {
        /// Target port name (e.g. BT:00:11:62:AA:BB:CC)
        port: String,

        /// Emulation dialect
        #[arg(long, default_value = "StarLine")]
        emulation: String,
    },

    /// Establish the persistent session
    Connect {
        /// Target port name
        port: String,

        /// Emulation dialect
        #[arg(long, default_value = "StarLine")]
        emulation: String,

        /// Negotiate barcode reader support
        #[arg(long)]
        barcode_reader: bool,
    },

    /// Compile and print a job file
    Print {
        /// Target port name
        port: String,

        /// JSON file containing the print command list
        commands: PathBuf,

        /// Emulation dialect
        #[arg(long, default_value = "StarLine")]
        emulation: String,

        /// Compile and report byte counts without touching hardware
        #[arg(long)]
        dry_run: bool,
    },
}

fn main() -> ExitCode {
    env_logger::init();

    match run(Cli::parse()) {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value).unwrap_or_default());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<Value, ClassifiedError> {
    match cli.command {
        Commands::Discover { class } => {
            hardware_service()?.port_discovery(&args(json!({"type": class})))
        }
        Commands::Status { port, emulation } => hardware_service()?.check_status(&args(json!({
            "portName": port,
            "emulation": emulation,
        }))),
        Commands::Connect {
            port,
            emulation,
            barcode_reader,
        } => hardware_service()?.connect(&args(json!({
            "portName": port,
            "emulation": emulation,
            "hasBarcodeReader": barcode_reader,
        }))),
        Commands::Print {
            port,
            commands,
            emulation,
            dry_run,
        } => {
            let text = fs::read_to_string(&commands).map_err(|e| {
                print_error(format!("cannot read {}: {e}", commands.display()))
            })?;
            let list: Value = serde_json::from_str(&text).map_err(|e| {
                print_error(format!("invalid JSON in {}: {e}", commands.display()))
            })?;
            let call = args(json!({
                "portName": port,
                "emulation": emulation,
                "printCommands": list,
            }));

            if dry_run {
                let driver = MockDriver::new();
                let service = PrinterService::new(driver.clone(), Box::new(FsImageSource));
                let mut result = service.print(&call)?;
                if let Value::Object(map) = &mut result {
                    map.insert("compiledBytes".into(), json!(driver.written().len()));
                }
                Ok(result)
            } else {
                hardware_service()?.print(&call)
            }
        }
    }
}

#[cfg(all(unix, feature = "rfcomm"))]
fn hardware_service()
-> Result<PrinterService<lucero::transport::rfcomm::RfcommDriver>, ClassifiedError> {
    Ok(PrinterService::new(
        lucero::transport::rfcomm::RfcommDriver,
        Box::new(FsImageSource),
    ))
}

#[cfg(not(all(unix, feature = "rfcomm")))]
fn hardware_service() -> Result<PrinterService<MockDriver>, ClassifiedError> {
    Err(print_error(
        "no hardware transport built in; rebuild with the `rfcomm` feature (unix only) or use --dry-run".to_string(),
    ))
}

fn print_error(message: String) -> ClassifiedError {
    ClassifiedError {
        code: lucero::error::ErrorCode::Print,
        message,
    }
}

fn args(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}
