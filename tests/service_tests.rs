//! # Service Integration Tests
//!
//! End-to-end tests of the four-operation call surface against the mock
//! transport: argument handling, compilation plumbing, checked-block
//! sequencing, and the acquire/release discipline.

use lucero::command;
use lucero::emulation::Emulation;
use lucero::raster::FsImageSource;
use lucero::service::PrinterService;
use lucero::status::PrinterStatus;
use lucero::transport::{MockDriver, PortInfo, TransportClass};

use pretty_assertions::assert_eq;
use serde_json::{Map, Value, json};

fn service(driver: MockDriver) -> PrinterService<MockDriver> {
    PrinterService::new(driver, Box::new(FsImageSource))
}

fn args(value: Value) -> Map<String, Value> {
    value.as_object().cloned().expect("args must be an object")
}

fn print_args(commands: Value) -> Map<String, Value> {
    args(json!({
        "portName": "BT:00:11:62:AA:BB:CC",
        "emulation": "StarPRNT",
        "printCommands": commands,
    }))
}

// ============================================================================
// PRINT
// ============================================================================

#[test]
fn empty_print_short_circuits_without_transport() {
    let driver = MockDriver::new();
    let svc = service(driver.clone());

    let result = svc.print(&print_args(json!([]))).unwrap();

    assert_eq!(result["is_success"], json!(true));
    assert_eq!(result["info_message"], json!("No data to print"));
    assert_eq!(result["offline"], json!(false));
    assert_eq!(result["coverOpen"], json!(false));
    assert_eq!(result["cutterError"], json!(false));
    assert_eq!(result["receiptPaperEmpty"], json!(false));

    // Zero transport interaction of any kind.
    assert_eq!(driver.open_count(), 0);
    assert_eq!(driver.write_count(), 0);
    assert_eq!(driver.release_count(), 0);
}

#[test]
fn print_writes_compiled_buffer_and_releases_once() {
    let driver = MockDriver::new();
    let svc = service(driver.clone());

    let result = svc
        .print(&print_args(json!([
            {"appendEncoding": "UTF-8"},
            {"append": "hello\n"},
            {"appendCutPaper": "FullCutWithFeed"},
        ])))
        .unwrap();

    assert_eq!(result["is_success"], json!(true));

    let written = driver.written();
    // Document opens with initialize, ends with the Star full-cut-feed.
    assert_eq!(&written[..2], &[0x1B, 0x40]);
    assert!(written.windows(6).any(|w| w == b"hello\n"));
    assert_eq!(&written[written.len() - 3..], &[0x1B, 0x64, 0x02]);

    // Settings string came from the same dialect that chose the opcodes.
    assert_eq!(
        driver.opens(),
        vec![("BT:00:11:62:AA:BB:CC".to_string(), "Portable;l".to_string())]
    );
    assert_eq!(driver.open_count(), 1);
    assert_eq!(driver.release_count(), 1);
    assert_eq!(driver.checked_blocks(), (1, 1));
}

#[test]
fn all_noop_commands_compile_like_an_empty_sequence() {
    let driver = MockDriver::new();
    let svc = service(driver.clone());

    svc.print(&print_args(json!([
        {"futureFeature": true},
        {"somethingElse": "ignored"},
    ])))
    .unwrap();

    // The job still went to the device (the list was not empty), but the
    // buffer is exactly the bare document wrapper.
    let expected = command::compile(Emulation::StarPrnt, &[], &FsImageSource);
    assert_eq!(driver.written(), expected);
}

#[test]
fn paper_empty_blocks_the_write() {
    let driver = MockDriver::new().with_status(PrinterStatus {
        receipt_paper_empty: true,
        ..PrinterStatus::READY
    });
    let svc = service(driver.clone());

    let result = svc
        .print(&print_args(json!([{"append": "anything"}])))
        .unwrap();

    assert_eq!(result["is_success"], json!(false));
    assert_eq!(result["error_message"], json!("Paper empty"));
    assert_eq!(result["receiptPaperEmpty"], json!(true));

    // Pre-write validation short-circuited the write; the port was still
    // released exactly once.
    assert_eq!(driver.write_count(), 0);
    assert_eq!(driver.open_count(), 1);
    assert_eq!(driver.release_count(), 1);
}

#[test]
fn transport_write_failure_classifies_as_print_error_and_releases() {
    let driver = MockDriver::new().fail_write("link dropped");
    let svc = service(driver.clone());

    let err = svc
        .print(&print_args(json!([{"append": "x"}])))
        .unwrap_err();

    assert_eq!(err.code.as_str(), "PRINT_ERROR");
    assert!(err.message.contains("link dropped"));
    assert_eq!(driver.open_count(), 1);
    assert_eq!(driver.release_count(), 1);
}

#[test]
fn encoding_switch_affects_only_later_text() {
    let driver = MockDriver::new();
    let svc = service(driver.clone());

    svc.print(&print_args(json!([
        {"append": "é"},
        {"appendEncoding": "UTF-8"},
        {"append": "é"},
    ])))
    .unwrap();

    let written = driver.written();
    // ASCII first ('?'), then the UTF-8 pair, nothing in between.
    assert_eq!(&written[2..], &[b'?', 0xC3, 0xA9]);
}

#[test]
fn barcode_absolute_position_beats_alignment() {
    let driver = MockDriver::new();
    let svc = service(driver.clone());

    svc.print(&print_args(json!([{
        "appendBarcode": "12345",
        "absolutePosition": 48,
        "alignment": "Center",
    }])))
    .unwrap();

    let written = driver.written();
    // Cursor moved with ESC GS A, not ESC GS a.
    assert_eq!(&written[2..7], &[0x1B, 0x1D, 0x41, 48, 0]);
    assert_eq!(&written[7..9], &[0x1B, 0x62]);
}

#[test]
fn escpos_dialect_switches_opcodes_and_settings_together() {
    let driver = MockDriver::new();
    let svc = service(driver.clone());

    svc.print(&args(json!({
        "portName": "TCP:192.168.1.20",
        "emulation": "EscPosMobile",
        "printCommands": [{"appendCutPaper": "FullCut"}],
    })))
    .unwrap();

    assert_eq!(
        driver.opens(),
        vec![("TCP:192.168.1.20".to_string(), "mini".to_string())]
    );
    // ESC/POS cut, not Star ESC d.
    let written = driver.written();
    assert_eq!(&written[written.len() - 3..], &[0x1D, 0x56, 0]);
}

#[test]
fn missing_image_skips_only_that_command() {
    let driver = MockDriver::new();
    let svc = service(driver.clone());

    let result = svc
        .print(&print_args(json!([
            {"appendBitmap": "/definitely/not/here.png"},
            {"append": "still printed"},
        ])))
        .unwrap();

    assert_eq!(result["is_success"], json!(true));
    let written = driver.written();
    assert!(written.windows(13).any(|w| w == b"still printed"));
    // No raster command made it into the stream.
    assert!(!written.windows(3).any(|w| w == [0x1B, 0x1D, 0x53]));
}

#[test]
fn bitmap_text_produces_a_raster_command() {
    let driver = MockDriver::new();
    let svc = service(driver.clone());

    svc.print(&print_args(json!([{
        "appendBitmapText": "TOTAL 12.50",
        "fontSize": 25.0,
        "diffusion": false,
    }])))
    .unwrap();

    let written = driver.written();
    // ESC GS S header, 72 bytes wide (576 dots default).
    let pos = written
        .windows(3)
        .position(|w| w == [0x1B, 0x1D, 0x53])
        .expect("raster command present");
    assert_eq!(written[pos + 4], 72);
}

// ============================================================================
// DISCOVERY
// ============================================================================

#[test]
fn discovery_all_searches_each_class_once_in_order() {
    let driver = MockDriver::new()
        .with_ports(
            TransportClass::Lan,
            vec![PortInfo {
                port_name: "TCP:192.168.1.20".into(),
                mac_address: "00:11:62:DD:EE:FF".into(),
                model_name: "TSP654II".into(),
            }],
        )
        .with_ports(
            TransportClass::Bluetooth,
            vec![PortInfo {
                port_name: "BT:Star Micronics".into(),
                mac_address: "00:11:62:AA:BB:CC".into(),
                model_name: String::new(),
            }],
        )
        .with_ports(
            TransportClass::Usb,
            vec![PortInfo {
                port_name: "USB:0001".into(),
                mac_address: String::new(),
                model_name: "mPOP".into(),
            }],
        );
    let svc = service(driver.clone());

    let result = svc.port_discovery(&args(json!({"type": "All"}))).unwrap();

    assert_eq!(
        driver.searches(),
        vec![
            TransportClass::Lan,
            TransportClass::Bluetooth,
            TransportClass::Usb
        ]
    );

    let list = result.as_array().unwrap();
    assert_eq!(list.len(), 3);
    assert_eq!(list[0]["portName"], json!("TCP:192.168.1.20"));
    // Radio identifiers are MAC-based, never raw names.
    assert_eq!(list[1]["portName"], json!("BT:00:11:62:AA:BB:CC"));
    assert_eq!(list[1]["modelName"], json!("BT:Star Micronics"));
    assert_eq!(list[2]["USBSerialNumber"], json!("0001"));
}

#[test]
fn discovery_single_class_only_searches_that_class() {
    let driver = MockDriver::new();
    let svc = service(driver.clone());
    svc.port_discovery(&args(json!({"type": "LAN"}))).unwrap();
    assert_eq!(driver.searches(), vec![TransportClass::Lan]);
}

// ============================================================================
// STATUS
// ============================================================================

#[test]
fn check_status_returns_flags_and_firmware() {
    let driver = MockDriver::new().with_status(PrinterStatus {
        cover_open: true,
        over_temp: true,
        ..PrinterStatus::READY
    });
    let svc = service(driver.clone());

    let result = svc
        .check_status(&args(json!({
            "portName": "TCP:192.168.1.20",
            "emulation": "EscPos",
        })))
        .unwrap();

    assert_eq!(result["is_success"], json!(true));
    assert_eq!(result["coverOpen"], json!(true));
    assert_eq!(result["overTemp"], json!(true));
    assert_eq!(result["offline"], json!(false));
    assert_eq!(result["ModelName"], json!("Mock TSP650II"));
    assert_eq!(result["FirmwareVersion"], json!("1.0"));

    // The settings string followed the dialect, and no checked block was
    // opened for a plain status query.
    assert_eq!(
        driver.opens(),
        vec![("TCP:192.168.1.20".to_string(), "escpos".to_string())]
    );
    assert_eq!(driver.checked_blocks(), (0, 0));
    assert_eq!(driver.release_count(), 1);
}

// ============================================================================
// CONNECT
// ============================================================================

#[test]
fn connect_replaces_the_previous_session() {
    let driver = MockDriver::new();
    let svc = service(driver.clone());

    let first = svc
        .connect(&args(json!({
            "portName": "TCP:192.168.1.20",
            "emulation": "EscPos",
        })))
        .unwrap();
    assert_eq!(first, json!("Printer Connected"));
    assert_eq!(driver.release_count(), 0);

    svc.connect(&args(json!({
        "portName": "BT:00:11:62:AA:BB:CC",
        "emulation": "StarPRNT",
        "hasBarcodeReader": true,
    })))
    .unwrap();

    // The old session was torn down before the new one was established.
    assert_eq!(driver.release_count(), 1);
    assert_eq!(driver.open_count(), 2);

    svc.disconnect().unwrap();
    assert_eq!(driver.release_count(), 2);
}

#[test]
fn connect_failure_is_classified() {
    let driver = MockDriver::new().fail_open("no route to printer");
    let svc = service(driver);
    let err = svc
        .connect(&args(json!({
            "portName": "TCP:10.0.0.9",
            "emulation": "EscPos",
        })))
        .unwrap_err();
    assert_eq!(err.code.as_str(), "CONNECT_ERROR");
    assert!(err.message.contains("no route"));
}
