//! # Mock Transport
//!
//! An in-memory [`PortDriver`] with scripted discovery results, scripted
//! status snapshots, and full capture of everything the caller does to
//! it. Used by the test suite to verify transaction sequencing (acquire /
//! write / release discipline) without hardware, and handy for dry runs.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::LuceroError;
use crate::status::{FirmwareInfo, PrinterStatus};

use super::{Port, PortDriver, PortInfo, TransportClass};

/// Everything observable about interactions with a [`MockDriver`].
#[derive(Debug, Default)]
struct MockLog {
    searches: Vec<TransportClass>,
    opens: Vec<(String, String)>,
    releases: usize,
    writes: Vec<Vec<u8>>,
    end_timeouts: Vec<Duration>,
    begin_count: usize,
    end_count: usize,
}

/// Scripted behavior shared by the driver and the ports it opens.
#[derive(Debug, Clone)]
struct MockScript {
    lan: Vec<PortInfo>,
    bluetooth: Vec<PortInfo>,
    usb: Vec<PortInfo>,
    status: PrinterStatus,
    end_status: PrinterStatus,
    firmware: Option<FirmwareInfo>,
    open_error: Option<String>,
    already_connected: bool,
    write_error: Option<String>,
    release_error: Option<String>,
}

impl Default for MockScript {
    fn default() -> Self {
        Self {
            lan: Vec::new(),
            bluetooth: Vec::new(),
            usb: Vec::new(),
            status: PrinterStatus::READY,
            end_status: PrinterStatus::READY,
            firmware: Some(FirmwareInfo {
                model_name: "Mock TSP650II".to_string(),
                firmware_version: "1.0".to_string(),
            }),
            open_error: None,
            already_connected: false,
            write_error: None,
            release_error: None,
        }
    }
}

/// The mock [`PortDriver`]. Clones share one interaction log.
#[derive(Debug, Clone, Default)]
pub struct MockDriver {
    script: MockScript,
    log: Arc<Mutex<MockLog>>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the discovery result for one transport class.
    pub fn with_ports(mut self, class: TransportClass, ports: Vec<PortInfo>) -> Self {
        match class {
            TransportClass::Lan => self.script.lan = ports,
            TransportClass::Bluetooth => self.script.bluetooth = ports,
            TransportClass::Usb => self.script.usb = ports,
        }
        self
    }

    /// Script the status returned from every status read.
    pub fn with_status(mut self, status: PrinterStatus) -> Self {
        self.script.status = status;
        self.script.end_status = status;
        self
    }

    /// Script a different status for the end of the checked block.
    pub fn with_end_status(mut self, status: PrinterStatus) -> Self {
        self.script.end_status = status;
        self
    }

    /// Script the firmware query result (`None` makes it fail).
    pub fn with_firmware(mut self, firmware: Option<FirmwareInfo>) -> Self {
        self.script.firmware = firmware;
        self
    }

    /// Make every `open` fail with the given message.
    pub fn fail_open(mut self, message: &str) -> Self {
        self.script.open_error = Some(message.to_string());
        self
    }

    /// Make every `open` report an already-live device-side connection.
    pub fn already_connected(mut self) -> Self {
        self.script.already_connected = true;
        self
    }

    /// Make every write fail with the given message.
    pub fn fail_write(mut self, message: &str) -> Self {
        self.script.write_error = Some(message.to_string());
        self
    }

    /// Make every release fail with the given message.
    pub fn fail_release(mut self, message: &str) -> Self {
        self.script.release_error = Some(message.to_string());
        self
    }

    // ---- inspection -------------------------------------------------------

    /// Transport classes searched, in call order.
    pub fn searches(&self) -> Vec<TransportClass> {
        self.log.lock().unwrap().searches.clone()
    }

    /// `(port_name, settings)` pairs passed to `open`, in call order.
    pub fn opens(&self) -> Vec<(String, String)> {
        self.log.lock().unwrap().opens.clone()
    }

    pub fn open_count(&self) -> usize {
        self.log.lock().unwrap().opens.len()
    }

    pub fn release_count(&self) -> usize {
        self.log.lock().unwrap().releases
    }

    /// Every buffer written across all ports, concatenated.
    pub fn written(&self) -> Vec<u8> {
        self.log.lock().unwrap().writes.concat()
    }

    pub fn write_count(&self) -> usize {
        self.log.lock().unwrap().writes.len()
    }

    /// Checked-block timeout extensions, in call order.
    pub fn end_timeouts(&self) -> Vec<Duration> {
        self.log.lock().unwrap().end_timeouts.clone()
    }

    pub fn checked_blocks(&self) -> (usize, usize) {
        let log = self.log.lock().unwrap();
        (log.begin_count, log.end_count)
    }
}

impl PortDriver for MockDriver {
    fn search(&self, class: TransportClass) -> Result<Vec<PortInfo>, LuceroError> {
        self.log.lock().unwrap().searches.push(class);
        Ok(match class {
            TransportClass::Lan => self.script.lan.clone(),
            TransportClass::Bluetooth => self.script.bluetooth.clone(),
            TransportClass::Usb => self.script.usb.clone(),
        })
    }

    fn open(
        &self,
        port_name: &str,
        settings: &str,
        _timeout: Duration,
    ) -> Result<Box<dyn Port>, LuceroError> {
        if let Some(message) = &self.script.open_error {
            return Err(LuceroError::Transport(message.clone()));
        }
        if self.script.already_connected {
            return Err(LuceroError::AlreadyConnected);
        }
        self.log
            .lock()
            .unwrap()
            .opens
            .push((port_name.to_string(), settings.to_string()));
        Ok(Box::new(MockPort {
            script: self.script.clone(),
            log: Arc::clone(&self.log),
            released: false,
        }))
    }
}

/// A handle opened by [`MockDriver`].
struct MockPort {
    script: MockScript,
    log: Arc<Mutex<MockLog>>,
    released: bool,
}

impl MockPort {
    fn check_live(&self) -> Result<(), LuceroError> {
        if self.released {
            Err(LuceroError::Transport(
                "port used after release".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

impl Port for MockPort {
    fn write_all(&mut self, data: &[u8]) -> Result<(), LuceroError> {
        self.check_live()?;
        if let Some(message) = &self.script.write_error {
            return Err(LuceroError::Transport(message.clone()));
        }
        self.log.lock().unwrap().writes.push(data.to_vec());
        Ok(())
    }

    fn begin_checked_block(&mut self) -> Result<PrinterStatus, LuceroError> {
        self.check_live()?;
        self.log.lock().unwrap().begin_count += 1;
        Ok(self.script.status)
    }

    fn end_checked_block(&mut self) -> Result<PrinterStatus, LuceroError> {
        self.check_live()?;
        self.log.lock().unwrap().end_count += 1;
        Ok(self.script.end_status)
    }

    fn set_end_checked_block_timeout(&mut self, timeout: Duration) {
        self.log.lock().unwrap().end_timeouts.push(timeout);
    }

    fn retrieve_status(&mut self) -> Result<PrinterStatus, LuceroError> {
        self.check_live()?;
        Ok(self.script.status)
    }

    fn firmware_information(&mut self) -> Result<FirmwareInfo, LuceroError> {
        self.check_live()?;
        self.script
            .firmware
            .clone()
            .ok_or_else(|| LuceroError::Transport("firmware query unsupported".to_string()))
    }

    fn release(&mut self) -> Result<(), LuceroError> {
        if self.released {
            return Err(LuceroError::Transport("double release".to_string()));
        }
        self.released = true;
        self.log.lock().unwrap().releases += 1;
        if let Some(message) = &self.script.release_error {
            return Err(LuceroError::Transport(message.clone()));
        }
        Ok(())
    }
}
