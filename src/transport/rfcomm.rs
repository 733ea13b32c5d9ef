//! # Bluetooth RFCOMM Driver
//!
//! Talks to Star printers over the Bluetooth Serial Port Profile (SPP)
//! via a bound RFCOMM device node. This is the reference [`PortDriver`]
//! for the short-range-radio transport class on Linux.
//!
//! ## Bluetooth Setup
//!
//! The printer must be paired and bound before lucero can open it:
//!
//! ```bash
//! # 1. Find the printer's Bluetooth address
//! $ bluetoothctl
//! [bluetooth]# scan on
//! # Look for "Star Micronics" or "TSP650II", note the address
//!
//! # 2. Pair, then bind an RFCOMM device
//! [bluetooth]# pair 00:11:62:XX:XX:XX
//! $ sudo rfcomm bind 0 00:11:62:XX:XX:XX
//! # This creates /dev/rfcomm0
//! ```
//!
//! Discovery lists the devices currently bound in `/proc/net/rfcomm`,
//! reported with `BT:`-prefixed hardware addresses — RFCOMM device
//! numbers move around between boots, the MAC does not.
//!
//! ## TTY Configuration
//!
//! The device node is switched to raw mode on open so binary command
//! data passes through unmodified: no CR/LF translation, no echo, 8-bit
//! characters, and critically no XON/XOFF flow control (0x11 and 0x13
//! appear routinely in raster data).
//!
//! ## Status Limitations
//!
//! A bare RFCOMM link has no side channel, and this driver does not
//! implement ASB parsing, so status reads report the printer as ready
//! and firmware queries fail. Checked-block validation over RFCOMM is
//! therefore best-effort; the LAN driver is the transport of choice when
//! hard pre-write validation matters.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::os::unix::io::AsRawFd;
use std::path::Path;
use std::thread;
use std::time::Duration;

use crate::error::LuceroError;
use crate::status::{FirmwareInfo, PrinterStatus};

use super::{Port, PortDriver, PortInfo, TransportClass};

/// Chunk size for large writes (bytes). Larger chunks are faster but can
/// overflow the Bluetooth buffer.
const CHUNK_SIZE: usize = 4096;

/// Delay between chunks.
const CHUNK_DELAY: Duration = Duration::from_millis(2);

/// The RFCOMM [`PortDriver`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RfcommDriver;

impl PortDriver for RfcommDriver {
    fn search(&self, class: TransportClass) -> Result<Vec<PortInfo>, LuceroError> {
        if class != TransportClass::Bluetooth {
            // This driver only owns the radio class.
            return Ok(Vec::new());
        }

        let mut ports = Vec::new();
        // /proc/net/rfcomm lines: "rfcomm0: 00:11:62:AA:BB:CC channel 1 ..."
        if let Ok(contents) = fs::read_to_string("/proc/net/rfcomm") {
            for line in contents.lines() {
                let mut fields = line.split_whitespace();
                let (Some(_dev), Some(mac)) = (fields.next(), fields.next()) else {
                    continue;
                };
                if is_valid_mac(mac) {
                    ports.push(PortInfo {
                        port_name: format!("BT:{}", mac.to_uppercase()),
                        mac_address: mac.to_uppercase(),
                        model_name: String::new(),
                    });
                }
            }
        }
        Ok(ports)
    }

    fn open(
        &self,
        port_name: &str,
        settings: &str,
        _timeout: Duration,
    ) -> Result<Box<dyn Port>, LuceroError> {
        log::debug!("opening {port_name} with settings {settings:?}");

        let device = if let Some(mac) = port_name.strip_prefix("BT:") {
            find_rfcomm_for_mac(mac)?.ok_or_else(|| {
                LuceroError::Transport(format!("No RFCOMM device bound to {mac}"))
            })?
        } else {
            // Allow a raw device path for direct use.
            port_name.to_string()
        };

        let file = OpenOptions::new().write(true).open(&device).map_err(|e| {
            LuceroError::Transport(format!("Failed to open {device}: {e}"))
        })?;
        configure_tty_raw(file.as_raw_fd())?;

        Ok(Box::new(RfcommPort {
            file: Some(file),
            device,
        }))
    }
}

/// An open RFCOMM handle. `file` goes to `None` on release, making any
/// later use a detectable contract violation.
struct RfcommPort {
    file: Option<File>,
    device: String,
}

impl RfcommPort {
    fn file(&mut self) -> Result<&mut File, LuceroError> {
        self.file.as_mut().ok_or_else(|| {
            LuceroError::Transport("port used after release".to_string())
        })
    }
}

impl Port for RfcommPort {
    fn write_all(&mut self, data: &[u8]) -> Result<(), LuceroError> {
        let file = self.file()?;
        for chunk in data.chunks(CHUNK_SIZE) {
            file.write_all(chunk)
                .map_err(|e| LuceroError::Transport(format!("Write failed: {e}")))?;
            if data.len() > CHUNK_SIZE {
                thread::sleep(CHUNK_DELAY);
            }
        }
        file.flush()
            .map_err(|e| LuceroError::Transport(format!("Flush failed: {e}")))
    }

    fn begin_checked_block(&mut self) -> Result<PrinterStatus, LuceroError> {
        self.file()?;
        Ok(PrinterStatus::READY)
    }

    fn end_checked_block(&mut self) -> Result<PrinterStatus, LuceroError> {
        self.file()?;
        Ok(PrinterStatus::READY)
    }

    fn set_end_checked_block_timeout(&mut self, _timeout: Duration) {}

    fn retrieve_status(&mut self) -> Result<PrinterStatus, LuceroError> {
        self.file()?;
        Ok(PrinterStatus::READY)
    }

    fn firmware_information(&mut self) -> Result<FirmwareInfo, LuceroError> {
        Err(LuceroError::Transport(
            "firmware query not supported over RFCOMM".to_string(),
        ))
    }

    fn release(&mut self) -> Result<(), LuceroError> {
        match self.file.take() {
            Some(file) => {
                log::debug!("releasing {}", self.device);
                drop(file);
                Ok(())
            }
            None => Err(LuceroError::Transport("double release".to_string())),
        }
    }
}

// ============================================================================
// RFCOMM HELPERS
// ============================================================================

/// Validate a Bluetooth MAC address format (XX:XX:XX:XX:XX:XX).
pub fn is_valid_mac(mac: &str) -> bool {
    let parts: Vec<&str> = mac.split(':').collect();
    if parts.len() != 6 {
        return false;
    }
    parts
        .iter()
        .all(|part| part.len() == 2 && part.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Find the RFCOMM device node bound to the given MAC address, if any.
fn find_rfcomm_for_mac(mac: &str) -> Result<Option<String>, LuceroError> {
    let mac_upper = mac.to_uppercase();

    if let Ok(contents) = fs::read_to_string("/proc/net/rfcomm") {
        for line in contents.lines() {
            if line.to_uppercase().contains(&mac_upper) {
                if let Some(dev_name) = line.split(':').next() {
                    let device_path = format!("/dev/{}", dev_name.trim());
                    if Path::new(&device_path).exists() {
                        return Ok(Some(device_path));
                    }
                }
            }
        }
    }

    Ok(None)
}

/// Configure a file descriptor for raw TTY mode.
///
/// Disables all input/output processing so binary data passes through
/// unmodified. IXON/IXOFF/IXANY matter most: 0x11 (XON) and 0x13 (XOFF)
/// occur in raster data and must not be eaten by software flow control.
fn configure_tty_raw(fd: i32) -> Result<(), LuceroError> {
    use std::mem::MaybeUninit;

    let mut termios = MaybeUninit::uninit();
    let result = unsafe { libc::tcgetattr(fd, termios.as_mut_ptr()) };
    if result != 0 {
        return Err(LuceroError::Transport(format!(
            "tcgetattr failed: {}",
            io::Error::last_os_error()
        )));
    }
    let mut termios = unsafe { termios.assume_init() };

    termios.c_iflag &= !(libc::IGNBRK
        | libc::BRKINT
        | libc::PARMRK
        | libc::ISTRIP
        | libc::INLCR
        | libc::IGNCR
        | libc::ICRNL
        | libc::IXON
        | libc::IXOFF
        | libc::IXANY);
    termios.c_oflag &= !libc::OPOST;
    termios.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);
    termios.c_cflag &= !(libc::CSIZE | libc::PARENB);
    termios.c_cflag |= libc::CS8;

    let result = unsafe { libc::tcsetattr(fd, libc::TCSANOW, &termios) };
    if result != 0 {
        return Err(LuceroError::Transport(format!(
            "tcsetattr failed: {}",
            io::Error::last_os_error()
        )));
    }

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
