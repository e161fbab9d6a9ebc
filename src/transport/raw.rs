//! # Raw Device Transport
//!
//! Sends encoded label data to a printer character device (serial or
//! USB line printer).
//!
//! ## TTY Configuration
//!
//! When the device is a TTY (serial-attached printers), it is switched
//! to raw mode so command bytes pass through unmodified:
//!
//! - **No input processing**: disable IGNBRK, BRKINT, PARMRK, ISTRIP, etc.
//! - **No output processing**: disable OPOST (no CR/LF translation)
//! - **8-bit characters**: CS8, no parity
//! - **No echo**: disable ECHO, ECHONL
//! - **Non-canonical mode**: disable ICANON (no line buffering)
//!
//! OPOST matters most here: command blocks are LF-separated text, and
//! a cooked TTY would rewrite LF to CR-LF inside graphic payloads.
//! USB line-printer devices (`/dev/usb/lp*`) are not TTYs and are
//! written as-is.
//!
//! ## Chunked Writes
//!
//! Graphic-heavy labels run to tens of kilobytes of hex payload. Large
//! blocks are written in chunks with a small delay so the device
//! buffer is not overwhelmed.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::os::unix::io::AsRawFd;
use std::path::Path;
use std::thread;
use std::time::Duration;

use crate::error::EtiquetaError;

/// Default printer device path
pub const DEFAULT_DEVICE: &str = "/dev/usb/lp0";

/// Default chunk size for writes (bytes)
const CHUNK_SIZE: usize = 4096;

/// Delay between chunks (milliseconds)
const CHUNK_DELAY_MS: u64 = 2;

/// # Raw Printer Transport
///
/// Manages a write-only connection to a printer device node.
///
/// ## Example
///
/// ```no_run
/// use etiqueta::transport::raw::RawTransport;
///
/// let mut transport = RawTransport::open("/dev/usb/lp0")?;
/// transport.write_all(b"^XA^FO20,25^A0N,22,22^FDAFP^FS^XZ\n")?;
/// # Ok::<(), etiqueta::EtiquetaError>(())
/// ```
pub struct RawTransport {
    file: File,
    chunk_size: usize,
    chunk_delay: Duration,
}

impl RawTransport {
    /// Open the printer device for writing.
    ///
    /// TTY devices are configured for raw binary transmission; non-TTY
    /// devices are left alone.
    ///
    /// ## Errors
    ///
    /// Returns [`EtiquetaError::Transport`] if:
    /// - The device doesn't exist or isn't connected
    /// - Permission denied (may need the `lp` or `dialout` group)
    /// - TTY configuration fails
    pub fn open<P: AsRef<Path>>(device: P) -> Result<Self, EtiquetaError> {
        let path = device.as_ref();

        let file = OpenOptions::new().write(true).open(path).map_err(|e| {
            EtiquetaError::Transport(format!("failed to open {}: {}", path.display(), e))
        })?;

        configure_tty_raw(file.as_raw_fd())?;

        Ok(Self {
            file,
            chunk_size: CHUNK_SIZE,
            chunk_delay: Duration::from_millis(CHUNK_DELAY_MS),
        })
    }

    /// Open with the default device path.
    pub fn open_default() -> Result<Self, EtiquetaError> {
        Self::open(DEFAULT_DEVICE)
    }

    /// Set the chunk size for large writes. Default is 4096 bytes.
    pub fn set_chunk_size(&mut self, size: usize) {
        self.chunk_size = size;
    }

    /// Set the delay between chunks. Default is 2 ms.
    pub fn set_chunk_delay(&mut self, delay: Duration) {
        self.chunk_delay = delay;
    }

    /// Write data to the printer, chunking large blocks, then flush.
    pub fn write_all(&mut self, data: &[u8]) -> Result<(), EtiquetaError> {
        if data.len() <= self.chunk_size {
            self.file
                .write_all(data)
                .map_err(|e| EtiquetaError::Transport(format!("write failed: {}", e)))?;
        } else {
            for chunk in data.chunks(self.chunk_size) {
                self.file
                    .write_all(chunk)
                    .map_err(|e| EtiquetaError::Transport(format!("write failed: {}", e)))?;

                if !self.chunk_delay.is_zero() {
                    thread::sleep(self.chunk_delay);
                }
            }
        }

        self.file
            .flush()
            .map_err(|e| EtiquetaError::Transport(format!("flush failed: {}", e)))
    }
}

/// Configure a file descriptor for raw TTY mode.
///
/// A descriptor that isn't a TTY (ENOTTY from `tcgetattr`) needs no
/// configuration and is accepted as-is.
#[cfg(unix)]
fn configure_tty_raw(fd: i32) -> Result<(), EtiquetaError> {
    use std::mem::MaybeUninit;

    let mut termios = MaybeUninit::uninit();
    let result = unsafe { libc::tcgetattr(fd, termios.as_mut_ptr()) };
    if result != 0 {
        let err = io::Error::last_os_error();
        if err.raw_os_error() == Some(libc::ENOTTY) {
            return Ok(());
        }
        return Err(EtiquetaError::Transport(format!("tcgetattr failed: {}", err)));
    }
    let mut termios = unsafe { termios.assume_init() };

    // Input flags: no break/parity handling, no CR/LF mapping, and no
    // XON/XOFF flow control (0x11/0x13 could appear in binary data).
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

    // Output flags: no post-processing (keeps LF as LF).
    termios.c_oflag &= !libc::OPOST;

    // Local flags: no echo, canonical mode, or signals.
    termios.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);

    // Control flags: 8-bit characters, no parity.
    termios.c_cflag &= !(libc::CSIZE | libc::PARENB);
    termios.c_cflag |= libc::CS8;

    let result = unsafe { libc::tcsetattr(fd, libc::TCSANOW, &termios) };
    if result != 0 {
        return Err(EtiquetaError::Transport(format!(
            "tcsetattr failed: {}",
            io::Error::last_os_error()
        )));
    }

    Ok(())
}

#[cfg(not(unix))]
fn configure_tty_raw(_fd: i32) -> Result<(), EtiquetaError> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_device_path() {
        assert_eq!(DEFAULT_DEVICE, "/dev/usb/lp0");
    }

    #[test]
    fn test_open_missing_device_is_a_transport_error() {
        let result = RawTransport::open("/nonexistent/printer-device");
        assert!(matches!(result, Err(EtiquetaError::Transport(_))));
    }

    // Writes against real hardware are covered by manual integration
    // runs with a connected printer.
}
