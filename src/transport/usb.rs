//! # USB Character Device Transport
//!
//! Linux exposes USB receipt printers as `/dev/usb/lpN` through the
//! `usblp` driver. Anything written to the device goes to the printer
//! unmodified, so no TTY configuration is needed.
//!
//! The device is opened read/write with `O_SYNC` so a write only returns
//! once the driver has accepted the bytes. An unplugged printer then shows
//! up as a write error instead of silently buffered data.

use std::fs::{File, OpenOptions};
use std::io::Write;

use tracing::{debug, instrument, warn};

use super::{NOT_CONNECTED, Transport};
use crate::error::ProxyError;

/// # USB Printer Transport
///
/// ## Example
///
/// ```no_run
/// use epos_proxy::transport::{Transport, UsbTransport};
/// use epos_proxy::protocol::commands;
///
/// let mut transport = UsbTransport::new("/dev/usb/lp0");
/// transport.open()?;
/// transport.write_raw(&commands::DRAWER_KICK)?;
/// transport.close()?;
///
/// # Ok::<(), epos_proxy::error::ProxyError>(())
/// ```
#[derive(Debug)]
pub struct UsbTransport {
    path: String,
    file: Option<File>,
}

impl UsbTransport {
    /// Create a closed transport for `path`.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            file: None,
        }
    }
}

impl Transport for UsbTransport {
    #[instrument(skip(self), fields(path = %self.path))]
    fn open(&mut self) -> Result<(), ProxyError> {
        if self.file.is_some() {
            debug!("USB device already open");
            return Ok(());
        }

        let mut options = OpenOptions::new();
        options.read(true).write(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.custom_flags(libc::O_SYNC);
        }

        let file = options.open(&self.path).map_err(|e| {
            ProxyError::Connection(format!("failed to open USB device {}: {}", self.path, e))
        })?;

        debug!("USB device opened");
        self.file = Some(file);
        Ok(())
    }

    #[instrument(skip(self, data), fields(path = %self.path, len = data.len()))]
    fn write_raw(&mut self, data: &[u8]) -> Result<(), ProxyError> {
        let Some(file) = self.file.as_mut() else {
            warn!("write attempted without an open USB device");
            return Err(ProxyError::Connection(NOT_CONNECTED.to_string()));
        };

        file.write_all(data).map_err(|e| {
            ProxyError::Connection(format!("write to {} failed: {}", self.path, e))
        })?;

        debug!("write complete");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %self.path))]
    fn close(&mut self) -> Result<(), ProxyError> {
        let Some(mut file) = self.file.take() else {
            debug!("USB device not open, nothing to close");
            return Ok(());
        };

        // The handle is gone either way; the file closes when dropped.
        file.flush().map_err(|e| {
            ProxyError::Connection(format!("error closing USB device {}: {}", self.path, e))
        })?;

        debug!("USB device closed");
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.file.is_some()
    }

    fn target(&self) -> &str {
        &self.path
    }
}

// ============================================================================
// TESTS
// ============================================================================
