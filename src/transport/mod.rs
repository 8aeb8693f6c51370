//! # Printer Transport Layer
//!
//! This module provides the byte pipes that carry commands to a printer.
//! A transport knows nothing about ESC/POS; it opens, writes, and closes.
//!
//! ## Available Transports
//!
//! - [`usb`]: USB printer character device (e.g. `/dev/usb/lp0`)
//! - [`tcp`]: Raw TCP socket (e.g. `192.168.1.50:9100`)
//!
//! ## Lifecycle
//!
//! ```text
//!            open() ok
//! Closed ─────────────────► Open
//!   ▲                         │
//!   └──────── close() ────────┘
//! ```
//!
//! - `open` on an open transport is a no-op.
//! - `write_raw` on a closed transport fails with a connection error.
//! - `close` on a closed transport is a no-op. The handle is released even
//!   when closing reports an error.

pub mod tcp;
pub mod usb;

#[cfg(test)]
pub mod mock;

use std::fmt;
use std::str::FromStr;

use crate::error::ProxyError;

pub use tcp::TcpTransport;
pub use usb::UsbTransport;

/// Error message for writes attempted without an open handle.
pub(crate) const NOT_CONNECTED: &str = "No active connection. Reconnect";

/// Open / write / close capability shared by every transport.
///
/// A [`crate::printer::Printer`] owns exactly one transport and never shares
/// it, so methods take `&mut self`.
pub trait Transport: Send {
    /// Acquire the underlying device or socket.
    fn open(&mut self) -> Result<(), ProxyError>;

    /// Write the whole buffer.
    fn write_raw(&mut self, data: &[u8]) -> Result<(), ProxyError>;

    /// Release the underlying device or socket.
    fn close(&mut self) -> Result<(), ProxyError>;

    /// Whether a handle is currently held.
    fn is_open(&self) -> bool;

    /// Device path or `host:port` this transport talks to.
    fn target(&self) -> &str;
}

/// Which transport backs a printer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionType {
    /// USB character device path
    Usb,
    /// `host:port` of a raw TCP print server
    Tcp,
}

impl ConnectionType {
    /// Build an unopened transport for `target`.
    pub fn transport(self, target: &str) -> Box<dyn Transport> {
        match self {
            ConnectionType::Usb => Box::new(UsbTransport::new(target)),
            ConnectionType::Tcp => Box::new(TcpTransport::new(target)),
        }
    }
}

impl fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionType::Usb => f.write_str("USB"),
            ConnectionType::Tcp => f.write_str("TCP"),
        }
    }
}

impl FromStr for ConnectionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "USB" => Ok(ConnectionType::Usb),
            "TCP" => Ok(ConnectionType::Tcp),
            _ => Err(format!("Unknown protocol: {} (must be USB or TCP)", s)),
        }
    }
}
