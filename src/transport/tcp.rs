//! # Raw TCP Transport
//!
//! Network receipt printers accept raw ESC/POS on a TCP port (9100 on most
//! models). The stream carries no framing: bytes in, paper out.

use std::io::{ErrorKind, Write};
use std::net::{Shutdown, TcpStream};

use tracing::{debug, instrument, warn};

use super::{NOT_CONNECTED, Transport};
use crate::error::ProxyError;

/// # TCP Printer Transport
///
/// ## Example
///
/// ```no_run
/// use epos_proxy::transport::{TcpTransport, Transport};
/// use epos_proxy::protocol::commands;
///
/// let mut transport = TcpTransport::new("192.168.1.50:9100");
/// transport.open()?;
/// transport.write_raw(&commands::cut_sequence())?;
///
/// # Ok::<(), epos_proxy::error::ProxyError>(())
/// ```
#[derive(Debug)]
pub struct TcpTransport {
    address: String,
    stream: Option<TcpStream>,
}

impl TcpTransport {
    /// Create a closed transport for `host:port`.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            stream: None,
        }
    }
}

impl Transport for TcpTransport {
    #[instrument(skip(self), fields(addr = %self.address))]
    fn open(&mut self) -> Result<(), ProxyError> {
        if self.stream.is_some() {
            debug!("TCP connection already open");
            return Ok(());
        }

        let stream = TcpStream::connect(&self.address).map_err(|e| {
            ProxyError::Connection(format!("failed to dial {}: {}", self.address, e))
        })?;

        debug!("TCP connection established");
        self.stream = Some(stream);
        Ok(())
    }

    #[instrument(skip(self, data), fields(addr = %self.address, len = data.len()))]
    fn write_raw(&mut self, data: &[u8]) -> Result<(), ProxyError> {
        let Some(stream) = self.stream.as_mut() else {
            warn!("write attempted without an open TCP connection");
            return Err(ProxyError::Connection(NOT_CONNECTED.to_string()));
        };

        stream
            .write_all(data)
            .and_then(|()| stream.flush())
            .map_err(|e| ProxyError::Connection(format!("write to {} failed: {}", self.address, e)))?;

        debug!("write complete");
        Ok(())
    }

    #[instrument(skip(self), fields(addr = %self.address))]
    fn close(&mut self) -> Result<(), ProxyError> {
        let Some(stream) = self.stream.take() else {
            debug!("TCP connection not open, nothing to close");
            return Ok(());
        };

        match stream.shutdown(Shutdown::Both) {
            Ok(()) => {}
            // Peer already hung up
            Err(e) if e.kind() == ErrorKind::NotConnected => {}
            Err(e) => {
                return Err(ProxyError::Connection(format!(
                    "error closing TCP connection {}: {}",
                    self.address, e
                )));
            }
        }

        debug!("TCP connection closed");
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    fn target(&self) -> &str {
        &self.address
    }
}

// ============================================================================
// TESTS
// ============================================================================
