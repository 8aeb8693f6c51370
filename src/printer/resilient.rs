//! # Resilient Printer
//!
//! [`Printer`] owns one transport and runs every hardware operation through
//! [`with_retry`], so a printer that is unplugged, power-cycled, or drops
//! its TCP connection mid-job gets reconnected automatically.
//!
//! ## Operations
//!
//! | Method | Bytes | Attempts |
//! |--------|-------|----------|
//! | [`Printer::print_graphics`] | `GS v 0` raster + `ESC d 12` | 3 |
//! | [`Printer::kick_drawer`] | `ESC p 0 25 25` | 8 |
//! | [`Printer::cut`] | `GS V 0`, then `ESC d 2` | 8 |
//!
//! A cut is two writes retried as one unit. If the feed fails after the
//! cut went through, the retry sends the cut again.
//!
//! ## Concurrency
//!
//! The transport sits behind a mutex that is held for the whole operation,
//! retries included. Concurrent callers queue up; `close` waits for any
//! in-flight retry loop to finish.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, instrument, warn};

use super::config::{
    CONNECT_RETRY_DELAY, CUT_ATTEMPTS, DRAWER_ATTEMPTS, IMAGE_ATTEMPTS, PrinterConfig,
};
use super::retry::{RetryPolicy, with_retry};
use crate::document::{EposDocument, Instruction};
use crate::error::ProxyError;
use crate::protocol::commands::{CUT, DRAWER_KICK, cut_feed};
use crate::protocol::graphics::encode_image;
use crate::transport::Transport;

/// A receipt printer reachable over one transport.
pub struct Printer {
    connection: String,
    receipt_width: usize,
    retry: RetryPolicy,
    transport: Mutex<Box<dyn Transport>>,
}

impl Printer {
    /// Open the configured transport, waiting as long as it takes.
    ///
    /// Blocks the calling thread until the device or socket opens. There
    /// is no timeout: a proxy without a printer has nothing else to do.
    pub fn connect(config: &PrinterConfig) -> Self {
        let transport = config.connection_type.transport(&config.connection);
        Self::connect_with(
            transport,
            config.receipt_width,
            RetryPolicy::new(config.retry_delay),
        )
    }

    /// Like [`Printer::connect`] with an explicit transport and policy.
    ///
    /// The connect loop waits [`CONNECT_RETRY_DELAY`] between attempts
    /// through the policy's sleep function.
    pub fn connect_with(
        mut transport: Box<dyn Transport>,
        receipt_width: usize,
        retry: RetryPolicy,
    ) -> Self {
        let mut attempt: u64 = 1;
        loop {
            match transport.open() {
                Ok(()) => break,
                Err(e) => {
                    warn!(
                        conn = transport.target(),
                        attempt,
                        error = %e,
                        "printer not available, retrying"
                    );
                    retry.pause_for(CONNECT_RETRY_DELAY);
                    attempt += 1;
                }
            }
        }

        info!(conn = transport.target(), receipt_width, "printer connected");
        Self::from_transport(transport, receipt_width, retry)
    }

    /// Wrap a transport as-is, without opening it.
    pub fn from_transport(
        transport: Box<dyn Transport>,
        receipt_width: usize,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            connection: transport.target().to_string(),
            receipt_width,
            retry,
            transport: Mutex::new(transport),
        }
    }

    /// Device path or `host:port`
    pub fn connection(&self) -> &str {
        &self.connection
    }

    pub fn receipt_width(&self) -> usize {
        self.receipt_width
    }

    /// Whether the transport currently holds an open handle.
    pub fn is_connected(&self) -> bool {
        self.lock().is_open()
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn Transport>> {
        self.transport.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Print a packed 1-bit bitmap, centered on the receipt.
    ///
    /// Size validation happens before any write; a bad image is never
    /// retried.
    #[instrument(skip(self, data), fields(conn = %self.connection, len = data.len()))]
    pub fn print_graphics(&self, data: &[u8], width: i64, height: i64) -> Result<(), ProxyError> {
        let cmd = encode_image(data, width, height, self.receipt_width)?;
        debug!(bytes = cmd.len(), "raster command encoded");

        let mut transport = self.lock();
        with_retry(transport.as_mut(), &self.retry, IMAGE_ATTEMPTS, |t| {
            t.write_raw(&cmd)
        })
    }

    /// Pulse the cash drawer.
    #[instrument(skip(self), fields(conn = %self.connection))]
    pub fn kick_drawer(&self) -> Result<(), ProxyError> {
        let mut transport = self.lock();
        with_retry(transport.as_mut(), &self.retry, DRAWER_ATTEMPTS, |t| {
            t.write_raw(&DRAWER_KICK)
        })
    }

    /// Cut the paper and feed two lines.
    #[instrument(skip(self), fields(conn = %self.connection))]
    pub fn cut(&self) -> Result<(), ProxyError> {
        let feed = cut_feed();
        let mut transport = self.lock();
        with_retry(transport.as_mut(), &self.retry, CUT_ATTEMPTS, |t| {
            t.write_raw(&CUT)?;
            t.write_raw(&feed)
        })
    }

    /// Release the transport. Safe to call any number of times.
    pub fn close(&self) -> Result<(), ProxyError> {
        info!(conn = %self.connection, "closing printer");
        self.lock().close()
    }

    /// Run one instruction. Errors name the operation that failed.
    pub fn execute(&self, instruction: &Instruction) -> Result<(), ProxyError> {
        match instruction {
            Instruction::Image(image) => self
                .print_graphics(&image.data, image.width, image.height)
                .map_err(|e| e.during("print image")),
            Instruction::Pulse => self.kick_drawer().map_err(|e| e.during("kick drawer")),
            Instruction::Cut => self.cut().map_err(|e| e.during("cut")),
        }
    }

    /// Run every instruction in order, stopping at the first failure.
    pub fn execute_document(&self, document: &EposDocument) -> Result<(), ProxyError> {
        for (index, instruction) in document.iter().enumerate() {
            debug!(index, kind = instruction.name(), "executing instruction");
            self.execute(instruction)?;
        }
        info!(instructions = document.len(), "document printed");
        Ok(())
    }
}

impl std::fmt::Debug for Printer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Printer")
            .field("connection", &self.connection)
            .field("receipt_width", &self.receipt_width)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// TESTS
// ============================================================================
