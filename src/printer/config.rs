//! # Printer Configuration
//!
//! Connection settings and the fixed retry budgets used by
//! [`crate::printer::Printer`].
//!
//! ## Retry Budgets
//!
//! | Operation | Attempts | Writes per attempt |
//! |-----------|----------|--------------------|
//! | Print image | 3 | 1 |
//! | Kick drawer | 8 | 1 |
//! | Cut | 8 | 2 (cut, then feed) |
//!
//! Image failures usually mean a bad command, so they get fewer attempts.
//! Drawer kicks and cuts are small and worth retrying harder.
//!
//! ## Usage
//!
//! ```
//! use epos_proxy::printer::PrinterConfig;
//! use epos_proxy::transport::ConnectionType;
//!
//! let config = PrinterConfig::new("/dev/usb/lp0", 576, ConnectionType::Usb);
//! println!("{} printer at {} ({} dots wide)",
//!          config.connection_type,
//!          config.connection,
//!          config.receipt_width);
//! ```

use std::time::Duration;

use crate::transport::ConnectionType;

/// 80mm paper at 203 DPI: 72mm printable, 576 dots
pub const DEFAULT_RECEIPT_WIDTH: usize = 576;

/// Pause between a failed attempt and the reconnect that follows it
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Pause between attempts of the startup connect loop
pub const CONNECT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Attempts for one raster image
pub const IMAGE_ATTEMPTS: u32 = 3;

/// Attempts for one drawer kick
pub const DRAWER_ATTEMPTS: u32 = 8;

/// Attempts for one cut
pub const CUT_ATTEMPTS: u32 = 8;

/// # Printer Connection Settings
///
/// - **connection**: device path (`/dev/usb/lp0`) or `host:port`
/// - **receipt_width**: printable width in dots; narrower images are centered
/// - **connection_type**: which transport carries the bytes
/// - **retry_delay**: sleep before each reconnect during an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrinterConfig {
    pub connection: String,
    pub receipt_width: usize,
    pub connection_type: ConnectionType,
    pub retry_delay: Duration,
}

impl PrinterConfig {
    pub fn new(
        connection: impl Into<String>,
        receipt_width: usize,
        connection_type: ConnectionType,
    ) -> Self {
        Self {
            connection: connection.into(),
            receipt_width,
            connection_type,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Override the reconnect delay.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }
}
