//! # epos-proxy - ePOS-Print to ESC/POS Bridge
//!
//! epos-proxy lets point-of-sale software that speaks Epson's ePOS-Print
//! XML drive any ESC/POS receipt printer attached over USB or TCP. It
//! provides:
//!
//! - **Document parsing**: ePOS-Print XML to typed instructions
//! - **Protocol encoding**: raster images, cuts, and drawer kicks as ESC/POS bytes
//! - **Transport**: USB character devices and raw TCP sockets
//! - **Resilience**: every print operation retries with reconnect
//!
//! ## Quick Start
//!
//! ```no_run
//! use epos_proxy::{document, printer::{Printer, PrinterConfig}, transport::ConnectionType};
//!
//! let xml = br#"<epos-print xmlns="http://www.epson-pos.com/schemas/2011/03/epos-print">
//!   <pulse/>
//!   <cut/>
//! </epos-print>"#;
//!
//! // Parse the document
//! let doc = document::parse(xml)?;
//!
//! // Blocks until the printer is reachable
//! let printer = Printer::connect(&PrinterConfig::new("/dev/usb/lp0", 576, ConnectionType::Usb));
//!
//! // Kick the drawer, then cut
//! printer.execute_document(&doc)?;
//! printer.close()?;
//!
//! # Ok::<(), epos_proxy::error::ProxyError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`document`] | ePOS-Print XML parser and instruction model |
//! | [`protocol`] | ESC/POS command bytes |
//! | [`transport`] | USB and TCP byte pipes |
//! | [`printer`] | Resilient printer with retry-with-reconnect |
//! | [`preview`] | Render documents to PNG |
//! | [`server`] | HTTP front end |
//! | [`error`] | Error types |

pub mod document;
pub mod error;
pub mod preview;
pub mod printer;
pub mod protocol;
pub mod server;
pub mod transport;

// Re-exports for convenience
pub use document::{EposDocument, Instruction};
pub use error::{ParseError, ProxyError};
pub use printer::{Printer, PrinterConfig};
pub use transport::ConnectionType;
