//! # Error Types
//!
//! This module defines error types used throughout the epos-proxy library.
//!
//! | Error | Raised by | Recovered? |
//! |-------|-----------|------------|
//! | [`ParseError`] | [`crate::document::parse`] | No, the document is rejected |
//! | [`ProxyError::Validation`] | [`crate::protocol::graphics`] | No, the instruction aborts |
//! | [`ProxyError::Connection`] / [`ProxyError::Io`] | [`crate::transport`] | Yes, by the printer's retry loop |

use thiserror::Error;

/// Errors produced while turning an ePOS-Print XML document into instructions.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The XML token stream was malformed
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The document ended while elements were still open
    #[error("malformed XML: element <{0}> is never closed")]
    Unclosed(String),

    /// An element carried a malformed attribute list
    #[error("malformed attribute: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    /// An image body was not valid base64
    #[error("failed to decode image base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The decoded image body does not match the declared dimensions
    #[error(
        "image data incomplete: got {actual} bytes, expected {expected} bytes (width={width}, height={height})"
    )]
    SizeMismatch {
        expected: i64,
        actual: usize,
        width: i64,
        height: i64,
    },
}

/// Main error type for epos-proxy operations
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The request document could not be parsed
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Image data does not fit the raster it claims to describe
    #[error("Validation error: {0}")]
    Validation(String),

    /// Transport-level errors (open, write, close)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Image rendering or encoding error
    #[error("Image error: {0}")]
    Image(String),

    /// A printer operation failed; `op` names it for the caller
    #[error("Failed to {op}: {source}")]
    Operation {
        op: &'static str,
        #[source]
        source: Box<ProxyError>,
    },

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProxyError {
    /// Tag this error with the printer operation that produced it.
    pub fn during(self, op: &'static str) -> Self {
        ProxyError::Operation {
            op,
            source: Box::new(self),
        }
    }
}
