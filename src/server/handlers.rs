//! ePOS-Print request handler.
//!
//! One handler serves every path. POS software posts an ePOS-Print XML
//! document, the printer runs it, and the reply mimics the acknowledgement
//! an Epson printer would send back.

use axum::{
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    http::{Method, StatusCode, header},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::document;

use super::state::AppState;

/// SOAP acknowledgement returned after a document prints.
pub const ACK: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
<s:Body>
<response success="true" code="" status="123456" battery="0"/>
</s:Body>
</s:Envelope>"#;

/// Content type of [`ACK`].
pub const ACK_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

/// Handle any request: OPTIONS preflight, or POST of an ePOS-Print document.
pub async fn handle(
    State(state): State<Arc<AppState>>,
    method: Method,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    if method == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }

    if method != Method::POST {
        return error_response(StatusCode::METHOD_NOT_ALLOWED, "Only POST requests are allowed");
    }

    let body = match body {
        Ok(body) => body,
        Err(e) => {
            return error_response(StatusCode::BAD_REQUEST, &format!("Failed to read body: {}", e));
        }
    };

    if body.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Empty request body");
    }

    let document = match document::parse(&body) {
        Ok(document) => document,
        Err(e) => {
            warn!(error = %e, "rejected request");
            return error_response(StatusCode::BAD_REQUEST, &format!("Failed to parse XML: {}", e));
        }
    };

    info!(instructions = document.len(), "printing document");

    // Print on a blocking thread: retries sleep
    let printer = Arc::clone(&state.printer);
    let print_result =
        tokio::task::spawn_blocking(move || printer.execute_document(&document)).await;

    match print_result {
        Ok(Ok(())) => ([(header::CONTENT_TYPE, ACK_CONTENT_TYPE)], ACK).into_response(),
        Ok(Err(e)) => {
            error!(error = %e, "print failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            &format!("Task error: {}", e),
        ),
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, format!("{}\n", message)).into_response()
}

// ============================================================================
// TESTS
// ============================================================================
