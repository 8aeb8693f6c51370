//! # ePOS-Print HTTP Server
//!
//! Accepts ePOS-Print XML over HTTP the way a networked Epson printer
//! does, and prints it on the attached printer.
//!
//! ## Usage
//!
//! ```bash
//! epos-proxy serve --printer /dev/usb/lp0 --proto usb --host 0.0.0.0 --port 8000
//! ```
//!
//! Then point the POS at `http://<host>:8000/` as its printer URL.
//!
//! ## Responses
//!
//! | Request | Status | Body |
//! |---------|--------|------|
//! | `OPTIONS` | 200 | empty |
//! | not `POST` | 405 | `Only POST requests are allowed` |
//! | empty body | 400 | `Empty request body` |
//! | unparsable XML | 400 | `Failed to parse XML: ...` |
//! | print failure | 500 | `Failed to print image: ...` / `Failed to kick drawer: ...` / `Failed to cut: ...` |
//! | printed | 200 | SOAP acknowledgement ([`ACK`]) |
//!
//! Every response carries permissive CORS headers so browser-based POS
//! front ends can post directly.

mod handlers;
mod state;

pub use handlers::{ACK, ACK_CONTENT_TYPE};
pub use state::{AppState, ServerConfig};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, header},
};
use std::sync::Arc;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::info;

use crate::error::ProxyError;
use crate::printer::Printer;

/// Largest accepted request body: a few full-width images
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Build the router. Every path and method goes to one handler.
pub fn router(printer: Arc<Printer>) -> Router {
    let app_state = Arc::new(AppState::new(printer));

    Router::new()
        .fallback(handlers::handle)
        .with_state(app_state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("POST, OPTIONS"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        ))
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server and run until SIGINT or SIGTERM.
///
/// Closing the printer is left to the caller, once this returns.
///
/// ## Example
///
/// ```no_run
/// use std::sync::Arc;
/// use epos_proxy::printer::{Printer, PrinterConfig};
/// use epos_proxy::server::{serve, ServerConfig};
/// use epos_proxy::transport::ConnectionType;
///
/// # async fn example() -> Result<(), epos_proxy::error::ProxyError> {
/// let printer = Arc::new(Printer::connect(&PrinterConfig::new(
///     "/dev/usb/lp0",
///     576,
///     ConnectionType::Usb,
/// )));
/// let config = ServerConfig::new("127.0.0.1", 8000);
///
/// serve(config, printer.clone()).await?;
/// printer.close()?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: ServerConfig, printer: Arc<Printer>) -> Result<(), ProxyError> {
    let connection = printer.connection().to_string();
    let app = router(printer);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|e| {
            ProxyError::Connection(format!("Failed to bind to {}: {}", config.listen_addr, e))
        })?;

    info!(addr = %config.listen_addr, printer = %connection, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ProxyError::Connection(format!("Server error: {}", e)))?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutting down gracefully");
}
