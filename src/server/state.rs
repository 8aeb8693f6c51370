//! Server state and configuration.

use std::sync::Arc;

use crate::printer::Printer;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "127.0.0.1:8000")
    pub listen_addr: String,
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            listen_addr: format!("{}:{}", host, port),
        }
    }
}

/// Application state shared across handlers.
#[derive(Debug)]
pub struct AppState {
    pub printer: Arc<Printer>,
}

impl AppState {
    pub fn new(printer: Arc<Printer>) -> Self {
        Self { printer }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listen_addr() {
        assert_eq!(ServerConfig::new("127.0.0.1", 8000).listen_addr, "127.0.0.1:8000");
    }
}
