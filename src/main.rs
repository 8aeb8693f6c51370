//! # epos-proxy CLI
//!
//! Stand in for a networked Epson printer in front of a USB or raw TCP
//! receipt printer.
//!
//! ## Usage
//!
//! ```bash
//! # Serve ePOS-Print on 127.0.0.1:8000, printing to a USB printer
//! epos-proxy serve --printer /dev/usb/lp0 --proto usb
//!
//! # Serve on all interfaces, printing to a network printer
//! epos-proxy serve --printer 192.168.1.50:9100 --proto tcp --host 0.0.0.0
//!
//! # Print a saved ePOS-Print document once
//! epos-proxy print --printer /dev/usb/lp0 --proto usb receipt.xml
//!
//! # Render a document to PNG instead of printing
//! epos-proxy preview --png receipt.png receipt.xml
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use epos_proxy::{
    ProxyError, document, preview,
    printer::{Printer, PrinterConfig, config::DEFAULT_RECEIPT_WIDTH},
    server::{self, ServerConfig},
    transport::ConnectionType,
};

/// epos-proxy - ePOS-Print to ESC/POS bridge
#[derive(Parser, Debug)]
#[command(name = "epos-proxy")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Accept ePOS-Print XML over HTTP and print it
    Serve {
        /// Printer device path (USB) or host:port (TCP)
        #[arg(long)]
        printer: String,

        /// Printer protocol: USB or TCP
        #[arg(long)]
        proto: ConnectionType,

        /// Receipt width in dots
        #[arg(long, default_value_t = DEFAULT_RECEIPT_WIDTH)]
        receipt_width: usize,

        /// Server host
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Server port
        #[arg(long, default_value_t = 8000)]
        port: u16,
    },

    /// Print an ePOS-Print XML file once
    Print {
        /// Printer device path (USB) or host:port (TCP)
        #[arg(long)]
        printer: String,

        /// Printer protocol: USB or TCP
        #[arg(long)]
        proto: ConnectionType,

        /// Receipt width in dots
        #[arg(long, default_value_t = DEFAULT_RECEIPT_WIDTH)]
        receipt_width: usize,

        /// ePOS-Print XML document
        file: PathBuf,
    },

    /// Render an ePOS-Print XML file to PNG
    Preview {
        /// Receipt width in dots
        #[arg(long, default_value_t = DEFAULT_RECEIPT_WIDTH)]
        receipt_width: usize,

        /// Output PNG file
        #[arg(long, value_name = "FILE")]
        png: PathBuf,

        /// ePOS-Print XML document
        file: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), ProxyError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            printer,
            proto,
            receipt_width,
            host,
            port,
        } => {
            let config = PrinterConfig::new(printer, receipt_width, proto);
            let printer = Arc::new(Printer::connect(&config));
            println!("Connected to printer: {}", printer.connection());

            let server_config = ServerConfig::new(&host, port);
            println!("Starting server on {}", server_config.listen_addr);

            let runtime = tokio::runtime::Runtime::new()?;
            let result = runtime.block_on(server::serve(server_config, Arc::clone(&printer)));

            if let Err(e) = printer.close() {
                eprintln!("Error closing printer connection: {}", e);
            }
            result
        }

        Commands::Print {
            printer,
            proto,
            receipt_width,
            file,
        } => {
            let xml = std::fs::read(&file)?;
            let doc = document::parse(&xml)?;
            println!("Parsed {} instruction(s) from {}", doc.len(), file.display());

            let config = PrinterConfig::new(printer, receipt_width, proto);
            let printer = Printer::connect(&config);
            let result = printer.execute_document(&doc);
            if let Err(e) = printer.close() {
                eprintln!("Error closing printer connection: {}", e);
            }
            result?;

            println!("Printed to {}", printer.connection());
            Ok(())
        }

        Commands::Preview {
            receipt_width,
            png,
            file,
        } => {
            let xml = std::fs::read(&file)?;
            let doc = document::parse(&xml)?;

            let image = preview::render(&doc, receipt_width)?;
            preview::save_png(&png, &image)?;

            println!(
                "Saved to {} ({}x{})",
                png.display(),
                image.width(),
                image.height()
            );
            Ok(())
        }
    }
}
