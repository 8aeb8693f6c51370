//! # Printer Module
//!
//! The resilient printer and its configuration.
//!
//! ## Modules
//!
//! - [`config`]: Connection settings and retry budgets
//! - [`retry`]: Retry-with-reconnect combinator
//! - [`resilient`]: [`Printer`], the operations the HTTP layer calls

pub mod config;
pub mod resilient;
pub mod retry;

pub use config::PrinterConfig;
pub use resilient::Printer;
pub use retry::{RetryPolicy, with_retry};
