//! # ESC/POS Protocol Implementation
//!
//! Pure byte builders for the commands this proxy sends. Nothing here does
//! I/O; the [`crate::printer`] module hands the output to a transport.
//!
//! ## Module Structure
//!
//! - [`commands`]: Fixed sequences (feed, cut, drawer kick)
//! - [`graphics`]: Raster image encoding and centering
//!
//! ## Usage Example
//!
//! ```
//! use epos_proxy::protocol::{commands, graphics};
//!
//! let mut data = Vec::new();
//!
//! // A 64-dot wide, 2-row image centered on 576-dot paper
//! data.extend(graphics::encode_image(&[0xFF; 16], 64, 2, 576)?);
//!
//! data.extend(commands::cut_sequence());
//! data.extend(commands::DRAWER_KICK);
//! # Ok::<(), epos_proxy::error::ProxyError>(())
//! ```

pub mod commands;
pub mod graphics;
