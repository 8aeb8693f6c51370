//! # ePOS-Print Documents
//!
//! The data model for a print request and the parser that produces it.
//!
//! ```
//! use epos_proxy::document::{parse, Instruction};
//!
//! let doc = parse(br#"<epos-print xmlns="http://www.epson-pos.com/schemas/2011/03/epos-print">
//!   <pulse/>
//! </epos-print>"#)?;
//!
//! for instruction in &doc {
//!     assert_eq!(*instruction, Instruction::Pulse);
//! }
//! # Ok::<(), epos_proxy::error::ParseError>(())
//! ```

pub mod parser;
pub mod types;

pub use parser::{EPOS_NAMESPACE_MARKER, must_parse, parse};
pub use types::{EposDocument, Image, Instruction};
