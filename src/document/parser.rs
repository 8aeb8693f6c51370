//! # ePOS-Print XML Parser
//!
//! Streams an ePOS-Print document through [`quick_xml::NsReader`] and turns
//! the recognized elements into [`Instruction`]s. No tree is built.
//!
//! ## Recognized Elements
//!
//! Only elements whose namespace URI contains [`EPOS_NAMESPACE_MARKER`]
//! count. The match is a substring test so schema revisions
//! (`.../schemas/2011/03/epos-print`, `.../2012/10/...`) all work.
//! Unqualified elements and elements in other namespaces are skipped.
//!
//! | Element | Becomes |
//! |---------|---------|
//! | `<epos-print>` | Recorded in [`EposDocument::root_namespace`], nothing else |
//! | `<pulse/>` | [`Instruction::Pulse`] |
//! | `<cut/>` | [`Instruction::Cut`] |
//! | `<image width=".." height="..">base64</image>` | [`Instruction::Image`] |
//!
//! ## Image Bodies
//!
//! The body may arrive in several text events (entities, CDATA, pretty
//! printing). Each chunk is trimmed, base64-decoded on its own and appended.
//! When `</image>` closes, the decoded length must equal
//! `(width / 8) * height` or the whole parse fails.
//!
//! `width` and `height` are read leniently: a missing or non-numeric value
//! is 0, and negative values are kept so the size check can reject them.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use tracing::debug;

use super::types::{EposDocument, Image, Instruction};
use crate::error::ParseError;

/// Substring identifying the vendor's print schema namespace.
pub const EPOS_NAMESPACE_MARKER: &str = "epson-pos";

const ROOT: &[u8] = b"epos-print";
const PULSE: &[u8] = b"pulse";
const CUT: &[u8] = b"cut";
const IMAGE: &[u8] = b"image";

/// Parse an ePOS-Print XML document into an ordered instruction list.
///
/// An empty input, or one without any recognized element, yields an empty
/// document.
///
/// ## Example
///
/// ```
/// use epos_proxy::document::{parse, Instruction};
///
/// let xml = br#"<epos-print xmlns="http://www.epson-pos.com/schemas/2011/03/epos-print">
///     <image width="8" height="1">/w==</image>
///     <cut/>
/// </epos-print>"#;
///
/// let doc = parse(xml)?;
/// assert_eq!(doc.len(), 2);
/// assert_eq!(doc.instructions[1], Instruction::Cut);
/// # Ok::<(), epos_proxy::error::ParseError>(())
/// ```
pub fn parse(xml: &[u8]) -> Result<EposDocument, ParseError> {
    let mut reader = NsReader::from_reader(xml);
    let mut state = ParserState::default();

    loop {
        let (ns, event) = reader.read_resolved_event()?;
        let namespace = epos_namespace(&ns);

        match event {
            Event::Start(e) => {
                state.open.push(String::from_utf8_lossy(e.name().as_ref()).into_owned());
                state.start(namespace, &e)?;
            }
            Event::Empty(e) => {
                state.start(namespace.clone(), &e)?;
                state.end(namespace.is_some(), e.local_name().as_ref())?;
            }
            Event::End(e) => {
                state.open.pop();
                state.end(namespace.is_some(), e.local_name().as_ref())?;
            }
            Event::Text(text) => state.text(&text.unescape()?)?,
            Event::CData(data) => state.text(&String::from_utf8_lossy(&data))?,
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(name) = state.open.pop() {
        return Err(ParseError::Unclosed(name));
    }

    debug!(
        instructions = state.doc.len(),
        root = ?state.doc.root_namespace,
        "parsed ePOS document"
    );
    Ok(state.doc)
}

/// Parse a document the caller already knows to be valid.
///
/// # Panics
///
/// Panics with the parse error if `xml` is not a valid document.
pub fn must_parse(xml: &[u8]) -> EposDocument {
    match parse(xml) {
        Ok(doc) => doc,
        Err(e) => panic!("must_parse: {}", e),
    }
}

/// Namespace URI of an element if it belongs to the ePOS schema.
fn epos_namespace(ns: &ResolveResult<'_>) -> Option<String> {
    match ns {
        ResolveResult::Bound(uri) => {
            let uri = String::from_utf8_lossy(uri.as_ref());
            uri.contains(EPOS_NAMESPACE_MARKER).then(|| uri.into_owned())
        }
        _ => None,
    }
}

/// Tokenize and unescape every attribute so malformed syntax fails the
/// parse even on elements that are otherwise skipped.
fn check_attributes(e: &BytesStart<'_>) -> Result<(), ParseError> {
    for attr in e.attributes() {
        attr?.unescape_value()?;
    }
    Ok(())
}

/// Image element being accumulated.
struct PendingImage {
    width: i64,
    height: i64,
    data: Vec<u8>,
}

#[derive(Default)]
struct ParserState {
    doc: EposDocument,
    image: Option<PendingImage>,
    /// Qualified names of open elements, for the unclosed-element check.
    open: Vec<String>,
}

impl ParserState {
    fn start(&mut self, namespace: Option<String>, e: &BytesStart<'_>) -> Result<(), ParseError> {
        check_attributes(e)?;
        let Some(namespace) = namespace else {
            return Ok(());
        };

        match e.local_name().as_ref() {
            ROOT => self.doc.root_namespace = Some(namespace),
            PULSE => self.doc.instructions.push(Instruction::Pulse),
            CUT => self.doc.instructions.push(Instruction::Cut),
            IMAGE => {
                let mut image = PendingImage {
                    width: 0,
                    height: 0,
                    data: Vec::new(),
                };
                for attr in e.attributes() {
                    let attr = attr?;
                    match attr.key.local_name().as_ref() {
                        b"width" => image.width = lenient_int(&attr.unescape_value()?),
                        b"height" => image.height = lenient_int(&attr.unescape_value()?),
                        _ => {}
                    }
                }
                self.image = Some(image);
            }
            _ => {}
        }
        Ok(())
    }

    fn text(&mut self, chunk: &str) -> Result<(), ParseError> {
        let Some(image) = self.image.as_mut() else {
            return Ok(());
        };

        let chunk = chunk.trim();
        if !chunk.is_empty() {
            let decoded = STANDARD.decode(chunk)?;
            image.data.extend_from_slice(&decoded);
        }
        Ok(())
    }

    fn end(&mut self, in_epos: bool, local_name: &[u8]) -> Result<(), ParseError> {
        if !in_epos || local_name != IMAGE {
            return Ok(());
        }
        let Some(image) = self.image.take() else {
            return Ok(());
        };

        let expected = Image::expected_len(image.width, image.height);
        let actual = image.data.len();
        if i64::try_from(actual).ok() != Some(expected) {
            return Err(ParseError::SizeMismatch {
                expected,
                actual,
                width: image.width,
                height: image.height,
            });
        }

        self.doc.instructions.push(Instruction::Image(Image {
            width: image.width,
            height: image.height,
            data: image.data,
        }));
        Ok(())
    }
}

/// Read a leading decimal integer, defaulting to 0.
///
/// Leading whitespace and a sign are accepted, trailing junk is ignored
/// (`"8px"` reads as 8). Anything without digits, or out of range, is 0.
fn lenient_int(value: &str) -> i64 {
    let value = value.trim_start();
    let (negative, rest) = match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    };

    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    match rest[..digits].parse::<i64>() {
        Ok(n) if negative => -n,
        Ok(n) => n,
        Err(_) => 0,
    }
}

// ============================================================================
// TESTS
// ============================================================================
