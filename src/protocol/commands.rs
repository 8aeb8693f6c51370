//! # ESC/POS Protocol Commands
//!
//! Fixed command sequences understood by Epson TM-series receipt printers
//! (and the many clones that speak ESC/POS).
//!
//! ## Escape Sequence Structure
//!
//! Commands are byte sequences starting with a prefix byte:
//! - `ESC` (0x1B) for printing and mechanism control: `ESC d n`, `ESC p m t1 t2`
//! - `GS` (0x1D) for graphics and the cutter: `GS V m`, `GS v 0 m ...`
//!
//! ## Byte Order
//!
//! Multi-byte integers use **little-endian** encoding:
//! - `u16` value 0x1234 is sent as bytes `[0x34, 0x12]`
//!
//! ## Reference
//!
//! Based on the "ESC/POS Application Programming Guide" by Seiko Epson Corp.

// ============================================================================
// ESCAPE SEQUENCE CONSTANTS
// ============================================================================

/// ESC (Escape) - Command prefix byte
pub const ESC: u8 = 0x1B;

/// GS (Group Separator) - Graphics and cutter command prefix
pub const GS: u8 = 0x1D;

/// Lines fed after a cut so the next receipt starts below the blade.
pub const CUT_FEED_LINES: u8 = 2;

/// Lines fed after a raster image so it clears the tear bar.
pub const IMAGE_FEED_LINES: u8 = 12;

// ============================================================================
// PAPER FEED
// ============================================================================

/// # Print and Feed n Lines (ESC d n)
///
/// Prints the buffer contents and feeds the paper `n` lines.
///
/// ## Protocol Details
///
/// | Format  | Bytes     |
/// |---------|-----------|
/// | ASCII   | ESC d n   |
/// | Hex     | 1B 64 n   |
/// | Decimal | 27 100 n  |
///
/// ## Example
///
/// ```
/// use epos_proxy::protocol::commands;
///
/// assert_eq!(commands::feed(12), [0x1B, 0x64, 12]);
/// ```
#[inline]
pub const fn feed(n: u8) -> [u8; 3] {
    [ESC, b'd', n]
}

// ============================================================================
// CUTTER CONTROL
// ============================================================================

/// # Full Cut (GS V 0)
///
/// Cuts the paper at the current position without feeding first.
///
/// ## Protocol Details
///
/// | Format  | Bytes    |
/// |---------|----------|
/// | ASCII   | GS V NUL |
/// | Hex     | 1D 56 00 |
/// | Decimal | 29 86 0  |
///
/// The printer expects [`cut_feed`] right after, as a separate write.
pub const CUT: [u8; 3] = [GS, b'V', 0x00];

/// Feed that follows [`CUT`] (ESC d 2).
#[inline]
pub const fn cut_feed() -> [u8; 3] {
    feed(CUT_FEED_LINES)
}

/// # Cut Sequence
///
/// [`CUT`] followed by [`cut_feed`] as one buffer. Useful for previews and
/// byte-level assertions; the printer sends the two halves separately.
///
/// ```
/// use epos_proxy::protocol::commands;
///
/// assert_eq!(commands::cut_sequence(), vec![0x1D, b'V', 0x00, 0x1B, 0x64, 2]);
/// ```
pub fn cut_sequence() -> Vec<u8> {
    let mut cmd = Vec::with_capacity(6);
    cmd.extend_from_slice(&CUT);
    cmd.extend_from_slice(&cut_feed());
    cmd
}

// ============================================================================
// CASH DRAWER
// ============================================================================

/// # Generate Pulse (ESC p m t1 t2)
///
/// Fires the drawer kick-out connector.
///
/// ## Protocol Details
///
/// | Format  | Bytes              |
/// |---------|--------------------|
/// | ASCII   | ESC p 0 t1 t2      |
/// | Hex     | 1B 70 00 19 19     |
/// | Decimal | 27 112 0 25 25     |
///
/// ## Parameters
///
/// - `m = 0`: connector pin 2
/// - `t1 = 25`: on time, 25 × 2 ms
/// - `t2 = 25`: off time, 25 × 2 ms
pub const DRAWER_KICK: [u8; 5] = [ESC, b'p', 0x00, 25, 25];

// ============================================================================
// UTILITIES
// ============================================================================

/// Split a u16 into little-endian bytes.
///
/// ```
/// use epos_proxy::protocol::commands::u16_le;
///
/// assert_eq!(u16_le(0x1234), [0x34, 0x12]);
/// assert_eq!(u16_le(72), [0x48, 0x00]);
/// ```
#[inline]
pub const fn u16_le(value: u16) -> [u8; 2] {
    value.to_le_bytes()
}

// ============================================================================
// TESTS
// ============================================================================
