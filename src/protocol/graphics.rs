//! # ESC/POS Raster Graphics
//!
//! Encodes a 1-bit bitmap as a `GS v 0` raster command, centering images
//! that are narrower than the paper.
//!
//! ## Bit Packing
//!
//! Graphics data is packed as bytes where each bit represents one dot:
//! - Bit 7 (MSB) = leftmost dot
//! - Bit 0 (LSB) = rightmost dot
//! - 1 = black (print), 0 = white (no print)
//!
//! ```text
//! Byte value 0xF0 = 11110000 = ████░░░░
//! Byte value 0x0F = 00001111 = ░░░░████
//! ```
//!
//! ## Centering
//!
//! The printer starts every raster row at the left margin. An image
//! narrower than the paper is padded with blank bytes on both sides so it
//! lands in the middle:
//!
//! ```text
//! paper_width_bytes = 8, width_bytes = 3
//!
//! ┌──┬──┬──┬──┬──┬──┬──┬──┐
//! │00│00│d0│d1│d2│00│00│00│   left = (8 - 3) / 2 = 2
//! └──┴──┴──┴──┴──┴──┴──┴──┘   right = 8 - 3 - 2  = 3
//! ```
//!
//! The odd byte always goes to the right.

use super::commands::{GS, IMAGE_FEED_LINES, feed, u16_le};
use crate::error::ProxyError;

/// Raster command prefix: `GS v 0 m` with `m = 0` (normal density).
pub const RASTER_PREFIX: [u8; 4] = [GS, b'v', b'0', 0x00];

/// Raster bytes ready to be wrapped in a `GS v 0` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    /// Bytes per row
    pub width_bytes: usize,
    /// Number of rows
    pub height: usize,
    /// Row-major packed data, `width_bytes * height` bytes
    pub data: Vec<u8>,
}

/// Pad every row of a `width_bytes`-wide bitmap out to `paper_width_bytes`.
///
/// ## Errors
///
/// Returns [`ProxyError::Validation`] if `data` holds fewer than
/// `width_bytes * height` bytes, if a row would read past the end, or if
/// the padded output is too large to allocate.
///
/// ## Example
///
/// ```
/// use epos_proxy::protocol::graphics::center;
///
/// let out = center(&[1, 2, 3, 4], 4, 8, 1)?;
/// assert_eq!(out, vec![0, 0, 1, 2, 3, 4, 0, 0]);
/// # Ok::<(), epos_proxy::error::ProxyError>(())
/// ```
pub fn center(
    data: &[u8],
    width_bytes: usize,
    paper_width_bytes: usize,
    height: usize,
) -> Result<Vec<u8>, ProxyError> {
    let expected_len = width_bytes.checked_mul(height).ok_or_else(|| {
        ProxyError::Validation(format!(
            "center: image size overflows ({} bytes x {} rows)",
            width_bytes, height
        ))
    })?;
    if data.len() < expected_len {
        return Err(ProxyError::Validation(format!(
            "center: data too short: got {} bytes, need {} bytes",
            data.len(),
            expected_len
        )));
    }

    let spare = paper_width_bytes.saturating_sub(width_bytes);
    let left = spare / 2;
    let right = spare - left;

    let row_len = left + width_bytes + right;
    let out_len = row_len.checked_mul(height).ok_or_else(|| {
        ProxyError::Validation(format!(
            "center: centered image overflows ({} bytes x {} rows)",
            row_len, height
        ))
    })?;
    let mut centered = Vec::new();
    centered.try_reserve(out_len).map_err(|e| {
        ProxyError::Validation(format!("center: cannot allocate {} bytes: {}", out_len, e))
    })?;

    for y in 0..height {
        let start = y * width_bytes;
        let row = data
            .get(start..start + width_bytes)
            .ok_or_else(|| ProxyError::Validation(format!("center: row out of bounds at y={}", y)))?;

        centered.resize(centered.len() + left, 0);
        centered.extend_from_slice(row);
        centered.resize(centered.len() + right, 0);
    }

    Ok(centered)
}

/// Validate an image against its declared size and fit it to the paper.
///
/// - Data beyond `(width / 8) * height` bytes is dropped.
/// - Images narrower than `receipt_width` are centered and widened to
///   `receipt_width / 8` bytes per row.
/// - Images as wide or wider than the paper pass through untouched.
///
/// ## Errors
///
/// [`ProxyError::Validation`] for negative dimensions, data shorter than
/// the declared size, or a centered image too large to allocate.
pub fn layout(
    data: &[u8],
    width: i64,
    height: i64,
    receipt_width: usize,
) -> Result<Raster, ProxyError> {
    let (Ok(width), Ok(height)) = (usize::try_from(width), usize::try_from(height)) else {
        return Err(ProxyError::Validation(format!(
            "negative image dimensions: {}x{}",
            width, height
        )));
    };

    let width_bytes = width / 8;
    let required = width_bytes.checked_mul(height).ok_or_else(|| {
        ProxyError::Validation(format!("image size overflows: {}x{}", width, height))
    })?;
    if data.len() < required {
        return Err(ProxyError::Validation(format!(
            "data too short: got {} bytes, need {} bytes",
            data.len(),
            required
        )));
    }
    let data = &data[..required];

    if width < receipt_width {
        let paper_width_bytes = receipt_width / 8;
        return Ok(Raster {
            width_bytes: paper_width_bytes,
            height,
            data: center(data, width_bytes, paper_width_bytes, height)?,
        });
    }

    Ok(Raster {
        width_bytes,
        height,
        data: data.to_vec(),
    })
}

/// # Print Raster Bit Image (GS v 0 m xL xH yL yH d1...dk)
///
/// ## Protocol Details
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | GS v 0 m xL xH yL yH d1...dk |
/// | Hex     | 1D 76 30 00 xL xH yL yH d1...dk |
///
/// - `xL, xH`: bytes per row, little-endian
/// - `yL, yH`: rows, little-endian
///
/// Both are truncated to 16 bits; larger values wrap. The command is
/// followed by `ESC d 12` so the image clears the tear bar.
///
/// ## Example
///
/// ```
/// use epos_proxy::protocol::graphics::{Raster, raster_command};
///
/// let raster = Raster { width_bytes: 72, height: 500, data: vec![0; 72 * 500] };
/// let cmd = raster_command(&raster);
///
/// assert_eq!(&cmd[0..4], &[0x1D, 0x76, 0x30, 0x00]);
/// assert_eq!(&cmd[4..8], &[72, 0, 0xF4, 0x01]);
/// assert_eq!(&cmd[cmd.len() - 3..], &[0x1B, 0x64, 12]);
/// ```
pub fn raster_command(raster: &Raster) -> Vec<u8> {
    let [xl, xh] = u16_le(raster.width_bytes as u16);
    let [yl, yh] = u16_le(raster.height as u16);
    let feed = feed(IMAGE_FEED_LINES);

    let mut cmd = Vec::with_capacity(RASTER_PREFIX.len() + 4 + raster.data.len() + feed.len());
    cmd.extend_from_slice(&RASTER_PREFIX);
    cmd.extend_from_slice(&[xl, xh, yl, yh]);
    cmd.extend_from_slice(&raster.data);
    cmd.extend_from_slice(&feed);
    cmd
}

/// [`layout`] then [`raster_command`]: the full byte sequence for one image.
pub fn encode_image(
    data: &[u8],
    width: i64,
    height: i64,
    receipt_width: usize,
) -> Result<Vec<u8>, ProxyError> {
    Ok(raster_command(&layout(data, width, height, receipt_width)?))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const RECEIPT_WIDTH: usize = 576;

    #[test]
    fn test_center_single_row() {
        let out = center(&[1, 2, 3, 4], 4, 8, 1).unwrap();
        assert_eq!(out, vec![0, 0, 1, 2, 3, 4, 0, 0]);
    }

    #[test]
    fn test_center_multi_row() {
        let out = center(&[1, 2, 3, 4], 2, 4, 2).unwrap();
        assert_eq!(out, vec![0, 1, 2, 0, 0, 3, 4, 0]);
    }

    #[test]
    fn test_center_asymmetric_padding() {
        let out = center(&[1, 2, 3], 3, 8, 1).unwrap();
        assert_eq!(out, vec![0, 0, 1, 2, 3, 0, 0, 0]);
    }

    #[test]
    fn test_center_exact_size() {
        let out = center(&[1, 2, 3, 4], 4, 4, 1).unwrap();
        assert_eq!(out, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_center_data_too_short() {
        let err = center(&[1, 2], 4, 8, 1).unwrap_err();
        assert!(matches!(err, ProxyError::Validation(_)));
        assert!(err.to_string().contains("data too short"));
    }

    #[test]
    fn test_center_zero_height() {
        assert!(center(&[], 4, 8, 0).unwrap().is_empty());
    }

    #[test]
    fn test_center_ignores_trailing_bytes() {
        let out = center(&[1, 2, 9, 9], 2, 4, 1).unwrap();
        assert_eq!(out, vec![0, 1, 2, 0]);
    }

    #[test]
    fn test_center_output_size_overflows() {
        let err = center(&[], 0, 72, usize::MAX).unwrap_err();
        assert!(matches!(err, ProxyError::Validation(_)));
        assert!(err.to_string().contains("overflows"));
    }

    #[test]
    fn test_center_unallocatable_output() {
        let paper_width_bytes = isize::MAX as usize + 1;
        let err = center(&[], 0, paper_width_bytes, 1).unwrap_err();
        assert!(matches!(err, ProxyError::Validation(_)));
        assert!(err.to_string().contains("cannot allocate"));
    }

    #[test]
    fn test_layout_full_width_untouched() {
        let data: Vec<u8> = (0..72).map(|i| i as u8).collect();
        let raster = layout(&data, 576, 1, RECEIPT_WIDTH).unwrap();

        assert_eq!(raster.width_bytes, 72);
        assert_eq!(raster.height, 1);
        assert_eq!(raster.data, data);
    }

    #[test]
    fn test_layout_centers_narrow_image() {
        let data: Vec<u8> = (1..=8).collect();
        let raster = layout(&data, 64, 1, RECEIPT_WIDTH).unwrap();

        assert_eq!(raster.width_bytes, 72);
        assert_eq!(raster.data.len(), 72);
        assert!(raster.data[..32].iter().all(|&b| b == 0));
        assert_eq!(&raster.data[32..40], &data[..]);
        assert!(raster.data[40..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_layout_oversized_not_clipped() {
        let data = vec![0xFF; 80 * 2];
        let raster = layout(&data, 640, 2, RECEIPT_WIDTH).unwrap();
        assert_eq!(raster.width_bytes, 80);
        assert_eq!(raster.data.len(), 160);
    }

    #[test]
    fn test_layout_truncates_extra_data() {
        let data = vec![0xAA; 72 + 10];
        let raster = layout(&data, 576, 1, RECEIPT_WIDTH).unwrap();
        assert_eq!(raster.data.len(), 72);
    }

    #[test]
    fn test_layout_data_too_short() {
        let err = layout(&[0; 10], 576, 1, RECEIPT_WIDTH).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: data too short: got 10 bytes, need 72 bytes"
        );
    }

    #[test]
    fn test_layout_negative_dimensions() {
        assert!(matches!(
            layout(&[], -8, 0, RECEIPT_WIDTH),
            Err(ProxyError::Validation(_))
        ));
    }

    #[test]
    fn test_layout_narrow_image_absurd_height() {
        // Zero bytes per row, so no data is needed, but centering widens every row
        let height = 1_000_000_000_000_000_000;
        assert!(matches!(
            layout(&[], 7, height, RECEIPT_WIDTH),
            Err(ProxyError::Validation(_))
        ));
        assert!(matches!(
            encode_image(&[], 7, height, RECEIPT_WIDTH),
            Err(ProxyError::Validation(_))
        ));
    }

    #[test]
    fn test_raster_command_header() {
        let data = vec![0x55; 72 * 3];
        let cmd = encode_image(&data, 576, 3, RECEIPT_WIDTH).unwrap();

        assert_eq!(&cmd[0..4], &RASTER_PREFIX);
        assert_eq!(&cmd[4..8], &[72, 0, 3, 0]);
        assert_eq!(&cmd[8..8 + data.len()], &data[..]);
        assert_eq!(&cmd[8 + data.len()..], &[0x1B, 0x64, 12]);
    }

    #[test]
    fn test_raster_command_dimensions_round_trip() {
        let (width, height) = (576usize, 300usize);
        let data = vec![0; width / 8 * height];
        let cmd = encode_image(&data, width as i64, height as i64, RECEIPT_WIDTH).unwrap();

        let width_bytes = u16::from_le_bytes([cmd[4], cmd[5]]) as usize;
        let rows = u16::from_le_bytes([cmd[6], cmd[7]]) as usize;
        assert_eq!(width_bytes, width / 8);
        assert_eq!(rows, height);
    }

    #[test]
    fn test_raster_command_header_wraps() {
        let raster = Raster {
            width_bytes: 1,
            height: 65536 + 5,
            data: Vec::new(),
        };
        let cmd = raster_command(&raster);
        assert_eq!(&cmd[6..8], &[5, 0]);
    }

    #[test]
    fn test_raster_command_centered_header_uses_paper_width() {
        let cmd = encode_image(&[0xFF; 8], 64, 1, RECEIPT_WIDTH).unwrap();
        assert_eq!(&cmd[4..6], &[72, 0]);
        assert_eq!(cmd.len(), 4 + 4 + 72 + 3);
    }
}
