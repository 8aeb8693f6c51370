//! # Receipt Preview Renderer
//!
//! Renders an [`EposDocument`] to a grayscale image showing what the
//! receipt would look like, without touching a printer.
//!
//! ## Layout
//!
//! ```text
//! EposDocument → graphics::layout (same centering as the printer) → GrayImage
//!                     ↓
//!               Per instruction:
//!               - Image: blit the centered raster, top to bottom
//!               - Cut:   dashed separator band
//!               - Pulse: nothing on paper
//! ```
//!
//! Rasters wider than the receipt are clipped on the right. Black pixels
//! are set bits.
//!
//! ## Example
//!
//! ```
//! use epos_proxy::document::EposDocument;
//! use epos_proxy::preview::render;
//!
//! let image = render(&EposDocument::new(), 576)?;
//! assert_eq!(image.dimensions(), (576, 1));
//! # Ok::<(), epos_proxy::error::ProxyError>(())
//! ```

use std::path::Path;

use image::{GrayImage, ImageFormat, Luma};
use tracing::debug;

use crate::document::{EposDocument, Instruction};
use crate::error::ProxyError;
use crate::protocol::graphics::{Raster, layout};

const BLACK: Luma<u8> = Luma([0]);
const WHITE: Luma<u8> = Luma([255]);

/// Rows taken by a cut marker
const CUT_BAND_HEIGHT: usize = 4;

enum Block {
    Raster(Raster),
    Cut,
}

impl Block {
    fn height(&self) -> usize {
        match self {
            Block::Raster(raster) => raster.height,
            Block::Cut => CUT_BAND_HEIGHT,
        }
    }
}

/// Render a document at `receipt_width` dots.
///
/// ## Errors
///
/// [`ProxyError::Validation`] if an image fails the same size checks the
/// printer applies.
pub fn render(document: &EposDocument, receipt_width: usize) -> Result<GrayImage, ProxyError> {
    let mut blocks = Vec::new();
    for instruction in document {
        match instruction {
            Instruction::Image(image) => blocks.push(Block::Raster(layout(
                &image.data,
                image.width,
                image.height,
                receipt_width,
            )?)),
            Instruction::Cut => blocks.push(Block::Cut),
            Instruction::Pulse => {}
        }
    }

    let height = blocks.iter().map(Block::height).sum::<usize>().max(1);
    let (w, h) = dimensions(receipt_width, height)?;
    let mut img = GrayImage::from_pixel(w, h, WHITE);

    let mut y = 0;
    for block in &blocks {
        match block {
            Block::Raster(raster) => blit(&mut img, raster, y),
            Block::Cut => draw_cut(&mut img, y),
        }
        y += block.height();
    }

    debug!(width = w, height = h, blocks = blocks.len(), "preview rendered");
    Ok(img)
}

/// Write a rendered preview as PNG.
pub fn save_png(path: impl AsRef<Path>, image: &GrayImage) -> Result<(), ProxyError> {
    image
        .save_with_format(path, ImageFormat::Png)
        .map_err(|e| ProxyError::Image(e.to_string()))
}

fn dimensions(width: usize, height: usize) -> Result<(u32, u32), ProxyError> {
    match (u32::try_from(width), u32::try_from(height)) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(ProxyError::Image(format!(
            "preview too large: {}x{}",
            width, height
        ))),
    }
}

fn blit(img: &mut GrayImage, raster: &Raster, top: usize) {
    let width = img.width() as usize;
    for row in 0..raster.height {
        let Some(bytes) = raster
            .data
            .get(row * raster.width_bytes..(row + 1) * raster.width_bytes)
        else {
            return;
        };

        for (bx, byte) in bytes.iter().enumerate() {
            for bit in 0..8 {
                let x = bx * 8 + bit;
                if x >= width {
                    break;
                }
                if byte & (0x80 >> bit) != 0 {
                    img.put_pixel(x as u32, (top + row) as u32, BLACK);
                }
            }
        }
    }
}

/// Dashed line, 8 on 8 off, two rows thick, centered in the band.
fn draw_cut(img: &mut GrayImage, top: usize) {
    for y in top + 1..top + 3 {
        for x in 0..img.width() {
            if (x / 8) % 2 == 0 {
                img.put_pixel(x, y as u32, BLACK);
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Image;
    use pretty_assertions::assert_eq;

    fn doc(instructions: Vec<Instruction>) -> EposDocument {
        EposDocument {
            root_namespace: None,
            instructions,
        }
    }

    fn is_black(img: &GrayImage, x: u32, y: u32) -> bool {
        img.get_pixel(x, y) == &BLACK
    }

    #[test]
    fn test_empty_document() {
        let img = render(&EposDocument::new(), 576).unwrap();
        assert_eq!(img.dimensions(), (576, 1));
        assert!(img.pixels().all(|p| *p == WHITE));
    }

    #[test]
    fn test_pulse_draws_nothing() {
        let img = render(&doc(vec![Instruction::Pulse]), 64).unwrap();
        assert_eq!(img.dimensions(), (64, 1));
    }

    #[test]
    fn test_image_is_centered() {
        // 16 dots wide on a 64 dot receipt: 3 blank bytes on the left
        let img = render(
            &doc(vec![Instruction::Image(Image {
                width: 16,
                height: 2,
                data: vec![0xFF, 0xFF, 0x80, 0x01],
            })]),
            64,
        )
        .unwrap();

        assert_eq!(img.dimensions(), (64, 2));
        assert!(!is_black(&img, 23, 0));
        assert!((24..40).all(|x| is_black(&img, x, 0)));
        assert!(!is_black(&img, 40, 0));

        assert!(is_black(&img, 24, 1));
        assert!(!is_black(&img, 25, 1));
        assert!(is_black(&img, 39, 1));
    }

    #[test]
    fn test_wide_image_is_clipped() {
        let img = render(
            &doc(vec![Instruction::Image(Image {
                width: 32,
                height: 1,
                data: vec![0xFF; 4],
            })]),
            16,
        )
        .unwrap();

        assert_eq!(img.dimensions(), (16, 1));
        assert!(img.pixels().all(|p| *p == BLACK));
    }

    #[test]
    fn test_cut_band_follows_image() {
        let img = render(
            &doc(vec![
                Instruction::Image(Image {
                    width: 16,
                    height: 1,
                    data: vec![0, 0],
                }),
                Instruction::Cut,
            ]),
            32,
        )
        .unwrap();

        assert_eq!(img.dimensions(), (32, 1 + CUT_BAND_HEIGHT as u32));
        assert!(is_black(&img, 0, 2));
        assert!(!is_black(&img, 8, 2));
        assert!(is_black(&img, 16, 3));
        assert!(!is_black(&img, 0, 4));
    }

    #[test]
    fn test_bad_image_is_rejected() {
        let err = render(
            &doc(vec![Instruction::Image(Image {
                width: -8,
                height: 1,
                data: vec![],
            })]),
            576,
        )
        .unwrap_err();
        assert!(matches!(err, ProxyError::Validation(_)));
    }

    #[test]
    fn test_narrow_image_with_absurd_height_is_rejected() {
        let err = render(
            &doc(vec![Instruction::Image(Image {
                width: 7,
                height: 1_000_000_000_000_000_000,
                data: vec![],
            })]),
            576,
        )
        .unwrap_err();
        assert!(matches!(err, ProxyError::Validation(_)));
    }

    #[test]
    fn test_save_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("receipt.png");

        let img = render(&doc(vec![Instruction::Cut]), 64).unwrap();
        save_png(&path, &img).unwrap();

        let loaded = image::open(&path).unwrap().to_luma8();
        assert_eq!(loaded, img);
    }
}
