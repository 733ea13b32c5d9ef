//! # Raster Pipeline
//!
//! Everything between "a picture or a string" and "packed monochrome bits
//! the printer understands":
//!
//! - [`ImageSource`] — the injected capability that acquires images
//!   (filesystem/URL) and renders text into pixels. The compiler depends
//!   only on this trait, keeping it deterministic and platform-free.
//! - [`prepare`] — rotation and width scaling of a grayscale image.
//! - [`to_monochrome`] — 1-bit conversion, with or without error
//!   diffusion.
//! - [`BitRaster`] — the packed result handed to a
//!   [`crate::protocol::CommandSet`].
//!
//! ## Bit Packing
//!
//! Raster data is packed row-major, one bit per dot: bit 7 (MSB) is the
//! leftmost dot of the byte, and a set bit prints black.
//!
//! ```text
//! Byte value 0xF0 = 11110000 = ████░░░░
//! Byte value 0xAA = 10101010 = █░█░█░█░
//! ```

use image::{GrayImage, imageops};
use spleen_font::{FONT_6X12, FONT_12X24, PSF2Font};

use crate::error::LuceroError;

/// Luminance cutoff for "dark enough to print".
const BLACK_THRESHOLD: f32 = 128.0;

// ============================================================================
// TYPES
// ============================================================================

/// Rotation applied to a bitmap before printing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BitmapRotation {
    #[default]
    Normal,
    /// 90° counter-clockwise
    Left90,
    /// 90° clockwise
    Right90,
    Rotate180,
}

/// A packed 1-bit raster ready for a graphics command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitRaster {
    /// Width in dots. Rows are padded to whole bytes.
    pub width_dots: u16,
    /// Height in dots (rows).
    pub height: u16,
    /// Row-major packed data, `ceil(width_dots / 8) * height` bytes.
    pub data: Vec<u8>,
}

// ============================================================================
// IMAGE SOURCE CAPABILITY
// ============================================================================

/// Platform capability for acquiring raster images.
///
/// Implementations load images from wherever the platform keeps them and
/// lay out text in a monospace font. Both operations return an 8-bit
/// grayscale raster; the compiler owns everything downstream of that.
pub trait ImageSource {
    /// Load an image from a path or URL.
    fn load(&self, location: &str) -> Result<GrayImage, LuceroError>;

    /// Render a string into pixels at roughly `font_size` dots per line,
    /// wrapped to `width` dots.
    fn render_text(&self, text: &str, font_size: f32, width: u32) -> Result<GrayImage, LuceroError>;
}

/// Decode an in-memory encoded image (PNG, JPEG, ...) to grayscale.
pub fn decode_bytes(bytes: &[u8]) -> Result<GrayImage, LuceroError> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| LuceroError::Image(format!("Failed to decode image bytes: {e}")))?;
    Ok(img.into_luma8())
}

// ============================================================================
// GEOMETRY
// ============================================================================

/// Rotate and scale a grayscale image for printing.
///
/// Rotation is applied first, then the image is scaled to `target_width`
/// dots. With `both_scale` the height follows proportionally; without it
/// only the width changes (the original's asymmetric-stretch behavior).
pub fn prepare(
    img: &GrayImage,
    target_width: u32,
    both_scale: bool,
    rotation: BitmapRotation,
) -> GrayImage {
    let rotated = match rotation {
        BitmapRotation::Normal => img.clone(),
        BitmapRotation::Left90 => imageops::rotate270(img),
        BitmapRotation::Right90 => imageops::rotate90(img),
        BitmapRotation::Rotate180 => imageops::rotate180(img),
    };

    if rotated.width() == target_width || rotated.width() == 0 || target_width == 0 {
        return rotated;
    }

    let target_height = if both_scale {
        let aspect = rotated.height() as f64 / rotated.width() as f64;
        ((target_width as f64 * aspect).round() as u32).max(1)
    } else {
        rotated.height()
    };

    imageops::resize(
        &rotated,
        target_width,
        target_height,
        imageops::FilterType::Triangle,
    )
}

// ============================================================================
// 1-BIT CONVERSION
// ============================================================================

/// Convert a grayscale image to a packed monochrome raster.
///
/// With `diffusion` the conversion uses Floyd-Steinberg error diffusion:
/// each pixel's quantization error is pushed onto its right and lower
/// neighbors, which preserves midtones as dot density. Without it a plain
/// 50% threshold is applied, which keeps line art and text crisp.
pub fn to_monochrome(img: &GrayImage, diffusion: bool) -> BitRaster {
    let width = img.width() as usize;
    let height = img.height() as usize;
    let width_bytes = width.div_ceil(8);

    let mut luma: Vec<f32> = img.pixels().map(|p| p.0[0] as f32).collect();
    let mut data = vec![0u8; width_bytes * height];

    for y in 0..height {
        for x in 0..width {
            let idx = y * width + x;
            let old = luma[idx];
            let black = old < BLACK_THRESHOLD;
            if black {
                data[y * width_bytes + x / 8] |= 0x80 >> (x % 8);
            }

            if diffusion {
                // Quantized output: black prints as 0, white as 255.
                let new = if black { 0.0 } else { 255.0 };
                let err = old - new;
                //        x  7/16
                // 3/16 5/16 1/16
                if x + 1 < width {
                    luma[idx + 1] += err * 7.0 / 16.0;
                }
                if y + 1 < height {
                    let below = idx + width;
                    if x > 0 {
                        luma[below - 1] += err * 3.0 / 16.0;
                    }
                    luma[below] += err * 5.0 / 16.0;
                    if x + 1 < width {
                        luma[below + 1] += err * 1.0 / 16.0;
                    }
                }
            }
        }
    }

    BitRaster {
        width_dots: width as u16,
        height: height as u16,
        data,
    }
}

// ============================================================================
// FILESYSTEM IMAGE SOURCE
// ============================================================================

/// The default [`ImageSource`]: images from the local filesystem (plus
/// HTTP(S) URLs with the `http` feature), text through the Spleen bitmap
/// fonts.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsImageSource;

impl ImageSource for FsImageSource {
    fn load(&self, location: &str) -> Result<GrayImage, LuceroError> {
        if location.starts_with("http://") || location.starts_with("https://") {
            return load_url(location);
        }
        let img = image::open(location)
            .map_err(|e| LuceroError::Image(format!("Failed to load {location}: {e}")))?;
        Ok(img.into_luma8())
    }

    fn render_text(&self, text: &str, font_size: f32, width: u32) -> Result<GrayImage, LuceroError> {
        render_text_spleen(text, font_size, width)
    }
}

#[cfg(feature = "http")]
fn load_url(url: &str) -> Result<GrayImage, LuceroError> {
    let bytes = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .and_then(|r| r.bytes())
        .map_err(|e| LuceroError::Image(format!("Failed to fetch {url}: {e}")))?;
    decode_bytes(&bytes)
}

#[cfg(not(feature = "http"))]
fn load_url(url: &str) -> Result<GrayImage, LuceroError> {
    Err(LuceroError::Image(format!(
        "URL sources require the `http` feature: {url}"
    )))
}

/// Lay out `text` in a Spleen bitmap font, integer-scaled to approximate
/// `font_size` dots of line height, wrapped at `width` dots.
///
/// Small sizes use the 6x12 face, everything else 12x24; the remaining
/// gap to `font_size` is closed by integer block scaling, which keeps
/// glyph edges crisp on a 1-bit device.
fn render_text_spleen(text: &str, font_size: f32, width: u32) -> Result<GrayImage, LuceroError> {
    let (face, glyph_w, glyph_h) = if font_size < 16.0 {
        (FONT_6X12, 6u32, 12u32)
    } else {
        (FONT_12X24, 12u32, 24u32)
    };
    let scale = ((font_size / glyph_h as f32).round() as u32).max(1);
    let cell_w = glyph_w * scale;
    let cell_h = glyph_h * scale;
    let cols = (width / cell_w).max(1) as usize;

    // Hard newlines first, then wrap each paragraph at the column count.
    let mut lines: Vec<Vec<char>> = Vec::new();
    for paragraph in text.split('\n') {
        let chars: Vec<char> = paragraph.chars().collect();
        if chars.is_empty() {
            lines.push(Vec::new());
        } else {
            for chunk in chars.chunks(cols) {
                lines.push(chunk.to_vec());
            }
        }
    }

    let height = (lines.len() as u32 * cell_h).max(cell_h);
    let mut img = GrayImage::from_pixel(width.max(cell_w), height, image::Luma([255u8]));

    let mut font = PSF2Font::new(face).unwrap();

    for (line_no, line) in lines.iter().enumerate() {
        for (col, ch) in line.iter().enumerate() {
            let origin_x = col as u32 * cell_w;
            let origin_y = line_no as u32 * cell_h;
            let utf8 = ch.to_string();
            let Some(glyph) = font.glyph_for_utf8(utf8.as_bytes()) else {
                continue; // unmapped glyph renders as blank
            };
            for (row_y, row) in glyph.enumerate() {
                for (col_x, on) in row.enumerate() {
                    if !on {
                        continue;
                    }
                    // Integer-scale each glyph dot to a scale x scale block.
                    for dy in 0..scale {
                        for dx in 0..scale {
                            let px = origin_x + col_x as u32 * scale + dx;
                            let py = origin_y + row_y as u32 * scale + dy;
                            if px < img.width() && py < img.height() {
                                img.put_pixel(px, py, image::Luma([0u8]));
                            }
                        }
                    }
                }
            }
        }
    }

    Ok(img)
}

// ============================================================================
// TESTS
// ============================================================================
