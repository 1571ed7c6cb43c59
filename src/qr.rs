//! QR payload encoding.
//!
//! Turns a destination URL into a scannable RGBA bitmap: opaque black modules
//! on a transparent background, scaled to a fixed output width. The transform
//! is pure and deterministic, so identical input always yields a byte-identical
//! bitmap.

use image::{imageops, ImageBuffer, Rgba, RgbaImage};
use qrcode::{EcLevel, QrCode};

use crate::error::CartolinaError;

/// Fixed edge length of the encoded QR bitmap in pixels.
pub const QR_WIDTH: u32 = 500;

/// Quiet zone around the code, in modules.
pub const QUIET_ZONE: u32 = 2;

/// Error-correction level used for card payloads.
pub const EC_LEVEL: EcLevel = EcLevel::M;

/// Encode a destination URL as a [`QR_WIDTH`]-wide RGBA bitmap.
///
/// Fails with [`CartolinaError::Encoding`] when the payload exceeds the
/// QR capacity for [`EC_LEVEL`]; no partial output is produced.
pub fn encode(url: &str) -> Result<RgbaImage, CartolinaError> {
    let code = QrCode::with_error_correction_level(url.as_bytes(), EC_LEVEL)
        .map_err(|e| CartolinaError::Encoding(format!("{url:.64}: {e}")))?;
    Ok(render(&code, QR_WIDTH, QUIET_ZONE))
}

/// Number of modules per side, including the quiet zone, for a payload.
///
/// Used by callers that need to locate module centers inside a rendered card.
pub fn module_count(url: &str) -> Result<u32, CartolinaError> {
    let code = QrCode::with_error_correction_level(url.as_bytes(), EC_LEVEL)
        .map_err(|e| CartolinaError::Encoding(format!("{url:.64}: {e}")))?;
    Ok(code.width() as u32 + 2 * QUIET_ZONE)
}

/// Render a module matrix to pixels: black on transparent.
///
/// Modules are drawn at a whole number of pixels each, then the bitmap is
/// nearest-neighbor resized to the exact target size so module edges stay
/// crisp and the output stays deterministic.
fn render(code: &QrCode, size: u32, margin: u32) -> RgbaImage {
    let width_modules = code.width() as u32;
    let total_modules = width_modules + 2 * margin;
    let pixels_per_module = (size / total_modules).max(1);
    let actual_size = total_modules * pixels_per_module;

    let clear = Rgba([0, 0, 0, 0]);
    let dark = Rgba([0, 0, 0, 255]);
    let mut img: RgbaImage = ImageBuffer::from_pixel(actual_size, actual_size, clear);

    for y in 0..width_modules {
        for x in 0..width_modules {
            if !matches!(code[(x as usize, y as usize)], qrcode::Color::Dark) {
                continue;
            }
            let px0 = (x + margin) * pixels_per_module;
            let py0 = (y + margin) * pixels_per_module;
            for py in py0..(py0 + pixels_per_module) {
                for px in px0..(px0 + pixels_per_module) {
                    img.put_pixel(px, py, dark);
                }
            }
        }
    }

    if actual_size != size {
        imageops::resize(&img, size, size, imageops::FilterType::Nearest)
    } else {
        img
    }
}

/// The module matrix for a payload as booleans (dark = true), without quiet zone.
///
/// Row-major, `width × width`. This is what a conformant reader recovers from
/// the rendered bitmap, so tests use it to verify the composited QR region.
pub fn module_matrix(url: &str) -> Result<(u32, Vec<bool>), CartolinaError> {
    let code = QrCode::with_error_correction_level(url.as_bytes(), EC_LEVEL)
        .map_err(|e| CartolinaError::Encoding(format!("{url:.64}: {e}")))?;
    let width = code.width();
    let mut modules = Vec::with_capacity(width * width);
    for y in 0..width {
        for x in 0..width {
            modules.push(matches!(code[(x, y)], qrcode::Color::Dark));
        }
    }
    Ok((width as u32, modules))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_is_deterministic() {
        let a = encode("https://example.com/valentine/ab12cd34").unwrap();
        let b = encode("https://example.com/valentine/ab12cd34").unwrap();
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn encode_has_fixed_size() {
        let img = encode("https://example.com/valentine/ab12cd34").unwrap();
        assert_eq!(img.dimensions(), (QR_WIDTH, QR_WIDTH));
    }

    #[test]
    fn encode_is_black_on_transparent() {
        let img = encode("https://example.com/valentine/x").unwrap();
        let mut dark = 0usize;
        let mut clear = 0usize;
        for p in img.pixels() {
            match p.0 {
                [0, 0, 0, 255] => dark += 1,
                [_, _, _, 0] => clear += 1,
                other => panic!("unexpected pixel {other:?}"),
            }
        }
        assert!(dark > 0);
        assert!(clear > 0);
    }

    #[test]
    fn oversized_payload_fails() {
        // Far beyond the ~2.3KB capacity of version 40 at level M
        let huge = "x".repeat(8000);
        let err = encode(&huge).unwrap_err();
        assert!(matches!(err, CartolinaError::Encoding(_)));
    }

    #[test]
    fn module_matrix_matches_bitmap() {
        let url = "https://example.com/valentine/ab12cd34";
        let (width, modules) = module_matrix(url).unwrap();
        let img = encode(url).unwrap();

        // Sample each module center through the quiet-zone offset
        let total = width + 2 * QUIET_ZONE;
        let scale = QR_WIDTH as f32 / total as f32;
        for my in 0..width {
            for mx in 0..width {
                let px = ((mx + QUIET_ZONE) as f32 + 0.5) * scale;
                let py = ((my + QUIET_ZONE) as f32 + 0.5) * scale;
                let pixel = img.get_pixel(px as u32, py as u32);
                let dark = pixel.0[3] == 255;
                assert_eq!(
                    dark,
                    modules[(my * width + mx) as usize],
                    "module ({mx},{my}) mismatch"
                );
            }
        }
    }
}
