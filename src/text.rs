//! Text rasterization for card titles and captions.
//!
//! Renders a single line to an anti-aliased f32 coverage buffer which the
//! compositor blits with an explicit color. The primary path uses TTF faces
//! via ab_glyph; when a face is not available the Spleen bitmap font takes
//! over (with a synthetic shear standing in for the italic title face), so
//! text rendering always succeeds. The degraded placeholder card depends
//! on that.

use ab_glyph::{Font, FontArc, ScaleFont};
use spleen_font::{PSF2Font, FONT_12X24};
use std::path::Path;

/// Shear factor applied to the bitmap font when a face asks for italics.
const ITALIC_SHEAR: f32 = 0.18;

/// Spleen 12×24 cell dimensions.
const CELL_W: usize = 12;
const CELL_H: usize = 24;

/// A loaded font face for one text role.
#[derive(Clone)]
pub enum FontFace {
    /// TTF face rasterized with ab_glyph. Italics come from the font file.
    Ttf(FontArc),
    /// Spleen bitmap fallback, optionally sheared into a synthetic italic.
    Bitmap { italic: bool },
}

/// The two faces a card needs: an italic serif/script title face and a
/// plain sans caption face.
#[derive(Clone)]
pub struct FontSet {
    pub title: FontFace,
    pub caption: FontFace,
}

impl FontSet {
    /// Load faces from a fonts directory (`title.ttf` / `caption.ttf`).
    ///
    /// Never fails: a missing or unparsable file falls back to the bitmap
    /// font for that role, with a warning so operators notice.
    pub fn load(fonts_dir: Option<&Path>) -> FontSet {
        FontSet {
            title: load_face(fonts_dir, "title.ttf", true),
            caption: load_face(fonts_dir, "caption.ttf", false),
        }
    }

    /// The all-bitmap set. Used when no fonts directory is configured.
    pub fn bitmap() -> FontSet {
        FontSet {
            title: FontFace::Bitmap { italic: true },
            caption: FontFace::Bitmap { italic: false },
        }
    }
}

fn load_face(fonts_dir: Option<&Path>, file: &str, italic: bool) -> FontFace {
    let Some(dir) = fonts_dir else {
        return FontFace::Bitmap { italic };
    };
    let path = dir.join(file);
    match std::fs::read(&path) {
        Ok(bytes) => match FontArc::try_from_vec(bytes) {
            Ok(font) => FontFace::Ttf(font),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unparsable font, using bitmap fallback");
                FontFace::Bitmap { italic }
            }
        },
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "font not found, using bitmap fallback");
            FontFace::Bitmap { italic }
        }
    }
}

/// Rendered text line as an anti-aliased coverage buffer.
///
/// Intensity values: 0.0 = blank, 1.0 = full ink, intermediate for AA.
pub struct TextRender {
    pub width: usize,
    pub height: usize,
    pub data: Vec<f32>,
}

impl TextRender {
    fn empty() -> TextRender {
        TextRender {
            width: 1,
            height: 1,
            data: vec![0.0],
        }
    }
}

/// Measure the advance width of a line at the given pixel height.
pub fn measure_line(face: &FontFace, text: &str, pixel_height: f32) -> f32 {
    match face {
        FontFace::Ttf(font) => {
            let scaled = font.as_scaled(pixel_height);
            text.chars()
                .map(|ch| scaled.h_advance(font.glyph_id(ch)))
                .sum()
        }
        FontFace::Bitmap { italic } => {
            let scale = pixel_height / CELL_H as f32;
            let cell_w = (CELL_W as f32 * scale).round().max(1.0);
            let shear = if *italic {
                pixel_height * ITALIC_SHEAR
            } else {
                0.0
            };
            text.chars().count() as f32 * cell_w + shear
        }
    }
}

/// Shorten a line with an ellipsis until it fits `max_width`.
pub fn fit_line(face: &FontFace, text: &str, pixel_height: f32, max_width: f32) -> String {
    if measure_line(face, text, pixel_height) <= max_width {
        return text.to_string();
    }
    let ellipsis = "...";
    let mut chars: Vec<char> = text.chars().collect();
    while !chars.is_empty() {
        chars.pop();
        let candidate: String = chars.iter().collect::<String>() + ellipsis;
        if measure_line(face, &candidate, pixel_height) <= max_width {
            return candidate;
        }
    }
    ellipsis.to_string()
}

/// Render a single line of text at the given pixel height.
///
/// The line is ellipsis-truncated to `max_width` first, so the result is
/// always at most `max_width` wide.
pub fn render_line(face: &FontFace, text: &str, pixel_height: f32, max_width: f32) -> TextRender {
    let text = fit_line(face, text, pixel_height, max_width);
    if text.is_empty() {
        return TextRender::empty();
    }
    match face {
        FontFace::Ttf(font) => render_ttf(font, &text, pixel_height),
        FontFace::Bitmap { italic } => render_bitmap(&text, pixel_height, *italic),
    }
}

/// Rasterize with ab_glyph: lay out carets, then draw outline coverage.
fn render_ttf(font: &FontArc, text: &str, pixel_height: f32) -> TextRender {
    let scaled = font.as_scaled(pixel_height);

    let mut glyphs = Vec::new();
    let mut caret_x = 0.0f32;
    for ch in text.chars() {
        let glyph_id = font.glyph_id(ch);
        glyphs.push((glyph_id, caret_x));
        caret_x += scaled.h_advance(glyph_id);
    }

    let width = (caret_x.ceil() as usize).max(1);
    let ascent = scaled.ascent();
    let descent = scaled.descent();
    let height = ((ascent - descent).ceil() as usize).max(1);
    let baseline_y = ascent;

    let mut data = vec![0.0f32; width * height];

    for &(glyph_id, glyph_x) in &glyphs {
        let glyph =
            glyph_id.with_scale_and_position(pixel_height, ab_glyph::point(glyph_x, baseline_y));
        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            outlined.draw(|px, py, coverage| {
                let x = px as i32 + bounds.min.x as i32;
                let y = py as i32 + bounds.min.y as i32;
                if x >= 0 && x < width as i32 && y >= 0 && y < height as i32 {
                    let idx = y as usize * width + x as usize;
                    data[idx] = (data[idx] + coverage).min(1.0);
                }
            });
        }
    }

    TextRender {
        width,
        height,
        data,
    }
}

/// Rasterize with the Spleen 12×24 bitmap font, nearest-neighbor scaled.
fn render_bitmap(text: &str, pixel_height: f32, italic: bool) -> TextRender {
    let scale = pixel_height / CELL_H as f32;
    let cell_w = ((CELL_W as f32 * scale).round() as usize).max(1);
    let cell_h = ((CELL_H as f32 * scale).round() as usize).max(1);

    let chars: Vec<char> = text.chars().collect();
    let base_width = (chars.len() * cell_w).max(1);

    let mut upright = vec![0.0f32; base_width * cell_h];
    let mut spleen = PSF2Font::new(FONT_12X24).unwrap();

    for (i, ch) in chars.iter().enumerate() {
        let mut glyph = vec![0u8; CELL_W * CELL_H];
        let utf8 = ch.to_string();
        if let Some(rows) = spleen.glyph_for_utf8(utf8.as_bytes()) {
            for (row_y, row) in rows.enumerate() {
                for (col_x, on) in row.enumerate() {
                    if row_y < CELL_H && col_x < CELL_W && on {
                        glyph[row_y * CELL_W + col_x] = 1;
                    }
                }
            }
        } else {
            draw_box(&mut glyph, CELL_W, CELL_H);
        }

        // Nearest-neighbor scale into the line buffer
        let x0 = i * cell_w;
        for dy in 0..cell_h {
            let sy = dy * CELL_H / cell_h;
            for dx in 0..cell_w {
                let sx = dx * CELL_W / cell_w;
                if glyph[sy * CELL_W + sx] != 0 {
                    upright[dy * base_width + x0 + dx] = 1.0;
                }
            }
        }
    }

    if !italic {
        return TextRender {
            width: base_width,
            height: cell_h,
            data: upright,
        };
    }

    // Synthetic italic: shear rows rightward, top rows offset the most
    let shear_extra = ((cell_h as f32) * ITALIC_SHEAR).ceil() as usize;
    let width = base_width + shear_extra;
    let mut data = vec![0.0f32; width * cell_h];
    for y in 0..cell_h {
        let offset = (((cell_h - 1 - y) as f32) * ITALIC_SHEAR).round() as usize;
        for x in 0..base_width {
            data[y * width + x + offset] = upright[y * base_width + x];
        }
    }

    TextRender {
        width,
        height: cell_h,
        data,
    }
}

/// Box outline for characters missing from the bitmap font.
fn draw_box(glyph: &mut [u8], width: usize, height: usize) {
    for x in 0..width {
        glyph[x] = 1;
        glyph[(height - 1) * width + x] = 1;
    }
    for y in 0..height {
        glyph[y * width] = 1;
        glyph[y * width + width - 1] = 1;
    }
}
