//! The card compositor.
//!
//! Layers a fully loaded [`AssetSet`] onto a freshly allocated surface in a
//! deterministic single pass: background stretched to fill, then title, QR,
//! caption, heart, and finally the corner crop marks. Drawing primitives are
//! stateless free functions taking explicit style parameters, so steps can
//! be reordered or tested in isolation without hidden context state.
//!
//! Errors never escape the compositor boundary: when asset loading or a
//! drawing step fails, [`compose_or_fallback`] renders a minimal placeholder
//! card instead and records the failure as a structured warning. The caller
//! always receives some image.

use image::{imageops, ImageBuffer, Rgba, RgbaImage};

use crate::assets::{AssetSet, AssetStore};
use crate::error::CartolinaError;
use crate::layout::{Orientation, ResolvedLayout, CROP_ARM, CROP_MARGIN, CROP_STROKE};
use crate::qr;
use crate::text::{render_line, FontSet, TextRender};

/// A card render request. Transient per invocation; never persisted.
#[derive(Debug, Clone)]
pub struct CardRequest {
    /// Absolute URL encoded into the QR code.
    pub destination_url: String,
    /// Human-entered card title.
    pub title: String,
    pub orientation: Orientation,
}

/// Explicit colors for the drawing steps.
#[derive(Debug, Clone)]
pub struct CardStyle {
    pub title_color: Rgba<u8>,
    pub caption_color: Rgba<u8>,
    /// Solid background of the degraded placeholder card.
    pub fallback_background: Rgba<u8>,
}

impl Default for CardStyle {
    fn default() -> Self {
        CardStyle {
            title_color: Rgba([140, 47, 57, 255]),
            caption_color: Rgba([90, 90, 90, 255]),
            fallback_background: Rgba([255, 228, 235, 255]),
        }
    }
}

/// Caption drawn under the QR code.
pub const CAPTION: &str = "Scan to open your valentine";

/// Canvas size of the degraded placeholder card, independent of orientation.
pub const FALLBACK_SIZE: (u32, u32) = (800, 600);

/// Title pixel height on the placeholder card.
const FALLBACK_TITLE_PX: f32 = 48.0;

/// Horizontal padding reserved when fitting text to the surface.
const TEXT_MARGIN: u32 = 40;

/// Crop mark stroke color.
const CROP_COLOR: Rgba<u8> = Rgba([180, 180, 180, 255]);

/// A finished render, PNG-encoded.
#[derive(Debug, Clone)]
pub struct RenderedCard {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// True when the degraded placeholder path produced this image.
    pub degraded: bool,
}

/// Render a card end to end: encode the QR payload, load assets, compose.
///
/// This is the component boundary from the caller's perspective. The only
/// error that escapes is [`CartolinaError::Encoding`], since an oversized
/// QR payload is fatal to the request. Asset and drawing failures degrade
/// to the placeholder card instead.
pub async fn render_card(
    req: &CardRequest,
    store: &AssetStore,
    fonts: &FontSet,
    style: &CardStyle,
) -> Result<RenderedCard, CartolinaError> {
    let qr_code = qr::encode(&req.destination_url)?;

    let assets = store
        .load(req.orientation)
        .await
        .map(|(background, heart_glyph)| AssetSet {
            background,
            qr_code,
            heart_glyph,
        });

    // Composition is CPU work; keep it off the async executor.
    let req = req.clone();
    let fonts = fonts.clone();
    let style = style.clone();
    match tokio::task::spawn_blocking(move || compose_or_fallback(&req, assets, &fonts, &style))
        .await
    {
        Ok(result) => result,
        Err(e) => Err(CartolinaError::Draw(format!("render task: {e}"))),
    }
}

/// Compose the full card, or fall back to the placeholder on any failure.
///
/// The fallback is logged, never surfaced: the admin tool still gets a
/// downloadable image (see the `degraded` flag for observability).
pub fn compose_or_fallback(
    req: &CardRequest,
    assets: Result<AssetSet, CartolinaError>,
    fonts: &FontSet,
    style: &CardStyle,
) -> Result<RenderedCard, CartolinaError> {
    let full = assets.and_then(|assets| {
        let img = compose(req, &assets, fonts, style)?;
        let png = encode_png(&img)?;
        Ok(RenderedCard {
            png,
            width: img.width(),
            height: img.height(),
            degraded: false,
        })
    });

    match full {
        Ok(card) => Ok(card),
        Err(error) => {
            tracing::warn!(
                error = %error,
                orientation = %req.orientation,
                title_len = req.title.chars().count(),
                fallback_size = ?FALLBACK_SIZE,
                "card render degraded to placeholder"
            );
            let img = fallback_card(&req.title, fonts, style);
            let png = encode_png(&img)?;
            Ok(RenderedCard {
                png,
                width: img.width(),
                height: img.height(),
                degraded: true,
            })
        }
    }
}

/// Compose a full-fidelity card from loaded assets.
///
/// Strictly sequential: each layer may overlap the previous one, and crop
/// marks always come last.
pub fn compose(
    req: &CardRequest,
    assets: &AssetSet,
    fonts: &FontSet,
    style: &CardStyle,
) -> Result<RgbaImage, CartolinaError> {
    let layout = req.orientation.layout().resolve();

    if assets.background.width() == 0 || assets.background.height() == 0 {
        return Err(CartolinaError::Draw("background has zero dimensions".into()));
    }
    if assets.qr_code.width() == 0 || assets.heart_glyph.width() == 0 {
        return Err(CartolinaError::Draw("asset has zero dimensions".into()));
    }

    // 1. Background stretched to fill exactly. Templates are pre-authored to
    //    the target ratio, so aspect is intentionally not preserved.
    let mut surface = stretch_to_fill(&assets.background, layout.width, layout.height);

    // 2. Title, centered on its anchor.
    let max_text_width = (layout.width - TEXT_MARGIN) as f32;
    let title = render_line(&fonts.title, &req.title, layout.title_px, max_text_width);
    blit_text_centered(
        &mut surface,
        &title,
        layout.title_center.0,
        layout.title_center.1,
        style.title_color,
    );

    // 3. QR code.
    let qr_img = imageops::resize(
        &assets.qr_code,
        layout.qr.size,
        layout.qr.size,
        imageops::FilterType::Nearest,
    );
    overlay_alpha(&mut surface, &qr_img, layout.qr.x as i32, layout.qr.y as i32);

    // 4. Caption under the QR.
    let caption = render_line(&fonts.caption, CAPTION, layout.caption_px, max_text_width);
    blit_text_top(
        &mut surface,
        &caption,
        layout.caption_center_x,
        layout.caption_top,
        style.caption_color,
    );

    // 5. Heart glyph.
    let heart = imageops::resize(
        &assets.heart_glyph,
        layout.heart_px,
        layout.heart_px,
        imageops::FilterType::Lanczos3,
    );
    overlay_alpha(
        &mut surface,
        &heart,
        layout.heart_center.0 - layout.heart_px as i32 / 2,
        layout.heart_center.1 - layout.heart_px as i32 / 2,
    );

    // 6. Crop marks, always after all content.
    draw_crop_marks(&mut surface, &layout);

    Ok(surface)
}

/// The degraded placeholder: solid background plus the title, nothing else.
pub fn fallback_card(title: &str, fonts: &FontSet, style: &CardStyle) -> RgbaImage {
    let (width, height) = FALLBACK_SIZE;
    let mut surface: RgbaImage = ImageBuffer::from_pixel(width, height, style.fallback_background);

    let max_text_width = (width - TEXT_MARGIN) as f32;
    let line = render_line(&fonts.title, title, FALLBACK_TITLE_PX, max_text_width);
    blit_text_centered(
        &mut surface,
        &line,
        width as i32 / 2,
        height as i32 / 2,
        style.title_color,
    );
    surface
}

/// Encode a surface as PNG bytes.
pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>, CartolinaError> {
    use image::ImageEncoder;
    let mut png = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut png);
    encoder
        .write_image(
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgba8,
        )
        .map_err(|e| CartolinaError::Image(format!("png encode: {e}")))?;
    Ok(png)
}

/// Parse a `#rrggbb` color.
pub fn parse_hex_color(s: &str) -> Result<Rgba<u8>, CartolinaError> {
    let trimmed = s.trim().trim_start_matches('#');
    if trimmed.len() != 6 {
        return Err(CartolinaError::Draw(format!("invalid color: {s}")));
    }
    let bytes =
        hex::decode(trimmed).map_err(|_| CartolinaError::Draw(format!("invalid color: {s}")))?;
    Ok(Rgba([bytes[0], bytes[1], bytes[2], 255]))
}

/// Resize `src` to exactly `width × height`, ignoring aspect ratio.
fn stretch_to_fill(src: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    if src.dimensions() == (width, height) {
        src.clone()
    } else {
        imageops::resize(src, width, height, imageops::FilterType::Lanczos3)
    }
}

/// Alpha-blend `over` onto `base` at (x, y), clipping at the edges.
fn overlay_alpha(base: &mut RgbaImage, over: &RgbaImage, x: i32, y: i32) {
    for oy in 0..over.height() {
        for ox in 0..over.width() {
            let p = over.get_pixel(ox, oy);
            let a = p.0[3] as f32 / 255.0;
            if a <= 0.0 {
                continue;
            }
            let bx = x + ox as i32;
            let by = y + oy as i32;
            if bx < 0 || by < 0 || bx >= base.width() as i32 || by >= base.height() as i32 {
                continue;
            }
            let dst = base.get_pixel_mut(bx as u32, by as u32);
            let inv = 1.0 - a;
            dst.0[0] = (p.0[0] as f32 * a + dst.0[0] as f32 * inv) as u8;
            dst.0[1] = (p.0[1] as f32 * a + dst.0[1] as f32 * inv) as u8;
            dst.0[2] = (p.0[2] as f32 * a + dst.0[2] as f32 * inv) as u8;
            dst.0[3] = 255;
        }
    }
}

/// Blit a text coverage buffer with its center at (cx, cy).
fn blit_text_centered(img: &mut RgbaImage, text: &TextRender, cx: i32, cy: i32, color: Rgba<u8>) {
    let x0 = cx - text.width as i32 / 2;
    let y0 = cy - text.height as i32 / 2;
    blit_text(img, text, x0, y0, color);
}

/// Blit a text coverage buffer centered on cx, top edge at `top`.
fn blit_text_top(img: &mut RgbaImage, text: &TextRender, cx: i32, top: i32, color: Rgba<u8>) {
    let x0 = cx - text.width as i32 / 2;
    blit_text(img, text, x0, top, color);
}

fn blit_text(img: &mut RgbaImage, text: &TextRender, x0: i32, y0: i32, color: Rgba<u8>) {
    for ty in 0..text.height {
        for tx in 0..text.width {
            let coverage = text.data[ty * text.width + tx];
            if coverage <= 0.0 {
                continue;
            }
            let x = x0 + tx as i32;
            let y = y0 + ty as i32;
            if x < 0 || y < 0 || x >= img.width() as i32 || y >= img.height() as i32 {
                continue;
            }
            blend_pixel(img, x as u32, y as u32, color, coverage);
        }
    }
}

fn blend_pixel(img: &mut RgbaImage, x: u32, y: u32, color: Rgba<u8>, alpha: f32) {
    let dst = img.get_pixel_mut(x, y);
    let inv = 1.0 - alpha;
    dst.0[0] = (color.0[0] as f32 * alpha + dst.0[0] as f32 * inv) as u8;
    dst.0[1] = (color.0[1] as f32 * alpha + dst.0[1] as f32 * inv) as u8;
    dst.0[2] = (color.0[2] as f32 * alpha + dst.0[2] as f32 * inv) as u8;
    dst.0[3] = 255;
}

/// Fill a rectangle whose fractional right/bottom edges get partial alpha.
fn fill_soft_rect(img: &mut RgbaImage, x0: u32, y0: u32, w: f32, h: f32, color: Rgba<u8>) {
    let wi = w.ceil() as u32;
    let hi = h.ceil() as u32;
    for dy in 0..hi {
        let ay = (h - dy as f32).clamp(0.0, 1.0);
        for dx in 0..wi {
            let ax = (w - dx as f32).clamp(0.0, 1.0);
            let x = x0 + dx;
            let y = y0 + dy;
            if x < img.width() && y < img.height() {
                blend_pixel(img, x, y, color, ax * ay);
            }
        }
    }
}

/// Four L-shaped crop marks indicating the trim boundary. Purely cosmetic;
/// the only invariant is that they are drawn after all content.
fn draw_crop_marks(img: &mut RgbaImage, layout: &ResolvedLayout) {
    let (w, h) = (layout.width, layout.height);
    let m = CROP_MARGIN;
    let arm = CROP_ARM as f32;
    let stroke = CROP_STROKE;
    let stroke_px = stroke.ceil() as u32;

    // Top-left
    fill_soft_rect(img, m, m, arm, stroke, CROP_COLOR);
    fill_soft_rect(img, m, m, stroke, arm, CROP_COLOR);
    // Top-right
    fill_soft_rect(img, w - m - CROP_ARM, m, arm, stroke, CROP_COLOR);
    fill_soft_rect(img, w - m - stroke_px, m, stroke, arm, CROP_COLOR);
    // Bottom-left
    fill_soft_rect(img, m, h - m - stroke_px, arm, stroke, CROP_COLOR);
    fill_soft_rect(img, m, h - m - CROP_ARM, stroke, arm, CROP_COLOR);
    // Bottom-right
    fill_soft_rect(img, w - m - CROP_ARM, h - m - stroke_px, arm, stroke, CROP_COLOR);
    fill_soft_rect(img, w - m - stroke_px, h - m - CROP_ARM, stroke, arm, CROP_COLOR);
}
