//! Card layout descriptors.
//!
//! Every anchor is a named fraction of the surface width/height so the same
//! resolution logic serves both orientations. Resolving a descriptor against
//! its fixed surface dimensions yields concrete pixel geometry, which keeps
//! the layout testable without touching any rendering backend.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Card aspect mode. Each orientation has fixed pixel dimensions
/// approximating a 3.5×2 inch card at 300 DPI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    /// Fixed surface dimensions in pixels, decided before any drawing occurs.
    pub fn surface_size(self) -> (u32, u32) {
        match self {
            Orientation::Horizontal => (1050, 600),
            Orientation::Vertical => (600, 1050),
        }
    }

    /// The layout descriptor for this orientation.
    pub fn layout(self) -> &'static CardLayout {
        match self {
            Orientation::Horizontal => &HORIZONTAL,
            Orientation::Vertical => &VERTICAL,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Orientation::Horizontal => "horizontal",
            Orientation::Vertical => "vertical",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "horizontal" | "h" => Ok(Orientation::Horizontal),
            "vertical" | "v" => Ok(Orientation::Vertical),
            other => Err(format!("unknown orientation: {other}")),
        }
    }
}

/// An anchor point expressed as fractions of surface width and height.
#[derive(Debug, Clone, Copy)]
pub struct Anchor {
    pub x: f32,
    pub y: f32,
}

/// How the QR code's edge length is derived from the surface.
#[derive(Debug, Clone, Copy)]
pub enum QrSpan {
    /// Fraction of surface width.
    OfWidth(f32),
    /// Fraction of surface height.
    OfHeight(f32),
}

/// Declarative layout for one orientation.
///
/// Fractions live here so the drawing code contains no inline magic numbers.
#[derive(Debug, Clone, Copy)]
pub struct CardLayout {
    /// Fixed surface dimensions (width, height).
    pub surface: (u32, u32),
    /// Center point of the title line.
    pub title: Anchor,
    /// Title text height in pixels.
    pub title_px: f32,
    /// QR edge length rule.
    pub qr_span: QrSpan,
    /// Horizontal center of the QR code as a fraction of width.
    pub qr_center_x: f32,
    /// Top edge of the QR code as a fraction of height.
    pub qr_top: f32,
    /// Caption text height in pixels.
    pub caption_px: f32,
    /// Gap between the QR bottom edge and the caption, in pixels.
    pub caption_gap: u32,
    /// Center point of the heart glyph.
    pub heart: Anchor,
    /// Heart glyph edge length in pixels (fixed per orientation).
    pub heart_px: u32,
}

/// Business-card layout: title and QR share the left column, heart on the right.
pub const HORIZONTAL: CardLayout = CardLayout {
    surface: (1050, 600),
    title: Anchor { x: 0.30, y: 0.13 },
    title_px: 56.0,
    qr_span: QrSpan::OfHeight(0.68),
    qr_center_x: 0.30,
    qr_top: 0.20,
    caption_px: 24.0,
    caption_gap: 14,
    heart: Anchor { x: 0.75, y: 0.50 },
    heart_px: 260,
};

/// Portrait layout: title, QR and heart stacked down the center.
pub const VERTICAL: CardLayout = CardLayout {
    surface: (600, 1050),
    title: Anchor { x: 0.50, y: 0.10 },
    title_px: 64.0,
    qr_span: QrSpan::OfWidth(0.65),
    qr_center_x: 0.50,
    qr_top: 0.13,
    caption_px: 26.0,
    caption_gap: 16,
    heart: Anchor { x: 0.50, y: 0.64 },
    heart_px: 320,
};

/// Crop mark arm length in pixels.
pub const CROP_ARM: u32 = 30;
/// Crop mark margin from each corner in pixels.
pub const CROP_MARGIN: u32 = 5;
/// Crop mark stroke thickness in pixels (fractional part anti-aliased).
pub const CROP_STROKE: f32 = 1.5;

/// A square region in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QrRect {
    pub x: u32,
    pub y: u32,
    pub size: u32,
}

/// Concrete pixel geometry resolved from a [`CardLayout`].
#[derive(Debug, Clone, Copy)]
pub struct ResolvedLayout {
    pub width: u32,
    pub height: u32,
    /// Title line center.
    pub title_center: (i32, i32),
    pub title_px: f32,
    pub qr: QrRect,
    /// Caption is centered on this x and top-aligned at this y.
    pub caption_center_x: i32,
    pub caption_top: i32,
    pub caption_px: f32,
    /// Heart glyph center.
    pub heart_center: (i32, i32),
    pub heart_px: u32,
}

impl CardLayout {
    /// Resolve fractional anchors against the fixed surface dimensions.
    pub fn resolve(&self) -> ResolvedLayout {
        let (w, h) = self.surface;
        let (wf, hf) = (w as f32, h as f32);

        let qr_size = match self.qr_span {
            QrSpan::OfWidth(frac) => (wf * frac).round() as u32,
            QrSpan::OfHeight(frac) => (hf * frac).round() as u32,
        };
        let qr_center_x = wf * self.qr_center_x;
        let qr_x = (qr_center_x - qr_size as f32 / 2.0).round().max(0.0) as u32;
        let qr_y = (hf * self.qr_top).round() as u32;

        ResolvedLayout {
            width: w,
            height: h,
            title_center: (
                (wf * self.title.x).round() as i32,
                (hf * self.title.y).round() as i32,
            ),
            title_px: self.title_px,
            qr: QrRect {
                x: qr_x,
                y: qr_y,
                size: qr_size,
            },
            caption_center_x: qr_center_x.round() as i32,
            caption_top: (qr_y + qr_size + self.caption_gap) as i32,
            caption_px: self.caption_px,
            heart_center: (
                (wf * self.heart.x).round() as i32,
                (hf * self.heart.y).round() as i32,
            ),
            heart_px: self.heart_px,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_sizes_are_fixed() {
        assert_eq!(Orientation::Horizontal.surface_size(), (1050, 600));
        assert_eq!(Orientation::Vertical.surface_size(), (600, 1050));
    }

    #[test]
    fn orientation_parses() {
        assert_eq!("vertical".parse::<Orientation>(), Ok(Orientation::Vertical));
        assert_eq!("H".parse::<Orientation>(), Ok(Orientation::Horizontal));
        assert!("diagonal".parse::<Orientation>().is_err());
    }

    #[test]
    fn vertical_resolution() {
        let r = VERTICAL.resolve();
        assert_eq!((r.width, r.height), (600, 1050));
        // Title centered at 50% / 10%
        assert_eq!(r.title_center, (300, 105));
        // QR: 65% of width, horizontally centered, top at 13% of height
        assert_eq!(r.qr.size, 390);
        assert_eq!(r.qr.x, 105);
        assert_eq!(r.qr.y, 137);
        // Heart: 320px centered horizontally at 64% of height
        assert_eq!(r.heart_center, (300, 672));
        assert_eq!(r.heart_px, 320);
    }

    #[test]
    fn horizontal_resolution() {
        let r = HORIZONTAL.resolve();
        assert_eq!((r.width, r.height), (1050, 600));
        assert_eq!(r.title_center, (315, 78));
        // QR: 68% of height, centered on the title column
        assert_eq!(r.qr.size, 408);
        assert_eq!(r.qr.x, 111);
        // Heart vertically centered at 75% of width
        assert_eq!(r.heart_center, (788, 300));
        assert_eq!(r.heart_px, 260);
    }

    #[test]
    fn caption_sits_below_qr() {
        for layout in [&HORIZONTAL, &VERTICAL] {
            let r = layout.resolve();
            assert_eq!(r.caption_top as u32, r.qr.y + r.qr.size + layout.caption_gap);
            assert!((r.caption_top as u32) < r.height);
        }
    }

    #[test]
    fn qr_fits_inside_surface() {
        for layout in [&HORIZONTAL, &VERTICAL] {
            let r = layout.resolve();
            assert!(r.qr.x + r.qr.size <= r.width);
            assert!(r.qr.y + r.qr.size <= r.height);
        }
    }
}
