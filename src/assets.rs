//! Asset loading for card composition.
//!
//! A card needs three raster resources: a background template selected by
//! orientation, the QR bitmap, and a heart glyph. The loader produces the
//! first and last; the QR bitmap comes from [`crate::qr`]. Loads are issued
//! concurrently and joined: composition never starts until every resource
//! has resolved, and any single failure fails the whole primary load so the
//! compositor can take its degraded path instead.
//!
//! Three sources are supported: `builtin` procedural art (the crate is
//! self-contained out of the box), a directory of pre-authored PNGs, and
//! remote URLs. Remote fetches carry an explicit timeout so a hung load
//! degrades instead of stalling the render forever.

use image::{ImageBuffer, Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::CartolinaError;
use crate::layout::Orientation;

/// Per-fetch timeout for remote assets.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Edge length of the procedurally generated heart glyph.
const BUILTIN_HEART_SIZE: u32 = 512;

/// The three read-only raster resources a composition consumes.
pub struct AssetSet {
    pub background: RgbaImage,
    pub qr_code: RgbaImage,
    pub heart_glyph: RgbaImage,
}

/// Where background templates and the heart glyph come from.
#[derive(Debug, Clone)]
pub enum AssetSource {
    /// Procedurally generated template and heart.
    Builtin,
    /// Pre-authored PNGs on disk: `background-{orientation}.png`, `heart.png`.
    Dir(PathBuf),
    /// Remote base URL serving the same file names.
    Url(String),
}

/// Loader for background and heart assets.
pub struct AssetStore {
    source: AssetSource,
    http: reqwest::Client,
}

impl AssetStore {
    pub fn new(source: AssetSource) -> AssetStore {
        AssetStore {
            source,
            http: reqwest::Client::new(),
        }
    }

    pub fn source(&self) -> &AssetSource {
        &self.source
    }

    /// Load the background template and heart glyph concurrently.
    ///
    /// Both loads run in parallel and are joined; the first failure wins and
    /// fails the pair.
    pub async fn load(
        &self,
        orientation: Orientation,
    ) -> Result<(RgbaImage, RgbaImage), CartolinaError> {
        tokio::try_join!(self.background(orientation), self.heart())
    }

    async fn background(&self, orientation: Orientation) -> Result<RgbaImage, CartolinaError> {
        let name = format!("background-{orientation}.png");
        match &self.source {
            AssetSource::Builtin => Ok(builtin_background(orientation)),
            AssetSource::Dir(dir) => read_image(&dir.join(&name)).await,
            AssetSource::Url(base) => self.fetch_image(&join_url(base, &name)).await,
        }
    }

    async fn heart(&self) -> Result<RgbaImage, CartolinaError> {
        match &self.source {
            AssetSource::Builtin => Ok(builtin_heart(BUILTIN_HEART_SIZE)),
            AssetSource::Dir(dir) => read_image(&dir.join("heart.png")).await,
            AssetSource::Url(base) => self.fetch_image(&join_url(base, "heart.png")).await,
        }
    }

    /// Fetch and decode a remote image, bounded by [`FETCH_TIMEOUT`].
    async fn fetch_image(&self, url: &str) -> Result<RgbaImage, CartolinaError> {
        let fetch = async {
            let resp = self
                .http
                .get(url)
                .send()
                .await
                .map_err(|e| CartolinaError::AssetLoad(format!("fetch {url}: {e}")))?;
            if !resp.status().is_success() {
                return Err(CartolinaError::AssetLoad(format!(
                    "fetch {url}: http {}",
                    resp.status()
                )));
            }
            resp.bytes()
                .await
                .map_err(|e| CartolinaError::AssetLoad(format!("fetch {url}: {e}")))
        };
        let bytes = tokio::time::timeout(FETCH_TIMEOUT, fetch)
            .await
            .map_err(|_| CartolinaError::AssetLoad(format!("fetch {url}: timed out")))??;
        decode(&bytes, url)
    }
}

async fn read_image(path: &Path) -> Result<RgbaImage, CartolinaError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| CartolinaError::AssetLoad(format!("read {}: {e}", path.display())))?;
    decode(&bytes, &path.display().to_string())
}

fn decode(bytes: &[u8], what: &str) -> Result<RgbaImage, CartolinaError> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| CartolinaError::AssetLoad(format!("decode {what}: {e}")))?;
    Ok(img.to_rgba8())
}

fn join_url(base: &str, name: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), name)
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Procedural background template: a soft cream-to-blush vertical blend.
///
/// Generated at the exact surface dimensions for the orientation, so the
/// compositor's stretch-to-fill is a no-op for the builtin source.
pub fn builtin_background(orientation: Orientation) -> RgbaImage {
    let (width, height) = orientation.surface_size();
    let top = [255.0f32, 247.0, 240.0]; // cream
    let bottom = [255.0f32, 214.0, 225.0]; // blush

    ImageBuffer::from_fn(width, height, |_x, y| {
        let t = y as f32 / (height - 1) as f32;
        Rgba([
            lerp(top[0], bottom[0], t) as u8,
            lerp(top[1], bottom[1], t) as u8,
            lerp(top[2], bottom[2], t) as u8,
            255,
        ])
    })
}

/// Procedural heart glyph on a transparent background.
///
/// Fills the classic implicit heart curve `(x² + y² − 1)³ − x²·y³ ≤ 0`,
/// sampled 2×2 per pixel for soft edges.
pub fn builtin_heart(size: u32) -> RgbaImage {
    let crimson = [214u8, 51, 108];
    let s = size as f32;

    ImageBuffer::from_fn(size, size, |px, py| {
        let mut hits = 0u32;
        for (ox, oy) in [(0.25f32, 0.25f32), (0.75, 0.25), (0.25, 0.75), (0.75, 0.75)] {
            // Map pixel space to curve space: x in [-1.4, 1.4], y up, lobes at top
            let x = ((px as f32 + ox) / s) * 2.8 - 1.4;
            let y = 1.35 - ((py as f32 + oy) / s) * 2.6;
            if is_inside_heart(x, y) {
                hits += 1;
            }
        }
        let alpha = (hits * 255 / 4) as u8;
        Rgba([crimson[0], crimson[1], crimson[2], alpha])
    })
}

/// Check if a point is inside the implicit heart curve.
fn is_inside_heart(x: f32, y: f32) -> bool {
    let a = x * x + y * y - 1.0;
    a * a * a - x * x * y * y * y <= 0.0
}
