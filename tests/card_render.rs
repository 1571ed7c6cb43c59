//! # Card Rendering Integration Tests
//!
//! End-to-end checks of the compositor against the fixed card geometry:
//! surface dimensions, determinism, the degraded fallback, and that the
//! QR region of a finished card still reproduces the encoded module
//! matrix, i.e. remains scannable.

use pretty_assertions::assert_eq;

use cartolina::assets::{builtin_background, builtin_heart, AssetSet, AssetSource, AssetStore};
use cartolina::compose::{
    compose, compose_or_fallback, render_card, CardRequest, CardStyle, FALLBACK_SIZE,
};
use cartolina::error::CartolinaError;
use cartolina::layout::Orientation;
use cartolina::qr;
use cartolina::text::FontSet;

const DEST_URL: &str = "https://example.com/valentine/ab12cd34";

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn request(orientation: Orientation) -> CardRequest {
    CardRequest {
        destination_url: DEST_URL.to_string(),
        title: "FOR MY LOVE".to_string(),
        orientation,
    }
}

fn assets(orientation: Orientation) -> AssetSet {
    AssetSet {
        background: builtin_background(orientation),
        qr_code: qr::encode(DEST_URL).unwrap(),
        heart_glyph: builtin_heart(512),
    }
}

fn render(orientation: Orientation) -> image::RgbaImage {
    compose(
        &request(orientation),
        &assets(orientation),
        &FontSet::bitmap(),
        &CardStyle::default(),
    )
    .unwrap()
}

// ============================================================================
// SURFACE DIMENSIONS
// ============================================================================

#[test]
fn vertical_card_is_600_by_1050() {
    assert_eq!(render(Orientation::Vertical).dimensions(), (600, 1050));
}

#[test]
fn horizontal_card_is_1050_by_600() {
    assert_eq!(render(Orientation::Horizontal).dimensions(), (1050, 600));
}

#[test]
fn dimensions_ignore_title_content() {
    for title in ["", "X", "A TITLE LONG ENOUGH TO SPILL OVER EVERY EDGE OF THE CARD TWICE"] {
        let mut req = request(Orientation::Vertical);
        req.title = title.to_string();
        let img = compose(
            &req,
            &assets(Orientation::Vertical),
            &FontSet::bitmap(),
            &CardStyle::default(),
        )
        .unwrap();
        assert_eq!(img.dimensions(), (600, 1050), "title {title:?}");
    }
}

// ============================================================================
// DETERMINISM
// ============================================================================

#[test]
fn identical_requests_produce_identical_pngs() {
    let run = || {
        compose_or_fallback(
            &request(Orientation::Vertical),
            Ok(assets(Orientation::Vertical)),
            &FontSet::bitmap(),
            &CardStyle::default(),
        )
        .unwrap()
    };
    let a = run();
    let b = run();
    assert!(!a.degraded);
    assert_eq!(a.png, b.png);
}

#[test]
fn qr_encoding_is_deterministic() {
    let a = qr::encode(DEST_URL).unwrap();
    let b = qr::encode(DEST_URL).unwrap();
    assert_eq!(a.as_raw(), b.as_raw());
}

// ============================================================================
// QR REGION SCANNABILITY
// ============================================================================

/// Sample the composited card at every module center of the QR region and
/// compare against the encoded matrix. Dark modules land as opaque black,
/// light modules let the (red-saturated) background template through, so
/// the red channel discriminates exactly.
fn verify_qr_region(orientation: Orientation) {
    let img = render(orientation);
    let layout = orientation.layout().resolve();

    let (width, modules) = qr::module_matrix(DEST_URL).unwrap();
    let total = width + 2 * qr::QUIET_ZONE;
    let scale = layout.qr.size as f32 / total as f32;

    let mut mismatches = 0usize;
    for my in 0..width {
        for mx in 0..width {
            let px = layout.qr.x as f32 + ((mx + qr::QUIET_ZONE) as f32 + 0.5) * scale;
            let py = layout.qr.y as f32 + ((my + qr::QUIET_ZONE) as f32 + 0.5) * scale;
            let pixel = img.get_pixel(px as u32, py as u32).0;
            let sampled_dark = pixel[0] < 128;
            if sampled_dark != modules[(my * width + mx) as usize] {
                mismatches += 1;
            }
        }
    }

    // Nearest-neighbor scaling can nudge a handful of borderline centers;
    // a conformant reader tolerates far more than this.
    let allowed = (width * width / 100).max(1) as usize;
    assert!(
        mismatches <= allowed,
        "{mismatches} of {} modules mismatched (allowed {allowed})",
        width * width
    );
}

#[test]
fn vertical_qr_region_matches_encoded_modules() {
    verify_qr_region(Orientation::Vertical);
}

#[test]
fn horizontal_qr_region_matches_encoded_modules() {
    verify_qr_region(Orientation::Horizontal);
}

#[test]
fn vertical_qr_sits_in_the_middle_band() {
    // The 13%-78% height band holds the scannable code
    let layout = Orientation::Vertical.layout().resolve();
    assert!(layout.qr.y as f32 >= 0.13 * 1050.0 - 1.0);
    assert!((layout.qr.y + layout.qr.size) as f32 <= 0.78 * 1050.0);
}

// ============================================================================
// TITLE AND CROP MARKS
// ============================================================================

#[test]
fn vertical_title_ink_in_top_band() {
    let img = render(Orientation::Vertical);
    // Title is centered at (50%, 10%); the band ends above the QR's top edge
    let ink = (60u32..130)
        .flat_map(|y| (100u32..500).map(move |x| (x, y)))
        .filter(|&(x, y)| img.get_pixel(x, y).0[0] < 200)
        .count();
    assert!(ink > 0, "expected rendered title text in the top band");
}

#[test]
fn crop_marks_present_in_all_four_corners() {
    let img = render(Orientation::Vertical);
    let (w, h) = img.dimensions();
    for (x, y) in [(15, 5), (w - 15, 5), (15, h - 7), (w - 15, h - 7)] {
        let p = img.get_pixel(x, y).0;
        assert_eq!(
            (p[0], p[1], p[2]),
            (180, 180, 180),
            "expected crop mark stroke at ({x},{y})"
        );
    }
}

// ============================================================================
// DEGRADED FALLBACK
// ============================================================================

#[tokio::test]
async fn asset_failure_still_yields_an_image() {
    // Every asset load fails: the store points at a directory that is not there
    let store = AssetStore::new(AssetSource::Dir("/nonexistent/assets".into()));
    let card = render_card(
        &request(Orientation::Vertical),
        &store,
        &FontSet::bitmap(),
        &CardStyle::default(),
    )
    .await
    .unwrap();

    assert!(card.degraded);
    assert_eq!((card.width, card.height), FALLBACK_SIZE);
    assert!(!card.png.is_empty());
}

#[tokio::test]
async fn fallback_contains_title_not_error_state() {
    let store = AssetStore::new(AssetSource::Dir("/nonexistent/assets".into()));
    let card = render_card(
        &request(Orientation::Vertical),
        &store,
        &FontSet::bitmap(),
        &CardStyle::default(),
    )
    .await
    .unwrap();

    let img = image::load_from_memory(&card.png).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), FALLBACK_SIZE);
    let style = CardStyle::default();
    let ink = img
        .pixels()
        .filter(|p| p.0 != style.fallback_background.0)
        .count();
    assert!(ink > 0, "placeholder should carry the rendered title");
}

#[tokio::test]
async fn oversized_payload_is_the_only_hard_failure() {
    let store = AssetStore::new(AssetSource::Builtin);
    let mut req = request(Orientation::Vertical);
    req.destination_url = format!("https://example.com/valentine/{}", "x".repeat(8000));
    let err = render_card(&req, &store, &FontSet::bitmap(), &CardStyle::default())
        .await
        .unwrap_err();
    assert!(matches!(err, CartolinaError::Encoding(_)));
}

// ============================================================================
// FULL PIPELINE
// ============================================================================

#[tokio::test]
async fn builtin_render_end_to_end() {
    let store = AssetStore::new(AssetSource::Builtin);
    let card = render_card(
        &request(Orientation::Vertical),
        &store,
        &FontSet::bitmap(),
        &CardStyle::default(),
    )
    .await
    .unwrap();

    assert!(!card.degraded);
    assert_eq!((card.width, card.height), (600, 1050));

    // The PNG decodes back to the same surface dimensions
    let img = image::load_from_memory(&card.png).unwrap();
    assert_eq!(image::GenericImageView::dimensions(&img), (600, 1050));
}
