//! Export helpers: filenames, data URLs, and file output.

use base64::Engine;
use std::path::Path;

use crate::error::CartolinaError;

/// Slugify a card title for use in a filename: lowercase, alphanumerics
/// kept, everything else collapsed to single dashes.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for ch in title.chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            for lower in ch.to_lowercase() {
                slug.push(lower);
            }
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Download filename for a rendered card.
pub fn filename(title: &str) -> String {
    let slug = slugify(title);
    if slug.is_empty() {
        "valentine-card.png".to_string()
    } else {
        format!("valentine-card-{slug}.png")
    }
}

/// Encode PNG bytes as a `data:image/png;base64,…` URL for the preview API.
pub fn data_url(png: &[u8]) -> String {
    let engine = base64::engine::general_purpose::STANDARD;
    format!("data:image/png;base64,{}", engine.encode(png))
}

/// Write PNG bytes to disk.
pub fn save(path: &Path, png: &[u8]) -> Result<(), CartolinaError> {
    std::fs::write(path, png)?;
    Ok(())
}
