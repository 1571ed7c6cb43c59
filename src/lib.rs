//! # Cartolina - Printable QR Valentine-Card Renderer
//!
//! Cartolina renders the flower shop's "digital valentine card" artwork:
//! a print-ready PNG combining a scannable QR code (pointing at the card's
//! public page), title and caption text, a decorative heart, a background
//! template, and corner crop marks. It provides:
//!
//! - **QR encoding**: URL payloads to black-on-transparent bitmaps
//! - **Asset loading**: builtin procedural art, disk templates, or remote URLs
//! - **Composition**: data-driven per-orientation layout onto a fixed surface
//! - **Export**: PNG downloads, data URLs, slugified filenames
//!
//! ## Quick Start
//!
//! ```no_run
//! use cartolina::assets::{AssetSource, AssetStore};
//! use cartolina::compose::{render_card, CardRequest, CardStyle};
//! use cartolina::layout::Orientation;
//! use cartolina::text::FontSet;
//!
//! # async fn example() -> Result<(), cartolina::CartolinaError> {
//! let store = AssetStore::new(AssetSource::Builtin);
//! let fonts = FontSet::bitmap();
//!
//! let req = CardRequest {
//!     destination_url: "https://example.com/valentine/ab12cd34".into(),
//!     title: "FOR MY LOVE".into(),
//!     orientation: Orientation::Vertical,
//! };
//!
//! let card = render_card(&req, &store, &fonts, &CardStyle::default()).await?;
//! std::fs::write("card.png", &card.png)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`qr`] | QR payload encoding |
//! | [`assets`] | Background/heart loading with fan-out join |
//! | [`layout`] | Per-orientation layout descriptors |
//! | [`text`] | TTF and bitmap text rasterization |
//! | [`compose`] | The compositor and its degraded fallback |
//! | [`export`] | Filenames, data URLs, file output |
//! | [`server`] | HTTP API for the admin campaign tool |
//! | [`error`] | Error types |
//!
//! ## Guarantees
//!
//! Renders are deterministic and stateless per call: identical inputs
//! produce byte-identical PNGs. The compositor never propagates asset or
//! drawing failures; the caller always receives either the full card or
//! a minimal placeholder, with the failure recorded in the logs.

pub mod assets;
pub mod compose;
pub mod error;
pub mod export;
pub mod layout;
pub mod qr;
pub mod server;
pub mod text;

// Re-exports for convenience
pub use compose::{CardRequest, RenderedCard};
pub use error::CartolinaError;
pub use layout::Orientation;
