//! Server state and configuration.

use std::path::PathBuf;

use crate::assets::{AssetSource, AssetStore};
use crate::text::FontSet;

/// Everything a render needs to know besides the request itself.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Public origin the card pages live under, e.g. "https://example.com".
    /// Destination URLs are `{base_url}/valentine/{slug}`.
    pub base_url: String,
    /// Where background templates and the heart glyph come from.
    pub assets: AssetSource,
    /// Directory holding `title.ttf` / `caption.ttf`. None = bitmap fonts.
    pub fonts_dir: Option<PathBuf>,
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:8080")
    pub listen_addr: String,
    pub render: RenderConfig,
}

/// Application state shared across handlers.
pub struct AppState {
    pub config: ServerConfig,
    pub store: AssetStore,
    pub fonts: FontSet,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let store = AssetStore::new(config.render.assets.clone());
        let fonts = FontSet::load(config.render.fonts_dir.as_deref());
        Self {
            config,
            store,
            fonts,
        }
    }
}
