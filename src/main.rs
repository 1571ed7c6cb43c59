//! # Cartolina CLI
//!
//! Command-line interface for rendering valentine cards and serving the
//! campaign API.
//!
//! ## Usage
//!
//! ```bash
//! # Render a card to disk
//! cartolina render --title "FOR MY LOVE" --slug ab12cd34
//!
//! # Horizontal business-card layout with pre-authored templates
//! cartolina render --title "FOR MY LOVE" --slug ab12cd34 \
//!     --orientation horizontal --assets-dir ./assets
//!
//! # Serve the rendering API
//! cartolina serve --listen 0.0.0.0:8080 --base-url https://example.com
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use cartolina::{
    assets::{AssetSource, AssetStore},
    compose::{parse_hex_color, render_card, CardRequest, CardStyle},
    export,
    layout::Orientation,
    server::{self, RenderConfig, ServerConfig},
    text::FontSet,
    CartolinaError,
};

/// Cartolina - valentine card rendering utility
#[derive(Parser, Debug)]
#[command(name = "cartolina")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a card to a PNG file
    Render {
        /// Card title drawn on the artwork
        #[arg(long)]
        title: String,

        /// Card slug; the QR points at {base-url}/valentine/{slug}
        #[arg(long)]
        slug: String,

        /// Public origin the card pages live under
        #[arg(long, default_value = "https://example.com")]
        base_url: String,

        /// Card orientation: vertical or horizontal
        #[arg(long, default_value = "vertical")]
        orientation: Orientation,

        /// Output file (defaults to the download filename)
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,

        /// Directory with background-{orientation}.png and heart.png
        #[arg(long)]
        assets_dir: Option<PathBuf>,

        /// Remote base URL serving the same asset names
        #[arg(long)]
        assets_url: Option<String>,

        /// Directory with title.ttf / caption.ttf
        #[arg(long)]
        fonts_dir: Option<PathBuf>,

        /// Title color as #rrggbb
        #[arg(long)]
        title_color: Option<String>,
    },

    /// Serve the card rendering API
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "0.0.0.0:8080")]
        listen: String,

        /// Public origin the card pages live under
        #[arg(long, default_value = "https://example.com")]
        base_url: String,

        /// Directory with background-{orientation}.png and heart.png
        #[arg(long)]
        assets_dir: Option<PathBuf>,

        /// Remote base URL serving the same asset names
        #[arg(long)]
        assets_url: Option<String>,

        /// Directory with title.ttf / caption.ttf
        #[arg(long)]
        fonts_dir: Option<PathBuf>,
    },
}

/// Pick the asset source: explicit URL wins, then a directory, then builtin.
/// Env vars back the flags so the server container needs no arguments.
fn asset_source(assets_dir: Option<PathBuf>, assets_url: Option<String>) -> AssetSource {
    let assets_url =
        assets_url.or_else(|| std::env::var("CARTOLINA_ASSETS_URL").ok().filter(|s| !s.is_empty()));
    if let Some(url) = assets_url {
        return AssetSource::Url(url);
    }
    let assets_dir = assets_dir.or_else(|| {
        std::env::var("CARTOLINA_ASSETS_DIR")
            .ok()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
    });
    match assets_dir {
        Some(dir) => AssetSource::Dir(dir),
        None => AssetSource::Builtin,
    }
}

fn fonts_dir_or_env(fonts_dir: Option<PathBuf>) -> Option<PathBuf> {
    fonts_dir.or_else(|| {
        std::env::var("CARTOLINA_FONTS_DIR")
            .ok()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
    })
}

fn base_url_or_env(base_url: String) -> String {
    std::env::var("CARTOLINA_BASE_URL")
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or(base_url)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CartolinaError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            title,
            slug,
            base_url,
            orientation,
            out,
            assets_dir,
            assets_url,
            fonts_dir,
            title_color,
        } => {
            let store = AssetStore::new(asset_source(assets_dir, assets_url));
            let fonts = FontSet::load(fonts_dir_or_env(fonts_dir).as_deref());

            let mut style = CardStyle::default();
            if let Some(color) = title_color {
                style.title_color = parse_hex_color(&color)?;
            }

            let base = base_url_or_env(base_url);
            let req = CardRequest {
                destination_url: format!(
                    "{}/valentine/{}",
                    base.trim_end_matches('/'),
                    slug.trim()
                ),
                title,
                orientation,
            };

            let card = render_card(&req, &store, &fonts, &style).await?;
            let out = out.unwrap_or_else(|| PathBuf::from(export::filename(&req.title)));
            export::save(&out, &card.png)?;

            println!(
                "Wrote {} ({}x{}{})",
                out.display(),
                card.width,
                card.height,
                if card.degraded { ", degraded" } else { "" }
            );
            Ok(())
        }

        Commands::Serve {
            listen,
            base_url,
            assets_dir,
            assets_url,
            fonts_dir,
        } => {
            let config = ServerConfig {
                listen_addr: listen,
                render: RenderConfig {
                    base_url: base_url_or_env(base_url),
                    assets: asset_source(assets_dir, assets_url),
                    fonts_dir: fonts_dir_or_env(fonts_dir),
                },
            };
            server::serve(config).await
        }
    }
}
