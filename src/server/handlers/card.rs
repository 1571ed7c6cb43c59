//! Card rendering API handlers.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::compose::{parse_hex_color, render_card, CardRequest, CardStyle};
use crate::error::CartolinaError;
use crate::export;
use crate::layout::Orientation;

use super::super::state::AppState;

fn default_orientation() -> Orientation {
    Orientation::Vertical
}

/// Request body for render and preview endpoints.
#[derive(Debug, Deserialize)]
pub struct CardForm {
    /// Opaque card identifier; the destination URL becomes
    /// `{base_url}/valentine/{slug}`.
    pub slug: String,
    /// Human-entered card title.
    pub title: String,
    #[serde(default = "default_orientation")]
    pub orientation: Orientation,
    /// Optional `#rrggbb` override for the title color.
    pub title_color: Option<String>,
}

/// Response from the preview endpoint.
#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    /// `data:image/png;base64,…`
    pub data_url: String,
    pub width: u32,
    pub height: u32,
    /// True when the degraded placeholder path produced the image.
    pub degraded: bool,
    pub filename: String,
}

/// Build the compositor inputs from a form, validating as we go.
fn build_request(
    state: &AppState,
    form: &CardForm,
) -> Result<(CardRequest, CardStyle), (StatusCode, String)> {
    let slug = form.slug.trim();
    if slug.is_empty() || slug.contains('/') || slug.contains(char::is_whitespace) {
        return Err((StatusCode::BAD_REQUEST, "invalid slug".to_string()));
    }

    let base = state.config.render.base_url.trim_end_matches('/');
    let req = CardRequest {
        destination_url: format!("{base}/valentine/{slug}"),
        title: form.title.trim().to_string(),
        orientation: form.orientation,
    };

    let mut style = CardStyle::default();
    if let Some(color) = &form.title_color {
        style.title_color = parse_hex_color(color)
            .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    }

    Ok((req, style))
}

fn map_render_error(e: CartolinaError) -> (StatusCode, String) {
    match e {
        // The QR payload itself is unusable; the client must fix the input
        CartolinaError::Encoding(_) => (StatusCode::BAD_REQUEST, e.to_string()),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

/// POST /api/card/render - render a card and return it as a PNG download.
pub async fn render(
    State(state): State<Arc<AppState>>,
    Json(form): Json<CardForm>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let (req, style) = build_request(&state, &form)?;

    let card = render_card(&req, &state.store, &state.fonts, &style)
        .await
        .map_err(map_render_error)?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("image/png"),
    );
    let disposition = format!("attachment; filename=\"{}\"", export::filename(&form.title));
    headers.insert(
        header::CONTENT_DISPOSITION,
        header::HeaderValue::from_str(&disposition)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?,
    );
    Ok((headers, card.png))
}

/// POST /api/card/preview - render a card and return it as a data URL.
pub async fn preview(
    State(state): State<Arc<AppState>>,
    Json(form): Json<CardForm>,
) -> Result<Json<PreviewResponse>, (StatusCode, String)> {
    let (req, style) = build_request(&state, &form)?;

    let card = render_card(&req, &state.store, &state.fonts, &style)
        .await
        .map_err(map_render_error)?;

    Ok(Json(PreviewResponse {
        data_url: export::data_url(&card.png),
        width: card.width,
        height: card.height,
        degraded: card.degraded,
        filename: export::filename(&form.title),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetSource;
    use crate::server::state::{RenderConfig, ServerConfig};

    fn test_state() -> AppState {
        AppState::new(ServerConfig {
            listen_addr: "127.0.0.1:0".to_string(),
            render: RenderConfig {
                base_url: "https://example.com/".to_string(),
                assets: AssetSource::Builtin,
                fonts_dir: None,
            },
        })
    }

    fn form(slug: &str) -> CardForm {
        CardForm {
            slug: slug.to_string(),
            title: "FOR MY LOVE".to_string(),
            orientation: Orientation::Vertical,
            title_color: None,
        }
    }

    #[test]
    fn build_request_constructs_destination_url() {
        let state = test_state();
        let (req, _) = build_request(&state, &form("ab12cd34")).unwrap();
        assert_eq!(req.destination_url, "https://example.com/valentine/ab12cd34");
    }

    #[test]
    fn build_request_rejects_bad_slugs() {
        let state = test_state();
        for bad in ["", "  ", "a/b", "a b"] {
            let err = build_request(&state, &form(bad)).unwrap_err();
            assert_eq!(err.0, StatusCode::BAD_REQUEST, "slug {bad:?}");
        }
    }

    #[test]
    fn build_request_parses_title_color() {
        let state = test_state();
        let mut f = form("ab12cd34");
        f.title_color = Some("#112233".to_string());
        let (_, style) = build_request(&state, &f).unwrap();
        assert_eq!(style.title_color.0, [0x11, 0x22, 0x33, 255]);

        f.title_color = Some("nope".to_string());
        assert!(build_request(&state, &f).is_err());
    }
}
