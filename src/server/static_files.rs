//! The embedded page.
//!
//! `index.html` references its assets as `/assets/<file>?v={{version}}`.
//! The placeholder is filled with the server's boot time, so assets can be
//! cached forever while a restart still reaches every browser.

use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use include_dir::{Dir, include_dir};
use std::sync::Arc;

use super::state::AppState;

static FRONTEND: Dir = include_dir!("$CARGO_MANIFEST_DIR/frontend/dist");

const VERSION_PLACEHOLDER: &str = "{{version}}";

fn render_index(template: &str, version: u64) -> String {
    template.replace(VERSION_PLACEHOLDER, &version.to_string())
}

/// GET / - The generator page.
pub async fn index(State(state): State<Arc<AppState>>) -> Response {
    let Some(template) = FRONTEND.get_file("index.html").and_then(|f| f.contents_utf8()) else {
        return (StatusCode::NOT_FOUND, "Frontend not built").into_response();
    };
    (
        [(header::CACHE_CONTROL, "no-cache")],
        Html(render_index(template, state.boot_time)),
    )
        .into_response()
}

/// GET /assets/*path - Scripts and styles.
pub async fn asset(Path(path): Path<String>) -> Response {
    let Some(file) = FRONTEND.get_file(format!("assets/{}", path)) else {
        return (StatusCode::NOT_FOUND, "Asset not found").into_response();
    };
    let mime = mime_guess::from_path(&path).first_or_octet_stream();
    (
        [
            (header::CONTENT_TYPE, mime.to_string()),
            (header::CACHE_CONTROL, "public, max-age=31536000, immutable".to_string()),
        ],
        file.contents(),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_references_versioned_assets() {
        let template = FRONTEND
            .get_file("index.html")
            .and_then(|f| f.contents_utf8())
            .unwrap();
        let page = render_index(template, 1700000000);
        assert!(page.contains("/assets/app.js?v=1700000000"));
        assert!(page.contains("/assets/app.css?v=1700000000"));
        assert!(!page.contains(VERSION_PLACEHOLDER));
    }

    #[test]
    fn test_assets_are_embedded() {
        assert!(FRONTEND.get_file("assets/app.js").is_some());
        assert!(FRONTEND.get_file("assets/app.css").is_some());
    }
}
