//! Style catalogue API handlers.

use axum::Json;
use serde::Serialize;

use crate::style::{self, ShapeConfig};

#[derive(Debug, Serialize)]
pub struct StyleInfo {
    pub id: &'static str,
    #[serde(flatten)]
    pub shapes: ShapeConfig,
}

/// GET /api/styles - List every style with the shapes it resolves to.
pub async fn list() -> Json<Vec<StyleInfo>> {
    Json(
        style::STYLES
            .iter()
            .map(|&(id, shapes)| StyleInfo { id, shapes })
            .collect(),
    )
}
