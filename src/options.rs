//! # Render Options
//!
//! Configuration objects passed to a [`RenderEngine`](crate::engine::RenderEngine).
//!
//! The field names serialize in camelCase so the same structures can be
//! handed to a browser-side styling library unchanged:
//!
//! ```json
//! {
//!   "data": "https://example.com",
//!   "dotsOptions": { "color": "#2563eb", "type": "dots" },
//!   "cornersSquareOptions": { "color": "#1d4ed8", "type": "dot" },
//!   "cornersDotOptions": { "color": "#1e40af", "type": "dot" }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::QrGenError;
use crate::style::{CornerDotType, CornerSquareType, DotType};

/// A CSS-style hex color (`#rgb` or `#rrggbb`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub String);

impl Color {
    pub fn new(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse into opaque RGBA.
    pub fn to_rgba(&self) -> Result<[u8; 4], QrGenError> {
        let invalid = || QrGenError::Render(format!("Invalid color '{}'", self.0));
        let hex = self.0.strip_prefix('#').ok_or_else(invalid)?;
        if !hex.is_ascii() {
            return Err(invalid());
        }

        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        match hex.len() {
            3 => {
                let mut rgb = [0u8; 3];
                for (i, c) in hex.chars().enumerate() {
                    let v = channel(&c.to_string())?;
                    rgb[i] = v * 17;
                }
                Ok([rgb[0], rgb[1], rgb[2], 255])
            }
            6 => Ok([
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                255,
            ]),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DotsOptions {
    pub color: Color,
    #[serde(rename = "type")]
    pub kind: DotType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CornersSquareOptions {
    pub color: Color,
    #[serde(rename = "type")]
    pub kind: CornerSquareType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CornersDotOptions {
    pub color: Color,
    #[serde(rename = "type")]
    pub kind: CornerDotType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundOptions {
    pub color: Color,
}

/// How an embedded image is placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cross_origin: Option<String>,
    /// Clearance around the image, in pixels.
    pub margin: u32,
    /// Image edge as a fraction of the symbol edge.
    pub image_size: f32,
    #[serde(default = "default_hide_background_dots")]
    pub hide_background_dots: bool,
}

fn default_hide_background_dots() -> bool {
    true
}

/// Options an engine is constructed with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrOptions {
    pub width: u32,
    pub height: u32,
    pub data: String,
    pub dots_options: DotsOptions,
    pub background_options: BackgroundOptions,
    pub corners_square_options: CornersSquareOptions,
    pub corners_dot_options: CornersDotOptions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_options: Option<ImageOptions>,
}

impl QrOptions {
    /// Apply an update in place. Fields absent from the update are kept.
    pub fn apply(&mut self, update: &UpdateOptions) {
        self.data = update.data.clone();
        self.dots_options = update.dots_options.clone();
        self.corners_square_options = update.corners_square_options.clone();
        self.corners_dot_options = update.corners_dot_options.clone();
        if let Some(image) = &update.image {
            self.image = Some(image.clone());
        }
        if let Some(image_options) = &update.image_options {
            self.image_options = Some(image_options.clone());
        }
    }
}

/// Partial options replacing data, styling and image of a mounted render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOptions {
    pub data: String,
    pub dots_options: DotsOptions,
    pub corners_square_options: CornersSquareOptions,
    pub corners_dot_options: CornersDotOptions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_options: Option<ImageOptions>,
}

/// Request to export the current render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadOptions {
    pub name: String,
    pub extension: String,
}
