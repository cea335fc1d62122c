//! # Generator Configuration
//!
//! Constants the controller merges into every render: placeholder data,
//! canvas size, palette, logo limits and timer delays.
//!
//! Every field has a default, so a JSON file only needs the keys it changes:
//!
//! ```json
//! { "dotColor": "#111827", "debounceMs": 300 }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::QrGenError;
use crate::options::{
    BackgroundOptions, Color, CornersDotOptions, CornersSquareOptions, DotsOptions,
    ImageOptions, QrOptions,
};
use crate::style::{CornerDotType, CornerSquareType, DotType};

/// Data rendered when the text field is blank.
pub const PLACEHOLDER_DATA: &str = "https://qr-gen.example.com";

/// Largest accepted logo upload.
pub const MAX_LOGO_BYTES: u64 = 5 * 1024 * 1024;

/// Upper bound for the debounce and success delays.
pub const MAX_DELAY_MS: u64 = 60_000;

/// Formats the raster engine can export.
pub const DOWNLOAD_EXTENSIONS: &[&str] = &["png", "jpeg", "jpg"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratorConfig {
    pub placeholder_data: String,
    pub width: u32,
    pub height: u32,

    /// Color of every role in the initial, not yet generated render
    pub initial_color: Color,
    pub background_color: Color,
    pub dot_color: Color,
    pub corner_square_color: Color,
    pub corner_dot_color: Color,

    pub max_logo_bytes: u64,
    pub logo_image_size: f32,
    pub logo_margin: u32,
    pub logo_cross_origin: String,

    pub debounce_ms: u64,
    pub success_delay_ms: u64,

    pub default_file_base: String,
    pub default_style: String,
    pub download_extension: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            placeholder_data: PLACEHOLDER_DATA.to_string(),
            width: 300,
            height: 300,
            initial_color: Color::new("#e5e7eb"),
            background_color: Color::new("#ffffff"),
            dot_color: Color::new("#2563eb"),
            corner_square_color: Color::new("#1d4ed8"),
            corner_dot_color: Color::new("#1e40af"),
            max_logo_bytes: MAX_LOGO_BYTES,
            logo_image_size: 0.3,
            logo_margin: 10,
            logo_cross_origin: "anonymous".to_string(),
            debounce_ms: 500,
            success_delay_ms: 500,
            default_file_base: "qr-code".to_string(),
            default_style: crate::style::DEFAULT_STYLE.to_string(),
            download_extension: "png".to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Load a config from a JSON file, filling missing keys with defaults.
    pub fn load(path: &Path) -> Result<Self, QrGenError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
            .map_err(|e| QrGenError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_json(raw: &str) -> Result<Self, QrGenError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|e| QrGenError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), QrGenError> {
        if self.width == 0 || self.height == 0 {
            return Err(QrGenError::Config("width and height must be non-zero".into()));
        }
        if !(0.0..=1.0).contains(&self.logo_image_size) {
            return Err(QrGenError::Config(format!(
                "logoImageSize must be within 0..=1, got {}",
                self.logo_image_size
            )));
        }
        for (key, value) in [
            ("debounceMs", self.debounce_ms),
            ("successDelayMs", self.success_delay_ms),
        ] {
            if value > MAX_DELAY_MS {
                return Err(QrGenError::Config(format!(
                    "{} must be at most {}, got {}",
                    key, MAX_DELAY_MS, value
                )));
            }
        }
        if !DOWNLOAD_EXTENSIONS.contains(&self.download_extension.as_str()) {
            return Err(QrGenError::Config(format!(
                "downloadExtension must be one of {}, got '{}'",
                DOWNLOAD_EXTENSIONS.join(", "),
                self.download_extension
            )));
        }
        for color in [
            &self.initial_color,
            &self.background_color,
            &self.dot_color,
            &self.corner_square_color,
            &self.corner_dot_color,
        ] {
            color
                .to_rgba()
                .map_err(|_| QrGenError::Config(format!("invalid color '{}'", color)))?;
        }
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn success_delay(&self) -> Duration {
        Duration::from_millis(self.success_delay_ms)
    }

    /// Options for the first, neutral render shown before any generation.
    pub fn initial_options(&self) -> QrOptions {
        QrOptions {
            width: self.width,
            height: self.height,
            data: self.placeholder_data.clone(),
            dots_options: DotsOptions {
                color: self.initial_color.clone(),
                kind: DotType::Square,
            },
            background_options: BackgroundOptions {
                color: self.background_color.clone(),
            },
            corners_square_options: CornersSquareOptions {
                color: self.initial_color.clone(),
                kind: CornerSquareType::Square,
            },
            corners_dot_options: CornersDotOptions {
                color: self.initial_color.clone(),
                kind: CornerDotType::Square,
            },
            image: None,
            image_options: None,
        }
    }

    /// Embed parameters attached to every render that carries a logo.
    pub fn logo_options(&self) -> ImageOptions {
        ImageOptions {
            cross_origin: Some(self.logo_cross_origin.clone()),
            margin: self.logo_margin,
            image_size: self.logo_image_size,
            hide_background_dots: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.placeholder_data, "https://qr-gen.example.com");
        assert_eq!(config.max_logo_bytes, 5 * 1024 * 1024);
        assert_eq!(config.debounce(), Duration::from_millis(500));
        assert_eq!(config.logo_options().image_size, 0.3);
        assert_eq!(config.logo_options().margin, 10);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = GeneratorConfig::from_json(r##"{ "dotColor": "#111827", "debounceMs": 300 }"##)
            .unwrap();
        assert_eq!(config.dot_color, Color::new("#111827"));
        assert_eq!(config.debounce_ms, 300);
        assert_eq!(config.width, 300);
    }

    #[test]
    fn test_invalid_json_rejected() {
        assert!(GeneratorConfig::from_json(r#"{ "width": 0 }"#).is_err());
        assert!(GeneratorConfig::from_json(r#"{ "logoImageSize": 1.5 }"#).is_err());
        assert!(GeneratorConfig::from_json(r#"{ "dotColor": "blue" }"#).is_err());
        assert!(GeneratorConfig::from_json("not json").is_err());
    }

    #[test]
    fn test_unusable_download_extension_rejected() {
        let err = GeneratorConfig::from_json(r#"{ "downloadExtension": "svg" }"#).unwrap_err();
        assert!(err.to_string().contains("downloadExtension"));
        assert!(GeneratorConfig::from_json(r#"{ "downloadExtension": "jpeg" }"#).is_ok());
    }

    #[test]
    fn test_oversized_delays_rejected() {
        let huge = format!(r#"{{ "debounceMs": {} }}"#, u64::MAX);
        assert!(GeneratorConfig::from_json(&huge).is_err());
        let huge = format!(r#"{{ "successDelayMs": {} }}"#, u64::MAX - 1);
        assert!(GeneratorConfig::from_json(&huge).is_err());
        assert!(GeneratorConfig::from_json(r#"{ "successDelayMs": 60000 }"#).is_ok());
    }

    #[test]
    fn test_initial_options_are_neutral() {
        let options = GeneratorConfig::default().initial_options();
        assert_eq!(options.width, 300);
        assert_eq!(options.dots_options.color, Color::new("#e5e7eb"));
        assert_eq!(options.corners_dot_options.kind, CornerDotType::Square);
        assert!(options.image.is_none());
    }
}
