//! # Style Resolution
//!
//! Maps a style identifier (the `data-style` of a style button) onto the
//! three shape parameters the rendering engine understands.
//!
//! | Style | Dots | Corner squares | Corner dots |
//! |-------|------|----------------|-------------|
//! | square | square | square | square |
//! | dots | dots | dot | dot |
//! | rounded | rounded | extra-rounded | dot |
//! | extra-rounded | extra-rounded | extra-rounded | dot |
//! | classy | classy | square | square |
//! | classy-rounded | classy-rounded | extra-rounded | dot |
//! | diamond | square | square | square |
//! | star | dots | dot | dot |
//! | heart | rounded | extra-rounded | dot |
//! | hexagon | classy | extra-rounded | dot |
//!
//! Unknown identifiers resolve to `square`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier every unknown style falls back to.
pub const DEFAULT_STYLE: &str = "square";

/// Shape of the data modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DotType {
    Square,
    Dots,
    Rounded,
    ExtraRounded,
    Classy,
    ClassyRounded,
}

/// Shape of the outer 7x7 ring of each finder pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CornerSquareType {
    Square,
    Dot,
    ExtraRounded,
}

/// Shape of the inner 3x3 block of each finder pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CornerDotType {
    Square,
    Dot,
}

/// The shape triple a style resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeConfig {
    pub dots_type: DotType,
    pub corners_type: CornerSquareType,
    pub corner_dots_type: CornerDotType,
}

impl ShapeConfig {
    const fn new(
        dots_type: DotType,
        corners_type: CornerSquareType,
        corner_dots_type: CornerDotType,
    ) -> Self {
        Self {
            dots_type,
            corners_type,
            corner_dots_type,
        }
    }
}

impl Default for ShapeConfig {
    fn default() -> Self {
        SQUARE
    }
}

const SQUARE: ShapeConfig =
    ShapeConfig::new(DotType::Square, CornerSquareType::Square, CornerDotType::Square);

/// All supported styles, in button order.
pub const STYLES: &[(&str, ShapeConfig)] = &[
    ("square", SQUARE),
    (
        "dots",
        ShapeConfig::new(DotType::Dots, CornerSquareType::Dot, CornerDotType::Dot),
    ),
    (
        "rounded",
        ShapeConfig::new(DotType::Rounded, CornerSquareType::ExtraRounded, CornerDotType::Dot),
    ),
    (
        "extra-rounded",
        ShapeConfig::new(
            DotType::ExtraRounded,
            CornerSquareType::ExtraRounded,
            CornerDotType::Dot,
        ),
    ),
    (
        "classy",
        ShapeConfig::new(DotType::Classy, CornerSquareType::Square, CornerDotType::Square),
    ),
    (
        "classy-rounded",
        ShapeConfig::new(
            DotType::ClassyRounded,
            CornerSquareType::ExtraRounded,
            CornerDotType::Dot,
        ),
    ),
    ("diamond", SQUARE),
    (
        "star",
        ShapeConfig::new(DotType::Dots, CornerSquareType::Dot, CornerDotType::Dot),
    ),
    (
        "heart",
        ShapeConfig::new(DotType::Rounded, CornerSquareType::ExtraRounded, CornerDotType::Dot),
    ),
    (
        "hexagon",
        ShapeConfig::new(DotType::Classy, CornerSquareType::ExtraRounded, CornerDotType::Dot),
    ),
];

/// Resolve a style identifier to its shape triple.
///
/// Total: any input yields a valid config, unknown ids give `square`.
pub fn resolve(style_id: &str) -> ShapeConfig {
    STYLES
        .iter()
        .find(|(id, _)| *id == style_id)
        .map(|(_, config)| *config)
        .unwrap_or(SQUARE)
}

/// Whether `style_id` has its own table entry.
pub fn is_known(style_id: &str) -> bool {
    STYLES.iter().any(|(id, _)| *id == style_id)
}

/// List all style identifiers.
pub fn list_styles() -> impl Iterator<Item = &'static str> {
    STYLES.iter().map(|(id, _)| *id)
}

impl fmt::Display for DotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            DotType::Square => "square",
            DotType::Dots => "dots",
            DotType::Rounded => "rounded",
            DotType::ExtraRounded => "extra-rounded",
            DotType::Classy => "classy",
            DotType::ClassyRounded => "classy-rounded",
        })
    }
}

impl fmt::Display for CornerSquareType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            CornerSquareType::Square => "square",
            CornerSquareType::Dot => "dot",
            CornerSquareType::ExtraRounded => "extra-rounded",
        })
    }
}

impl fmt::Display for CornerDotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            CornerDotType::Square => "square",
            CornerDotType::Dot => "dot",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_has_ten_styles() {
        assert_eq!(list_styles().count(), 10);
        assert!(list_styles().all(is_known));
    }

    #[test]
    fn test_unknown_styles_fall_back_to_square() {
        let square = resolve("square");
        for id in ["", "SQUARE", "triangle", "dots ", "🙂"] {
            assert_eq!(resolve(id), square, "style {:?}", id);
            assert!(!is_known(id));
        }
    }

    #[test]
    fn test_known_triples() {
        assert_eq!(
            resolve("rounded"),
            ShapeConfig {
                dots_type: DotType::Rounded,
                corners_type: CornerSquareType::ExtraRounded,
                corner_dots_type: CornerDotType::Dot,
            }
        );
        assert_eq!(resolve("hexagon").dots_type, DotType::Classy);
        assert_eq!(resolve("diamond"), resolve("square"));
        assert_eq!(resolve("star"), resolve("dots"));
    }

    #[test]
    fn test_wire_names() {
        let json = serde_json::to_value(resolve("classy-rounded")).unwrap();
        assert_eq!(json["dotsType"], "classy-rounded");
        assert_eq!(json["cornersType"], "extra-rounded");
        assert_eq!(json["cornerDotsType"], "dot");
        assert_eq!(DotType::ExtraRounded.to_string(), "extra-rounded");
    }
}
