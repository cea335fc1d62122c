//! # Error Types
//!
//! This module defines error types used throughout the qrgen library.

use thiserror::Error;

/// Main error type for qrgen operations
#[derive(Debug, Error)]
pub enum QrGenError {
    /// The rendering engine could not apply an update
    #[error("Render error: {0}")]
    Render(String),

    /// The rendering engine could not export the current render
    #[error("Export error: {0}")]
    Export(String),

    /// An uploaded logo was refused
    #[error("Invalid logo: {0}")]
    InvalidLogo(#[from] LogoRejection),

    /// Image decoding or encoding error
    #[error("Image error: {0}")]
    Image(String),

    /// Configuration could not be loaded
    #[error("Config error: {0}")]
    Config(String),

    /// Network-level errors (bind, serve)
    #[error("Transport error: {0}")]
    Transport(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a logo upload was refused.
///
/// The display text is shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogoRejection {
    #[error("Please select a valid image file")]
    NotAnImage { mime: String },

    #[error("Image size should be less than {}MB", .max / (1024 * 1024))]
    TooLarge { size: u64, max: u64 },

    /// Labelled as an image but not in a format the renderer can decode.
    #[error("Please select a valid image file")]
    Unreadable { mime: String, reason: String },
}
