//! # Rendering Engines
//!
//! The controller never draws anything itself. It talks to a
//! [`RenderEngine`] through three operations:
//!
//! | Operation | Effect |
//! |-----------|--------|
//! | [`update`](RenderEngine::update) | replace data, styling and image in place |
//! | [`append`](RenderEngine::append) | mount the current render into a container |
//! | [`download`](RenderEngine::download) | export the current render as a file |
//!
//! [`raster::RasterEngine`] is the bundled implementation.

pub mod raster;

use serde::Serialize;

use crate::error::QrGenError;
use crate::options::{DownloadOptions, UpdateOptions};

pub use raster::RasterEngine;

/// A rendered image ready to be shown or saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedFile {
    pub file_name: String,
    pub mime: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

/// The element a render is mounted into.
///
/// Holds a snapshot of the render, so the owner appends again after each
/// update to keep it current.
#[derive(Debug, Clone, Default)]
pub struct PreviewContainer {
    content: Option<ExportedFile>,
    revision: u64,
}

impl PreviewContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.content = None;
    }

    pub fn set(&mut self, file: ExportedFile) {
        self.content = Some(file);
        self.revision += 1;
    }

    /// Number of times content has been mounted.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn content(&self) -> Option<&ExportedFile> {
        self.content.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_none()
    }
}

/// A QR code renderer.
pub trait RenderEngine {
    /// Replace data, styling and image of the current render.
    fn update(&mut self, options: &UpdateOptions) -> Result<(), QrGenError>;

    /// Mount the current render into `container`.
    fn append(&self, container: &mut PreviewContainer) -> Result<(), QrGenError>;

    /// Export the current render as `{name}.{extension}`.
    fn download(&self, options: &DownloadOptions) -> Result<ExportedFile, QrGenError>;
}
