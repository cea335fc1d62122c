//! Exporting the current render to a file.

use chrono::NaiveDate;
use tracing::{debug, error};

use crate::config::GeneratorConfig;
use crate::download;
use crate::engine::RenderEngine;
use crate::notify::Notification;
use crate::options::DownloadOptions;
use crate::page::UiSurface;

pub const DOWNLOAD_SUCCESS: &str = "QR code downloaded successfully!";
pub const DOWNLOAD_FAILED: &str = "Failed to download QR code";

/// Names exports and asks the engine for them.
#[derive(Debug, Clone)]
pub struct DownloadController {
    placeholder: String,
    default_base: String,
    extension: String,
}

impl DownloadController {
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            placeholder: config.placeholder_data.clone(),
            default_base: config.default_file_base.clone(),
            extension: config.download_extension.clone(),
        }
    }

    pub fn file_name(&self, text: &str, style: &str, date: NaiveDate) -> String {
        download::file_name(text, style, date, &self.placeholder, &self.default_base)
    }

    /// Export the engine's current render and hand it to the surface.
    ///
    /// Export failures are reported on the surface, never returned.
    pub fn download<E, S>(&self, engine: &E, surface: &mut S, text: &str, style: &str, date: NaiveDate)
    where
        E: RenderEngine + ?Sized,
        S: UiSurface + ?Sized,
    {
        let options = DownloadOptions {
            name: self.file_name(text, style, date),
            extension: self.extension.clone(),
        };
        debug!(name = %options.name, extension = %options.extension, "exporting render");

        match engine.download(&options) {
            Ok(file) => {
                surface.save_file(file);
                surface.notify(Notification::success(DOWNLOAD_SUCCESS));
            }
            Err(e) => {
                error!(error = %e, "download failed");
                surface.notify(Notification::error(DOWNLOAD_FAILED));
            }
        }
    }
}
