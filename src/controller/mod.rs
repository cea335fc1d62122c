//! # Generation Controller
//!
//! Owns the page state and turns user events into engine calls.
//!
//! ```text
//! text input ──(debounce)──┐
//! style click ─────────────┼──> generate ──> engine.update ──> page status
//! logo upload ─────────────┘
//! download click ────────────> DownloadController ──> engine.download
//! ```
//!
//! All methods take the current [`Instant`] instead of reading a clock, and
//! the owner calls [`poll`](GenerationController::poll) once
//! [`next_deadline`](GenerationController::next_deadline) has passed. Nothing
//! here blocks or spawns.
//!
//! At most one explicit generation is in flight: the busy flag is set when
//! it starts and cleared by the success timer or by a failure. Requests
//! arriving in between are dropped.

mod download;

pub use download::{DOWNLOAD_FAILED, DOWNLOAD_SUCCESS, DownloadController};

use chrono::{NaiveDate, Utc};
use std::time::Instant;
use tracing::{debug, error, warn};

use crate::config::GeneratorConfig;
use crate::engine::{RasterEngine, RenderEngine};
use crate::error::QrGenError;
use crate::logo::{self, LogoFile, ObjectUrl, ObjectUrls};
use crate::notify::Notification;
use crate::options::{CornersDotOptions, CornersSquareOptions, DotsOptions, UpdateOptions};
use crate::page::{PageState, UiSurface};
use crate::shortcuts::{KeyChord, Shortcut, shortcut_for};
use crate::style;
use crate::timer::{self, Timer};

pub const READY_STATUS: (&str, &str) = ("Ready to generate", "Select a style and click generate");
pub const GENERATING_STATUS: (&str, &str) =
    ("Generating...", "Please wait while we create your QR code");
pub const GENERATED_STATUS: (&str, &str) =
    ("QR Code Generated!", "Your QR code is ready for download");
pub const FAILED_STATUS: (&str, &str) =
    ("Generation Failed", "Please try again with different settings");

pub const GENERATE_SUCCESS: &str = "QR code generated successfully!";
pub const GENERATE_FAILED: &str = "Failed to generate QR code";
pub const LOGO_UPLOADED: &str = "Logo uploaded successfully";

/// How much UI feedback a generation shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    /// Busy button, status text and a notification after a short delay.
    Full,
    /// Background refresh: only reveals the download button on success.
    Silent,
}

/// Controller-owned state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiState {
    pub is_generating: bool,
    pub current_style: String,
    pub current_logo: Option<ObjectUrl>,
}

/// Something the user did on the page.
#[derive(Debug, Clone)]
pub enum UiEvent {
    TextInput(String),
    StyleSelected(String),
    LogoSelected(LogoFile),
    GenerateClicked,
    DownloadClicked,
    KeyDown(KeyChord),
}

pub struct GenerationController<E, S> {
    config: GeneratorConfig,
    engine: E,
    surface: S,
    objects: ObjectUrls,
    downloads: DownloadController,
    text: String,
    state: UiState,
    /// Whether a render has been mounted yet.
    rendered: bool,
    debounce: Timer,
    success: Timer,
}

impl GenerationController<RasterEngine, PageState> {
    /// Controller backed by the raster engine and an in-memory page.
    pub fn with_raster(config: GeneratorConfig) -> Result<Self, QrGenError> {
        let objects = ObjectUrls::new();
        let engine = RasterEngine::new(config.initial_options(), objects.clone())?;
        let page = PageState::new(style::list_styles(), &config.default_style);
        Ok(Self::new(config, engine, page, objects))
    }
}

impl<E: RenderEngine, S: UiSurface> GenerationController<E, S> {
    /// Mount the engine's initial render and show the ready status.
    ///
    /// `objects` must be the registry the engine resolves images from.
    pub fn new(config: GeneratorConfig, engine: E, surface: S, objects: ObjectUrls) -> Self {
        let mut controller = Self {
            downloads: DownloadController::new(&config),
            state: UiState {
                is_generating: false,
                current_style: config.default_style.clone(),
                current_logo: None,
            },
            config,
            engine,
            surface,
            objects,
            text: String::new(),
            rendered: false,
            debounce: Timer::new(),
            success: Timer::new(),
        };

        let container = controller.surface.container();
        container.clear();
        match controller.engine.append(container) {
            Ok(()) => controller.rendered = true,
            Err(e) => error!(error = %e, "failed to mount initial render"),
        }
        controller.surface.set_active_style(&controller.state.current_style);
        controller.surface.set_info(READY_STATUS.0, READY_STATUS.1);
        controller
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }

    /// Trimmed input, or the placeholder when blank.
    pub fn effective_text(&self) -> &str {
        match self.text.trim() {
            "" => self.config.placeholder_data.as_str(),
            text => text,
        }
    }

    /// Dispatch a page event.
    pub fn handle(&mut self, event: UiEvent, now: Instant) {
        match event {
            UiEvent::TextInput(text) => self.on_text_input(text, now),
            UiEvent::StyleSelected(id) => self.set_style(&id, now),
            UiEvent::LogoSelected(file) => self.set_logo(file, now),
            UiEvent::GenerateClicked => self.generate(Feedback::Full, now),
            UiEvent::DownloadClicked => self.download(),
            UiEvent::KeyDown(chord) => {
                self.on_key(&chord, now);
            }
        }
    }

    /// Record the new field value and restart the preview debounce.
    ///
    /// A blank field cancels the pending preview instead.
    pub fn on_text_input(&mut self, text: String, now: Instant) {
        self.text = text;
        if self.has_text() {
            self.debounce.schedule(now, self.config.debounce());
        } else {
            self.debounce.cancel();
        }
    }

    /// Select a style; refreshes the preview when there is text.
    pub fn set_style(&mut self, style_id: &str, now: Instant) {
        self.state.current_style = style_id.to_string();
        self.surface.set_active_style(style_id);
        if self.has_text() {
            self.generate(Feedback::Silent, now);
        }
    }

    /// Accept or refuse a logo upload.
    ///
    /// The file is decoded here, so a refused file (wrong type, too large,
    /// or undecodable) leaves the current logo in place. An accepted one
    /// replaces it and the previous reference is revoked.
    pub fn set_logo(&mut self, file: LogoFile, now: Instant) {
        let (name, mime, size) = (file.name.clone(), file.mime.clone(), file.size());
        let decoded = match logo::load(file, self.config.max_logo_bytes) {
            Ok(decoded) => decoded,
            Err(rejection) => {
                warn!(file = %name, %mime, size, ?rejection, "logo rejected");
                self.surface.notify(Notification::error(rejection.to_string()));
                return;
            }
        };

        if let Some(previous) = self.state.current_logo.take() {
            self.objects.revoke(&previous);
        }
        let url = self.objects.create(decoded);
        debug!(%url, file = %name, "logo registered");
        self.state.current_logo = Some(url);
        self.surface.notify(Notification::success(LOGO_UPLOADED));

        if self.has_text() {
            self.generate(Feedback::Silent, now);
        }
    }

    /// Build the update sent to the engine for `data`.
    pub fn render_options(&self, data: &str) -> UpdateOptions {
        let shapes = style::resolve(&self.state.current_style);
        let logo = self.state.current_logo.as_ref();

        UpdateOptions {
            data: data.to_string(),
            dots_options: DotsOptions {
                color: self.config.dot_color.clone(),
                kind: shapes.dots_type,
            },
            corners_square_options: CornersSquareOptions {
                color: self.config.corner_square_color.clone(),
                kind: shapes.corners_type,
            },
            corners_dot_options: CornersDotOptions {
                color: self.config.corner_dot_color.clone(),
                kind: shapes.corner_dots_type,
            },
            image: logo.map(ToString::to_string),
            image_options: logo.map(|_| self.config.logo_options()),
        }
    }

    /// Render the current text and style.
    ///
    /// Dropped while another explicit generation is in flight.
    pub fn generate(&mut self, feedback: Feedback, now: Instant) {
        if self.state.is_generating {
            debug!(?feedback, "generation already in flight, dropping request");
            return;
        }

        let data = self.effective_text().to_string();
        if feedback == Feedback::Full {
            self.state.is_generating = true;
            self.surface.set_generate_busy(true);
            self.surface.set_info(GENERATING_STATUS.0, GENERATING_STATUS.1);
        }

        let options = self.render_options(&data);
        debug!(style = %self.state.current_style, logo = options.image.is_some(), ?feedback, "generating");

        let result = self
            .engine
            .update(&options)
            .and_then(|()| self.engine.append(self.surface.container()));

        match result {
            Ok(()) => {
                self.rendered = true;
                match feedback {
                    Feedback::Full => self.success.schedule(now, self.config.success_delay()),
                    Feedback::Silent => self.surface.set_download_visible(true),
                }
            }
            Err(e) => {
                error!(error = %e, "error generating QR code");
                self.surface.set_info(FAILED_STATUS.0, FAILED_STATUS.1);
                self.surface.set_generate_busy(false);
                self.state.is_generating = false;
                self.surface.notify(Notification::error(GENERATE_FAILED));
            }
        }
    }

    fn finish_generation(&mut self) {
        self.surface.set_info(GENERATED_STATUS.0, GENERATED_STATUS.1);
        self.surface.set_download_visible(true);
        self.surface.set_generate_busy(false);
        self.state.is_generating = false;
        self.surface.notify(Notification::success(GENERATE_SUCCESS));
    }

    /// Export the current render, named with today's UTC date.
    pub fn download(&mut self) {
        self.download_on(Utc::now().date_naive());
    }

    /// Export the current render, named with `date`. No-op before the first mount.
    pub fn download_on(&mut self, date: NaiveDate) {
        if !self.rendered {
            return;
        }
        self.downloads.download(
            &self.engine,
            &mut self.surface,
            &self.text,
            &self.state.current_style,
            date,
        );
    }

    pub fn file_name(&self, date: NaiveDate) -> String {
        self.downloads
            .file_name(&self.text, &self.state.current_style, date)
    }

    /// Apply a keyboard shortcut. Returns true if the chord was consumed.
    pub fn on_key(&mut self, chord: &KeyChord, now: Instant) -> bool {
        match shortcut_for(chord) {
            Some(Shortcut::Generate) => {
                self.generate(Feedback::Full, now);
                true
            }
            Some(Shortcut::Download) => {
                if self.surface.download_visible() {
                    self.download();
                }
                true
            }
            None => false,
        }
    }

    /// Run every timer that is due at `now`.
    pub fn poll(&mut self, now: Instant) {
        if self.debounce.fire_if_due(now) {
            self.generate(Feedback::Silent, now);
        }
        if self.success.fire_if_due(now) {
            self.finish_generation();
        }
    }

    /// When [`poll`](Self::poll) next has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        timer::earliest([self.debounce.deadline(), self.success.deadline()])
    }
}

impl<E, S> Drop for GenerationController<E, S> {
    fn drop(&mut self) {
        if let Some(url) = self.state.current_logo.take() {
            self.objects.revoke(&url);
        }
    }
}
