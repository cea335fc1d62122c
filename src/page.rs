//! # Page Surface
//!
//! Everything the controller changes on screen goes through [`UiSurface`].
//! [`PageState`] is an in-memory implementation whose [`snapshot`](PageState::snapshot)
//! is what the browser front end renders.

use serde::Serialize;

use crate::engine::{ExportedFile, PreviewContainer};
use crate::notify::Notification;

pub const GENERATE_LABEL: &str = "Generate QR Code";
pub const GENERATING_LABEL: &str = "Generating...";

/// Screen-side effects of the controller.
pub trait UiSurface {
    /// Set the status line and its detail text.
    fn set_info(&mut self, status: &str, details: &str);

    /// Disable (busy) or re-enable the generate button.
    fn set_generate_busy(&mut self, busy: bool);

    fn set_download_visible(&mut self, visible: bool);

    fn download_visible(&self) -> bool;

    /// Mark `style_id` as the single selected style button.
    fn set_active_style(&mut self, style_id: &str);

    fn notify(&mut self, notification: Notification);

    /// Hand an exported file to the user (the browser save dialog).
    fn save_file(&mut self, file: ExportedFile);

    /// The element the render is mounted in.
    fn container(&mut self) -> &mut PreviewContainer;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyleButton {
    pub id: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateButton {
    pub enabled: bool,
    pub label: String,
}

/// In-memory page.
#[derive(Debug, Clone)]
pub struct PageState {
    pub status: String,
    pub details: String,
    pub generate: GenerateButton,
    pub download_visible: bool,
    pub styles: Vec<StyleButton>,
    pub notifications: Vec<Notification>,
    pub saved: Option<ExportedFile>,
    pub preview: PreviewContainer,
}

impl PageState {
    /// A page with one button per style, `active_style` selected.
    pub fn new<'a>(style_ids: impl IntoIterator<Item = &'a str>, active_style: &str) -> Self {
        Self {
            status: String::new(),
            details: String::new(),
            generate: GenerateButton {
                enabled: true,
                label: GENERATE_LABEL.to_string(),
            },
            download_visible: false,
            styles: style_ids
                .into_iter()
                .map(|id| StyleButton {
                    id: id.to_string(),
                    active: id == active_style,
                })
                .collect(),
            notifications: Vec::new(),
            saved: None,
            preview: PreviewContainer::new(),
        }
    }

    pub fn active_styles(&self) -> impl Iterator<Item = &str> {
        self.styles.iter().filter(|b| b.active).map(|b| b.id.as_str())
    }

    /// Remove and return pending notifications.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    pub fn take_saved(&mut self) -> Option<ExportedFile> {
        self.saved.take()
    }

    pub fn snapshot(&self) -> PageSnapshot {
        PageSnapshot {
            status: self.status.clone(),
            details: self.details.clone(),
            generate: self.generate.clone(),
            download_visible: self.download_visible,
            styles: self.styles.clone(),
            notifications: self.notifications.clone(),
            has_preview: !self.preview.is_empty(),
            preview_revision: self.preview.revision(),
            saved: self.saved.clone(),
        }
    }
}

impl UiSurface for PageState {
    fn set_info(&mut self, status: &str, details: &str) {
        self.status = status.to_string();
        self.details = details.to_string();
    }

    fn set_generate_busy(&mut self, busy: bool) {
        self.generate = GenerateButton {
            enabled: !busy,
            label: if busy { GENERATING_LABEL } else { GENERATE_LABEL }.to_string(),
        };
    }

    fn set_download_visible(&mut self, visible: bool) {
        self.download_visible = visible;
    }

    fn download_visible(&self) -> bool {
        self.download_visible
    }

    fn set_active_style(&mut self, style_id: &str) {
        // no button to select, keep the current one
        if !self.styles.iter().any(|b| b.id == style_id) {
            return;
        }
        for button in &mut self.styles {
            button.active = button.id == style_id;
        }
    }

    fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    fn save_file(&mut self, file: ExportedFile) {
        self.saved = Some(file);
    }

    fn container(&mut self) -> &mut PreviewContainer {
        &mut self.preview
    }
}

/// Serializable view of the page sent to the front end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSnapshot {
    pub status: String,
    pub details: String,
    pub generate: GenerateButton,
    pub download_visible: bool,
    pub styles: Vec<StyleButton>,
    pub notifications: Vec<Notification>,
    pub has_preview: bool,
    pub preview_revision: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved: Option<ExportedFile>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> PageState {
        PageState::new(["square", "dots", "rounded"], "square")
    }

    #[test]
    fn test_single_selection() {
        let mut page = page();
        assert_eq!(page.active_styles().collect::<Vec<_>>(), vec!["square"]);

        page.set_active_style("rounded");
        assert_eq!(page.active_styles().collect::<Vec<_>>(), vec!["rounded"]);

        page.set_active_style("no-such-style");
        assert_eq!(page.active_styles().collect::<Vec<_>>(), vec!["rounded"]);
    }

    #[test]
    fn test_busy_button() {
        let mut page = page();
        page.set_generate_busy(true);
        assert!(!page.generate.enabled);
        assert_eq!(page.generate.label, "Generating...");

        page.set_generate_busy(false);
        assert!(page.generate.enabled);
        assert_eq!(page.generate.label, "Generate QR Code");
    }

    #[test]
    fn test_take_notifications_drains() {
        let mut page = page();
        page.notify(Notification::success("hi"));
        assert_eq!(page.take_notifications().len(), 1);
        assert!(page.take_notifications().is_empty());
    }
}
