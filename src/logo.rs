//! # Logo Uploads
//!
//! Validation of user-selected logo files and the object URL registry that
//! hands the engine an opaque reference instead of the pixels themselves.
//!
//! A logo is decoded once, when it is picked. Files the renderer cannot
//! decode are refused there, so a registered reference always draws. A
//! reference stays resolvable until it is revoked. The controller revokes
//! the previous logo whenever a new one is accepted.

use image::RgbaImage;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

use crate::error::LogoRejection;

/// A file picked by the user.
#[derive(Debug, Clone)]
pub struct LogoFile {
    pub name: String,
    /// MIME type reported by the picker
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl LogoFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Check that `file` is an image no larger than `max_bytes`.
pub fn validate(file: &LogoFile, max_bytes: u64) -> Result<(), LogoRejection> {
    if !file.mime.starts_with("image/") {
        return Err(LogoRejection::NotAnImage {
            mime: file.mime.clone(),
        });
    }
    if file.size() > max_bytes {
        return Err(LogoRejection::TooLarge {
            size: file.size(),
            max: max_bytes,
        });
    }
    Ok(())
}

/// Validate `file` and decode it.
///
/// The MIME check and size limit run first, so oversized uploads are never
/// decoded.
pub fn load(file: LogoFile, max_bytes: u64) -> Result<DecodedLogo, LogoRejection> {
    validate(&file, max_bytes)?;
    let image = image::load_from_memory(&file.bytes).map_err(|e| LogoRejection::Unreadable {
        mime: file.mime.clone(),
        reason: e.to_string(),
    })?;
    Ok(DecodedLogo {
        name: file.name,
        mime: file.mime,
        image: image.to_rgba8(),
    })
}

/// Opaque reference to a registered object (`blob:qrgen/<uuid>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectUrl(String);

impl ObjectUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A logo that passed validation, held behind an object URL.
#[derive(Debug, Clone)]
pub struct DecodedLogo {
    pub name: String,
    pub mime: String,
    pub image: RgbaImage,
}

/// Registry of live object URLs, shared between the page and the engine.
#[derive(Debug, Clone, Default)]
pub struct ObjectUrls {
    inner: Arc<Mutex<HashMap<String, Arc<DecodedLogo>>>>,
}

impl ObjectUrls {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<DecodedLogo>>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a decoded logo and return a reference to it.
    pub fn create(&self, logo: DecodedLogo) -> ObjectUrl {
        let url = format!("blob:qrgen/{}", Uuid::new_v4());
        self.lock().insert(url.clone(), Arc::new(logo));
        ObjectUrl(url)
    }

    pub fn resolve(&self, url: &str) -> Option<Arc<DecodedLogo>> {
        self.lock().get(url).cloned()
    }

    /// Release a reference. Unknown references are ignored.
    pub fn revoke(&self, url: &ObjectUrl) {
        self.lock().remove(url.as_str());
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgba};
    use std::io::Cursor;

    const MB: usize = 1024 * 1024;

    fn png(edge: u32) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(edge, edge, Rgba([0, 128, 255, 255])))
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    fn decoded(name: &str) -> DecodedLogo {
        load(LogoFile::new(name, "image/png", png(4)), 5 * MB as u64).unwrap()
    }

    #[test]
    fn test_rejects_non_images() {
        let file = LogoFile::new("notes.txt", "text/plain", vec![0; 10]);
        assert!(matches!(
            validate(&file, 5 * MB as u64),
            Err(LogoRejection::NotAnImage { .. })
        ));
    }

    #[test]
    fn test_rejects_oversized_images() {
        let file = LogoFile::new("big.png", "image/png", vec![0; 10 * MB]);
        assert_eq!(
            validate(&file, 5 * MB as u64),
            Err(LogoRejection::TooLarge {
                size: 10 * MB as u64,
                max: 5 * MB as u64,
            })
        );
    }

    #[test]
    fn test_accepts_exact_limit() {
        let file = LogoFile::new("edge.jpg", "image/jpeg", vec![0; 5 * MB]);
        assert!(validate(&file, 5 * MB as u64).is_ok());
    }

    #[test]
    fn test_load_decodes_pixels() {
        let logo = load(LogoFile::new("logo.png", "image/png", png(8)), 5 * MB as u64).unwrap();
        assert_eq!(logo.image.dimensions(), (8, 8));
        assert_eq!(logo.image.get_pixel(3, 3).0, [0, 128, 255, 255]);
        assert_eq!(logo.mime, "image/png");
    }

    #[test]
    fn test_load_refuses_undecodable_images() {
        let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" width="8" height="8"/>"#.to_vec();
        let result = load(LogoFile::new("logo.svg", "image/svg+xml", svg), 5 * MB as u64);
        assert!(matches!(result, Err(LogoRejection::Unreadable { .. })));
    }

    #[test]
    fn test_load_checks_size_before_decoding() {
        let result = load(LogoFile::new("big.png", "image/png", vec![0; 6 * MB]), 5 * MB as u64);
        assert!(matches!(result, Err(LogoRejection::TooLarge { .. })));
    }

    #[test]
    fn test_object_url_lifecycle() {
        let urls = ObjectUrls::new();
        let url = urls.create(decoded("a.png"));
        assert!(url.as_str().starts_with("blob:qrgen/"));

        let stored = urls.resolve(url.as_str()).unwrap();
        assert_eq!(stored.name, "a.png");
        assert_eq!(stored.image.dimensions(), (4, 4));

        urls.revoke(&url);
        assert!(urls.resolve(url.as_str()).is_none());
        assert!(urls.is_empty());
    }

    #[test]
    fn test_clones_share_registry() {
        let urls = ObjectUrls::new();
        let other = urls.clone();
        let url = urls.create(decoded("a.png"));
        assert!(other.resolve(url.as_str()).is_some());
    }
}
