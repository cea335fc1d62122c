//! # Raster Engine
//!
//! Renders styled QR codes into an RGBA canvas.
//!
//! The module matrix comes from the `qrcode` crate (error correction level Q);
//! this engine only decides how each module is painted:
//!
//! ```text
//! +--------------------------------+
//! | [corner]              [corner] |   corner square: 7x7 ring
//! |          data modules          |   corner dot:    3x3 centre
//! |            [ logo ]            |   logo: centred, dots under it hidden
//! | [corner]                       |
//! +--------------------------------+
//! ```
//!
//! Module size is `floor(min(width, height) / modules)`; the symbol is
//! centred on the canvas with the remainder as quiet zone.

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage, imageops::FilterType};
use qrcode::{Color as Module, EcLevel, QrCode};
use std::io::Cursor;

use super::{ExportedFile, PreviewContainer, RenderEngine};
use crate::error::QrGenError;
use crate::logo::ObjectUrls;
use crate::options::{DownloadOptions, ImageOptions, QrOptions, UpdateOptions};
use crate::style::{CornerDotType, CornerSquareType, DotType};

/// Size of a finder pattern in modules.
const FINDER: usize = 7;

/// Defaults applied when an image is set without explicit options.
static DEFAULT_IMAGE_OPTIONS: ImageOptions = ImageOptions {
    cross_origin: None,
    margin: 0,
    image_size: 0.4,
    hide_background_dots: true,
};

/// Engine state: the merged options and the canvas they produce.
pub struct RasterEngine {
    options: QrOptions,
    objects: ObjectUrls,
    canvas: RgbaImage,
}

impl RasterEngine {
    /// Construct and draw the initial render.
    ///
    /// `objects` resolves the `image` references found in options.
    pub fn new(options: QrOptions, objects: ObjectUrls) -> Result<Self, QrGenError> {
        let canvas = draw(&options, &objects)?;
        Ok(Self {
            options,
            objects,
            canvas,
        })
    }

    pub fn options(&self) -> &QrOptions {
        &self.options
    }

    pub fn canvas(&self) -> &RgbaImage {
        &self.canvas
    }

    fn encode(&self, format: ImageFormat) -> Result<Vec<u8>, QrGenError> {
        let image = DynamicImage::ImageRgba8(self.canvas.clone());
        // JPEG has no alpha channel
        let image = match format {
            ImageFormat::Jpeg => DynamicImage::ImageRgb8(image.to_rgb8()),
            _ => image,
        };

        let mut out = Cursor::new(Vec::new());
        image
            .write_to(&mut out, format)
            .map_err(|e| QrGenError::Image(format!("Failed to encode image: {}", e)))?;
        Ok(out.into_inner())
    }
}

impl RenderEngine for RasterEngine {
    fn update(&mut self, update: &UpdateOptions) -> Result<(), QrGenError> {
        let mut next = self.options.clone();
        next.apply(update);

        // Draw first so a failed update leaves the previous render intact
        let canvas = draw(&next, &self.objects)?;
        self.options = next;
        self.canvas = canvas;
        Ok(())
    }

    fn append(&self, container: &mut PreviewContainer) -> Result<(), QrGenError> {
        let bytes = self.encode(ImageFormat::Png)?;
        container.set(ExportedFile {
            file_name: "preview.png".to_string(),
            mime: ImageFormat::Png.to_mime_type().to_string(),
            bytes,
        });
        Ok(())
    }

    fn download(&self, options: &DownloadOptions) -> Result<ExportedFile, QrGenError> {
        let format = ImageFormat::from_extension(&options.extension)
            .filter(|f| matches!(f, ImageFormat::Png | ImageFormat::Jpeg))
            .ok_or_else(|| {
                QrGenError::Export(format!("Unsupported extension '{}'", options.extension))
            })?;

        Ok(ExportedFile {
            file_name: format!("{}.{}", options.name, options.extension),
            mime: format.to_mime_type().to_string(),
            bytes: self.encode(format)?,
        })
    }
}

// ============================================================================
// DRAWING
// ============================================================================

/// Axis-aligned rectangle in canvas pixels.
#[derive(Debug, Clone, Copy)]
struct Rect {
    x: f32,
    y: f32,
    w: f32,
    h: f32,
}

impl Rect {
    fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    fn inset(&self, by: f32) -> Self {
        Self::new(self.x + by, self.y + by, self.w - 2.0 * by, self.h - 2.0 * by)
    }

    fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }
}

/// A rectangle with per-corner radii: top-left, top-right, bottom-right, bottom-left.
#[derive(Debug, Clone, Copy)]
struct RoundedRect {
    rect: Rect,
    radii: [f32; 4],
}

impl RoundedRect {
    fn square(rect: Rect) -> Self {
        Self {
            rect,
            radii: [0.0; 4],
        }
    }

    fn circle(rect: Rect) -> Self {
        Self::uniform(rect, rect.w.min(rect.h) / 2.0)
    }

    fn uniform(rect: Rect, r: f32) -> Self {
        Self { rect, radii: [r; 4] }
    }

    fn contains(&self, px: f32, py: f32) -> bool {
        let Rect { x, y, w, h } = self.rect;
        if px < x || py < y || px > x + w || py > y + h {
            return false;
        }

        let [tl, tr, br, bl] = self.radii;
        let corners = [
            (tl, x + tl, y + tl, px < x + tl && py < y + tl),
            (tr, x + w - tr, y + tr, px > x + w - tr && py < y + tr),
            (br, x + w - br, y + h - br, px > x + w - br && py > y + h - br),
            (bl, x + bl, y + h - bl, px < x + bl && py > y + h - bl),
        ];
        corners.iter().all(|&(r, cx, cy, in_corner)| {
            !in_corner || r <= 0.0 || (px - cx).powi(2) + (py - cy).powi(2) <= r * r
        })
    }
}

/// Paint every pixel of `bounds` whose centre satisfies `inside`.
fn paint(canvas: &mut RgbaImage, bounds: Rect, color: Rgba<u8>, inside: impl Fn(f32, f32) -> bool) {
    let x_start = bounds.x.floor().max(0.0) as u32;
    let y_start = bounds.y.floor().max(0.0) as u32;
    let x_end = ((bounds.x + bounds.w).ceil() as u32).min(canvas.width());
    let y_end = ((bounds.y + bounds.h).ceil() as u32).min(canvas.height());

    for py in y_start..y_end {
        for px in x_start..x_end {
            if inside(px as f32 + 0.5, py as f32 + 0.5) {
                canvas.put_pixel(px, py, color);
            }
        }
    }
}

fn fill(canvas: &mut RgbaImage, shape: RoundedRect, color: Rgba<u8>) {
    paint(canvas, shape.rect, color, |x, y| shape.contains(x, y));
}

fn fill_ring(canvas: &mut RgbaImage, outer: RoundedRect, inner: RoundedRect, color: Rgba<u8>) {
    paint(canvas, outer.rect, color, |x, y| {
        outer.contains(x, y) && !inner.contains(x, y)
    });
}

/// Occupancy of the four orthogonal neighbours of a module.
#[derive(Debug, Clone, Copy, Default)]
struct Neighbours {
    left: bool,
    right: bool,
    top: bool,
    bottom: bool,
}

fn dot_shape(kind: DotType, cell: Rect, n: Neighbours) -> RoundedRect {
    let half = cell.w / 2.0;
    let free = |a: bool, b: bool| !a && !b;
    let round = |cond: bool, r: f32| if cond { r } else { 0.0 };

    let tl = free(n.left, n.top);
    let tr = free(n.right, n.top);
    let br = free(n.right, n.bottom);
    let bl = free(n.left, n.bottom);

    let radii = match kind {
        DotType::Square => return RoundedRect::square(cell),
        DotType::Dots => return RoundedRect::circle(cell),
        DotType::Rounded => {
            let r = cell.w * 0.3;
            [round(tl, r), round(tr, r), round(br, r), round(bl, r)]
        }
        DotType::ExtraRounded => [round(tl, half), round(tr, half), round(br, half), round(bl, half)],
        DotType::Classy => [round(tl, half), 0.0, round(br, half), 0.0],
        DotType::ClassyRounded => {
            let r = cell.w * 0.25;
            [round(tl, half), round(tr, r), round(br, half), round(bl, r)]
        }
    };
    RoundedRect { rect: cell, radii }
}

fn draw_corner_square(canvas: &mut RgbaImage, kind: CornerSquareType, outer: Rect, dot: f32, color: Rgba<u8>) {
    let inner = outer.inset(dot);
    let (outer, inner) = match kind {
        CornerSquareType::Square => (RoundedRect::square(outer), RoundedRect::square(inner)),
        CornerSquareType::Dot => (RoundedRect::circle(outer), RoundedRect::circle(inner)),
        CornerSquareType::ExtraRounded => (
            RoundedRect::uniform(outer, dot * 2.5),
            RoundedRect::uniform(inner, dot * 1.5),
        ),
    };
    fill_ring(canvas, outer, inner, color);
}

fn draw_corner_dot(canvas: &mut RgbaImage, kind: CornerDotType, rect: Rect, color: Rgba<u8>) {
    let shape = match kind {
        CornerDotType::Square => RoundedRect::square(rect),
        CornerDotType::Dot => RoundedRect::circle(rect),
    };
    fill(canvas, shape, color);
}

fn is_finder(x: usize, y: usize, count: usize) -> bool {
    (x < FINDER && y < FINDER)
        || (x >= count - FINDER && y < FINDER)
        || (x < FINDER && y >= count - FINDER)
}

/// Logo scaled to fit and the area of the symbol it clears.
struct PlacedLogo {
    image: RgbaImage,
    x: i64,
    y: i64,
    cleared: Option<Rect>,
}

fn place_logo(
    url: &str,
    image_options: &ImageOptions,
    objects: &ObjectUrls,
    symbol: Rect,
) -> Result<Option<PlacedLogo>, QrGenError> {
    let stored = objects
        .resolve(url)
        .ok_or_else(|| QrGenError::Render(format!("Image not found: {}", url)))?;
    let logo = &stored.image;

    let edge = symbol.w * image_options.image_size.clamp(0.0, 1.0);
    let scale = edge / logo.width().max(logo.height()).max(1) as f32;
    let w = (logo.width() as f32 * scale).floor() as u32;
    let h = (logo.height() as f32 * scale).floor() as u32;
    if w == 0 || h == 0 {
        return Ok(None);
    }

    let x = symbol.x + (symbol.w - w as f32) / 2.0;
    let y = symbol.y + (symbol.h - h as f32) / 2.0;
    let margin = image_options.margin as f32;
    let cleared = image_options.hide_background_dots.then(|| {
        Rect::new(x - margin, y - margin, w as f32 + 2.0 * margin, h as f32 + 2.0 * margin)
    });

    Ok(Some(PlacedLogo {
        image: image::imageops::resize(logo, w, h, FilterType::Triangle),
        x: x.round() as i64,
        y: y.round() as i64,
        cleared,
    }))
}

fn draw(options: &QrOptions, objects: &ObjectUrls) -> Result<RgbaImage, QrGenError> {
    let code = QrCode::with_error_correction_level(options.data.as_bytes(), EcLevel::Q)
        .map_err(|e| QrGenError::Render(format!("QR code generation failed: {}", e)))?;

    let count = code.width();
    let dot = (options.width.min(options.height) as usize / count) as f32;
    if dot < 1.0 {
        return Err(QrGenError::Render(format!(
            "Canvas {}x{} is too small for {} modules",
            options.width, options.height, count
        )));
    }

    let background = Rgba(options.background_options.color.to_rgba()?);
    let dot_color = Rgba(options.dots_options.color.to_rgba()?);
    let corner_square_color = Rgba(options.corners_square_options.color.to_rgba()?);
    let corner_dot_color = Rgba(options.corners_dot_options.color.to_rgba()?);

    let mut canvas = RgbaImage::from_pixel(options.width, options.height, background);

    let size = count as f32 * dot;
    let symbol = Rect::new(
        ((options.width as f32 - size) / 2.0).floor(),
        ((options.height as f32 - size) / 2.0).floor(),
        size,
        size,
    );
    let cell = |x: usize, y: usize| {
        Rect::new(symbol.x + x as f32 * dot, symbol.y + y as f32 * dot, dot, dot)
    };

    let logo = match &options.image {
        Some(url) => {
            let image_options = options.image_options.as_ref().unwrap_or(&DEFAULT_IMAGE_OPTIONS);
            place_logo(url, image_options, objects, symbol)?
        }
        None => None,
    };
    let cleared = logo.as_ref().and_then(|l| l.cleared);

    let is_data = |x: usize, y: usize| {
        code[(x, y)] == Module::Dark
            && !is_finder(x, y, count)
            && !cleared.is_some_and(|area| area.intersects(&cell(x, y)))
    };

    for y in 0..count {
        for x in 0..count {
            if !is_data(x, y) {
                continue;
            }
            let n = Neighbours {
                left: x > 0 && is_data(x - 1, y),
                right: x + 1 < count && is_data(x + 1, y),
                top: y > 0 && is_data(x, y - 1),
                bottom: y + 1 < count && is_data(x, y + 1),
            };
            fill(&mut canvas, dot_shape(options.dots_options.kind, cell(x, y), n), dot_color);
        }
    }

    let finder_size = FINDER as f32 * dot;
    for (fx, fy) in [(0, 0), (count - FINDER, 0), (0, count - FINDER)] {
        let origin = cell(fx, fy);
        let outer = Rect::new(origin.x, origin.y, finder_size, finder_size);
        draw_corner_square(
            &mut canvas,
            options.corners_square_options.kind,
            outer,
            dot,
            corner_square_color,
        );
        draw_corner_dot(
            &mut canvas,
            options.corners_dot_options.kind,
            outer.inset(2.0 * dot),
            corner_dot_color,
        );
    }

    if let Some(logo) = logo {
        image::imageops::overlay(&mut canvas, &logo.image, logo.x, logo.y);
    }

    Ok(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::logo::{self, LogoFile};
    use crate::options::{Color, CornersDotOptions, CornersSquareOptions, DotsOptions};

    fn engine() -> RasterEngine {
        RasterEngine::new(GeneratorConfig::default().initial_options(), ObjectUrls::new()).unwrap()
    }

    fn styled(data: &str, dots: DotType) -> UpdateOptions {
        UpdateOptions {
            data: data.to_string(),
            dots_options: DotsOptions {
                color: Color::new("#2563eb"),
                kind: dots,
            },
            corners_square_options: CornersSquareOptions {
                color: Color::new("#1d4ed8"),
                kind: CornerSquareType::ExtraRounded,
            },
            corners_dot_options: CornersDotOptions {
                color: Color::new("#1e40af"),
                kind: CornerDotType::Dot,
            },
            image: None,
            image_options: None,
        }
    }

    fn png_logo(edge: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(edge, edge, Rgba([255, 0, 0, 255]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    fn count_color(canvas: &RgbaImage, color: [u8; 4]) -> usize {
        canvas.pixels().filter(|p| p.0 == color).count()
    }

    #[test]
    fn test_initial_render_uses_configured_size() {
        let engine = engine();
        assert_eq!(engine.canvas().dimensions(), (300, 300));
        assert!(count_color(engine.canvas(), [0xe5, 0xe7, 0xeb, 255]) > 0);
    }

    #[test]
    fn test_update_applies_palette() {
        let mut engine = engine();
        engine.update(&styled("hello", DotType::Square)).unwrap();
        assert_eq!(engine.options().data, "hello");
        assert!(count_color(engine.canvas(), [0x25, 0x63, 0xeb, 255]) > 0);
        assert!(count_color(engine.canvas(), [0x1d, 0x4e, 0xd8, 255]) > 0);
        assert!(count_color(engine.canvas(), [0x1e, 0x40, 0xaf, 255]) > 0);
        assert_eq!(count_color(engine.canvas(), [0xe5, 0xe7, 0xeb, 255]), 0);
    }

    #[test]
    fn test_round_dots_cover_less_than_squares() {
        let mut square = engine();
        square.update(&styled("coverage", DotType::Square)).unwrap();
        let mut dots = engine();
        dots.update(&styled("coverage", DotType::Dots)).unwrap();

        let blue = [0x25, 0x63, 0xeb, 255];
        assert!(count_color(dots.canvas(), blue) < count_color(square.canvas(), blue));
    }

    #[test]
    fn test_failed_update_keeps_previous_render() {
        let mut engine = engine();
        engine.update(&styled("first", DotType::Square)).unwrap();
        let before = engine.canvas().clone();

        let mut bad = styled("second", DotType::Square);
        bad.dots_options.color = Color::new("not-a-color");
        assert!(matches!(engine.update(&bad), Err(QrGenError::Render(_))));
        assert_eq!(engine.options().data, "first");
        assert_eq!(engine.canvas(), &before);
    }

    #[test]
    fn test_missing_image_reference_fails() {
        let mut engine = engine();
        let mut update = styled("logo", DotType::Square);
        update.image = Some("blob:qrgen/missing".into());
        assert!(engine.update(&update).is_err());
    }

    #[test]
    fn test_logo_is_embedded() {
        let objects = ObjectUrls::new();
        let logo = logo::load(LogoFile::new("logo.png", "image/png", png_logo(16)), u64::MAX).unwrap();
        let url = objects.create(logo);
        let mut engine =
            RasterEngine::new(GeneratorConfig::default().initial_options(), objects).unwrap();

        let mut update = styled("https://example.com", DotType::Rounded);
        update.image = Some(url.to_string());
        update.image_options = Some(GeneratorConfig::default().logo_options());
        engine.update(&update).unwrap();

        // the logo's centre sits at the canvas centre
        let [r, g, b, _] = engine.canvas().get_pixel(150, 150).0;
        assert!(r > 200 && g < 50 && b < 50, "got {:?}", (r, g, b));
        assert!(engine.options().image.is_some());
    }

    #[test]
    fn test_download_png_and_jpeg() {
        let engine = engine();
        let png = engine
            .download(&DownloadOptions {
                name: "code".into(),
                extension: "png".into(),
            })
            .unwrap();
        assert_eq!(png.file_name, "code.png");
        assert_eq!(png.mime, "image/png");
        assert_eq!(&png.bytes[1..4], b"PNG");

        let jpeg = engine
            .download(&DownloadOptions {
                name: "code".into(),
                extension: "jpeg".into(),
            })
            .unwrap();
        assert_eq!(jpeg.mime, "image/jpeg");
        assert_eq!(&jpeg.bytes[..2], &[0xff, 0xd8]);
    }

    #[test]
    fn test_download_unsupported_extension() {
        let result = engine().download(&DownloadOptions {
            name: "code".into(),
            extension: "svg".into(),
        });
        assert!(matches!(result, Err(QrGenError::Export(_))));
    }

    #[test]
    fn test_append_mounts_png() {
        let mut container = PreviewContainer::new();
        engine().append(&mut container).unwrap();
        assert_eq!(container.content().unwrap().mime, "image/png");
    }

    #[test]
    fn test_rounded_rect_contains() {
        let circle = RoundedRect::circle(Rect::new(0.0, 0.0, 10.0, 10.0));
        assert!(circle.contains(5.0, 5.0));
        assert!(!circle.contains(0.5, 0.5));

        let square = RoundedRect::square(Rect::new(0.0, 0.0, 10.0, 10.0));
        assert!(square.contains(0.5, 0.5));
        assert!(!square.contains(10.5, 5.0));
    }
}
