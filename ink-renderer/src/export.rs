//! Drawing export.
//!
//! Flattens a drawing onto its opaque theme background and encodes it as
//! PNG. Export always works on a fresh pixmap; the live surface and the
//! stroke list are only read.

use base64::Engine;
use ink_core::{Background, CanvasState, Stroke};
use rand::Rng;
use tiny_skia::{Pixmap, PixmapPaint, Transform};

use crate::compositor::{skia_color, Compositor};
use crate::error::{RenderError, RenderResult};
use crate::new_surface;

/// Media type of exported drawings.
pub const PNG_MIME: &str = "image/png";

/// A flattened, encoded drawing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedImage {
    /// PNG bytes.
    pub png: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ExportedImage {
    /// PNG bytes as standard base64, without a data-URI prefix.
    #[must_use]
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.png)
    }

    /// `data:image/png;base64,...`
    #[must_use]
    pub fn to_data_uri(&self) -> String {
        format!("data:{PNG_MIME};base64,{}", self.to_base64())
    }
}

/// Exports drawings to PNG.
#[derive(Debug, Clone, Default)]
pub struct DrawingExporter {
    compositor: Compositor,
}

impl DrawingExporter {
    /// Create an exporter that redraws strokes with `compositor`.
    #[must_use]
    pub fn new(compositor: Compositor) -> Self {
        Self { compositor }
    }

    /// Render `strokes` at `width`x`height` and flatten them onto
    /// `background`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidDimensions`] for a zero-sized surface
    /// and [`RenderError::Encode`] if PNG encoding fails.
    pub fn export_strokes(
        &self,
        strokes: &[Stroke],
        background: &Background,
        width: u32,
        height: u32,
    ) -> RenderResult<ExportedImage> {
        self.export_strokes_with_rng(strokes, background, width, height, &mut rand::thread_rng())
    }

    /// Like [`Self::export_strokes`] with an explicit particle RNG.
    ///
    /// # Errors
    ///
    /// Same as [`Self::export_strokes`].
    pub fn export_strokes_with_rng<R: Rng + ?Sized>(
        &self,
        strokes: &[Stroke],
        background: &Background,
        width: u32,
        height: u32,
        rng: &mut R,
    ) -> RenderResult<ExportedImage> {
        let mut drawing = new_surface(width, height)?;
        for stroke in strokes {
            self.compositor
                .draw_stroke(&mut drawing, stroke.points(), stroke.settings(), rng);
        }
        tracing::debug!("Exporting {} strokes at {}x{}", strokes.len(), width, height);
        export_surface(&drawing, background)
    }

    /// Export the committed strokes of `state`; the preview is not part of
    /// the drawing.
    ///
    /// # Errors
    ///
    /// Same as [`Self::export_strokes`].
    pub fn export_state(
        &self,
        state: &CanvasState,
        background: &Background,
        width: u32,
        height: u32,
    ) -> RenderResult<ExportedImage> {
        self.export_strokes(state.committed(), background, width, height)
    }
}

/// Flatten an already-rendered drawing surface onto `background`.
///
/// # Errors
///
/// Returns [`RenderError::Encode`] if PNG encoding fails.
pub fn export_surface(surface: &Pixmap, background: &Background) -> RenderResult<ExportedImage> {
    let flattened = flatten(surface, background)?;
    let png = flattened
        .encode_png()
        .map_err(|e| RenderError::Encode(e.to_string()))?;

    Ok(ExportedImage {
        png,
        width: flattened.width(),
        height: flattened.height(),
    })
}

/// Composite `surface` over an opaque fill into a new pixmap.
///
/// # Errors
///
/// Returns [`RenderError::InvalidDimensions`] if a pixmap of the surface's
/// size cannot be allocated.
pub fn flatten(surface: &Pixmap, background: &Background) -> RenderResult<Pixmap> {
    let mut out = new_surface(surface.width(), surface.height())?;
    out.fill(skia_color(background.fill(), 1.0));
    out.draw_pixmap(
        0,
        0,
        surface.as_ref(),
        &PixmapPaint::default(),
        Transform::identity(),
        None,
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ink_core::{BackgroundMode, Color, Point, ThemeId, ToolSettings};

    const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn line(settings: ToolSettings) -> Stroke {
        Stroke::new(
            vec![Point::new(0.0, 10.0), Point::new(40.0, 10.0)],
            settings,
        )
        .expect("stroke")
    }

    #[test]
    fn test_export_is_png() {
        let image = DrawingExporter::default()
            .export_strokes(
                &[line(ToolSettings::default())],
                &Background::default(),
                40,
                20,
            )
            .expect("export");
        assert_eq!(&image.png[..8], &PNG_MAGIC);
        assert_eq!((image.width, image.height), (40, 20));
    }

    #[test]
    fn test_zero_size_rejected() {
        let err = DrawingExporter::default()
            .export_strokes(&[], &Background::default(), 0, 10)
            .expect_err("zero width");
        assert!(matches!(
            err,
            RenderError::InvalidDimensions {
                width: 0,
                height: 10
            }
        ));
    }

    #[test]
    fn test_flatten_fills_background_and_keeps_ink() {
        let mut surface = new_surface(40, 20).expect("surface");
        Compositor::default().draw_stroke(
            &mut surface,
            &[Point::new(0.0, 10.0), Point::new(40.0, 10.0)],
            &ToolSettings::pen(Color::WHITE, 6.0),
            &mut rand::thread_rng(),
        );
        let background = Background::new(ThemeId::MidnightOcean, BackgroundMode::Void);
        let flat = flatten(&surface, &background).expect("flatten");

        let corner = flat.pixel(0, 0).expect("pixel");
        assert_eq!(
            (corner.red(), corner.green(), corner.blue(), corner.alpha()),
            (0x0A, 0x16, 0x28, 255)
        );
        let ink = flat.pixel(20, 10).expect("pixel");
        assert_eq!((ink.red(), ink.green(), ink.blue()), (255, 255, 255));
    }

    #[test]
    fn test_erased_area_shows_background() {
        let strokes = vec![
            line(ToolSettings::pen(Color::WHITE, 10.0)),
            Stroke::new(
                vec![Point::new(20.0, 0.0), Point::new(20.0, 20.0)],
                ToolSettings::eraser(10.0),
            )
            .expect("eraser"),
        ];
        let mut drawing = new_surface(40, 20).expect("surface");
        for s in &strokes {
            Compositor::default().draw_stroke(
                &mut drawing,
                s.points(),
                s.settings(),
                &mut rand::thread_rng(),
            );
        }
        let background = Background::new(ThemeId::BloodMoon, BackgroundMode::Parchment);
        let flat = flatten(&drawing, &background).expect("flatten");
        let hole = flat.pixel(20, 10).expect("pixel");
        assert_eq!(
            (hole.red(), hole.green(), hole.blue(), hole.alpha()),
            (0xF8, 0xE6, 0xE6, 255)
        );
    }

    #[test]
    fn test_data_uri_prefix() {
        let image = ExportedImage {
            png: vec![1, 2, 3],
            width: 1,
            height: 1,
        };
        assert_eq!(image.to_base64(), "AQID");
        assert_eq!(image.to_data_uri(), "data:image/png;base64,AQID");
    }

    #[test]
    fn test_export_does_not_touch_live_surface() {
        let mut live = new_surface(10, 10).expect("surface");
        live.fill(tiny_skia::Color::from_rgba8(0, 0, 0, 0));
        let before = live.data().to_vec();
        export_surface(&live, &Background::default()).expect("export");
        assert_eq!(live.data(), &before[..]);
    }
}
