//! # Mystic Ink Renderer
//!
//! Software stroke compositor built on tiny-skia.
//!
//! ## Pipeline
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │        CanvasState (ink-core)               │
//! ├─────────────────────────────────────────────┤
//! │  Compositor                                 │
//! │  smoothed path → passes → shadow / eraser   │
//! ├──────────────────────┬──────────────────────┤
//! │  Drawing surface     │  Export              │
//! │  (transparent RGBA)  │  background + PNG    │
//! └──────────────────────┴──────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod blur;
pub mod compositor;
pub mod error;
pub mod export;
pub mod path;

pub use compositor::{Compositor, PARTICLE_SPACING};
pub use error::{RenderError, RenderResult};
pub use export::{DrawingExporter, ExportedImage};

use ink_core::CanvasState;
use tiny_skia::Pixmap;

/// Largest supported surface edge, in pixels.
pub const MAX_DIMENSION: u32 = 8192;

/// Configuration for the renderer.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
    /// Enable anti-aliasing.
    pub anti_aliasing: bool,
    /// Path length per ethereal particle.
    pub particle_spacing: f32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            anti_aliasing: true,
            particle_spacing: PARTICLE_SPACING,
        }
    }
}

impl RendererConfig {
    /// The compositor described by this configuration.
    #[must_use]
    pub fn compositor(&self) -> Compositor {
        Compositor::new(self.anti_aliasing, self.particle_spacing)
    }
}

/// Allocate a transparent surface.
///
/// # Errors
///
/// Returns [`RenderError::InvalidDimensions`] when either edge is zero or
/// larger than [`MAX_DIMENSION`].
pub fn new_surface(width: u32, height: u32) -> RenderResult<Pixmap> {
    if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(RenderError::InvalidDimensions { width, height });
    }
    Pixmap::new(width, height).ok_or(RenderError::InvalidDimensions { width, height })
}

/// What a painted frame was drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FrameKey {
    revision: u64,
    strokes: usize,
    preview_points: Option<usize>,
}

impl FrameKey {
    fn of(state: &CanvasState) -> Self {
        Self {
            revision: state.revision(),
            strokes: state.committed().len(),
            preview_points: state.in_progress().map(|s| s.points().len()),
        }
    }
}

/// The live drawing surface plus the compositor that repaints it.
///
/// A renderer follows one [`CanvasState`]. Hosts that switch to another
/// state call [`Renderer::invalidate`] so the next frame is repainted.
pub struct Renderer {
    config: RendererConfig,
    compositor: Compositor,
    surface: Pixmap,
    frame_count: u64,
    last_frame: Option<FrameKey>,
}

impl Renderer {
    /// Create a new renderer with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured surface size is invalid.
    pub fn new(config: RendererConfig) -> RenderResult<Self> {
        let surface = new_surface(config.width, config.height)?;
        tracing::debug!("Renderer surface {}x{}", config.width, config.height);
        Ok(Self {
            compositor: config.compositor(),
            config,
            surface,
            frame_count: 0,
            last_frame: None,
        })
    }

    /// Repaint the surface for `state`.
    ///
    /// Skips the repaint when the revision, stroke count and preview are
    /// the same as in the last frame.
    pub fn render(&mut self, state: &CanvasState) -> &Pixmap {
        let key = FrameKey::of(state);
        if self.last_frame == Some(key) {
            return &self.surface;
        }
        self.compositor.render(state, &mut self.surface);
        self.last_frame = Some(key);
        self.frame_count += 1;
        &self.surface
    }

    /// Get the current frame count.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// The last painted surface.
    #[must_use]
    pub fn surface(&self) -> &Pixmap {
        &self.surface
    }

    /// Get the renderer configuration.
    #[must_use]
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Resize the rendering surface. The next `render` repaints.
    ///
    /// # Errors
    ///
    /// Returns an error if the new size is invalid.
    pub fn resize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        self.surface = new_surface(width, height)?;
        self.config.width = width;
        self.config.height = height;
        self.last_frame = None;
        tracing::debug!("Renderer resized to {}x{}", width, height);
        Ok(())
    }

    /// Force the next [`Renderer::render`] to repaint.
    pub fn invalidate(&mut self) {
        self.last_frame = None;
    }

    /// An exporter that draws like this renderer.
    #[must_use]
    pub fn exporter(&self) -> DrawingExporter {
        DrawingExporter::new(self.compositor.clone())
    }
}
