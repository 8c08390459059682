//! Stroke compositor.
//!
//! Paints committed strokes in commit order, then the in-progress preview,
//! onto a transparent RGBA surface. Every stroke is broken into one or more
//! [`StrokePass`]es; a pass owns its blend mode, alpha, width, color and
//! shadow, so nothing leaks from one stroke into the next.

use ink_core::{BrushStyle, CanvasState, Color, Point, ToolSettings};
use rand::Rng;
use tiny_skia::{
    BlendMode, FillRule, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap, PixmapPaint,
    Transform,
};

use crate::blur;
use crate::path::smoothed_path;

/// Path length, in pixels, per ethereal particle.
pub const PARTICLE_SPACING: f32 = 24.0;

/// Smallest particle radius.
pub const PARTICLE_MIN_RADIUS: f32 = 1.0;

/// Exclusive upper bound of particle radii.
pub const PARTICLE_MAX_RADIUS: f32 = 4.0;

/// Particle offset from its path point, as a multiple of stroke width.
pub const PARTICLE_SPREAD: f32 = 1.5;

/// Upper bound of the random factor applied to particle alpha.
pub const PARTICLE_MAX_ALPHA: f32 = 0.6;

/// One stroking of the smoothed path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokePass {
    /// Line width.
    pub width: f32,
    /// Ink color.
    pub color: Color,
    /// Global alpha multiplier.
    pub alpha: f32,
    /// Shadow blur radius; 0 disables the shadow.
    pub blur: f32,
    /// Shadow color.
    pub shadow: Color,
    /// Compositing operator.
    pub blend: BlendMode,
}

impl StrokePass {
    fn plain(width: f32, color: Color, alpha: f32) -> Self {
        Self {
            width,
            color,
            alpha,
            blur: 0.0,
            shadow: color,
            blend: BlendMode::SourceOver,
        }
    }

    fn shadowed(width: f32, color: Color, alpha: f32, blur: f32, shadow: Color) -> Self {
        Self {
            blur,
            shadow,
            ..Self::plain(width, color, alpha)
        }
    }
}

/// The passes that make up a stroke drawn with `settings`.
#[must_use]
pub fn stroke_passes(settings: &ToolSettings) -> Vec<StrokePass> {
    let w = settings.width;
    let color = settings.color;
    let opacity = settings.opacity;

    if settings.is_eraser() {
        return vec![StrokePass {
            blend: BlendMode::DestinationOut,
            ..StrokePass::plain(w, Color::WHITE, 1.0)
        }];
    }

    match settings.style {
        BrushStyle::Solid => vec![StrokePass::plain(w, color, opacity)],
        BrushStyle::Glow => vec![
            StrokePass::shadowed(0.9 * w, color, opacity, 30.0, color),
            StrokePass::shadowed(1.5 * w, color, opacity * 0.5, 50.0, color),
            // The core keeps the colored halo but paints white.
            StrokePass::shadowed(0.5 * w, Color::WHITE, opacity * 0.3, 15.0, color),
        ],
        BrushStyle::Ethereal => vec![StrokePass::shadowed(
            1.8 * w,
            color,
            opacity * 0.6,
            45.0,
            Color::ETHEREAL_VIOLET,
        )],
    }
}

/// A filled dot scattered around an ethereal stroke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Centre.
    pub center: Point,
    /// Radius in `[PARTICLE_MIN_RADIUS, PARTICLE_MAX_RADIUS)`.
    pub radius: f32,
    /// Alpha in `[0, opacity * PARTICLE_MAX_ALPHA)`.
    pub alpha: f32,
}

/// Number of particles for a path of `length` pixels.
#[must_use]
pub fn particle_count(length: f32, spacing: f32) -> usize {
    if spacing <= 0.0 || !length.is_finite() || length <= 0.0 {
        return 0;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    {
        (length / spacing).floor() as usize
    }
}

/// Scatter particles along `points` for an ethereal pen stroke.
///
/// Each particle sits on a randomly chosen recorded point, offset by up to
/// `PARTICLE_SPREAD * width` on each axis.
pub fn scatter_particles<R: Rng + ?Sized>(
    points: &[Point],
    settings: &ToolSettings,
    spacing: f32,
    rng: &mut R,
) -> Vec<Particle> {
    if points.is_empty() {
        return Vec::new();
    }
    let count = particle_count(ink_core::stroke::polyline_length(points), spacing);
    let spread = PARTICLE_SPREAD * settings.width;

    (0..count)
        .map(|_| {
            let anchor = points[rng.gen_range(0..points.len())];
            let dx = if spread > 0.0 { rng.gen_range(-spread..spread) } else { 0.0 };
            let dy = if spread > 0.0 { rng.gen_range(-spread..spread) } else { 0.0 };
            Particle {
                center: Point::new(anchor.x + dx, anchor.y + dy),
                radius: rng.gen_range(PARTICLE_MIN_RADIUS..PARTICLE_MAX_RADIUS),
                alpha: settings.opacity * rng.gen_range(0.0..PARTICLE_MAX_ALPHA),
            }
        })
        .collect()
}

/// Draws strokes onto a drawing surface.
#[derive(Debug, Clone)]
pub struct Compositor {
    anti_alias: bool,
    particle_spacing: f32,
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new(true, PARTICLE_SPACING)
    }
}

impl Compositor {
    /// Create a compositor.
    #[must_use]
    pub fn new(anti_alias: bool, particle_spacing: f32) -> Self {
        Self {
            anti_alias,
            particle_spacing,
        }
    }

    /// Clear `surface` and paint the whole canvas state, using the thread
    /// RNG for particles.
    pub fn render(&self, state: &CanvasState, surface: &mut Pixmap) {
        self.render_with_rng(state, surface, &mut rand::thread_rng());
    }

    /// Clear `surface` and paint the whole canvas state.
    pub fn render_with_rng<R: Rng + ?Sized>(
        &self,
        state: &CanvasState,
        surface: &mut Pixmap,
        rng: &mut R,
    ) {
        surface.fill(tiny_skia::Color::TRANSPARENT);

        for stroke in state.committed() {
            self.draw_stroke(surface, stroke.points(), stroke.settings(), rng);
        }
        if let Some(preview) = state.in_progress() {
            self.draw_stroke(surface, preview.points(), preview.settings(), rng);
        }

        tracing::trace!(
            "Composited {} strokes (preview: {}) on {}x{}",
            state.committed().len(),
            state.is_drawing(),
            surface.width(),
            surface.height()
        );
    }

    /// Paint one stroke. Fewer than two points draws nothing.
    pub fn draw_stroke<R: Rng + ?Sized>(
        &self,
        surface: &mut Pixmap,
        points: &[Point],
        settings: &ToolSettings,
        rng: &mut R,
    ) {
        let Some(path) = smoothed_path(points) else {
            tracing::trace!("Skipping stroke with {} points", points.len());
            return;
        };

        for pass in stroke_passes(settings) {
            self.draw_pass(surface, &path, &pass);
        }

        if !settings.is_eraser() && settings.style == BrushStyle::Ethereal {
            for particle in scatter_particles(points, settings, self.particle_spacing, rng) {
                self.draw_particle(surface, &particle, settings.color);
            }
        }
    }

    fn paint(&self, color: Color, alpha: f32, blend: BlendMode) -> Paint<'static> {
        let mut paint = Paint::default();
        paint.set_color(skia_color(color, alpha));
        paint.anti_alias = self.anti_alias;
        paint.blend_mode = blend;
        paint
    }

    fn draw_pass(&self, surface: &mut Pixmap, path: &Path, pass: &StrokePass) {
        let stroke = line_stroke(pass.width);

        if pass.blur > 0.0 {
            self.draw_shadow(surface, path, &stroke, pass);
        }

        let paint = self.paint(pass.color, pass.alpha, pass.blend);
        surface.stroke_path(path, &paint, &stroke, Transform::identity(), None);
    }

    /// Paint a blurred copy of the pass beneath where the pass will land.
    ///
    /// The copy is rasterized on a layer covering the path bounds plus three
    /// standard deviations, then blurred and composited source-over.
    fn draw_shadow(
        &self,
        surface: &mut Pixmap,
        path: &Path,
        stroke: &tiny_skia::Stroke,
        pass: &StrokePass,
    ) {
        let sigma = pass.blur / 2.0;
        let pad = (3.0 * sigma + pass.width).ceil();
        let bounds = path.bounds();

        #[allow(clippy::cast_precision_loss)]
        let (max_x, max_y) = (surface.width() as f32, surface.height() as f32);
        let left = (bounds.left() - pad).floor().max(0.0);
        let top = (bounds.top() - pad).floor().max(0.0);
        let right = (bounds.right() + pad).ceil().min(max_x);
        let bottom = (bounds.bottom() + pad).ceil().min(max_y);
        if right <= left || bottom <= top {
            return;
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let (x, y, w, h) = (
            left as i32,
            top as i32,
            (right - left) as u32,
            (bottom - top) as u32,
        );
        let Some(mut layer) = Pixmap::new(w, h) else {
            return;
        };

        let paint = self.paint(pass.shadow, pass.alpha, BlendMode::SourceOver);
        layer.stroke_path(
            path,
            &paint,
            stroke,
            Transform::from_translate(-left, -top),
            None,
        );
        blur::blur(&mut layer, sigma);

        surface.draw_pixmap(
            x,
            y,
            layer.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }

    fn draw_particle(&self, surface: &mut Pixmap, particle: &Particle, color: Color) {
        let Some(circle) =
            PathBuilder::from_circle(particle.center.x, particle.center.y, particle.radius)
        else {
            return;
        };
        let paint = self.paint(color, particle.alpha, BlendMode::SourceOver);
        surface.fill_path(
            &circle,
            &paint,
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }
}

fn line_stroke(width: f32) -> tiny_skia::Stroke {
    tiny_skia::Stroke {
        width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..tiny_skia::Stroke::default()
    }
}

/// Convert a stroke color plus a pass alpha into a tiny-skia color.
pub(crate) fn skia_color(color: Color, alpha: f32) -> tiny_skia::Color {
    let mut c = tiny_skia::Color::from_rgba8(color.r, color.g, color.b, color.a);
    c.apply_opacity(alpha);
    c
}
