//! Stroke model: committed stroke log plus the in-progress buffer.

use crate::input::{surface_point, InputPhase, PointerInput, SurfaceRect};
use crate::{Point, Stroke, ToolSettings};

/// Points closer than this to the previous point are dropped.
pub const MIN_POINT_DISTANCE: f32 = 1.0;

/// A stroke still being drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct InProgressStroke {
    points: Vec<Point>,
    settings: ToolSettings,
}

impl InProgressStroke {
    /// Points recorded so far (at least one).
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Settings captured at pointer-down.
    #[must_use]
    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }
}

/// The drawing surface state.
///
/// Committed strokes form an append-only log: insertion order is paint
/// order. Every change is an append, a remove-last or a reset to empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanvasState {
    committed: Vec<Stroke>,
    in_progress: Option<InProgressStroke>,
    settings: ToolSettings,
    locked: bool,
    revision: u64,
}

impl CanvasState {
    /// Create an empty canvas with default tool settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty canvas with the given tool settings.
    #[must_use]
    pub fn with_settings(settings: ToolSettings) -> Self {
        Self {
            settings: settings.sanitized(),
            ..Self::default()
        }
    }

    /// Committed strokes in paint order.
    #[must_use]
    pub fn committed(&self) -> &[Stroke] {
        &self.committed
    }

    /// The stroke currently being drawn, if any.
    #[must_use]
    pub fn in_progress(&self) -> Option<&InProgressStroke> {
        self.in_progress.as_ref()
    }

    /// Settings the next stroke will capture.
    #[must_use]
    pub fn tool_settings(&self) -> &ToolSettings {
        &self.settings
    }

    /// Change the settings used by the next stroke.
    ///
    /// A stroke already in progress keeps the settings it started with.
    pub fn set_tool_settings(&mut self, settings: ToolSettings) {
        self.settings = settings.sanitized();
    }

    /// Monotonic counter bumped on every visible change; hosts redraw when
    /// it moves.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether an interpretation is pending and new input is refused.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Whether a stroke is being drawn.
    #[must_use]
    pub fn is_drawing(&self) -> bool {
        self.in_progress.is_some()
    }

    /// Whether the drawing may be exported and submitted.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        !self.committed.is_empty() && !self.locked
    }

    /// Enter the processing state: [`CanvasState::begin_stroke`] becomes a
    /// no-op until [`CanvasState::unlock`].
    pub fn lock(&mut self) {
        if !self.locked {
            tracing::debug!("Canvas locked with {} strokes", self.committed.len());
            self.locked = true;
        }
    }

    /// Leave the processing state.
    pub fn unlock(&mut self) {
        if self.locked {
            tracing::debug!("Canvas unlocked");
            self.locked = false;
        }
    }

    /// Start a stroke at `point` with the current settings.
    ///
    /// No-op while locked or while another stroke is in progress.
    pub fn begin_stroke(&mut self, point: Point) {
        if self.locked || self.in_progress.is_some() {
            tracing::trace!("begin_stroke ignored (locked={})", self.locked);
            return;
        }
        self.in_progress = Some(InProgressStroke {
            points: vec![point],
            settings: self.settings,
        });
        self.touch();
    }

    /// Append `point` to the in-progress stroke.
    ///
    /// No-op without an in-progress stroke or when `point` is within
    /// [`MIN_POINT_DISTANCE`] of the last recorded point.
    pub fn extend_stroke(&mut self, point: Point) {
        let Some(stroke) = self.in_progress.as_mut() else {
            return;
        };
        if let Some(last) = stroke.points.last() {
            if last.distance_squared(point) < MIN_POINT_DISTANCE * MIN_POINT_DISTANCE {
                return;
            }
        }
        stroke.points.push(point);
        self.touch();
    }

    /// Finish the in-progress stroke.
    ///
    /// Appends it to the committed log if it has at least two points; the
    /// buffer is cleared either way.
    pub fn commit_stroke(&mut self) {
        let Some(InProgressStroke { points, settings }) = self.in_progress.take() else {
            return;
        };
        match Stroke::new(points, settings) {
            Ok(stroke) => {
                self.committed.push(stroke);
                tracing::debug!("Committed stroke #{}", self.committed.len());
            }
            Err(e) => tracing::trace!("Discarded stroke: {e}"),
        }
        self.touch();
    }

    /// Append an already-recorded stroke unchanged, e.g. one loaded from a
    /// stroke file.
    ///
    /// Points are kept as recorded; the movement filter only applies to
    /// live input. No-op while locked.
    pub fn push_stroke(&mut self, stroke: Stroke) {
        if self.locked {
            tracing::trace!("Ignoring recorded stroke while locked");
            return;
        }
        self.committed.push(stroke);
        tracing::debug!("Appended recorded stroke #{}", self.committed.len());
        self.touch();
    }

    /// Remove the most recently committed stroke, if any.
    pub fn undo_last(&mut self) {
        if self.committed.pop().is_some() {
            self.touch();
        }
    }

    /// Drop every committed stroke and cancel the in-progress one.
    pub fn clear_all(&mut self) {
        if self.committed.is_empty() && self.in_progress.is_none() {
            return;
        }
        self.committed = Vec::new();
        self.in_progress = None;
        self.touch();
    }

    /// Route a raw pointer event through input capture into the stroke
    /// model.
    ///
    /// Events that cannot be mapped to a point (surface not attached, empty
    /// touch list) are ignored.
    pub fn handle_input(
        &mut self,
        phase: InputPhase,
        input: &PointerInput,
        rect: Option<&SurfaceRect>,
    ) {
        match phase {
            InputPhase::Down => {
                if let Some(point) = surface_point(input, rect) {
                    self.begin_stroke(point);
                }
            }
            InputPhase::Move => {
                if let Some(point) = surface_point(input, rect) {
                    self.extend_stroke(point);
                }
            }
            InputPhase::Up | InputPhase::Leave => self.commit_stroke(),
        }
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BrushStyle, Tool};

    fn draw(state: &mut CanvasState, points: &[(f32, f32)]) {
        let mut iter = points.iter();
        if let Some(&(x, y)) = iter.next() {
            state.begin_stroke(Point::new(x, y));
        }
        for &(x, y) in iter {
            state.extend_stroke(Point::new(x, y));
        }
        state.commit_stroke();
    }

    #[test]
    fn test_two_point_stroke_commits() {
        let mut state = CanvasState::new();
        state.begin_stroke(Point::new(10.0, 10.0));
        state.extend_stroke(Point::new(50.0, 50.0));
        state.commit_stroke();

        assert_eq!(state.committed().len(), 1);
        assert_eq!(
            state.committed()[0].points(),
            &[Point::new(10.0, 10.0), Point::new(50.0, 50.0)]
        );
        assert!(state.in_progress().is_none());
    }

    #[test]
    fn test_single_tap_discarded() {
        let mut state = CanvasState::new();
        state.begin_stroke(Point::new(5.0, 5.0));
        state.commit_stroke();
        assert!(state.committed().is_empty());
        assert!(state.in_progress().is_none());
    }

    #[test]
    fn test_undo_removes_last() {
        let mut state = CanvasState::new();
        draw(&mut state, &[(0.0, 0.0), (10.0, 0.0)]);
        draw(&mut state, &[(0.0, 10.0), (10.0, 10.0)]);
        draw(&mut state, &[(0.0, 20.0), (10.0, 20.0)]);
        let first_two = state.committed()[..2].to_vec();

        state.undo_last();
        assert_eq!(state.committed(), first_two.as_slice());
    }

    #[test]
    fn test_undo_empty_is_noop() {
        let mut state = CanvasState::new();
        let rev = state.revision();
        state.undo_last();
        assert!(state.committed().is_empty());
        assert_eq!(state.revision(), rev);
    }

    #[test]
    fn test_clear_cancels_in_progress() {
        let mut state = CanvasState::new();
        draw(&mut state, &[(0.0, 0.0), (10.0, 0.0)]);
        state.begin_stroke(Point::new(1.0, 1.0));
        state.clear_all();
        assert!(state.committed().is_empty());
        assert!(state.in_progress().is_none());
    }

    #[test]
    fn test_extend_without_stroke_is_noop() {
        let mut state = CanvasState::new();
        state.extend_stroke(Point::new(1.0, 1.0));
        assert!(state.in_progress().is_none());
        assert_eq!(state.revision(), 0);
    }

    #[test]
    fn test_begin_while_drawing_is_noop() {
        let mut state = CanvasState::new();
        state.begin_stroke(Point::new(1.0, 1.0));
        state.begin_stroke(Point::new(99.0, 99.0));
        let stroke = state.in_progress().expect("in progress");
        assert_eq!(stroke.points(), &[Point::new(1.0, 1.0)]);
    }

    #[test]
    fn test_min_distance_filter() {
        let mut state = CanvasState::new();
        state.begin_stroke(Point::new(0.0, 0.0));
        state.extend_stroke(Point::new(0.5, 0.5));
        state.extend_stroke(Point::new(3.0, 0.0));
        assert_eq!(state.in_progress().expect("stroke").points().len(), 2);
    }

    #[test]
    fn test_locked_refuses_new_strokes_but_allows_undo_and_clear() {
        let mut state = CanvasState::new();
        draw(&mut state, &[(0.0, 0.0), (10.0, 0.0)]);
        draw(&mut state, &[(0.0, 5.0), (10.0, 5.0)]);
        state.lock();
        assert!(!state.can_submit());

        state.begin_stroke(Point::new(1.0, 1.0));
        assert!(state.in_progress().is_none());

        state.undo_last();
        assert_eq!(state.committed().len(), 1);
        state.clear_all();
        assert!(state.committed().is_empty());

        state.unlock();
        draw(&mut state, &[(0.0, 0.0), (10.0, 0.0)]);
        assert!(state.can_submit());
    }

    #[test]
    fn test_stroke_keeps_settings_from_begin() {
        let mut state = CanvasState::new();
        state.begin_stroke(Point::new(0.0, 0.0));
        state.set_tool_settings(ToolSettings::eraser(20.0));
        state.extend_stroke(Point::new(10.0, 10.0));
        state.commit_stroke();

        let stroke = &state.committed()[0];
        assert_eq!(stroke.tool(), Tool::Pen);
        assert_eq!(stroke.style(), BrushStyle::Solid);

        draw(&mut state, &[(0.0, 0.0), (10.0, 0.0)]);
        assert_eq!(state.committed()[1].tool(), Tool::Eraser);
    }

    #[test]
    fn test_handle_input_routes_phases() {
        let rect = SurfaceRect::new(100.0, 100.0, 400.0, 400.0);
        let mut state = CanvasState::new();

        state.handle_input(InputPhase::Down, &PointerInput::mouse(110.0, 110.0), Some(&rect));
        state.handle_input(InputPhase::Move, &PointerInput::touch(150.0, 150.0), Some(&rect));
        state.handle_input(InputPhase::Leave, &PointerInput::mouse(0.0, 0.0), Some(&rect));

        assert_eq!(state.committed().len(), 1);
        assert_eq!(
            state.committed()[0].points(),
            &[Point::new(10.0, 10.0), Point::new(50.0, 50.0)]
        );
    }

    #[test]
    fn test_handle_input_without_surface_is_ignored() {
        let mut state = CanvasState::new();
        state.handle_input(InputPhase::Down, &PointerInput::mouse(1.0, 1.0), None);
        assert!(!state.is_drawing());
    }

    #[test]
    fn test_push_stroke_keeps_recorded_points() {
        let dense: Vec<Point> = (0..20u8)
            .map(|i| Point::new(10.0 + f32::from(i) * 0.6, 10.0))
            .collect();
        let stroke = Stroke::new(dense, ToolSettings::default()).expect("stroke");

        let mut state = CanvasState::new();
        state.push_stroke(stroke.clone());
        assert_eq!(state.committed(), &[stroke.clone()]);
        assert_eq!(state.committed()[0].points().len(), 20);
        assert_eq!(state.revision(), 1);

        state.lock();
        state.push_stroke(stroke);
        assert_eq!(state.committed().len(), 1);
        assert_eq!(state.revision(), 1);
    }
}
