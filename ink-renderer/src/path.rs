//! Smoothed stroke geometry.
//!
//! Recorded points are joined with quadratic curves whose control points are
//! the samples themselves and whose end points are the midpoints between
//! neighbours. The path passes exactly through the first and last sample.

use ink_core::Point;
use tiny_skia::{Path, PathBuilder};

/// Build the smoothed path for a point sequence.
///
/// Returns `None` for fewer than two points or for degenerate input that
/// tiny-skia refuses (non-finite coordinates).
#[must_use]
pub fn smoothed_path(points: &[Point]) -> Option<Path> {
    let (first, rest) = points.split_first()?;
    if rest.is_empty() {
        return None;
    }

    let mut pb = PathBuilder::new();
    pb.move_to(first.x, first.y);

    let n = points.len();
    if n == 2 {
        pb.line_to(points[1].x, points[1].y);
        return pb.finish();
    }

    for i in 1..n - 2 {
        let ctrl = points[i];
        let end = ctrl.midpoint(points[i + 1]);
        pb.quad_to(ctrl.x, ctrl.y, end.x, end.y);
    }
    let ctrl = points[n - 2];
    let last = points[n - 1];
    pb.quad_to(ctrl.x, ctrl.y, last.x, last.y);

    pb.finish()
}
