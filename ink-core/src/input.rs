//! Pointer and touch input normalization.

use serde::{Deserialize, Serialize};

use crate::Point;

/// Phase of a pointer interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputPhase {
    /// Button pressed / finger down.
    Down,
    /// Pointer moved / finger dragged.
    Move,
    /// Button released / finger lifted.
    Up,
    /// Pointer left the surface.
    Leave,
}

/// A single touch point in client (viewport) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TouchPoint {
    /// Touch identifier (for multi-touch).
    pub id: u32,
    /// X position in client coordinates.
    pub client_x: f32,
    /// Y position in client coordinates.
    pub client_y: f32,
}

/// A raw pointer event as delivered by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PointerInput {
    /// Mouse or pen pointer.
    #[serde(rename_all = "camelCase")]
    Mouse {
        /// X position in client coordinates.
        client_x: f32,
        /// Y position in client coordinates.
        client_y: f32,
    },
    /// Touch screen; the first active touch drives drawing.
    Touch {
        /// All active touches, first one primary.
        touches: Vec<TouchPoint>,
    },
}

impl PointerInput {
    /// Mouse event at the given client position.
    #[must_use]
    pub fn mouse(client_x: f32, client_y: f32) -> Self {
        Self::Mouse { client_x, client_y }
    }

    /// Single-finger touch event at the given client position.
    #[must_use]
    pub fn touch(client_x: f32, client_y: f32) -> Self {
        Self::Touch {
            touches: vec![TouchPoint {
                id: 0,
                client_x,
                client_y,
            }],
        }
    }

    /// Client coordinates of the primary pointer, if any.
    #[must_use]
    pub fn client_position(&self) -> Option<(f32, f32)> {
        match self {
            Self::Mouse { client_x, client_y } => Some((*client_x, *client_y)),
            Self::Touch { touches } => touches.first().map(|t| (t.client_x, t.client_y)),
        }
    }
}

/// Bounding rectangle of the drawing surface in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceRect {
    /// Left edge.
    pub left: f32,
    /// Top edge.
    pub top: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

impl SurfaceRect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Rectangle anchored at the client origin.
    #[must_use]
    pub const fn at_origin(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }
}

/// Convert a raw event into a surface-local point.
///
/// Returns `None` while the surface is not attached (`rect` is `None`) or
/// when a touch event carries no touches. Callers drop such events.
#[must_use]
pub fn surface_point(input: &PointerInput, rect: Option<&SurfaceRect>) -> Option<Point> {
    let rect = rect?;
    let (x, y) = input.client_position()?;
    Some(Point::new(x - rect.left, y - rect.top))
}
