//! Points, colors, tool settings and committed strokes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{CanvasError, CanvasResult};

/// Smallest brush width in pixels.
pub const MIN_WIDTH: f32 = 1.0;

/// Largest brush width in pixels.
pub const MAX_WIDTH: f32 = 50.0;

/// A point in surface-local pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X position (pixels from the surface's left edge).
    pub x: f32,
    /// Y position (pixels from the surface's top edge).
    pub y: f32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Midpoint between `self` and `other`.
    #[must_use]
    pub fn midpoint(self, other: Self) -> Self {
        Self::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Squared euclidean distance to `other`.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        self.distance_squared(other).sqrt()
    }
}

/// An RGBA color, written as hex on the wire (`#rrggbb` or `#rrggbbaa`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel (255 = opaque).
    pub a: u8,
}

impl Color {
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(0xFF, 0xFF, 0xFF);
    /// Default pen color.
    pub const GOLD: Self = Self::rgb(0xFF, 0xD7, 0x00);
    /// Glow tint used by the ethereal brush, whatever the stroke color.
    pub const ETHEREAL_VIOLET: Self = Self::rgb(0x93, 0x70, 0xDB);

    /// Create an opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xFF }
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` (the `#` is optional).
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidColor`] for any other shape or for
    /// non-hex digits.
    pub fn from_hex(input: &str) -> CanvasResult<Self> {
        let hex = input.trim().trim_start_matches('#');
        let invalid = || CanvasError::InvalidColor(input.to_string());
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        match hex.len() {
            3 => {
                let mut out = [0u8; 3];
                for (slot, c) in out.iter_mut().zip(hex.chars()) {
                    let v = c.to_digit(16).ok_or_else(invalid)?;
                    // Single digit `f` expands to `ff`.
                    #[allow(clippy::cast_possible_truncation)]
                    {
                        *slot = (v * 17) as u8;
                    }
                }
                Ok(Self::rgb(out[0], out[1], out[2]))
            }
            6 => Ok(Self::rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            8 => Ok(Self {
                r: channel(&hex[0..2])?,
                g: channel(&hex[2..4])?,
                b: channel(&hex[4..6])?,
                a: channel(&hex[6..8])?,
            }),
            _ => Err(invalid()),
        }
    }

    /// Format as `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    #[must_use]
    pub fn to_hex(&self) -> String {
        if self.a == 0xFF {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// Whether the color fully covers what is beneath it.
    #[must_use]
    pub fn is_opaque(&self) -> bool {
        self.a == 0xFF
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = CanvasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Color {
    type Error = CanvasError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

/// Drawing tool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Adds color.
    #[default]
    Pen,
    /// Removes previously painted coverage.
    Eraser,
}

/// Visual style of a pen stroke. Ignored for the eraser.
///
/// Unknown style names read as [`BrushStyle::Solid`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrushStyle {
    /// Neon: outer halo, base line and a white core.
    Glow,
    /// Wide violet haze with floating particles.
    Ethereal,
    /// Clean line, no effects.
    #[default]
    #[serde(other)]
    Solid,
}

/// Currently selected brush settings, captured by each new stroke.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToolSettings {
    /// Stroke color (meaningless for the eraser).
    pub color: Color,
    /// Stroke width in pixels.
    pub width: f32,
    /// Pen or eraser.
    pub tool: Tool,
    /// Visual style.
    pub style: BrushStyle,
    /// Opacity in `[0, 1]`.
    pub opacity: f32,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            color: Color::GOLD,
            width: 5.0,
            tool: Tool::Pen,
            style: BrushStyle::Solid,
            opacity: 1.0,
        }
    }
}

impl ToolSettings {
    /// Pen settings with the given color and width.
    #[must_use]
    pub fn pen(color: Color, width: f32) -> Self {
        Self::default().with_color(color).with_width(width)
    }

    /// Eraser settings with the given width.
    #[must_use]
    pub fn eraser(width: f32) -> Self {
        Self::default().with_tool(Tool::Eraser).with_width(width)
    }

    /// Set the color.
    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Set the width, clamped to `[MIN_WIDTH, MAX_WIDTH]`.
    #[must_use]
    pub fn with_width(mut self, width: f32) -> Self {
        self.width = if width.is_finite() {
            width.clamp(MIN_WIDTH, MAX_WIDTH)
        } else {
            MIN_WIDTH
        };
        self
    }

    /// Set the tool.
    #[must_use]
    pub fn with_tool(mut self, tool: Tool) -> Self {
        self.tool = tool;
        self
    }

    /// Set the brush style.
    #[must_use]
    pub fn with_style(mut self, style: BrushStyle) -> Self {
        self.style = style;
        self
    }

    /// Set the opacity, clamped to `[0, 1]`.
    #[must_use]
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = if opacity.is_finite() {
            opacity.clamp(0.0, 1.0)
        } else {
            1.0
        };
        self
    }

    /// Whether these settings erase rather than paint.
    #[must_use]
    pub fn is_eraser(&self) -> bool {
        self.tool == Tool::Eraser
    }

    /// Settings with out-of-range values pulled back into range.
    #[must_use]
    pub fn sanitized(self) -> Self {
        let (width, opacity) = (self.width, self.opacity);
        self.with_width(width).with_opacity(opacity)
    }
}

/// A committed, immutable stroke.
///
/// Always holds at least two points: a single tap never becomes a stroke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StrokeRecord")]
pub struct Stroke {
    points: Vec<Point>,
    #[serde(flatten)]
    settings: ToolSettings,
}

#[derive(Deserialize)]
struct StrokeRecord {
    points: Vec<Point>,
    #[serde(flatten)]
    settings: ToolSettings,
}

impl TryFrom<StrokeRecord> for Stroke {
    type Error = CanvasError;

    fn try_from(record: StrokeRecord) -> Result<Self, Self::Error> {
        Self::new(record.points, record.settings)
    }
}

impl Stroke {
    /// Minimum number of points a committed stroke carries.
    pub const MIN_POINTS: usize = 2;

    /// Create a stroke from recorded points and the settings active when it
    /// was drawn.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidStroke`] if fewer than
    /// [`Stroke::MIN_POINTS`] points are given or any coordinate is not
    /// finite.
    pub fn new(points: Vec<Point>, settings: ToolSettings) -> CanvasResult<Self> {
        if points.len() < Self::MIN_POINTS {
            return Err(CanvasError::InvalidStroke(format!(
                "need at least {} points, got {}",
                Self::MIN_POINTS,
                points.len()
            )));
        }
        if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(CanvasError::InvalidStroke(
                "non-finite coordinate".to_string(),
            ));
        }
        Ok(Self {
            points,
            settings: settings.sanitized(),
        })
    }

    /// Recorded points, in input order.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Settings captured when the stroke began.
    #[must_use]
    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    /// Stroke color.
    #[must_use]
    pub fn color(&self) -> Color {
        self.settings.color
    }

    /// Stroke width in pixels.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.settings.width
    }

    /// Pen or eraser.
    #[must_use]
    pub fn tool(&self) -> Tool {
        self.settings.tool
    }

    /// Brush style.
    #[must_use]
    pub fn style(&self) -> BrushStyle {
        self.settings.style
    }

    /// Opacity in `[0, 1]`.
    #[must_use]
    pub fn opacity(&self) -> f32 {
        self.settings.opacity
    }

    /// Length of the polyline through the recorded points.
    #[must_use]
    pub fn path_length(&self) -> f32 {
        polyline_length(&self.points)
    }

    /// Parse a JSON array of strokes, as written by [`Stroke::list_to_json`].
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or any stroke is invalid.
    pub fn list_from_json(json: &str) -> CanvasResult<Vec<Self>> {
        serde_json::from_str(json).map_err(CanvasError::Serialization)
    }

    /// Serialize a list of strokes to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn list_to_json(strokes: &[Self]) -> CanvasResult<String> {
        serde_json::to_string_pretty(strokes).map_err(CanvasError::Serialization)
    }
}

/// Length of the polyline through `points`.
#[must_use]
pub fn polyline_length(points: &[Point]) -> f32 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}
