//! Theme configuration passed explicitly to rendering and export.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Color;

/// Available themes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThemeId {
    /// Deep purple (default).
    #[default]
    MysticPurple,
    /// Navy blues.
    MidnightOcean,
    /// Dark reds.
    BloodMoon,
    /// Dark greens.
    EnchantedForest,
}

impl ThemeId {
    /// Every theme, in menu order.
    pub const ALL: [Self; 4] = [
        Self::MysticPurple,
        Self::MidnightOcean,
        Self::BloodMoon,
        Self::EnchantedForest,
    ];

    /// Stable identifier, e.g. `mystic-purple`.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MysticPurple => "mystic-purple",
            Self::MidnightOcean => "midnight-ocean",
            Self::BloodMoon => "blood-moon",
            Self::EnchantedForest => "enchanted-forest",
        }
    }
}

impl fmt::Display for ThemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown theme: {s}"))
    }
}

/// Which backdrop sits behind the drawing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundMode {
    /// The theme's dark backdrop.
    #[default]
    Void,
    /// The theme's light paper tone.
    Parchment,
}

impl FromStr for BackgroundMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "void" => Ok(Self::Void),
            "parchment" => Ok(Self::Parchment),
            other => Err(format!("unknown background: {other}")),
        }
    }
}

/// Colors a theme contributes to the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    /// Theme identifier.
    pub id: ThemeId,
    /// Opaque fill for [`BackgroundMode::Void`].
    pub void: Color,
    /// Opaque fill for [`BackgroundMode::Parchment`].
    pub parchment: Color,
    /// Accent color for host chrome.
    pub accent: Color,
}

impl Theme {
    /// Palette for a theme.
    #[must_use]
    pub const fn palette(id: ThemeId) -> Self {
        match id {
            ThemeId::MysticPurple => Self {
                id,
                void: Color::rgb(0x13, 0x04, 0x24),
                parchment: Color::rgb(0xF0, 0xE6, 0xD2),
                accent: Color::rgb(0xFF, 0xD7, 0x00),
            },
            ThemeId::MidnightOcean => Self {
                id,
                void: Color::rgb(0x0A, 0x16, 0x28),
                parchment: Color::rgb(0xE6, 0xF2, 0xF8),
                accent: Color::rgb(0x60, 0xA5, 0xFA),
            },
            ThemeId::BloodMoon => Self {
                id,
                void: Color::rgb(0x1A, 0x0A, 0x0A),
                parchment: Color::rgb(0xF8, 0xE6, 0xE6),
                accent: Color::rgb(0xFB, 0xBF, 0x24),
            },
            ThemeId::EnchantedForest => Self {
                id,
                void: Color::rgb(0x0A, 0x1F, 0x0A),
                parchment: Color::rgb(0xE6, 0xF8, 0xE6),
                accent: Color::rgb(0xA3, 0xE6, 0x35),
            },
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::palette(ThemeId::default())
    }
}

/// The opaque fill placed under a drawing when it is exported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Background {
    /// Selected theme.
    pub theme: ThemeId,
    /// Void or parchment.
    pub mode: BackgroundMode,
}

impl Background {
    /// Create a background selection.
    #[must_use]
    pub const fn new(theme: ThemeId, mode: BackgroundMode) -> Self {
        Self { theme, mode }
    }

    /// Resolve to a single opaque color.
    #[must_use]
    pub fn fill(&self) -> Color {
        let palette = Theme::palette(self.theme);
        match self.mode {
            BackgroundMode::Void => palette.void,
            BackgroundMode::Parchment => palette.parchment,
        }
    }
}

/// Pen colors offered to the user.
pub const PALETTE: [Color; 20] = [
    Color::rgb(0xFF, 0xD7, 0x00),
    Color::rgb(0xC0, 0xC0, 0xC0),
    Color::rgb(0xFF, 0xFF, 0xFF),
    Color::rgb(0x00, 0x00, 0x00),
    Color::rgb(0xFF, 0x45, 0x00),
    Color::rgb(0xDC, 0x14, 0x3C),
    Color::rgb(0xFF, 0x69, 0xB4),
    Color::rgb(0xFF, 0xA5, 0x00),
    Color::rgb(0x41, 0x69, 0xE1),
    Color::rgb(0x00, 0xCE, 0xD1),
    Color::rgb(0x93, 0x70, 0xDB),
    Color::rgb(0x8A, 0x2B, 0xE2),
    Color::rgb(0x22, 0x8B, 0x22),
    Color::rgb(0x8B, 0x45, 0x13),
    Color::rgb(0xDA, 0xA5, 0x20),
    Color::rgb(0x2F, 0x4F, 0x4F),
    Color::rgb(0xE6, 0xE6, 0xFA),
    Color::rgb(0x87, 0xCE, 0xEB),
    Color::rgb(0xF0, 0xE6, 0x8C),
    Color::rgb(0xDD, 0xA0, 0xDD),
];
