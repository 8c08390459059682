//! Tarot cards, per-position results and spread layouts.

use serde::{Deserialize, Serialize};

/// A card assigned to a drawing by the interpretation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TarotCard {
    /// Card name, e.g. "The Fool" or "Three of Cups".
    pub name: String,
    /// Arcana category ("Major Arcana" / "Minor Arcana").
    pub arcana: String,
    /// Interpretation for this position.
    pub meaning: String,
    /// Short description of the traditional imagery.
    pub visual_description: String,
    /// Whether the card was drawn upside-down.
    pub is_reversed: bool,
}

impl TarotCard {
    /// Name of the card substituted when interpretation fails.
    pub const MYSTERY_NAME: &'static str = "The Mystery";

    /// The clearly-labelled stand-in used when the oracle cannot answer.
    #[must_use]
    pub fn mystery() -> Self {
        Self {
            name: Self::MYSTERY_NAME.to_string(),
            arcana: "Unknown".to_string(),
            meaning: "The mists obscure the vision. Ensure your API key is valid.".to_string(),
            visual_description: "A clouded mirror.".to_string(),
            is_reversed: false,
        }
    }

    /// Whether this is the fallback card.
    #[must_use]
    pub fn is_mystery(&self) -> bool {
        self.name == Self::MYSTERY_NAME && self.arcana == "Unknown"
    }
}

/// The outcome of one drawn position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingResult {
    /// Position label ("Past", "Partner", ...).
    #[serde(rename = "timeFrame")]
    pub position: String,
    /// What the user was asked to draw.
    pub prompt: String,
    /// The card assigned.
    pub card: TarotCard,
    /// The exported drawing, base64 PNG.
    #[serde(rename = "drawingBase64")]
    pub drawing_base64: String,
}

/// Named spread layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpreadKind {
    /// Past, Present, Future.
    ThreeCard,
    /// Single answer card.
    YesNo,
    /// You, Partner, Connection.
    Love,
    /// Six-card cross.
    CelticCross,
    /// User-chosen card count.
    Custom,
}

/// A named position in a spread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpreadPosition {
    /// Label shown to the user and sent to the oracle.
    pub name: String,
    /// What the position stands for.
    pub description: String,
}

/// A spread: a name and an ordered list of positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spread {
    /// Layout kind.
    pub kind: SpreadKind,
    /// Display name.
    pub name: String,
    /// Positions in drawing order.
    pub positions: Vec<SpreadPosition>,
}

/// Fewest cards a custom spread may have.
pub const MIN_CUSTOM_CARDS: usize = 1;

/// Most cards a custom spread may have.
pub const MAX_CUSTOM_CARDS: usize = 10;

impl Spread {
    /// The preset layout for `kind`; `Custom` yields three cards.
    #[must_use]
    pub fn preset(kind: SpreadKind) -> Self {
        let (name, positions): (&str, &[(&str, &str)]) = match kind {
            SpreadKind::ThreeCard => (
                "Past-Present-Future",
                &[
                    ("Past", "What has led you here"),
                    ("Present", "Your current situation"),
                    ("Future", "Where you are heading"),
                ],
            ),
            SpreadKind::YesNo => ("Yes or No", &[("Answer", "The universe responds")]),
            SpreadKind::Love => (
                "Love Triangle",
                &[
                    ("You", "Your energy in the relationship"),
                    ("Partner", "Their energy and perspective"),
                    ("Connection", "The bond between you"),
                ],
            ),
            SpreadKind::CelticCross => (
                "Celtic Cross",
                &[
                    ("Present", "The heart of the matter"),
                    ("Challenge", "What crosses you"),
                    ("Foundation", "The root cause"),
                    ("Past", "Recent influences"),
                    ("Crown", "Best possible outcome"),
                    ("Future", "What is coming"),
                ],
            ),
            SpreadKind::Custom => return Self::custom(3),
        };
        Self {
            kind,
            name: name.to_string(),
            positions: positions
                .iter()
                .map(|(n, d)| SpreadPosition {
                    name: (*n).to_string(),
                    description: (*d).to_string(),
                })
                .collect(),
        }
    }

    /// A custom spread of `count` cards, clamped to
    /// `[MIN_CUSTOM_CARDS, MAX_CUSTOM_CARDS]`.
    #[must_use]
    pub fn custom(count: usize) -> Self {
        let count = count.clamp(MIN_CUSTOM_CARDS, MAX_CUSTOM_CARDS);
        Self {
            kind: SpreadKind::Custom,
            name: "Custom Spread".to_string(),
            positions: (1..=count)
                .map(|i| SpreadPosition {
                    name: format!("Card {i}"),
                    description: format!("Position {i} of {count}"),
                })
                .collect(),
        }
    }

    /// Number of cards drawn in this spread.
    #[must_use]
    pub fn card_count(&self) -> usize {
        self.positions.len()
    }

    /// Position labels in order.
    #[must_use]
    pub fn position_names(&self) -> Vec<String> {
        self.positions.iter().map(|p| p.name.clone()).collect()
    }
}

impl Default for Spread {
    fn default() -> Self {
        Self::preset(SpreadKind::ThreeCard)
    }
}
