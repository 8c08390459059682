//! The interpretation seam.
//!
//! The reading flow only needs something that turns a drawing into a card.
//! [`crate::GeminiClient`] is the production implementation; tests plug in
//! their own.

use async_trait::async_trait;
use ink_core::TarotCard;
use serde::{Deserialize, Serialize};

use crate::error::OracleResult;

/// Everything the oracle is told about one drawing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterpretationRequest {
    /// The flattened drawing, base64 PNG without a data-URI prefix.
    pub image_base64: String,
    /// The seeker's question.
    pub question: String,
    /// Spread position label ("Past", "Partner", ...).
    pub position: String,
    /// What the user was asked to draw.
    pub prompt: String,
    /// Cards already drawn in this reading; must not be repeated.
    pub excluded_cards: Vec<String>,
}

/// Turns a drawing into a tarot card.
#[async_trait]
pub trait Interpreter: Send + Sync {
    /// Interpret one drawing.
    ///
    /// # Errors
    ///
    /// Returns an error if the service cannot be reached or its answer
    /// cannot be decoded. Callers substitute [`TarotCard::mystery`].
    async fn interpret(&self, request: &InterpretationRequest) -> OracleResult<TarotCard>;
}

/// Always answers with the same card. Useful offline and in tests.
#[derive(Debug, Clone)]
pub struct FixedInterpreter {
    card: TarotCard,
}

impl FixedInterpreter {
    /// Answer every request with `card`.
    #[must_use]
    pub fn new(card: TarotCard) -> Self {
        Self { card }
    }
}

#[async_trait]
impl Interpreter for FixedInterpreter {
    async fn interpret(&self, request: &InterpretationRequest) -> OracleResult<TarotCard> {
        tracing::debug!("Fixed interpretation for {}", request.position);
        Ok(self.card.clone())
    }
}
