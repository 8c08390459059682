//! The reading flow.
//!
//! A [`ReadingSession`] walks the positions of a spread. Each submission
//! locks the canvas, exports the drawing and asks the interpreter for a
//! card while a minimum reveal delay runs alongside; the card is revealed
//! only when both are done. Interpretation failures and timeouts become
//! [`TarotCard::mystery`], so a reading always moves forward.
//!
//! [`ReadingSession::submit`] runs the whole submission. Hosts that keep
//! handling input while the card is pending split it into
//! [`ReadingSession::prepare`], [`PendingSubmission::reveal`] and
//! [`ReadingSession::complete`]; the canvas is free between the steps, so
//! undo and clear stay available while new strokes are refused.

use std::sync::Arc;
use std::time::Duration;

use ink_core::history::{HistoryStore, ReadingHistory, ReadingKind};
use ink_core::{Background, CanvasState, ReadingResult, Spread, TarotCard};
use ink_renderer::DrawingExporter;
use uuid::Uuid;

use crate::config::OracleConfig;
use crate::error::{OracleError, SessionError};
use crate::interpreter::{InterpretationRequest, Interpreter};

/// One reading in progress.
pub struct ReadingSession {
    id: Uuid,
    question: String,
    spread: Spread,
    category: Option<String>,
    prompts: Vec<String>,
    results: Vec<ReadingResult>,
    interpreter: Arc<dyn Interpreter>,
    exporter: DrawingExporter,
    request_timeout: Duration,
    min_reveal: Duration,
}

impl std::fmt::Debug for ReadingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadingSession")
            .field("id", &self.id)
            .field("question", &self.question)
            .field("spread", &self.spread.name)
            .field("drawn", &self.results.len())
            .finish_non_exhaustive()
    }
}

/// A drawing exported and waiting for its card.
///
/// Holds no borrow of the canvas or the session.
pub struct PendingSubmission {
    request: InterpretationRequest,
    interpreter: Arc<dyn Interpreter>,
    request_timeout: Duration,
    min_reveal: Duration,
}

impl std::fmt::Debug for PendingSubmission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingSubmission")
            .field("position", &self.request.position)
            .field("request_timeout", &self.request_timeout)
            .field("min_reveal", &self.min_reveal)
            .finish_non_exhaustive()
    }
}

impl PendingSubmission {
    /// The request sent to the interpreter.
    #[must_use]
    pub fn request(&self) -> &InterpretationRequest {
        &self.request
    }

    /// Run the interpretation under its timeout next to the reveal delay.
    ///
    /// Resolves once both are done; failures and timeouts yield
    /// [`TarotCard::mystery`].
    pub async fn reveal(&self) -> TarotCard {
        let interpretation =
            tokio::time::timeout(self.request_timeout, self.interpreter.interpret(&self.request));
        let (outcome, ()) = tokio::join!(interpretation, tokio::time::sleep(self.min_reveal));

        let failure = match outcome {
            Ok(Ok(card)) => return card,
            Ok(Err(e)) => e,
            Err(_) => OracleError::Timeout,
        };
        tracing::warn!(
            "Interpretation for {} failed, using fallback card: {failure}",
            self.request.position
        );
        TarotCard::mystery()
    }
}

/// Default instruction for a position until prompts are supplied.
fn default_prompt(position: &str) -> String {
    format!("Draw {}", position.to_lowercase())
}

impl ReadingSession {
    /// Start a reading for `question` over `spread`.
    #[must_use]
    pub fn new(
        question: impl Into<String>,
        spread: Spread,
        category: Option<String>,
        interpreter: Arc<dyn Interpreter>,
        config: &OracleConfig,
    ) -> Self {
        let prompts = spread
            .positions
            .iter()
            .map(|p| default_prompt(&p.name))
            .collect();
        let id = Uuid::new_v4();
        tracing::debug!("Reading {id} started ({})", spread.name);
        Self {
            id,
            question: question.into(),
            spread,
            category,
            prompts,
            results: Vec::new(),
            interpreter,
            exporter: DrawingExporter::default(),
            request_timeout: config.request_timeout,
            min_reveal: config.min_reveal,
        }
    }

    /// Draw with `exporter` instead of the default compositor.
    #[must_use]
    pub fn with_exporter(mut self, exporter: DrawingExporter) -> Self {
        self.exporter = exporter;
        self
    }

    /// Session id.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The seeker's question.
    #[must_use]
    pub fn question(&self) -> &str {
        &self.question
    }

    /// The spread being drawn.
    #[must_use]
    pub fn spread(&self) -> &Spread {
        &self.spread
    }

    /// Question category, if any.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Drawing instructions, one per position.
    #[must_use]
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// Replace the drawing instructions.
    ///
    /// Missing entries keep their default; extra entries are ignored.
    pub fn set_prompts(&mut self, prompts: Vec<String>) {
        for (slot, prompt) in self.prompts.iter_mut().zip(prompts) {
            *slot = prompt;
        }
    }

    /// Results so far, in position order.
    #[must_use]
    pub fn results(&self) -> &[ReadingResult] {
        &self.results
    }

    /// Position label and prompt for the next drawing, or `None` when the
    /// spread is complete.
    #[must_use]
    pub fn current_position(&self) -> Option<(&str, &str)> {
        let index = self.results.len();
        let position = self.spread.positions.get(index)?;
        Some((position.name.as_str(), self.prompts[index].as_str()))
    }

    /// Whether every position has a card.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.results.len() >= self.spread.card_count()
    }

    /// Submit the drawing on `canvas` for the current position.
    ///
    /// The canvas stays locked until the card is revealed and is cleared
    /// for the next position afterwards.
    ///
    /// # Errors
    ///
    /// Same as [`Self::prepare`].
    pub async fn submit(
        &mut self,
        canvas: &mut CanvasState,
        background: &Background,
        size: (u32, u32),
    ) -> Result<ReadingResult, SessionError> {
        let pending = self.prepare(canvas, background, size)?;
        let card = pending.reveal().await;
        Ok(self.complete(canvas, pending, card))
    }

    /// Lock `canvas` and export its drawing for the current position.
    ///
    /// The canvas stays locked until the returned submission is passed to
    /// [`Self::complete`].
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::SpreadComplete`] when nothing is left to
    /// draw, [`SessionError::Locked`] while another submission holds the
    /// canvas, [`SessionError::EmptyCanvas`] without committed strokes and
    /// [`SessionError::Render`] if the drawing cannot be exported. The
    /// canvas is left untouched in every error case.
    pub fn prepare(
        &self,
        canvas: &mut CanvasState,
        background: &Background,
        size: (u32, u32),
    ) -> Result<PendingSubmission, SessionError> {
        let Some((position, prompt)) = self.current_position() else {
            return Err(SessionError::SpreadComplete(self.spread.card_count()));
        };
        if canvas.is_locked() {
            return Err(SessionError::Locked);
        }
        if !canvas.can_submit() {
            return Err(SessionError::EmptyCanvas);
        }

        canvas.lock();
        let image = match self
            .exporter
            .export_state(canvas, background, size.0, size.1)
        {
            Ok(image) => image,
            Err(e) => {
                canvas.unlock();
                return Err(e.into());
            }
        };

        Ok(PendingSubmission {
            request: InterpretationRequest {
                image_base64: image.to_base64(),
                question: self.question.clone(),
                position: position.to_string(),
                prompt: prompt.to_string(),
                excluded_cards: self.drawn_cards(),
            },
            interpreter: Arc::clone(&self.interpreter),
            request_timeout: self.request_timeout,
            min_reveal: self.min_reveal,
        })
    }

    /// Record the revealed `card`: unlock `canvas`, append the result and
    /// clear the canvas for the next position.
    pub fn complete(
        &mut self,
        canvas: &mut CanvasState,
        pending: PendingSubmission,
        card: TarotCard,
    ) -> ReadingResult {
        canvas.unlock();
        let InterpretationRequest {
            image_base64,
            position,
            prompt,
            ..
        } = pending.request;

        let result = ReadingResult {
            position,
            prompt,
            card,
            drawing_base64: image_base64,
        };
        self.results.push(result.clone());
        canvas.clear_all();
        tracing::debug!(
            "Reading {}: {} -> {} ({}/{})",
            self.id,
            result.position,
            result.card.name,
            self.results.len(),
            self.spread.card_count()
        );
        result
    }

    /// Names of the cards drawn so far.
    #[must_use]
    pub fn drawn_cards(&self) -> Vec<String> {
        self.results.iter().map(|r| r.card.name.clone()).collect()
    }

    /// Save the completed reading with its closing `synthesis`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Incomplete`] if positions are still open.
    pub fn finish(
        &self,
        synthesis: &str,
        store: &HistoryStore,
    ) -> Result<ReadingHistory, SessionError> {
        if !self.is_complete() {
            return Err(SessionError::Incomplete {
                drawn: self.results.len(),
                expected: self.spread.card_count(),
            });
        }
        let entry = store.save_reading(
            &self.question,
            self.results.clone(),
            synthesis,
            ReadingKind::Full,
            Some(&self.spread.name),
            self.category.as_deref(),
        );
        tracing::info!("Reading {} saved as {}", self.id, entry.id);
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::FixedInterpreter;
    use ink_core::{Point, SpreadKind};

    fn card(name: &str) -> TarotCard {
        TarotCard {
            name: name.to_string(),
            arcana: "Major Arcana".to_string(),
            meaning: "m".to_string(),
            visual_description: "v".to_string(),
            is_reversed: false,
        }
    }

    fn session(spread: Spread) -> ReadingSession {
        ReadingSession::new(
            "Where am I headed?",
            spread,
            None,
            Arc::new(FixedInterpreter::new(card("The Chariot"))),
            &OracleConfig::default(),
        )
    }

    fn scribble(canvas: &mut CanvasState) {
        canvas.begin_stroke(Point::new(5.0, 5.0));
        canvas.extend_stroke(Point::new(40.0, 30.0));
        canvas.commit_stroke();
    }

    #[test]
    fn test_default_prompts_follow_positions() {
        let s = session(Spread::default());
        assert_eq!(s.prompts(), &["Draw past", "Draw present", "Draw future"]);
        assert_eq!(s.current_position(), Some(("Past", "Draw past")));
    }

    #[test]
    fn test_set_prompts_partial() {
        let mut s = session(Spread::default());
        s.set_prompts(vec!["Draw the storm".to_string()]);
        assert_eq!(s.prompts()[0], "Draw the storm");
        assert_eq!(s.prompts()[1], "Draw present");
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_advances_and_clears() {
        let mut s = session(Spread::preset(SpreadKind::YesNo));
        let mut canvas = CanvasState::new();
        scribble(&mut canvas);

        let result = s
            .submit(&mut canvas, &Background::default(), (64, 48))
            .await
            .expect("submit");

        assert_eq!(result.position, "Answer");
        assert_eq!(result.card.name, "The Chariot");
        assert!(!result.drawing_base64.is_empty());
        assert!(canvas.committed().is_empty());
        assert!(!canvas.is_locked());
        assert!(s.is_complete());
        assert!(s.current_position().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_canvas_rejected() {
        let mut s = session(Spread::default());
        let mut canvas = CanvasState::new();
        let err = s
            .submit(&mut canvas, &Background::default(), (64, 48))
            .await
            .expect_err("empty");
        assert!(matches!(err, SessionError::EmptyCanvas));
        assert!(!canvas.is_locked());
    }

    #[tokio::test(start_paused = true)]
    async fn test_locked_canvas_rejected() {
        let mut s = session(Spread::default());
        let mut canvas = CanvasState::new();
        scribble(&mut canvas);
        canvas.lock();
        let err = s
            .submit(&mut canvas, &Background::default(), (64, 48))
            .await
            .expect_err("locked");
        assert!(matches!(err, SessionError::Locked));
        assert_eq!(canvas.committed().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_render_error_unlocks() {
        let mut s = session(Spread::default());
        let mut canvas = CanvasState::new();
        scribble(&mut canvas);
        let err = s
            .submit(&mut canvas, &Background::default(), (0, 48))
            .await
            .expect_err("bad size");
        assert!(matches!(err, SessionError::Render(_)));
        assert!(!canvas.is_locked());
        assert_eq!(canvas.committed().len(), 1);
        assert!(s.results().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_finish_requires_all_cards() {
        let mut s = session(Spread::preset(SpreadKind::YesNo));
        let store = HistoryStore::new();
        assert!(matches!(
            s.finish("done", &store),
            Err(SessionError::Incomplete {
                drawn: 0,
                expected: 1
            })
        ));

        let mut canvas = CanvasState::new();
        scribble(&mut canvas);
        s.submit(&mut canvas, &Background::default(), (64, 48))
            .await
            .expect("submit");
        let entry = s.finish("done", &store).expect("finish");
        assert_eq!(entry.spread_name.as_deref(), Some("Yes or No"));
        assert_eq!(entry.kind, ReadingKind::Full);
        assert_eq!(store.len(), 1);
    }
}
