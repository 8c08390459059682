//! Reading flow tests: reveal timing, fallback cards and history.
//!
//! Time is paused, so the reveal delay and timeouts elapse instantly while
//! keeping their ordering.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use ink_core::{
    Background, CanvasState, HistoryStore, Point, ReadingKind, Spread, SpreadKind, TarotCard,
};
use ink_oracle::{
    InterpretationRequest, Interpreter, OracleConfig, OracleError, OracleResult, ReadingSession,
    SessionError,
};
use tokio::time::Instant;

const SIZE: (u32, u32) = (120, 90);

/// Answers after `delay` with numbered cards, recording every request.
struct ScriptedInterpreter {
    delay: Duration,
    fail: bool,
    calls: AtomicUsize,
    seen: Mutex<Vec<InterpretationRequest>>,
}

impl ScriptedInterpreter {
    fn new(delay: Duration) -> Self {
        Self {
            delay,
            fail: false,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Duration::ZERO)
        }
    }
}

#[async_trait]
impl Interpreter for ScriptedInterpreter {
    async fn interpret(&self, request: &InterpretationRequest) -> OracleResult<TarotCard> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().expect("lock").push(request.clone());
        tokio::time::sleep(self.delay).await;
        if self.fail {
            return Err(OracleError::EmptyResponse);
        }
        Ok(TarotCard {
            name: format!("Card {n}"),
            arcana: "Minor Arcana".to_string(),
            meaning: "meaning".to_string(),
            visual_description: "imagery".to_string(),
            is_reversed: n % 2 == 1,
        })
    }
}

fn scribble(canvas: &mut CanvasState, offset: f32) {
    canvas.begin_stroke(Point::new(10.0 + offset, 10.0));
    canvas.extend_stroke(Point::new(60.0 + offset, 40.0));
    canvas.extend_stroke(Point::new(90.0, 80.0));
    canvas.commit_stroke();
}

fn session(spread: Spread, interpreter: Arc<ScriptedInterpreter>) -> ReadingSession {
    ReadingSession::new(
        "What should I focus on?",
        spread,
        Some("Career & Purpose".to_string()),
        interpreter,
        &OracleConfig::default(),
    )
}

#[tokio::test(start_paused = true)]
async fn fast_answer_still_waits_for_reveal() {
    let interpreter = Arc::new(ScriptedInterpreter::new(Duration::from_millis(200)));
    let mut s = session(Spread::preset(SpreadKind::YesNo), interpreter);
    let mut canvas = CanvasState::new();
    scribble(&mut canvas, 0.0);

    let start = Instant::now();
    let result = s
        .submit(&mut canvas, &Background::default(), SIZE)
        .await
        .expect("submit");

    assert!(start.elapsed() >= Duration::from_secs(3));
    assert!(start.elapsed() < Duration::from_secs(4));
    assert_eq!(result.card.name, "Card 0");
}

#[tokio::test(start_paused = true)]
async fn slow_answer_is_awaited_past_reveal() {
    let interpreter = Arc::new(ScriptedInterpreter::new(Duration::from_secs(10)));
    let mut s = session(Spread::preset(SpreadKind::YesNo), interpreter);
    let mut canvas = CanvasState::new();
    scribble(&mut canvas, 0.0);

    let start = Instant::now();
    let result = s
        .submit(&mut canvas, &Background::default(), SIZE)
        .await
        .expect("submit");

    assert!(start.elapsed() >= Duration::from_secs(10));
    assert_eq!(result.card.name, "Card 0");
}

#[tokio::test(start_paused = true)]
async fn timeout_yields_mystery_card() {
    let interpreter = Arc::new(ScriptedInterpreter::new(Duration::from_secs(120)));
    let mut s = session(Spread::preset(SpreadKind::YesNo), interpreter);
    let mut canvas = CanvasState::new();
    scribble(&mut canvas, 0.0);

    let start = Instant::now();
    let result = s
        .submit(&mut canvas, &Background::default(), SIZE)
        .await
        .expect("submit");

    assert!(start.elapsed() >= Duration::from_secs(30));
    assert!(start.elapsed() < Duration::from_secs(31));
    assert!(result.card.is_mystery());
    assert!(s.is_complete());
    assert!(!canvas.is_locked());
}

#[tokio::test(start_paused = true)]
async fn failure_yields_mystery_card_and_flow_continues() {
    let interpreter = Arc::new(ScriptedInterpreter::failing());
    let mut s = session(Spread::default(), interpreter);
    let mut canvas = CanvasState::new();

    scribble(&mut canvas, 0.0);
    let first = s
        .submit(&mut canvas, &Background::default(), SIZE)
        .await
        .expect("submit");
    assert_eq!(first.card, TarotCard::mystery());
    assert!(canvas.committed().is_empty());
    assert_eq!(s.current_position().map(|(p, _)| p), Some("Present"));
}

#[tokio::test(start_paused = true)]
async fn full_three_card_reading_is_saved() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = HistoryStore::with_data_dir(dir.path()).expect("store");
    let interpreter = Arc::new(ScriptedInterpreter::new(Duration::from_millis(50)));
    let mut s = session(Spread::default(), Arc::clone(&interpreter));
    s.set_prompts(vec![
        "Draw the road behind".to_string(),
        "Draw the crossroads".to_string(),
        "Draw the horizon".to_string(),
    ]);
    let mut canvas = CanvasState::new();

    for i in 0..3 {
        #[allow(clippy::cast_precision_loss)]
        scribble(&mut canvas, i as f32 * 5.0);
        s.submit(&mut canvas, &Background::default(), SIZE)
            .await
            .expect("submit");
    }

    // No more positions.
    scribble(&mut canvas, 0.0);
    let err = s
        .submit(&mut canvas, &Background::default(), SIZE)
        .await
        .expect_err("complete");
    assert!(matches!(err, SessionError::SpreadComplete(3)));
    assert_eq!(canvas.committed().len(), 1);

    // Earlier cards are excluded from later requests.
    {
        let seen = interpreter.seen.lock().expect("lock");
        assert_eq!(seen.len(), 3);
        assert!(seen[0].excluded_cards.is_empty());
        assert_eq!(seen[2].excluded_cards, vec!["Card 0", "Card 1"]);
        assert_eq!(seen[1].position, "Present");
        assert_eq!(seen[1].prompt, "Draw the crossroads");
        assert!(!seen[1].image_base64.starts_with("data:"));
    }

    let entry = s.finish("All roads converge.", &store).expect("finish");
    assert_eq!(entry.readings.len(), 3);
    assert_eq!(entry.kind, ReadingKind::Full);
    assert_eq!(entry.category_name.as_deref(), Some("Career & Purpose"));
    assert_eq!(entry.spread_name.as_deref(), Some("Past-Present-Future"));

    let reloaded = HistoryStore::with_data_dir(dir.path()).expect("reload");
    let saved = reloaded.get(&entry.id).expect("persisted");
    assert_eq!(saved.synthesis, "All roads converge.");
}

#[tokio::test(start_paused = true)]
async fn custom_timing_from_config() {
    let interpreter = Arc::new(ScriptedInterpreter::new(Duration::from_secs(5)));
    let config = OracleConfig::default()
        .with_request_timeout(Duration::from_secs(1))
        .with_min_reveal(Duration::from_millis(500));
    let mut s = ReadingSession::new("q", Spread::custom(2), None, interpreter, &config);
    let mut canvas = CanvasState::new();
    scribble(&mut canvas, 0.0);

    let start = Instant::now();
    let result = s
        .submit(&mut canvas, &Background::default(), SIZE)
        .await
        .expect("submit");
    assert!(start.elapsed() >= Duration::from_secs(1));
    assert!(start.elapsed() < Duration::from_secs(2));
    assert!(result.card.is_mystery());
    assert_eq!(result.position, "Card 1");
}

#[tokio::test(start_paused = true)]
async fn undo_works_while_card_is_pending() {
    let interpreter = Arc::new(ScriptedInterpreter::new(Duration::from_secs(1)));
    let mut s = session(Spread::preset(SpreadKind::YesNo), interpreter);
    let mut canvas = CanvasState::new();
    scribble(&mut canvas, 0.0);
    scribble(&mut canvas, 20.0);

    let pending = s
        .prepare(&mut canvas, &Background::default(), SIZE)
        .expect("prepare");
    assert!(canvas.is_locked());
    assert_eq!(pending.request().position, "Answer");

    let meanwhile = async {
        tokio::time::sleep(Duration::from_millis(500)).await;
        canvas.begin_stroke(Point::new(5.0, 5.0));
        assert!(canvas.in_progress().is_none());
        canvas.undo_last();
        assert_eq!(canvas.committed().len(), 1);
        assert!(canvas.is_locked());
    };
    let (card, ()) = tokio::join!(pending.reveal(), meanwhile);
    assert_eq!(card.name, "Card 0");
    assert!(canvas.is_locked());

    let result = s.complete(&mut canvas, pending, card);
    assert_eq!(result.position, "Answer");
    assert!(!canvas.is_locked());
    assert!(canvas.committed().is_empty());
    assert!(s.is_complete());
}

#[tokio::test(start_paused = true)]
async fn second_prepare_is_refused_while_pending() {
    let interpreter = Arc::new(ScriptedInterpreter::new(Duration::ZERO));
    let s = session(Spread::default(), interpreter);
    let mut canvas = CanvasState::new();
    scribble(&mut canvas, 0.0);

    let _pending = s
        .prepare(&mut canvas, &Background::default(), SIZE)
        .expect("prepare");
    let err = s
        .prepare(&mut canvas, &Background::default(), SIZE)
        .expect_err("locked");
    assert!(matches!(err, SessionError::Locked));
}
