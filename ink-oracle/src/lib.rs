//! # Mystic Ink Oracle
//!
//! Interpretation service client and the reading flow.
//!
//! ```text
//! ┌─────────────┐ export ┌────────────────┐ interpret ┌─────────────┐
//! │ CanvasState │ ─────▶ │ ReadingSession │ ────────▶ │ Interpreter │
//! │ (ink-core)  │        │ lock / reveal  │ ◀──────── │ (Gemini)    │
//! └─────────────┘        └───────┬────────┘ TarotCard └─────────────┘
//!                                │ finish
//!                                ▼
//!                        ┌────────────────┐
//!                        │  HistoryStore  │
//!                        └────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod gemini;
pub mod interpreter;
pub mod prompts;
pub mod session;

pub use config::OracleConfig;
pub use error::{OracleError, OracleResult, SessionError};
pub use gemini::{DailyReading, GeminiClient, PeriodAnalysis};
pub use interpreter::{FixedInterpreter, InterpretationRequest, Interpreter};
pub use prompts::PeriodStats;
pub use session::{PendingSubmission, ReadingSession};
