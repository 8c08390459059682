//! # Mystic Ink Core
//!
//! Core logic for drawing-driven tarot readings.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                  ink-core                   │
//! ├─────────────────────────────────────────────┤
//! │  Input Capture   │  Stroke Model            │
//! │  - Mouse events  │  - In-progress buffer    │
//! │  - Touch events  │  - Committed stroke log  │
//! │  - Surface rect  │  - Undo / clear / lock   │
//! ├─────────────────────────────────────────────┤
//! │  Themes          │  History                 │
//! │  - Backgrounds   │  - Reading records       │
//! │  - Pen palette   │  - Monthly/yearly stats  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Rendering lives in `ink-renderer`; the interpretation service and the
//! reading flow live in `ink-oracle`.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod analytics;
pub mod error;
pub mod history;
pub mod input;
pub mod reading;
pub mod state;
pub mod stroke;
pub mod theme;

pub use error::{CanvasError, CanvasResult};
pub use history::{HistoryError, HistoryStore, ReadingHistory, ReadingKind};
pub use input::{InputPhase, PointerInput, SurfaceRect, TouchPoint};
pub use reading::{ReadingResult, Spread, SpreadKind, TarotCard};
pub use state::CanvasState;
pub use stroke::{BrushStyle, Color, Point, Stroke, Tool, ToolSettings};
pub use theme::{Background, BackgroundMode, Theme, ThemeId};

/// Core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
