//! # Mystic Ink CLI
//!
//! Command-line host for the stroke canvas engine and the oracle.
//!
//! ## Commands
//!
//! - `render` - replay a stroke file and export it as a PNG
//! - `read` - submit one stroke file per spread position for a reading
//! - `daily` - draw (or show) the card of the day
//! - `history` - list, summarize or clear saved readings
//!
//! Stroke files are JSON arrays of strokes, each with `points` and the tool
//! settings they were drawn with:
//!
//! ```json
//! [{"points": [{"x": 10, "y": 10}, {"x": 90, "y": 40}],
//!   "color": "#FFD700", "width": 5, "tool": "pen", "style": "glow", "opacity": 1}]
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use ink_core::history::{DailyCard, HistoryStore, ReadingHistory, ReadingKind};
use ink_core::{
    Background, BackgroundMode, CanvasState, ReadingResult, Spread, SpreadKind, Stroke, ThemeId,
};
use ink_oracle::{GeminiClient, OracleConfig, PeriodStats, ReadingSession};
use ink_renderer::{DrawingExporter, ExportedImage};

/// Command-line arguments for mystic-ink.
#[derive(Debug, Clone, Parser)]
#[command(name = "mystic-ink")]
#[command(about = "Draw your question, receive a tarot card")]
#[command(version)]
pub struct CliArgs {
    /// Directory holding reading history
    #[arg(long, env = "MYSTIC_INK_DATA_DIR", default_value = ".mystic-ink")]
    pub data_dir: PathBuf,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

impl CliArgs {
    /// Oracle configuration from the environment, with the key from the
    /// command line taking precedence.
    #[must_use]
    pub fn oracle_config(&self) -> OracleConfig {
        let config = OracleConfig::from_env();
        match self.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => config.with_api_key(key),
            _ => config,
        }
    }
}

/// Subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Render a stroke file to PNG
    Render(RenderArgs),
    /// Run a reading over one stroke file per position
    Read(ReadArgs),
    /// Show the card of the day
    Daily,
    /// Browse saved readings
    History {
        /// History action (defaults to `list`)
        #[command(subcommand)]
        action: Option<HistoryCommand>,
    },
}

/// History actions.
#[derive(Debug, Clone, Subcommand)]
pub enum HistoryCommand {
    /// List saved readings, newest first
    List,
    /// Card statistics for a month or a year
    Stats {
        /// Year
        #[arg(long)]
        year: i32,
        /// Month (1-12); omit for the whole year
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,
        /// Ask the oracle for patterns across the period
        #[arg(long)]
        insight: bool,
    },
    /// Delete every saved reading
    Clear,
}

/// Drawing surface and backdrop options.
#[derive(Debug, Clone, Args)]
pub struct SurfaceArgs {
    /// Theme used for the backdrop
    #[arg(long, default_value = "mystic-purple")]
    pub theme: ThemeId,

    /// Backdrop: void or parchment
    #[arg(long, default_value = "void")]
    pub background: BackgroundMode,

    /// Surface width in pixels
    #[arg(long, default_value = "800")]
    pub width: u32,

    /// Surface height in pixels
    #[arg(long, default_value = "600")]
    pub height: u32,
}

impl SurfaceArgs {
    /// The export backdrop.
    #[must_use]
    pub fn backdrop(&self) -> Background {
        Background::new(self.theme, self.background)
    }
}

/// Arguments for `render`.
#[derive(Debug, Clone, Args)]
pub struct RenderArgs {
    /// Stroke file (JSON)
    pub input: PathBuf,

    /// Output PNG path
    #[arg(short, long)]
    pub output: PathBuf,

    /// Surface options
    #[command(flatten)]
    pub surface: SurfaceArgs,
}

/// Arguments for `read`.
#[derive(Debug, Clone, Args)]
pub struct ReadArgs {
    /// One stroke file per spread position, in order
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// The question to ask
    #[arg(short, long)]
    pub question: String,

    /// Spread: three-card, yes-no, love, celtic-cross or custom
    #[arg(long, value_parser = parse_spread)]
    pub spread: Option<SpreadKind>,

    /// Question category, e.g. "Love & Relationships"
    #[arg(long)]
    pub category: Option<String>,

    /// Drawing instruction per position (repeatable)
    #[arg(long = "prompt")]
    pub prompts: Vec<String>,

    /// Surface options
    #[command(flatten)]
    pub surface: SurfaceArgs,
}

impl ReadArgs {
    /// The spread to draw: the named preset, or a custom spread with one
    /// position per input file.
    ///
    /// # Errors
    ///
    /// Fails when the number of input files does not match the spread.
    pub fn spread(&self) -> anyhow::Result<Spread> {
        let spread = match self.spread {
            Some(SpreadKind::Custom) | None => Spread::custom(self.inputs.len()),
            Some(kind) => Spread::preset(kind),
        };
        if spread.card_count() != self.inputs.len() {
            bail!(
                "{} needs {} drawings, got {}",
                spread.name,
                spread.card_count(),
                self.inputs.len()
            );
        }
        Ok(spread)
    }
}

/// Parse a spread name as used on the command line.
///
/// # Errors
///
/// Returns a message listing the known names.
pub fn parse_spread(name: &str) -> Result<SpreadKind, String> {
    match name {
        "three-card" => Ok(SpreadKind::ThreeCard),
        "yes-no" => Ok(SpreadKind::YesNo),
        "love" => Ok(SpreadKind::Love),
        "celtic-cross" => Ok(SpreadKind::CelticCross),
        "custom" => Ok(SpreadKind::Custom),
        other => Err(format!(
            "unknown spread '{other}' (expected three-card, yes-no, love, celtic-cross or custom)"
        )),
    }
}

/// Read a stroke file.
///
/// # Errors
///
/// Fails if the file cannot be read or holds invalid strokes.
pub fn load_strokes(path: &Path) -> anyhow::Result<Vec<Stroke>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let strokes = Stroke::list_from_json(&json)
        .with_context(|| format!("Invalid stroke file {}", path.display()))?;
    tracing::debug!("Loaded {} strokes from {}", strokes.len(), path.display());
    Ok(strokes)
}

/// Load recorded strokes into a fresh canvas, in paint order and with their
/// points exactly as recorded.
#[must_use]
pub fn replay(strokes: &[Stroke]) -> CanvasState {
    let mut canvas = CanvasState::new();
    for stroke in strokes {
        canvas.push_stroke(stroke.clone());
    }
    canvas
}

/// Render a stroke file and write the PNG.
///
/// # Errors
///
/// Fails on unreadable input, an empty drawing, a bad surface size or an
/// unwritable output path.
pub fn render(args: &RenderArgs) -> anyhow::Result<ExportedImage> {
    let canvas = replay(&load_strokes(&args.input)?);
    if !canvas.can_submit() {
        bail!("{} contains no strokes", args.input.display());
    }
    let image = DrawingExporter::default().export_state(
        &canvas,
        &args.surface.backdrop(),
        args.surface.width,
        args.surface.height,
    )?;
    std::fs::write(&args.output, &image.png)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    tracing::info!(
        "Rendered {} strokes to {} ({}x{})",
        canvas.committed().len(),
        args.output.display(),
        image.width,
        image.height
    );
    Ok(image)
}

/// Run a full reading and save it to `store`.
///
/// Without an API key every card comes back as the fallback card; the
/// reading still completes and is saved.
///
/// # Errors
///
/// Fails on unreadable or empty stroke files, a spread mismatch or a bad
/// surface size.
pub async fn read(
    args: &ReadArgs,
    config: &OracleConfig,
    store: &HistoryStore,
) -> anyhow::Result<ReadingHistory> {
    let spread = args.spread()?;
    let drawings = args
        .inputs
        .iter()
        .map(|path| load_strokes(path))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let client = GeminiClient::new(config)?;
    if !client.has_credential() {
        tracing::warn!("No Gemini API key configured; cards will be clouded");
    }

    let mut session = ReadingSession::new(
        args.question.clone(),
        spread,
        args.category.clone(),
        Arc::new(client.clone()),
        config,
    );

    if args.prompts.is_empty() {
        if client.has_credential() {
            let prompts = client
                .drawing_prompts(
                    &args.question,
                    &session.spread().position_names(),
                    args.category.as_deref(),
                )
                .await;
            session.set_prompts(prompts);
        }
    } else {
        session.set_prompts(args.prompts.clone());
    }

    let background = args.surface.backdrop();
    let size = (args.surface.width, args.surface.height);
    for (path, strokes) in args.inputs.iter().zip(&drawings) {
        let mut canvas = replay(strokes);
        let result = session
            .submit(&mut canvas, &background, size)
            .await
            .with_context(|| format!("Failed to submit {}", path.display()))?;
        print_result(&result);
    }

    let synthesis = client
        .synthesis(
            &args.question,
            session.results(),
            Some(&session.spread().name),
            session.category(),
        )
        .await;
    println!("\n{synthesis}");

    Ok(session.finish(&synthesis, store)?)
}

fn print_result(result: &ReadingResult) {
    let orientation = if result.card.is_reversed {
        " (reversed)"
    } else {
        ""
    };
    println!(
        "{}: {}{} [{}]\n  {}",
        result.position, result.card.name, orientation, result.card.arcana, result.card.meaning
    );
}

/// The card of the day for `today`, drawing a new one if none is stored.
///
/// New cards are also saved to the history as a daily reading.
///
/// # Errors
///
/// Fails if the oracle client cannot be built.
pub async fn daily(
    config: &OracleConfig,
    store: &HistoryStore,
    today: NaiveDate,
) -> anyhow::Result<DailyCard> {
    if let Some(card) = store.daily_card(today) {
        tracing::debug!("Card of the day for {today} already drawn");
        return Ok(card);
    }

    let client = GeminiClient::new(config)?;
    let reading = client.daily_card(today).await;
    store.save_daily_card(
        today,
        reading.card.clone(),
        &reading.message,
        Some(&reading.date_meaning),
    );
    store.save_reading(
        "Daily Card",
        vec![ReadingResult {
            position: "Today".to_string(),
            prompt: String::new(),
            card: reading.card,
            drawing_base64: String::new(),
        }],
        &reading.message,
        ReadingKind::Daily,
        None,
        None,
    );

    store
        .daily_card(today)
        .context("Card of the day was not stored")
}

/// Run a history action.
///
/// # Errors
///
/// Fails if statistics cannot be serialized or the oracle client cannot be
/// built.
pub async fn history(
    action: &HistoryCommand,
    config: &OracleConfig,
    store: &HistoryStore,
) -> anyhow::Result<()> {
    match action {
        HistoryCommand::List => {
            let entries = store.list();
            if entries.is_empty() {
                println!("No readings yet.");
            }
            for entry in entries {
                let cards: Vec<&str> = entry
                    .readings
                    .iter()
                    .map(|r| r.card.name.as_str())
                    .collect();
                println!(
                    "{}  {}  {}  [{}]",
                    entry.date.format("%Y-%m-%d %H:%M"),
                    entry.id,
                    entry.question,
                    cards.join(", ")
                );
            }
        }
        HistoryCommand::Stats {
            year,
            month,
            insight,
        } => {
            let client = if *insight {
                Some(GeminiClient::new(config)?)
            } else {
                None
            };
            if let Some(month) = month {
                let stats = store.monthly_stats(*year, *month);
                println!("{}", serde_json::to_string_pretty(&stats)?);
                if let Some(client) = client {
                    let analysis = client.period_analysis(PeriodStats::Monthly(&stats)).await;
                    println!("{}", serde_json::to_string_pretty(&analysis)?);
                }
            } else {
                let stats = store.yearly_stats(*year);
                println!("{}", serde_json::to_string_pretty(&stats)?);
                if let Some(client) = client {
                    let analysis = client.period_analysis(PeriodStats::Yearly(&stats)).await;
                    println!("{}", serde_json::to_string_pretty(&analysis)?);
                }
            }
        }
        HistoryCommand::Clear => {
            let count = store.len();
            store.clear();
            tracing::info!("Cleared {count} readings");
        }
    }
    Ok(())
}

/// Today's date in local time.
#[must_use]
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
