//! Persisted reading history.
//!
//! [`HistoryStore`] keeps the most recent readings (newest first) and the
//! card of the day. With a data directory it mirrors every mutation to
//! `history.json` / `daily_card.json`; without one it is purely in-memory.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::analytics::{self, MonthlyStats, YearlyStats};
use crate::{ReadingResult, TarotCard};

/// Most readings retained; older ones are dropped on save.
pub const MAX_HISTORY: usize = 50;

const HISTORY_FILE: &str = "history.json";
const DAILY_CARD_FILE: &str = "daily_card.json";
const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 9;

/// Errors that can occur during history operations.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    /// An I/O error occurred during persistence.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// No reading with the given id.
    #[error("Reading not found: {0}")]
    NotFound(String),
}

/// Kind of a saved reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingKind {
    /// A complete spread.
    #[default]
    Full,
    /// The card of the day.
    Daily,
}

/// One saved reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingHistory {
    /// `reading_{millis}_{suffix}`.
    pub id: String,
    /// When the reading was saved.
    pub date: DateTime<Utc>,
    /// Unix milliseconds of `date`.
    pub timestamp: i64,
    /// The seeker's question.
    pub question: String,
    /// Per-position results.
    pub readings: Vec<ReadingResult>,
    /// Closing summary across all cards.
    pub synthesis: String,
    /// Full spread or daily card.
    #[serde(rename = "type")]
    pub kind: ReadingKind,
    /// Personal reflections added later.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Spread display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spread_name: Option<String>,
    /// Question category display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
}

/// The card of the day, valid for a single calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyCard {
    /// Date the card belongs to.
    pub date: NaiveDate,
    /// The card.
    pub card: TarotCard,
    /// Message for the day.
    pub message: String,
    /// Significance of the date itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_meaning: Option<String>,
}

#[derive(Debug, Default)]
struct Inner {
    entries: Vec<ReadingHistory>,
    daily: Option<DailyCard>,
}

/// Thread-safe reading history.
///
/// # Example
///
/// ```
/// use ink_core::history::{HistoryStore, ReadingKind};
///
/// let store = HistoryStore::new();
/// let entry = store.save_reading("Will it rain?", Vec::new(), "Yes.", ReadingKind::Full, None, None);
/// assert_eq!(store.get(&entry.id).map(|e| e.question), Some("Will it rain?".to_string()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct HistoryStore {
    inner: Arc<RwLock<Inner>>,
    /// Optional data directory for filesystem persistence.
    data_dir: Option<PathBuf>,
}

impl HistoryStore {
    /// Create an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store persisted under `data_dir`, loading what is already
    /// there.
    ///
    /// The directory is created if missing. Unreadable or corrupt files are
    /// logged and treated as empty.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::Io`] if the directory cannot be created.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Result<Self, HistoryError> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;

        let entries: Vec<ReadingHistory> =
            load_json(&data_dir.join(HISTORY_FILE)).unwrap_or_default();
        let daily = load_json(&data_dir.join(DAILY_CARD_FILE));
        tracing::debug!(
            "Loaded {} readings from {}",
            entries.len(),
            data_dir.display()
        );

        Ok(Self {
            inner: Arc::new(RwLock::new(Inner { entries, daily })),
            data_dir: Some(data_dir),
        })
    }

    /// Save a new reading at the current time.
    ///
    /// The entry is placed first; history beyond [`MAX_HISTORY`] is dropped.
    pub fn save_reading(
        &self,
        question: &str,
        readings: Vec<ReadingResult>,
        synthesis: &str,
        kind: ReadingKind,
        spread_name: Option<&str>,
        category_name: Option<&str>,
    ) -> ReadingHistory {
        let now = Utc::now();
        let entry = ReadingHistory {
            id: generate_id(now.timestamp_millis()),
            date: now,
            timestamp: now.timestamp_millis(),
            question: question.to_string(),
            readings,
            synthesis: synthesis.to_string(),
            kind,
            notes: None,
            spread_name: spread_name.map(str::to_string),
            category_name: category_name.map(str::to_string),
        };
        self.insert(entry.clone());
        entry
    }

    /// Insert an already-built entry (e.g. imported from another device).
    pub fn insert(&self, entry: ReadingHistory) {
        {
            let mut inner = self
                .inner
                .write()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            tracing::debug!("Saving reading {}", entry.id);
            inner.entries.insert(0, entry);
            inner.entries.truncate(MAX_HISTORY);
        }
        self.persist_history();
    }

    /// All readings, newest first.
    #[must_use]
    pub fn list(&self) -> Vec<ReadingHistory> {
        self.read().entries.clone()
    }

    /// Number of saved readings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    /// Whether no readings are saved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().entries.is_empty()
    }

    /// Look up a reading by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<ReadingHistory> {
        self.read().entries.iter().find(|e| e.id == id).cloned()
    }

    /// Replace the notes of a reading.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::NotFound`] if no reading has `id`.
    pub fn update_notes(&self, id: &str, notes: &str) -> Result<(), HistoryError> {
        {
            let mut inner = self
                .inner
                .write()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            let entry = inner
                .entries
                .iter_mut()
                .find(|e| e.id == id)
                .ok_or_else(|| HistoryError::NotFound(id.to_string()))?;
            entry.notes = Some(notes.to_string());
        }
        self.persist_history();
        Ok(())
    }

    /// Delete a reading. Returns whether anything was removed.
    pub fn delete(&self, id: &str) -> bool {
        let removed = {
            let mut inner = self
                .inner
                .write()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            let before = inner.entries.len();
            inner.entries.retain(|e| e.id != id);
            inner.entries.len() != before
        };
        if removed {
            self.persist_history();
        }
        removed
    }

    /// Remove every reading.
    pub fn clear(&self) {
        {
            let mut inner = self
                .inner
                .write()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            inner.entries.clear();
        }
        if let Some(ref data_dir) = self.data_dir {
            let path = data_dir.join(HISTORY_FILE);
            if path.exists() {
                if let Err(e) = std::fs::remove_file(&path) {
                    tracing::warn!("Failed to delete history file {}: {e}", path.display());
                }
            }
        }
    }

    /// Store the card of the day for `date`.
    pub fn save_daily_card(
        &self,
        date: NaiveDate,
        card: TarotCard,
        message: &str,
        date_meaning: Option<&str>,
    ) {
        let daily = DailyCard {
            date,
            card,
            message: message.to_string(),
            date_meaning: date_meaning.map(str::to_string),
        };
        {
            let mut inner = self
                .inner
                .write()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            inner.daily = Some(daily.clone());
        }
        if let Some(ref data_dir) = self.data_dir {
            write_json(&data_dir.join(DAILY_CARD_FILE), &daily);
        }
    }

    /// The card of the day, if one was drawn on `today`.
    #[must_use]
    pub fn daily_card(&self, today: NaiveDate) -> Option<DailyCard> {
        self.read().daily.clone().filter(|d| d.date == today)
    }

    /// Statistics for `month` (1-12) of `year`.
    #[must_use]
    pub fn monthly_stats(&self, year: i32, month: u32) -> MonthlyStats {
        analytics::monthly_stats(&self.read().entries, year, month)
    }

    /// Statistics for `year`.
    #[must_use]
    pub fn yearly_stats(&self, year: i32) -> YearlyStats {
        analytics::yearly_stats(&self.read().entries, year)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Write the reading list to disk.
    ///
    /// No-op if the store was created without a data directory.
    fn persist_history(&self) {
        let Some(ref data_dir) = self.data_dir else {
            return;
        };
        let entries = self.read().entries.clone();
        write_json(&data_dir.join(HISTORY_FILE), &entries);
    }
}

fn load_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Option<T> {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::warn!("Failed to read {}: {e}", path.display());
            return None;
        }
    };
    match serde_json::from_str(&contents) {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!("Ignoring corrupt {}: {e}", path.display());
            None
        }
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) {
    let json = match serde_json::to_string_pretty(value) {
        Ok(j) => j,
        Err(e) => {
            tracing::warn!("Failed to serialize {}: {e}", path.display());
            return;
        }
    };
    if let Err(e) = std::fs::write(path, json) {
        tracing::warn!("Failed to persist {}: {e}", path.display());
    }
}

fn generate_id(millis: i64) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| char::from(ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())]))
        .collect();
    format!("reading_{millis}_{suffix}")
}
