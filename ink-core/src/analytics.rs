//! Frequency counts and monthly/yearly roll-ups over reading history.

use std::collections::HashMap;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::history::ReadingHistory;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Category label used when a reading has none.
pub const DEFAULT_CATEGORY: &str = "General";

/// Spread label used when a reading has none.
pub const DEFAULT_SPREAD: &str = "Classic";

/// How often a card appeared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardFrequency {
    /// Card name.
    pub name: String,
    /// Appearances.
    pub count: usize,
    /// Appearances reversed.
    pub reversed_count: usize,
    /// Arcana of the first appearance.
    pub arcana: String,
}

/// A label and how many readings carried it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCount {
    /// Label.
    pub name: String,
    /// Number of readings.
    pub count: usize,
}

/// Readings in one month of a year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthCount {
    /// Three-letter month name.
    pub month: String,
    /// Number of readings.
    pub count: usize,
}

/// Statistics for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyStats {
    /// Full month name.
    pub month: String,
    /// Year.
    pub year: i32,
    /// Readings in the month.
    pub total_readings: usize,
    /// Every card seen, most frequent first.
    pub card_frequencies: Vec<CardFrequency>,
    /// The five most frequent cards.
    pub top_cards: Vec<CardFrequency>,
    /// Share of reversed cards, rounded percent.
    pub reversed_percentage: u32,
    /// Readings per category.
    pub categories: Vec<LabelCount>,
    /// Readings per spread.
    pub spreads: Vec<LabelCount>,
}

/// Statistics for one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyStats {
    /// Year.
    pub year: i32,
    /// Readings in the year.
    pub total_readings: usize,
    /// Readings per month, January first, three-letter names.
    pub monthly_breakdown: Vec<MonthCount>,
    /// The ten most frequent cards.
    pub top_cards: Vec<CardFrequency>,
    /// Share of reversed cards, rounded percent.
    pub reversed_percentage: u32,
    /// Three-letter name of the busiest month (earliest on ties).
    pub most_active_month: String,
    /// Readings per category.
    pub categories: Vec<LabelCount>,
}

/// Readings saved in `month` (1-12) of `year`.
pub fn readings_in_month(
    history: &[ReadingHistory],
    year: i32,
    month: u32,
) -> impl Iterator<Item = &ReadingHistory> {
    history
        .iter()
        .filter(move |e| e.date.year() == year && e.date.month() == month)
}

/// Readings saved in `year`.
pub fn readings_in_year(history: &[ReadingHistory], year: i32) -> impl Iterator<Item = &ReadingHistory> {
    history.iter().filter(move |e| e.date.year() == year)
}

/// Card frequencies, most frequent first.
///
/// Equal counts keep first-seen order.
#[must_use]
pub fn card_frequencies<'a>(readings: impl IntoIterator<Item = &'a ReadingHistory>) -> Vec<CardFrequency> {
    let mut order: Vec<CardFrequency> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for result in readings.into_iter().flat_map(|r| &r.readings) {
        let card = &result.card;
        let slot = *index.entry(card.name.clone()).or_insert_with(|| {
            order.push(CardFrequency {
                name: card.name.clone(),
                count: 0,
                reversed_count: 0,
                arcana: card.arcana.clone(),
            });
            order.len() - 1
        });
        let freq = &mut order[slot];
        freq.count += 1;
        if card.is_reversed {
            freq.reversed_count += 1;
        }
    }

    // Stable sort keeps first-seen order among ties.
    order.sort_by(|a, b| b.count.cmp(&a.count));
    order
}

/// Readings per category, most common first.
#[must_use]
pub fn category_breakdown<'a>(readings: impl IntoIterator<Item = &'a ReadingHistory>) -> Vec<LabelCount> {
    count_labels(
        readings
            .into_iter()
            .map(|r| label_or(r.category_name.as_deref(), DEFAULT_CATEGORY)),
    )
}

/// Readings per spread, most common first.
#[must_use]
pub fn spread_breakdown<'a>(readings: impl IntoIterator<Item = &'a ReadingHistory>) -> Vec<LabelCount> {
    count_labels(
        readings
            .into_iter()
            .map(|r| label_or(r.spread_name.as_deref(), DEFAULT_SPREAD)),
    )
}

/// Percentage of reversed cards across `readings`, rounded; 0 when there
/// are no cards.
#[must_use]
pub fn reversed_percentage<'a>(readings: impl IntoIterator<Item = &'a ReadingHistory>) -> u32 {
    let (total, reversed) = readings
        .into_iter()
        .flat_map(|r| &r.readings)
        .fold((0usize, 0usize), |(t, rev), r| {
            (t + 1, rev + usize::from(r.card.is_reversed))
        });
    if total == 0 {
        return 0;
    }
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    {
        ((reversed as f64 / total as f64) * 100.0).round() as u32
    }
}

/// Statistics for `month` (1-12) of `year`.
#[must_use]
pub fn monthly_stats(history: &[ReadingHistory], year: i32, month: u32) -> MonthlyStats {
    let readings: Vec<_> = readings_in_month(history, year, month).collect();
    let card_frequencies = card_frequencies(readings.iter().copied());
    let month_name = month
        .checked_sub(1)
        .and_then(|i| MONTH_NAMES.get(i as usize))
        .copied()
        .unwrap_or("Unknown");

    MonthlyStats {
        month: month_name.to_string(),
        year,
        total_readings: readings.len(),
        top_cards: card_frequencies.iter().take(5).cloned().collect(),
        card_frequencies,
        reversed_percentage: reversed_percentage(readings.iter().copied()),
        categories: category_breakdown(readings.iter().copied()),
        spreads: spread_breakdown(readings.iter().copied()),
    }
}

/// Statistics for `year`.
#[must_use]
pub fn yearly_stats(history: &[ReadingHistory], year: i32) -> YearlyStats {
    let readings: Vec<_> = readings_in_year(history, year).collect();

    let mut per_month = [0usize; 12];
    for r in &readings {
        per_month[r.date.month0() as usize] += 1;
    }
    let monthly_breakdown: Vec<MonthCount> = MONTH_NAMES
        .iter()
        .zip(per_month)
        .map(|(name, count)| MonthCount {
            month: name[..3].to_string(),
            count,
        })
        .collect();

    // Earliest month wins ties.
    let busiest = per_month
        .iter()
        .enumerate()
        .fold(0, |best, (i, &c)| if c > per_month[best] { i } else { best });

    YearlyStats {
        year,
        total_readings: readings.len(),
        monthly_breakdown,
        top_cards: card_frequencies(readings.iter().copied())
            .into_iter()
            .take(10)
            .collect(),
        reversed_percentage: reversed_percentage(readings.iter().copied()),
        most_active_month: MONTH_NAMES[busiest][..3].to_string(),
        categories: category_breakdown(readings.iter().copied()),
    }
}

/// `label`, or `default` when it is missing or empty.
fn label_or(label: Option<&str>, default: &str) -> String {
    label
        .filter(|l| !l.is_empty())
        .unwrap_or(default)
        .to_string()
}

fn count_labels(labels: impl Iterator<Item = String>) -> Vec<LabelCount> {
    let mut out: Vec<LabelCount> = Vec::new();
    for label in labels {
        match out.iter_mut().find(|l| l.name == label) {
            Some(existing) => existing.count += 1,
            None => out.push(LabelCount {
                name: label,
                count: 1,
            }),
        }
    }
    out.sort_by(|a, b| b.count.cmp(&a.count));
    out
}
