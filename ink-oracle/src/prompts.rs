//! Prompt text and response schemas sent to the model.

use chrono::{Datelike, NaiveDate, Weekday};
use ink_core::analytics::{CardFrequency, LabelCount, MonthlyStats, YearlyStats};
use ink_core::ReadingResult;
use serde_json::{json, Value};

use crate::interpreter::InterpretationRequest;

/// Which statistics a period analysis is based on.
#[derive(Debug, Clone, Copy)]
pub enum PeriodStats<'a> {
    /// One month.
    Monthly(&'a MonthlyStats),
    /// One year.
    Yearly(&'a YearlyStats),
}

impl PeriodStats<'_> {
    /// "monthly" or "yearly".
    #[must_use]
    pub fn period(&self) -> &'static str {
        match self {
            Self::Monthly(_) => "monthly",
            Self::Yearly(_) => "yearly",
        }
    }

    /// Human label, e.g. "March 2026".
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Monthly(s) => format!("{} {}", s.month, s.year),
            Self::Yearly(s) => s.year.to_string(),
        }
    }

    /// Readings in the period.
    #[must_use]
    pub fn total_readings(&self) -> usize {
        match self {
            Self::Monthly(s) => s.total_readings,
            Self::Yearly(s) => s.total_readings,
        }
    }

    /// Most frequent cards.
    #[must_use]
    pub fn top_cards(&self) -> &[CardFrequency] {
        match self {
            Self::Monthly(s) => &s.top_cards,
            Self::Yearly(s) => &s.top_cards,
        }
    }

    /// Rounded share of reversed cards.
    #[must_use]
    pub fn reversed_percentage(&self) -> u32 {
        match self {
            Self::Monthly(s) => s.reversed_percentage,
            Self::Yearly(s) => s.reversed_percentage,
        }
    }

    /// Readings per category.
    #[must_use]
    pub fn categories(&self) -> &[LabelCount] {
        match self {
            Self::Monthly(s) => &s.categories,
            Self::Yearly(s) => &s.categories,
        }
    }
}

/// Schema of a single card answer.
#[must_use]
pub fn card_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "name": { "type": "STRING", "description": "Name of the Tarot card (e.g., The Fool, Three of Cups)" },
            "arcana": { "type": "STRING", "description": "Major Arcana or Minor Arcana" },
            "meaning": { "type": "STRING", "description": "Interpretation of the card related to the drawing's energy and the position. If reversed, reflect the reversed meaning." },
            "visualDescription": { "type": "STRING", "description": "A brief visual description of the traditional card imagery." },
            "isReversed": { "type": "BOOLEAN", "description": "Whether the card appears reversed (upside-down)." }
        },
        "required": ["name", "arcana", "meaning", "visualDescription", "isReversed"]
    })
}

/// Schema of a list of `count` drawing prompts.
#[must_use]
pub fn prompts_schema(count: usize) -> Value {
    json!({
        "type": "ARRAY",
        "items": { "type": "STRING" },
        "description": format!("{count} metaphorical drawing prompts.")
    })
}

/// Schema of a period analysis.
#[must_use]
pub fn period_analysis_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "overallTheme": { "type": "STRING", "description": "The dominant spiritual theme of this period (max 50 words)" },
            "dominantEnergy": { "type": "STRING", "description": "The prevailing energy or archetype guiding the seeker (max 40 words)" },
            "shadowWork": { "type": "STRING", "description": "Shadow aspects suggested by reversed cards (max 50 words)" },
            "guidance": { "type": "STRING", "description": "Practical guidance for moving forward (max 60 words)" },
            "affirmation": { "type": "STRING", "description": "A personalized affirmation (max 20 words)" }
        },
        "required": ["overallTheme", "dominantEnergy", "shadowWork", "guidance", "affirmation"]
    })
}

/// Schema of the card of the day.
#[must_use]
pub fn daily_card_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "card": card_schema(),
            "message": { "type": "STRING", "description": "A brief, inspiring message for the day (max 50 words)." },
            "dateMeaning": { "type": "STRING", "description": "The significance of today's date in tarot and numerology (max 40 words)." }
        },
        "required": ["card", "message", "dateMeaning"]
    })
}

fn orientation(reversed: bool) -> &'static str {
    if reversed {
        "This card MUST be REVERSED (isReversed: true).\n\
         The meaning should reflect the shadow or blocked aspect of the card: \
         obstacles, delays, internal struggles, or introspection needed."
    } else {
        "This card should be UPRIGHT (isReversed: false).\n\
         The meaning should reflect the positive, flowing aspect of the card."
    }
}

/// Prompt asking for the card that matches a drawing.
#[must_use]
pub fn interpretation(request: &InterpretationRequest, reversed: bool) -> String {
    let excluded = if request.excluded_cards.is_empty() {
        "none".to_string()
    } else {
        request.excluded_cards.join(", ")
    };
    format!(
        "You are a mystical Tarot Master. The user has a question: \"{question}\".\n\
         They were asked to: \"{prompt}\" (which represents the {position_upper}).\n\n\
         Analyze the brushstrokes, chaos, order, and lines in the attached image.\n\
         Assign a Tarot card that best matches this energy.\n\n\
         Do NOT use these cards as they have already been drawn: {excluded}.\n\n\
         CARD ORIENTATION:\n{orientation}\n\n\
         Provide a deep, mystical interpretation connecting the visual energy of the drawing \
         to the card's meaning for the {position}.",
        question = request.question,
        prompt = request.prompt,
        position_upper = request.position.to_uppercase(),
        position = request.position,
        orientation = orientation(reversed),
    )
}

/// Prompt asking for one drawing instruction per position.
#[must_use]
pub fn drawing_prompts(question: &str, positions: &[String], category: Option<&str>) -> String {
    let count = positions.len();
    let listed: Vec<String> = positions
        .iter()
        .enumerate()
        .map(|(i, p)| format!("{}. \"{p}\"", i + 1))
        .collect();
    let category = category
        .map(|c| format!("Question category: {c}\n"))
        .unwrap_or_default();
    format!(
        "The user wants a Tarot reading for the question: \"{question}\".\n{category}\n\
         The spread uses {count} cards with these positions:\n{positions}\n\n\
         Create {count} distinct, metaphorical drawing instructions (MAX 10 words each) that \
         abstractly represent each position based on their question. They should be evocative, \
         relate to the position meaning and the question theme, and must NOT use the position \
         names directly.\n\n\
         Return exactly {count} prompts as a JSON array of strings.",
        positions = listed.join("\n"),
    )
}

fn reading_lines(readings: &[ReadingResult]) -> String {
    readings
        .iter()
        .enumerate()
        .map(|(i, r)| {
            format!(
                "{}. {} (User drew: \"{}\"): {}{} - {}",
                i + 1,
                r.position.to_uppercase(),
                r.prompt,
                r.card.name,
                if r.card.is_reversed { " (REVERSED)" } else { "" },
                r.card.meaning
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prompt asking for a closing summary across every card.
#[must_use]
pub fn synthesis(
    question: &str,
    readings: &[ReadingResult],
    spread_name: Option<&str>,
    category: Option<&str>,
) -> String {
    let max_words = if readings.len() > 5 { 250 } else { 150 };
    let spread = spread_name
        .map(|s| format!("Spread type: {s}\n"))
        .unwrap_or_default();
    let category = category
        .map(|c| format!("Question category: {c}\n"))
        .unwrap_or_default();
    format!(
        "The user asked: \"{question}\".\n{spread}{category}\n\
         The reading results are:\n{lines}\n\n\
         Provide a holistic summary (max {max_words} words) synthesizing all {count} cards into \
         a final answer for the user. Consider how the cards relate to each other and the \
         overall narrative arc. If any cards are reversed, acknowledge the blocked or shadow \
         energy. Offer practical wisdom.\n\n\
         Speak like a wise, compassionate mystic.",
        lines = reading_lines(readings),
        count = readings.len(),
    )
}

/// Prompt answering a follow-up question about a finished reading.
#[must_use]
pub fn follow_up(
    question: &str,
    readings: &[ReadingResult],
    synthesis: &str,
    follow_up_question: &str,
) -> String {
    format!(
        "You are a wise and compassionate Tarot reader continuing a conversation with a seeker.\n\n\
         ORIGINAL READING CONTEXT:\nQuestion: \"{question}\"\n\n\
         Cards Drawn:\n{lines}\n\n\
         Original Synthesis: \"{synthesis}\"\n\n\
         The seeker now asks a follow-up question: \"{follow_up_question}\"\n\n\
         Answer the follow-up directly, reference the cards already drawn when relevant, offer \
         grounded wisdom in a mystical tone, and keep the response under 150 words.",
        lines = reading_lines(readings),
    )
}

/// Prompt asking for patterns across a month or year of readings.
#[must_use]
pub fn period_analysis(stats: &PeriodStats<'_>) -> String {
    let top: Vec<String> = stats
        .top_cards()
        .iter()
        .take(5)
        .enumerate()
        .map(|(i, c)| {
            let reversed = if c.reversed_count > 0 {
                format!(", {} reversed", c.reversed_count)
            } else {
                String::new()
            };
            format!("{}. {} (appeared {} times{reversed})", i + 1, c.name, c.count)
        })
        .collect();
    let categories = if stats.categories().is_empty() {
        "Various topics".to_string()
    } else {
        stats
            .categories()
            .iter()
            .map(|c| format!("{}: {} readings", c.name, c.count))
            .collect::<Vec<_>>()
            .join(", ")
    };
    let horizon = match stats {
        PeriodStats::Monthly(_) => "weeks",
        PeriodStats::Yearly(_) => "year",
    };
    format!(
        "You are a wise Tarot Oracle providing a {period} spiritual analysis.\n\n\
         PERIOD: {label}\nTOTAL READINGS: {total}\nREVERSED CARD RATE: {reversed}%\n\n\
         MOST FREQUENT CARDS:\n{top}\n\nQUESTION THEMES: {categories}\n\n\
         Describe the emerging spiritual theme, the archetype most prominently guiding the \
         seeker, the shadow work suggested by the reversed rate, practical guidance for the \
         coming {horizon}, and a personalized affirmation.",
        period = stats.period(),
        label = stats.label(),
        total = stats.total_readings(),
        reversed = stats.reversed_percentage(),
        top = top.join("\n"),
    )
}

/// Digit sum of `{month}{day}{year}` and its reduced numerology number.
#[must_use]
pub fn numerology(date: NaiveDate) -> (u32, u32) {
    let digits = format!("{}{}{}", date.month(), date.day(), date.year());
    let sum: u32 = digits.chars().filter_map(|c| c.to_digit(10)).sum();
    let number = if sum > 9 { sum / 10 + sum % 10 } else { sum };
    (sum, number)
}

fn weekday_energy(day: Weekday) -> &'static str {
    match day {
        Weekday::Sun => "Sun - vitality, success",
        Weekday::Mon => "Moon - intuition, emotions",
        Weekday::Tue => "Mars - action, courage",
        Weekday::Wed => "Mercury - communication, intellect",
        Weekday::Thu => "Jupiter - expansion, luck",
        Weekday::Fri => "Venus - love, beauty",
        Weekday::Sat => "Saturn - discipline, karma",
    }
}

fn season(month: u32) -> &'static str {
    match month {
        3..=5 => "spring - renewal, growth",
        6..=8 => "summer - abundance, action",
        9..=11 => "autumn - harvest, introspection",
        _ => "winter - rest, inner reflection",
    }
}

/// Prompt asking for the card of the day.
#[must_use]
pub fn daily_card(date: NaiveDate, reversed: bool) -> String {
    let (sum, number) = numerology(date);
    let when = date.format("%A, %B %-d, %Y");
    format!(
        "Today is {when}.\nThe numerology number for today is {number} (sum of digits: {sum}).\n\n\
         1. Explain the mystical and numerological significance of today's date and the energy \
         of the number {number}.\n\
         2. Draw a Tarot card that resonates with today's energy, considering the day's planet \
         ({energy}), the vibration of {number}, and the season ({season}).\n\n\
         CARD ORIENTATION:\n{orientation}\n\n\
         Provide wisdom for navigating this specific day.",
        energy = weekday_energy(date.weekday()),
        season = season(date.month()),
        orientation = orientation(reversed),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ink_core::TarotCard;

    fn request() -> InterpretationRequest {
        InterpretationRequest {
            image_base64: "AAAA".to_string(),
            question: "Will I move abroad?".to_string(),
            position: "Future".to_string(),
            prompt: "Draw the gate opening".to_string(),
            excluded_cards: vec!["The Fool".to_string(), "The Star".to_string()],
        }
    }

    #[test]
    fn test_interpretation_mentions_context() {
        let text = interpretation(&request(), true);
        assert!(text.contains("Will I move abroad?"));
        assert!(text.contains("represents the FUTURE"));
        assert!(text.contains("The Fool, The Star"));
        assert!(text.contains("MUST be REVERSED"));
        assert!(interpretation(&request(), false).contains("UPRIGHT"));
    }

    #[test]
    fn test_synthesis_lists_cards() {
        let readings = vec![ReadingResult {
            position: "Past".to_string(),
            prompt: "Draw a wall".to_string(),
            card: TarotCard {
                is_reversed: true,
                ..TarotCard::mystery()
            },
            drawing_base64: String::new(),
        }];
        let text = synthesis("q", &readings, Some("Celtic Cross"), None);
        assert!(text.contains("1. PAST (User drew: \"Draw a wall\"): The Mystery (REVERSED)"));
        assert!(text.contains("Spread type: Celtic Cross"));
        assert!(text.contains("max 150 words"));
    }

    #[test]
    fn test_numerology() {
        // 1 + 1 + 2 + 0 + 2 + 6 = 12 -> 3
        let date = NaiveDate::from_ymd_opt(2026, 1, 1).expect("date");
        assert_eq!(numerology(date), (12, 3));
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).expect("date");
        assert_eq!(numerology(date), (1 + 0 + 1 + 8 + 2 + 0 + 2 + 6, 2));
    }

    #[test]
    fn test_daily_prompt_names_the_day() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).expect("date");
        let text = daily_card(date, false);
        assert!(text.contains("Sunday, October 18, 2026"));
        assert!(text.contains("Sun - vitality"));
        assert!(text.contains("autumn"));
    }
}
