//! Gemini REST client.
//!
//! Speaks the `generateContent` endpoint directly with `reqwest`. Card
//! interpretation reports failures to its caller; the other capabilities
//! degrade to fixed answers so a broken connection never blocks a reading.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use ink_core::{ReadingResult, TarotCard};
use rand::Rng;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::config::OracleConfig;
use crate::error::{OracleError, OracleResult};
use crate::interpreter::{InterpretationRequest, Interpreter};
use crate::prompts::{self, PeriodStats};

const API_KEY_HEADER: &str = "x-goog-api-key";
const JSON_MIME: &str = "application/json";

/// Chance that a drawing is read as a reversed card.
pub const REVERSAL_CHANCE: f64 = 0.35;

/// Chance that the card of the day is reversed.
pub const DAILY_REVERSAL_CHANCE: f64 = 0.30;

/// Patterns found across a month or year of readings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodAnalysis {
    /// Dominant theme.
    pub overall_theme: String,
    /// Guiding archetype.
    pub dominant_energy: String,
    /// What the reversed cards point at.
    pub shadow_work: String,
    /// Advice for the coming period.
    pub guidance: String,
    /// Closing mantra.
    pub affirmation: String,
}

/// The card of the day with its message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyReading {
    /// The card.
    pub card: TarotCard,
    /// Message for the day.
    pub message: String,
    /// Significance of the date.
    pub date_meaning: String,
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: String) -> Self {
        Self {
            text: Some(text),
            inline_data: None,
        }
    }

    fn png(data: String) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: ink_renderer::export::PNG_MIME.to_string(),
                data,
            }),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

impl GenerationConfig {
    fn json(schema: Value, temperature: f32) -> Self {
        Self {
            response_mime_type: Some(JSON_MIME.to_string()),
            response_schema: Some(schema),
            temperature: Some(temperature),
        }
    }

    fn text(temperature: f32) -> Self {
        Self {
            response_mime_type: None,
            response_schema: None,
            temperature: Some(temperature),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate.
    fn into_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .find_map(|p| p.text)
            .filter(|t| !t.trim().is_empty())
    }
}

/// Strip a Markdown code fence the model sometimes wraps JSON in.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Client for the Gemini `generateContent` API.
#[derive(Clone)]
pub struct GeminiClient {
    inner: Arc<InnerClient>,
    reversal_chance: f64,
}

struct InnerClient {
    http: Client,
    endpoint: Url,
    api_key: Option<String>,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("endpoint", &self.inner.endpoint.as_str())
            .field("has_credential", &self.has_credential())
            .field("reversal_chance", &self.reversal_chance)
            .finish()
    }
}

impl GeminiClient {
    /// Create a client for `config.model` under `config.base_url`.
    ///
    /// A missing API key is not an error here; every call reports
    /// [`OracleError::MissingCredential`] instead.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::InvalidUrl`] if the base URL is malformed.
    /// Returns [`OracleError::Http`] if the HTTP client fails to build.
    pub fn new(config: &OracleConfig) -> OracleResult<Self> {
        let base = config.base_url.trim_end_matches('/');
        let endpoint = Url::parse(&format!(
            "{base}/v1beta/models/{}:generateContent",
            config.model
        ))
        .map_err(|e| OracleError::InvalidUrl(e.to_string()))?;

        let http = Client::builder()
            .user_agent(concat!("mystic-ink/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(InnerClient {
                http,
                endpoint,
                api_key: config
                    .api_key
                    .clone()
                    .filter(|k| !k.trim().is_empty()),
            }),
            reversal_chance: REVERSAL_CHANCE,
        })
    }

    /// Override the chance of a reversed card (clamped to `[0, 1]`).
    #[must_use]
    pub fn with_reversal_chance(mut self, chance: f64) -> Self {
        self.reversal_chance = chance.clamp(0.0, 1.0);
        self
    }

    /// Whether an API key is configured.
    #[must_use]
    pub fn has_credential(&self) -> bool {
        self.inner.api_key.is_some()
    }

    /// The full `generateContent` URL.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    /// Assign a card to a drawing.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::MissingCredential`] before sending anything
    /// when no key is configured, and transport, status or decoding errors
    /// otherwise.
    pub async fn interpret_card(&self, request: &InterpretationRequest) -> OracleResult<TarotCard> {
        let reversed = Self::roll_reversed(self.reversal_chance);
        tracing::debug!(
            "Interpreting {} drawing (reversed hint: {reversed})",
            request.position
        );
        let parts = vec![
            Part::text(prompts::interpretation(request, reversed)),
            Part::png(request.image_base64.clone()),
        ];
        self.generate_json(parts, GenerationConfig::json(prompts::card_schema(), 0.7))
            .await
    }

    /// One drawing instruction per position.
    ///
    /// Falls back to "Draw {position}" for every position on any failure or
    /// when the model returns the wrong number of prompts.
    pub async fn drawing_prompts(
        &self,
        question: &str,
        positions: &[String],
        category: Option<&str>,
    ) -> Vec<String> {
        let fallback = || -> Vec<String> {
            positions
                .iter()
                .map(|p| format!("Draw {}", p.to_lowercase()))
                .collect()
        };
        let parts = vec![Part::text(prompts::drawing_prompts(
            question, positions, category,
        ))];
        let config = GenerationConfig::json(prompts::prompts_schema(positions.len()), 1.0);

        match self.generate_json::<Vec<String>>(parts, config).await {
            Ok(list) if list.len() == positions.len() => list,
            Ok(list) => {
                tracing::warn!(
                    "Expected {} drawing prompts, got {}",
                    positions.len(),
                    list.len()
                );
                fallback()
            }
            Err(e) => {
                tracing::warn!("Prompt generation failed: {e}");
                fallback()
            }
        }
    }

    /// Closing summary across every card of a reading.
    pub async fn synthesis(
        &self,
        question: &str,
        readings: &[ReadingResult],
        spread_name: Option<&str>,
        category: Option<&str>,
    ) -> String {
        let parts = vec![Part::text(prompts::synthesis(
            question,
            readings,
            spread_name,
            category,
        ))];
        match self.generate_text(parts, None).await {
            Ok(text) => text,
            Err(OracleError::EmptyResponse) => "The spirits are silent.".to_string(),
            Err(e) => {
                tracing::warn!("Synthesis failed: {e}");
                "The connection to the ether was interrupted.".to_string()
            }
        }
    }

    /// Answer a follow-up question about a finished reading.
    pub async fn follow_up(
        &self,
        question: &str,
        readings: &[ReadingResult],
        synthesis: &str,
        follow_up_question: &str,
    ) -> String {
        let parts = vec![Part::text(prompts::follow_up(
            question,
            readings,
            synthesis,
            follow_up_question,
        ))];
        match self
            .generate_text(parts, Some(GenerationConfig::text(0.8)))
            .await
        {
            Ok(text) => text,
            Err(OracleError::EmptyResponse) => {
                "The spirits require more focus to answer this question.".to_string()
            }
            Err(e) => {
                tracing::warn!("Follow-up failed: {e}");
                "The connection to the ether wavers. Please try again.".to_string()
            }
        }
    }

    /// Patterns across a month or a year of readings.
    pub async fn period_analysis(&self, stats: PeriodStats<'_>) -> PeriodAnalysis {
        let parts = vec![Part::text(prompts::period_analysis(&stats))];
        let config = GenerationConfig::json(prompts::period_analysis_schema(), 0.85);
        match self.generate_json(parts, config).await {
            Ok(analysis) => analysis,
            Err(e) => {
                tracing::warn!("Period analysis failed: {e}");
                fallback_period_analysis(&stats)
            }
        }
    }

    /// The card of the day for `date`.
    pub async fn daily_card(&self, date: NaiveDate) -> DailyReading {
        let reversed = Self::roll_reversed(DAILY_REVERSAL_CHANCE);
        let parts = vec![Part::text(prompts::daily_card(date, reversed))];
        let config = GenerationConfig::json(prompts::daily_card_schema(), 0.9);
        match self.generate_json(parts, config).await {
            Ok(reading) => reading,
            Err(e) => {
                tracing::warn!("Daily card failed: {e}");
                fallback_daily_reading(date)
            }
        }
    }

    fn roll_reversed(chance: f64) -> bool {
        rand::thread_rng().gen_bool(chance.clamp(0.0, 1.0))
    }

    async fn generate_json<T: DeserializeOwned>(
        &self,
        parts: Vec<Part>,
        config: GenerationConfig,
    ) -> OracleResult<T> {
        let text = self.generate_text(parts, Some(config)).await?;
        Ok(serde_json::from_str(strip_code_fence(&text))?)
    }

    async fn generate_text(
        &self,
        parts: Vec<Part>,
        config: Option<GenerationConfig>,
    ) -> OracleResult<String> {
        let Some(api_key) = self.inner.api_key.as_deref() else {
            return Err(OracleError::MissingCredential);
        };

        let request = GenerateContentRequest {
            contents: vec![Content { parts }],
            generation_config: config,
        };

        let response = self
            .inner
            .http
            .post(self.inner.endpoint.clone())
            .header(API_KEY_HEADER, api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Gemini returned {status}");
            return Err(OracleError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: GenerateContentResponse = serde_json::from_slice(&response.bytes().await?)?;
        body.into_text().ok_or(OracleError::EmptyResponse)
    }
}

#[async_trait]
impl Interpreter for GeminiClient {
    async fn interpret(&self, request: &InterpretationRequest) -> OracleResult<TarotCard> {
        self.interpret_card(request).await
    }
}

fn fallback_period_analysis(stats: &PeriodStats<'_>) -> PeriodAnalysis {
    let leading = stats
        .top_cards()
        .first()
        .map_or("Fool", |c| c.name.as_str());
    PeriodAnalysis {
        overall_theme: "The threads of fate are still weaving. Continue your journey and the \
                        patterns will reveal themselves."
            .to_string(),
        dominant_energy: format!("The {leading}'s energy guides your path."),
        shadow_work: if stats.reversed_percentage() > 30 {
            "The reversed energies suggest inner work is needed. Embrace introspection."
        } else {
            "Your energies flow well. Stay mindful of balance."
        }
        .to_string(),
        guidance: "Trust the cards that appear repeatedly; they carry messages your soul needs \
                   to hear."
            .to_string(),
        affirmation: "I trust my journey and embrace each lesson.".to_string(),
    }
}

fn fallback_daily_reading(date: NaiveDate) -> DailyReading {
    let (_, number) = prompts::numerology(date);
    DailyReading {
        card: TarotCard {
            name: "The Star".to_string(),
            arcana: "Major Arcana".to_string(),
            meaning: "Hope and inspiration guide your path today.".to_string(),
            visual_description:
                "A figure pours water under a starlit sky, representing renewal and hope."
                    .to_string(),
            is_reversed: false,
        },
        message: "Today brings clarity and renewed hope. Trust in the journey ahead.".to_string(),
        date_meaning: format!(
            "{} carries the energy of number {number}, a day for reflection and inner wisdom.",
            date.format("%B %-d")
        ),
    }
}
