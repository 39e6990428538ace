//! Language-model planning strategy (Google Gemini)

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest_middleware::ClientWithMiddleware;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, instrument};

use crate::models::TripRequest;
use crate::{TripError, http};

use super::PaceCapacity;
use super::ranking::RankedPlace;

/// Instructions sent as the system prompt
pub const SYSTEM_PROMPT: &str = "You are a travel planner building day-by-day city itineraries. \
Spread the candidate places across the trip days, grouping places that are close to each other \
on the same day. Prefer places that match the traveller's interests and have good ratings, \
respect the per-day limits for the requested pace and keep the total cost within budget. \
Never schedule a place twice and only use ids from the candidate list. \
Answer with JSON only: {\"days\": [{\"day\": 1, \"place_ids\": [\"...\"]}], \"notes\": \"...\"} \
with exactly one entry per trip day; a day may have an empty list.";

/// Something that can answer a planning prompt with text
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Model name, for logs
    fn name(&self) -> &str;

    /// Run one prompt and return the raw text of the answer
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> crate::Result<String>;
}

/// Render the trip and the ranked candidates into the user prompt
#[must_use]
pub fn build_prompt(
    request: &TripRequest,
    capacity: PaceCapacity,
    fixed_daily_cost: f64,
    candidates: &[RankedPlace<'_>],
) -> String {
    let interests = if request.interests().is_empty() {
        "anything".to_string()
    } else {
        request
            .interests()
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    };

    let listing: Vec<serde_json::Value> = candidates
        .iter()
        .map(|c| {
            json!({
                "id": c.place.id,
                "name": c.place.name,
                "category": c.place.category,
                "rating": c.place.rating,
                "estimated_cost": c.place.estimated_cost,
                "distance_from_center_km": (c.distance_km * 10.0).round() / 10.0,
                "latitude": c.place.latitude,
                "longitude": c.place.longitude,
            })
        })
        .collect();

    format!(
        "Plan a {days}-day trip to {destination} from {start} to {end}.\n\
         Travellers: {group}. Total budget: ${budget:.2} (meals and transport cost about ${fixed:.2} per planned day).\n\
         Interests: {interests}. Pace: {pace}, {min}-{max} places per day.\n\
         Candidates, best first:\n{listing}",
        days = request.num_days(),
        destination = request.destination(),
        start = request.start_date(),
        end = request.end_date(),
        group = request.group_size(),
        budget = request.budget(),
        fixed = fixed_daily_cost,
        pace = request.pace(),
        min = capacity.min,
        max = capacity.max,
        listing = serde_json::Value::Array(listing),
    )
}

/// Gemini `generateContent` client
pub struct GeminiClient {
    http: ClientWithMiddleware,
    base_url: String,
    model: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Debug, Deserialize)]
struct ResponseCandidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateResponse {
    fn into_text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

impl GeminiClient {
    #[must_use]
    pub fn new(
        http: ClientWithMiddleware,
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url,
            self.model,
            urlencoding::encode(&self.api_key)
        )
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    fn name(&self) -> &str {
        &self.model
    }

    #[instrument(name = "gemini_generate", skip_all, fields(model = %self.model))]
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> crate::Result<String> {
        let body = GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part { text: system_prompt }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: user_prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                temperature: 0.2,
            },
        };
        let body = serde_json::to_string(&body)
            .map_err(|e| TripError::planner(format!("Failed to encode request: {e}")))?;

        debug!("Sending {} byte prompt to {}", body.len(), self.model);
        let request = self
            .http
            .post(self.endpoint())
            .header(CONTENT_TYPE, "application/json")
            .body(body);

        let response = http::send("Gemini", request)
            .await
            .map_err(|e| TripError::planner(e.to_string()))?;
        let response: GenerateResponse = http::json("Gemini", response)
            .await
            .map_err(|e| TripError::planner(e.to_string()))?;

        response
            .into_text()
            .ok_or_else(|| TripError::planner("Gemini returned no text"))
    }
}
