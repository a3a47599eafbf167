// src/services/gemini_client.rs
// DOCUMENTATION: Generative-language API client
// PURPOSE: Send the planner prompt and return the model's text reply

use crate::config::Config;
use crate::errors::TravelError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Client for the generateContent endpoint
/// DOCUMENTATION: One request per plan, no retries
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
}

/// Response from generateContent
#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(rename = "promptFeedback")]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    #[serde(rename = "finishReason")]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PromptFeedback {
    #[serde(rename = "blockReason")]
    pub block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
    status: Option<String>,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String, base_url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_else(|e| {
                log::warn!("Falling back to default HTTP client: {}", e);
                Client::new()
            });

        Self {
            client,
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.gemini_api_key.clone(),
            config.gemini_model.clone(),
            config.gemini_base_url.clone(),
        )
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Send a prompt and return the concatenated text of the first candidate
    pub async fn generate(&self, prompt: &str) -> Result<String, TravelError> {
        if !self.is_configured() {
            return Err(TravelError::ServiceUnavailable(
                "AI planner is not configured".to_string(),
            ));
        }

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.7,
                response_mime_type: "application/json",
            },
        };

        log::debug!("Requesting plan from model {} ({} prompt chars)", self.model, prompt.len());

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                log::error!("Generative API request failed: {}", e);
                TravelError::ExternalApiError(format!("Request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .map(|b| format!("{} ({})", b.error.message, b.error.status.unwrap_or_default()))
                .unwrap_or(text);
            log::error!("Generative API error {}: {}", status, message);

            if status.as_u16() == 429 {
                return Err(TravelError::RateLimitExceeded);
            }
            return Err(TravelError::ExternalApiError(format!(
                "API error {}: {}",
                status, message
            )));
        }

        let api_response: GenerateContentResponse = response.json().await.map_err(|e| {
            log::error!("Failed to parse generative API response: {}", e);
            TravelError::ExternalApiError(format!("Parse error: {}", e))
        })?;

        extract_text(api_response)
    }
}

/// Text of the first candidate; blocked or empty replies are errors
pub fn extract_text(response: GenerateContentResponse) -> Result<String, TravelError> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        log::warn!("Prompt blocked by model: {}", reason);
        return Err(TravelError::ExternalApiError(format!("Prompt blocked: {}", reason)));
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| TravelError::ExternalApiError("No candidates returned".to_string()))?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(TravelError::AiResponseParse(format!(
            "empty reply (finish reason: {})",
            candidate.finish_reason.unwrap_or_else(|| "unknown".to_string())
        )));
    }

    Ok(text)
}
