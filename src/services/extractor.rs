// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Nutrition extractor backed by an OpenAI-compatible chat completions API.
//!
//! Handles:
//! - Text extraction (the user's description embedded in the prompt)
//! - Vision extraction (the photo attached as a data URL)
//! - Separating transport/HTTP failures from unusable model output

use crate::config::Config;
use crate::error::AppError;
use crate::models::{parse_estimate, NutritionEstimate};
use crate::services::image::ImagePayload;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Output schema shared by both prompts.
const SCHEMA_INSTRUCTIONS: &str = r#"- Food items
- Quantity
- Estimated calories
- Carbohydrates (grams)
- Protein (grams)
- Fiber (grams)
- Fat (grams)

Only respond with valid JSON in this format:
{
  "items": [
    {
      "name": "scrambled eggs",
      "quantity": 2,
      "calories": 140,
      "carbs": 1,
      "protein": 12,
      "fiber": 0,
      "fat": 10
    }
  ],
  "totals": {
    "calories": 0,
    "carbs": 0,
    "protein": 0,
    "fiber": 0,
    "fat": 0
  }
}"#;

const VISION_MAX_TOKENS: u32 = 500;

/// Source of structured nutrition estimates.
///
/// Implementations return `ExtractionParse` when they got an answer that
/// is not usable nutrition data, and `Extractor` when no answer was obtained.
#[async_trait]
pub trait NutritionExtractor: Send + Sync {
    async fn extract_from_text(&self, text: &str) -> Result<NutritionEstimate, AppError>;

    async fn extract_from_image(&self, image: &ImagePayload)
        -> Result<NutritionEstimate, AppError>;
}

pub fn text_prompt(text: &str) -> String {
    format!(
        "Extract the following details from the user's input:\n{}\n\nInput: \"{}\"",
        SCHEMA_INSTRUCTIONS, text
    )
}

pub fn vision_prompt() -> String {
    format!(
        "Describe the food in this image and estimate the following:\n{}",
        SCHEMA_INSTRUCTIONS
    )
}

// ─── Wire types ──────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: MessageContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

// ─── Client ──────────────────────────────────────────────────────

/// OpenAI-compatible extractor client.
#[derive(Clone)]
pub struct OpenAiExtractor {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiExtractor {
    pub fn new(base_url: String, api_key: String, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.openai_base_url.clone(),
            config.openai_api_key.clone(),
            config.openai_model.clone(),
        )
    }

    /// Send one chat completion and return the first choice's content.
    async fn complete(&self, request: &ChatRequest<'_>) -> Result<String, AppError> {
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::Extractor(format!("Request failed: {}", e)))?;

        let response = self.check_response(response).await?;

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::Extractor(format!("Unreadable response body: {}", e)))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        tracing::debug!(chars = content.len(), "Extractor responded");
        Ok(content)
    }

    /// Map non-2xx responses to `Extractor` errors.
    async fn check_response(
        &self,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, AppError> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ApiErrorResponse>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);

        if status.as_u16() == 429 {
            tracing::warn!("Extractor rate limit hit (429)");
        }

        Err(AppError::Extractor(format!("HTTP {}: {}", status, detail)))
    }

    fn parse(content: &str) -> Result<NutritionEstimate, AppError> {
        parse_estimate(content).map_err(|e| {
            tracing::warn!(error = %e, raw = content, "Failed to parse extractor response");
            AppError::from(e)
        })
    }
}

#[async_trait]
impl NutritionExtractor for OpenAiExtractor {
    async fn extract_from_text(&self, text: &str) -> Result<NutritionEstimate, AppError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: MessageContent::Text(text_prompt(text)),
            }],
            max_tokens: None,
        };

        let content = self.complete(&request).await?;
        Self::parse(&content)
    }

    async fn extract_from_image(
        &self,
        image: &ImagePayload,
    ) -> Result<NutritionEstimate, AppError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: MessageContent::Parts(vec![
                    ContentPart::Text {
                        text: vision_prompt(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: image.to_data_url(),
                        },
                    },
                ]),
            }],
            max_tokens: Some(VISION_MAX_TOKENS),
        };

        let content = self.complete(&request).await?;
        Self::parse(&content)
    }
}
