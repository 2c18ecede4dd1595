// SPDX-FileCopyrightText: 2026 Fedibot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Gemini `generateContent` REST API.
//!
//! Requests ask for `application/json` output and the joined candidate
//! text is parsed as JSON before being handed back. There is no retry
//! here: a failed or unparseable generation is reported once and the
//! caller decides whether that aborts its batch or skips one item.

use std::time::Duration;

use fedibot_core::FedibotError;
use serde_json::Value;
use tracing::debug;

use crate::types::{
    Content, GenerateRequest, GenerationConfig, Part, SafetySetting, WireRequest, WireResponse,
};

const API_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const MAX_OUTPUT_TOKENS: u32 = 8192;
const TOP_P: f32 = 0.95;

const SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_HARASSMENT",
];

/// Client for a single Gemini model.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    default_temperature: f32,
    base_url: String,
}

impl GeminiClient {
    pub fn new(
        api_key: String,
        model: String,
        default_temperature: f32,
    ) -> Result<Self, FedibotError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| FedibotError::Generation {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            http,
            api_key,
            model,
            default_temperature,
            base_url: API_BASE_URL.to_string(),
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    /// Generate a JSON document from the prompt.
    ///
    /// Callers own shape validation of the returned value.
    pub async fn generate(&self, request: &GenerateRequest) -> Result<Value, FedibotError> {
        let wire = WireRequest {
            system_instruction: request.system_instruction.as_ref().map(|text| Content {
                role: None,
                parts: vec![Part { text: text.clone() }],
            }),
            contents: vec![Content {
                role: Some("user".into()),
                parts: vec![Part {
                    text: request.prompt.clone(),
                }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: MAX_OUTPUT_TOKENS,
                temperature: request.temperature.unwrap_or(self.default_temperature),
                top_p: TOP_P,
                response_mime_type: "application/json",
            },
            safety_settings: SAFETY_CATEGORIES
                .iter()
                .map(|category| SafetySetting {
                    category,
                    threshold: "BLOCK_ONLY_HIGH",
                })
                .collect(),
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&wire)
            .send()
            .await
            .map_err(|e| FedibotError::Generation {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| FedibotError::Generation {
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;
        if !status.is_success() {
            return Err(FedibotError::Generation {
                message: format!("gemini returned {status}: {body}"),
                source: None,
            });
        }

        let wire_response: WireResponse =
            serde_json::from_str(&body).map_err(|e| FedibotError::Generation {
                message: format!("failed to parse gemini response: {e}"),
                source: Some(Box::new(e)),
            })?;

        let text = wire_response
            .candidates
            .iter()
            .flat_map(|candidate| candidate.content.parts.iter().map(|part| part.text.as_str()))
            .collect::<Vec<_>>()
            .join("\n");
        debug!(chars = text.len(), "generation received");

        serde_json::from_str(&text).map_err(|e| FedibotError::Generation {
            message: format!("generated text is not valid JSON: {e}"),
            source: Some(Box::new(e)),
        })
    }
}
