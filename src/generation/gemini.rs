//! Google Generative Language (Gemini) provider

use async_trait::async_trait;

use super::{GenerationError, LanguageModel};
use crate::config::GeminiConfig;

/// Gemini `generateContent` client
pub struct GeminiProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiProvider {
    pub fn new(config: &GeminiConfig) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GenerationError::Request(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl LanguageModel for GeminiProvider {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| GenerationError::NotConfigured("GEMINI_API_KEY is not set".into()))?;

        let request = serde_json::json!({
            "contents": [
                { "parts": [ { "text": prompt } ] }
            ]
        });

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::Request(format!("Failed to call Gemini: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api { status, body });
        }

        let result: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GenerationError::Request(format!("Failed to parse response: {}", e)))?;

        let text = response_text(&result);
        if text.trim().is_empty() {
            let reason = result["promptFeedback"]["blockReason"]
                .as_str()
                .or_else(|| result["candidates"][0]["finishReason"].as_str())
                .unwrap_or("no candidates");
            tracing::warn!(model = %self.model, reason, "Gemini returned no text");
            return Err(GenerationError::EmptyResponse);
        }

        Ok(text)
    }
}

/// Concatenate the text parts of the first candidate
fn response_text(result: &serde_json::Value) -> String {
    result["candidates"][0]["content"]["parts"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part["text"].as_str())
                .collect::<String>()
        })
        .unwrap_or_default()
}
