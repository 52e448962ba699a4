//! Seam to the external AI text-generation service.

use crate::config::AiConfig;
use crate::errors::GenerationError;
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

/// One prompt sent to the AI service
#[derive(Debug, Clone, PartialEq)]
pub struct TextRequest {
    pub prompt: String,
    /// When set, the reply is requested as JSON matching this schema
    pub response_schema: Option<Value>,
    pub temperature: Option<f32>,
}

impl TextRequest {
    pub fn plain(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            response_schema: None,
            temperature: None,
        }
    }
}

/// Request/response text generation
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Returns the generated text, or why the service could not produce it
    async fn generate_text(&self, request: &TextRequest) -> Result<String, GenerationError>;
}

/// Gemini `generateContent` REST client
pub struct GeminiClient {
    config: AiConfig,
    http: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: AiConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { config, http }
    }

    fn request_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        )
    }

    /// JSON body for a `generateContent` call
    pub fn request_body(request: &TextRequest) -> Value {
        let mut generation_config = serde_json::Map::new();
        if let Some(temperature) = request.temperature {
            generation_config.insert("temperature".to_string(), json!(temperature));
        }
        if let Some(schema) = &request.response_schema {
            generation_config.insert("responseMimeType".to_string(), json!("application/json"));
            generation_config.insert("responseSchema".to_string(), schema.clone());
        }

        json!({
            "contents": [{ "role": "user", "parts": [{ "text": request.prompt }] }],
            "generationConfig": Value::Object(generation_config),
        })
    }

    /// Concatenated text parts of the first candidate
    pub fn extract_text(payload: &Value) -> Result<String, GenerationError> {
        let parts = payload
            .pointer("/candidates/0/content/parts")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                GenerationError::MalformedResponse("response has no candidate parts".to_string())
            })?;

        let text: String = parts
            .iter()
            .filter_map(|part| part.get("text").and_then(Value::as_str))
            .collect();

        if text.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(text)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate_text(&self, request: &TextRequest) -> Result<String, GenerationError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(GenerationError::MissingCredentials)?;

        debug!(model = %self.config.model, "Sending generateContent request");
        let response = self
            .http
            .post(self.request_url())
            .header("x-goog-api-key", api_key)
            .json(&Self::request_body(request))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body,
            });
        }
        if body.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        let payload: Value = serde_json::from_str(&body)?;
        Self::extract_text(&payload)
    }
}
