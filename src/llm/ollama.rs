//! Ollama invoker implementation
//!
//! Async HTTP client for the Ollama API using the `format` field for
//! schema-constrained structured output.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::core::{Config, Result, TelosError};
use crate::llm::traits::{ModelCall, ModelInvoker};

/// Ollama API client implementing [`ModelInvoker`]
#[derive(Clone)]
pub struct OllamaInvoker {
    client: Client,
    base_url: String,
    default_model: String,
}

/// Ollama chat request
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaMessage>,
    /// "json" or a JSON schema; constrains the model output
    format: &'a Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
    stream: bool,
}

/// Ollama message format
#[derive(Debug, Serialize, Deserialize)]
struct OllamaMessage {
    role: String,
    content: String,
}

/// Ollama generation options
#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
}

/// Ollama chat response (non-streaming)
#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: OllamaMessage,
}

/// Ollama models list response
#[derive(Debug, Deserialize)]
struct ModelsResponse {
    models: Vec<ModelInfo>,
}

/// Model information
#[derive(Debug, Deserialize)]
struct ModelInfo {
    name: String,
}

impl OllamaInvoker {
    /// Create a new Ollama invoker from configuration
    pub fn from_config(config: &Config) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.ollama.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: config.ollama_url(),
            default_model: config.models.default.clone(),
        }
    }

    /// Create an invoker with a custom base URL and model
    pub fn with_base_url(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
            default_model: model.into(),
        }
    }

    /// Check if a model is available
    pub async fn is_model_available(&self, model: &str) -> Result<bool> {
        let models = self.list_models().await?;
        Ok(models.iter().any(|m| m == model || m.starts_with(&format!("{}:", model))))
    }

    /// List available models
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await?;

        let models: ModelsResponse = response.json().await?;
        Ok(models.models.into_iter().map(|m| m.name).collect())
    }
}

#[async_trait]
impl ModelInvoker for OllamaInvoker {
    async fn invoke(&self, call: ModelCall<'_>) -> Result<Value> {
        let model = call.model.unwrap_or(&self.default_model);

        let instructions = match call.output_schema {
            Some(_) => format!(
                "{}\n\nRespond with a single JSON object matching the required schema.",
                call.instructions
            ),
            None => format!("{}\n\nRespond with a single JSON object.", call.instructions),
        };

        let input_text = serde_json::to_string_pretty(&call.input)?;

        let json_format = Value::String("json".to_string());
        let format = call.output_schema.unwrap_or(&json_format);

        let request = ChatRequest {
            model,
            messages: vec![
                OllamaMessage {
                    role: "system".to_string(),
                    content: instructions,
                },
                OllamaMessage {
                    role: "user".to_string(),
                    content: input_text,
                },
            ],
            format,
            options: Some(OllamaOptions { temperature: 0.1 }),
            stream: false,
        };

        debug!(call = call.name, model, "invoking model");

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    TelosError::model(
                        call.name,
                        format!(
                            "cannot connect to Ollama at {}. Is it running?",
                            self.base_url
                        ),
                    )
                } else {
                    TelosError::model(call.name, e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(TelosError::model(
                call.name,
                format!("Ollama returned {}: {}", status, error_text),
            ));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| TelosError::model(call.name, format!("invalid API response: {}", e)))?;

        debug!(call = call.name, content = %chat.message.content, "model responded");

        serde_json::from_str(&chat.message.content).map_err(|e| {
            TelosError::model(
                call.name,
                format!("model output is not valid JSON: {}", e),
            )
        })
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
