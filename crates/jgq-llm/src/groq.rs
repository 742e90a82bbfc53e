//! Groq chat client.
//!
//! Uses the OpenAI-compatible `/chat/completions` endpoint with a bearer key.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use jgq_core::models::TEMPERATURE;
use jgq_core::{ChatModel, ModelSelection, OutputFormat};

/// Client for one Groq model.
#[derive(Clone)]
pub struct GroqClient {
    base_url: String,
    api_key: String,
    selection: ModelSelection,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl GroqClient {
    pub fn new(base_url: &str, api_key: &str, selection: ModelSelection) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .unwrap_or_default();

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            selection,
            client,
        }
    }

    fn request_body<'a>(&'a self, prompt: &'a str, format: OutputFormat) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.selection.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: TEMPERATURE,
            response_format: match format {
                OutputFormat::Json => Some(ResponseFormat { kind: "json_object" }),
                OutputFormat::Text => None,
            },
        }
    }

    /// Check that the API key is accepted and the model is listed.
    pub async fn health_check(&self) -> Result<bool> {
        let response = self
            .client
            .get(format!("{}/models", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                let text = resp.text().await.unwrap_or_default();
                Ok(text.contains(&self.selection.model))
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl ChatModel for GroqClient {
    async fn complete(&self, prompt: &str, format: OutputFormat) -> Result<String> {
        let request = self.request_body(prompt, format);
        debug!(model = %self.selection.model, prompt_len = prompt.len(), ?format, "Calling Groq");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to connect to Groq")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Groq API error ({}): {}", status, body);
        }

        let result: ChatCompletionResponse = response
            .json()
            .await
            .context("Failed to parse Groq response")?;

        let text = completion_text(result)?;
        debug!(model = %self.selection.model, len = text.len(), "Groq completion received");
        Ok(text)
    }

    fn selection(&self) -> &ModelSelection {
        &self.selection
    }
}

fn completion_text(response: ChatCompletionResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|s| s.trim().to_string())
        .ok_or_else(|| anyhow::anyhow!("No message content in Groq response"))
}
