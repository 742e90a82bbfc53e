//! Ollama chat client.
//!
//! Uses the Ollama API at /api/chat with streaming disabled.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use jgq_core::models::TEMPERATURE;
use jgq_core::{ChatModel, ModelSelection, OutputFormat};

/// Client for one Ollama model.
#[derive(Clone)]
pub struct OllamaChatClient {
    base_url: String,
    selection: ModelSelection,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'static str>,
    options: ChatOptions,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

impl OllamaChatClient {
    pub fn new(base_url: &str, selection: ModelSelection) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .unwrap_or_default();

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            selection,
            client,
        }
    }

    fn request_body<'a>(&'a self, prompt: &'a str, format: OutputFormat) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.selection.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
            format: match format {
                OutputFormat::Json => Some("json"),
                OutputFormat::Text => None,
            },
            options: ChatOptions {
                temperature: TEMPERATURE,
            },
        }
    }

    /// Check if the Ollama service is up and the model is pulled.
    pub async fn health_check(&self) -> Result<bool> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
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
impl ChatModel for OllamaChatClient {
    async fn complete(&self, prompt: &str, format: OutputFormat) -> Result<String> {
        let request = self.request_body(prompt, format);
        debug!(model = %self.selection.model, prompt_len = prompt.len(), ?format, "Calling Ollama");

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&request)
            .send()
            .await
            .context("Failed to connect to Ollama. Is it running?")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            if body.contains("model") && body.contains("not found") {
                bail!(
                    "Model '{}' not found. Pull it with: ollama pull {}",
                    self.selection.model,
                    self.selection.model
                );
            }
            bail!("Ollama API error ({}): {}", status, body);
        }

        let result: ChatResponse = response
            .json()
            .await
            .context("Failed to parse Ollama response")?;

        let text = result.message.content.trim().to_string();
        debug!(model = %self.selection.model, len = text.len(), "Ollama completion received");
        Ok(text)
    }

    fn selection(&self) -> &ModelSelection {
        &self.selection
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OllamaChatClient {
        OllamaChatClient::new("http://localhost:11434/", ModelSelection::ollama("codegemma:instruct"))
    }

    #[test]
    fn test_json_request_body() {
        let client = client();
        let body = serde_json::to_value(client.request_body("refine", OutputFormat::Json)).unwrap();
        assert_eq!(body["model"], "codegemma:instruct");
        assert_eq!(body["stream"], false);
        assert_eq!(body["format"], "json");
        assert_eq!(body["options"]["temperature"], 0.0);
        assert_eq!(body["messages"][0]["content"], "refine");
    }

    #[test]
    fn test_text_request_body() {
        let client = client();
        let body = serde_json::to_value(client.request_body("answer", OutputFormat::Text)).unwrap();
        assert!(body.get("format").is_none());
    }

    #[test]
    fn test_parse_response() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"model":"codegemma:instruct","message":{"role":"assistant","content":"{\"source\":\"none\"}"},"done":true}"#,
        )
        .unwrap();
        assert_eq!(response.message.content, r#"{"source":"none"}"#);
    }
}
