//! LLM client for DOM pattern analysis.
//!
//! Talks to any OpenAI-compatible chat-completions API and turns a simplified
//! DOM into a structured page payload.

mod config;
mod prompts;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::models::PagePayload;

pub use config::LlmConfig;
use prompts::{SYSTEM_PROMPT, USER_PROMPT_TEMPLATE};

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("LLM connection error: {0}")]
    Connection(String),
    #[error("LLM API error: {0}")]
    Api(String),
    #[error("LLM response parse error: {0}")]
    Parse(String),
    #[error("no LLM credential configured")]
    NotConfigured,
}

/// Client for LLM-backed page extraction.
pub struct LlmClient {
    config: LlmConfig,
    client: Client,
}

/// Chat-completions request format.
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

/// Chat-completions response format.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

impl LlmClient {
    /// Create a new LLM client with the given configuration.
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Connection(e.to_string()))?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Extract a structured payload from a simplified DOM.
    ///
    /// Returns the payload and a heuristic confidence: 0.94 when the model
    /// produced parseable JSON with main content, 0.5 when main content is
    /// missing. Non-JSON output is an error so the row is retried like any
    /// transient failure.
    pub async fn extract_payload(
        &self,
        dom_summary: &str,
        url: &str,
    ) -> Result<(PagePayload, f64), LlmError> {
        let user_content = USER_PROMPT_TEMPLATE
            .replace("{dom_summary}", dom_summary)
            .replace("{url}", url);

        debug!("Running DOM analysis for {}", url);
        let text = self
            .chat(vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user_content,
                },
            ])
            .await?;

        let json_text = strip_code_fence(&text);
        let payload: PagePayload = serde_json::from_str(json_text)
            .map_err(|e| LlmError::Parse(format!("model returned non-JSON payload: {}", e)))?;
        let payload = payload.clamped();

        let has_main = payload
            .main_content
            .as_deref()
            .is_some_and(|c| !c.is_empty());
        let confidence = if has_main { 0.94 } else { 0.5 };
        Ok((payload, confidence))
    }

    /// Call the chat-completions endpoint and return the first choice.
    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<String, LlmError> {
        let api_key = self.config.api_key.as_ref().ok_or(LlmError::NotConfigured)?;

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages,
            temperature: self.config.temperature,
        };

        let url = format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        let resp = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("HTTP {}: {}", status, body)));
        }

        let parsed: ChatResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| LlmError::Parse("empty choices in response".to_string()))
    }
}

/// Strip a markdown code fence around a JSON body, if present.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    for fence in ["```json", "```"] {
        if let Some(rest) = trimmed.strip_prefix(fence) {
            if let Some(end) = rest.find("```") {
                return rest[..end].trim();
            }
            return rest.trim();
        }
    }
    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fence_json() {
        let fenced = "```json\n{\"title\": \"x\"}\n```";
        assert_eq!(strip_code_fence(fenced), "{\"title\": \"x\"}");
    }

    #[test]
    fn test_strip_code_fence_plain() {
        let fenced = "```\n{}\n```";
        assert_eq!(strip_code_fence(fenced), "{}");
    }

    #[test]
    fn test_strip_code_fence_absent() {
        assert_eq!(strip_code_fence("  {\"a\": 1} "), "{\"a\": 1}");
    }
}
