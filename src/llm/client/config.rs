//! LLM client configuration.

/// Configuration for the OpenAI-compatible extraction client.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    /// API key; extraction falls back to the regex path when absent.
    pub api_key: Option<String>,
    /// API base URL for OpenAI-compatible providers.
    pub base_url: String,
    /// Model used for DOM analysis.
    pub model: String,
    /// Generation temperature; extraction wants determinism.
    pub temperature: f32,
    /// Maximum characters of DOM summary sent per request.
    pub max_dom_chars: usize,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self::base_default().with_env_overrides()
    }
}

impl LlmConfig {
    /// Base default without env overrides (used internally to avoid recursion).
    fn base_default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            temperature: 0.0,
            max_dom_chars: 50_000,
            timeout_secs: 120,
        }
    }

    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `OPENAI_API_KEY`: API key; enables the LLM extraction path
    /// - `LLM_API_BASE`: base URL for OpenAI-compatible APIs
    /// - `LLM_MODEL`: model name
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("OPENAI_API_KEY") {
            if !val.is_empty() {
                self.api_key = Some(val);
            }
        }
        if let Ok(val) = std::env::var("LLM_API_BASE") {
            if !val.is_empty() {
                self.base_url = val;
            }
        }
        if let Ok(val) = std::env::var("LLM_MODEL") {
            if !val.is_empty() {
                self.model = val;
            }
        }
        self
    }

    /// Whether a credential is available for the LLM path.
    pub fn enabled(&self) -> bool {
        self.api_key.is_some()
    }
}
