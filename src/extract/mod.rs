//! Page extraction seam: LLM-backed with a regex fallback.

mod dom;
pub mod fallback;

pub use dom::build_dom_summary;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::llm::{LlmClient, LlmConfig, LlmError};
use crate::models::PagePayload;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error(transparent)]
    Llm(#[from] LlmError),
}

/// Turns fetched markup into a structured payload with a confidence score.
#[async_trait]
pub trait PageExtractor: Send + Sync {
    async fn extract(&self, html: &str, url: &str) -> Result<(PagePayload, f64), ExtractError>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// LLM-backed extractor: DOM summary in, structured JSON out.
pub struct LlmExtractor {
    client: LlmClient,
}

impl LlmExtractor {
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageExtractor for LlmExtractor {
    async fn extract(&self, html: &str, url: &str) -> Result<(PagePayload, f64), ExtractError> {
        let summary = build_dom_summary(html, self.client.config().max_dom_chars);
        let (payload, confidence) = self.client.extract_payload(&summary, url).await?;
        Ok((payload, confidence))
    }

    fn name(&self) -> &'static str {
        "llm"
    }
}

/// Regex fallback extractor; cannot fail.
pub struct RegexExtractor;

#[async_trait]
impl PageExtractor for RegexExtractor {
    async fn extract(&self, html: &str, url: &str) -> Result<(PagePayload, f64), ExtractError> {
        Ok(fallback::extract(html, url))
    }

    fn name(&self) -> &'static str {
        "regex-fallback"
    }
}

/// Pick the extractor for this process: LLM when a credential is configured,
/// regex fallback otherwise.
pub fn extractor_from_env() -> anyhow::Result<Arc<dyn PageExtractor>> {
    let config = LlmConfig::default();
    if config.enabled() {
        let client = LlmClient::new(config)?;
        Ok(Arc::new(LlmExtractor::new(client)))
    } else {
        Ok(Arc::new(RegexExtractor))
    }
}
