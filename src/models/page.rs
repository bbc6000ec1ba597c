//! Extracted page payload types.

use serde::{Deserialize, Serialize};

/// A hyperlink surfaced by the extractor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageLink {
    #[serde(default)]
    pub href: String,
    #[serde(default)]
    pub text: String,
}

/// Structured content extracted from one page.
///
/// The shape is fixed; unknown keys in extractor output are ignored and
/// out-of-range relevance values are clamped at this boundary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PagePayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub main_content: Option<String>,
    #[serde(default)]
    pub links: Vec<PageLink>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub article_date: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub geo_entities: Vec<String>,
    #[serde(default)]
    pub location_hints: Vec<String>,
    #[serde(default)]
    pub vps_relevance: f64,
    #[serde(default)]
    pub reconstruction_relevance: f64,
    #[serde(default)]
    pub recency_signal: f64,
}

impl PagePayload {
    /// Clamp relevance fields into [0, 1].
    pub fn clamped(mut self) -> Self {
        self.vps_relevance = self.vps_relevance.clamp(0.0, 1.0);
        self.reconstruction_relevance = self.reconstruction_relevance.clamp(0.0, 1.0);
        self.recency_signal = self.recency_signal.clamp(0.0, 1.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_keys_ignored() {
        let payload: PagePayload = serde_json::from_str(
            r#"{"title": "Maps", "main_content": "text", "links": [], "surprise_field": 42}"#,
        )
        .unwrap();
        assert_eq!(payload.title.as_deref(), Some("Maps"));
    }

    #[test]
    fn test_missing_fields_default() {
        let payload: PagePayload = serde_json::from_str(r#"{"title": "Maps"}"#).unwrap();
        assert!(payload.main_content.is_none());
        assert!(payload.links.is_empty());
        assert_eq!(payload.vps_relevance, 0.0);
    }

    #[test]
    fn test_relevance_clamped() {
        let payload: PagePayload =
            serde_json::from_str(r#"{"vps_relevance": 3.5, "recency_signal": -0.2}"#).unwrap();
        let payload = payload.clamped();
        assert_eq!(payload.vps_relevance, 1.0);
        assert_eq!(payload.recency_signal, 0.0);
    }
}
