//! Injectable page-fetch seam.

use async_trait::async_trait;

/// Result of loading one page.
///
/// A failed load is represented as `html: None` with whatever status is
/// known; fetchers never surface transport errors to the caller.
#[derive(Debug, Clone, Default)]
pub struct FetchedPage {
    pub html: Option<String>,
    pub status_code: Option<u16>,
    pub content_type: Option<String>,
}

impl FetchedPage {
    /// A load failure with an optional status code.
    pub fn failed(status_code: Option<u16>) -> Self {
        Self {
            html: None,
            status_code: status_code.or(Some(0)),
            content_type: None,
        }
    }
}

/// Loads pages for the worker; implementations must not raise for timeouts
/// or navigation errors.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> FetchedPage;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_defaults_status_to_zero() {
        let page = FetchedPage::failed(None);
        assert_eq!(page.status_code, Some(0));
        assert!(page.html.is_none());
        assert!(page.content_type.is_none());
    }

    #[test]
    fn test_failed_keeps_known_status() {
        let page = FetchedPage::failed(Some(503));
        assert_eq!(page.status_code, Some(503));
    }
}
