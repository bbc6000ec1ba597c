//! Regex-based extraction used when no LLM credential is available.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::{PageLink, PagePayload};

const MAX_LINKS: usize = 50;
const MAX_HREF_CHARS: usize = 2048;
const MAX_TEXT_CHARS: usize = 200;
const MAX_FIELD_CHARS: usize = 500;
const MAX_MAIN_CHARS: usize = 10_000;
const MIN_MAIN_CHARS: usize = 200;

fn title_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<title[^>]*>([^<]+)</title>").expect("valid regex"))
}

fn description_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)<meta\s+name=["']description["'][^>]*content=["']([^"']+)["']"#)
            .expect("valid regex")
    })
}

fn anchor_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)<a\s+[^>]*href=["']([^"']+)["'][^>]*>([^<]*)</a>"#)
            .expect("valid regex")
    })
}

fn script_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<script[^>]*>[\s\S]*?</script>").expect("valid regex"))
}

fn style_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<style[^>]*>[\s\S]*?</style>").expect("valid regex"))
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]+>").expect("valid regex"))
}

fn take_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Extract a payload from raw markup without any model.
///
/// Confidence is 0.67 when a main content block was recovered, 0.45
/// otherwise.
pub fn extract(html: &str, _url: &str) -> (PagePayload, f64) {
    let mut payload = PagePayload::default();

    if let Some(caps) = title_regex().captures(html) {
        payload.title = Some(take_chars(caps[1].trim(), MAX_FIELD_CHARS));
    }
    if let Some(caps) = description_regex().captures(html) {
        payload.description = Some(take_chars(caps[1].trim(), MAX_FIELD_CHARS));
    }

    for caps in anchor_regex().captures_iter(html) {
        payload.links.push(PageLink {
            href: take_chars(&caps[1], MAX_HREF_CHARS),
            text: take_chars(caps[2].trim(), MAX_TEXT_CHARS),
        });
        if payload.links.len() >= MAX_LINKS {
            break;
        }
    }

    // Crude main content: everything left after dropping scripts, styles, and
    // tags, kept only when long enough to be a real text block.
    let text = script_regex().replace_all(html, "");
    let text = style_regex().replace_all(&text, "");
    let text = tag_regex().replace_all(&text, " ");
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let has_main = text.len() > MIN_MAIN_CHARS;
    if has_main {
        payload.main_content = Some(take_chars(&text, MAX_MAIN_CHARS));
    }

    let confidence = if has_main { 0.67 } else { 0.45 };
    (payload, confidence)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<html><head>
        <title> Urban LiDAR mapping </title>
        <meta name="description" content="City-scale terrain reconstruction">
        <style>.x{}</style>
        </head><body>
        <script>analytics();</script>
        <a href="https://e.com/pointcloud">Pointcloud viewer</a>
        <a href="/docs">Docs</a>
        <p>A long article about drone navigation and satellite imagery pipelines,
        describing how street-level capture feeds gaussian splatting models and
        city-scale meshes for localization. The text continues long enough to be
        treated as real page content rather than boilerplate chrome.</p>
        </body></html>"#;

    #[test]
    fn test_extracts_title_and_description() {
        let (payload, _) = extract(SAMPLE, "https://e.com/");
        assert_eq!(payload.title.as_deref(), Some("Urban LiDAR mapping"));
        assert_eq!(
            payload.description.as_deref(),
            Some("City-scale terrain reconstruction")
        );
    }

    #[test]
    fn test_extracts_links() {
        let (payload, _) = extract(SAMPLE, "https://e.com/");
        assert_eq!(payload.links.len(), 2);
        assert_eq!(payload.links[0].href, "https://e.com/pointcloud");
        assert_eq!(payload.links[0].text, "Pointcloud viewer");
    }

    #[test]
    fn test_main_content_recovered_with_confidence() {
        let (payload, confidence) = extract(SAMPLE, "https://e.com/");
        let main = payload.main_content.unwrap();
        assert!(main.contains("drone navigation"));
        assert!(!main.contains("analytics()"));
        assert_eq!(confidence, 0.67);
    }

    #[test]
    fn test_short_page_lowers_confidence() {
        let (payload, confidence) = extract("<html><body><p>tiny</p></body></html>", "https://e.com/");
        assert!(payload.main_content.is_none());
        assert_eq!(confidence, 0.45);
    }

    #[test]
    fn test_link_cap() {
        let mut html = String::new();
        for i in 0..80 {
            html.push_str(&format!(r#"<a href="https://e.com/{i}">l{i}</a>"#));
        }
        let (payload, _) = extract(&html, "https://e.com/");
        assert_eq!(payload.links.len(), 50);
    }
}
