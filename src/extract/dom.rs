//! Compact DOM summaries for the LLM.

use std::sync::OnceLock;

use regex::Regex;

/// Attributes worth keeping when simplifying tags, in output order.
const KEPT_ATTRS: &[&str] = &["id", "class", "role", "data-testid", "itemprop", "itemtype"];

const ATTR_VALUE_MAX: usize = 80;

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
    RE.get_or_init(|| Regex::new(r"<(\w+)([^>]*)>").expect("valid regex"))
}

fn attr_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)\b(id|class|role|data-testid|itemprop|itemtype)\s*=\s*["']([^"']*)["']"#)
            .expect("valid regex")
    })
}

/// Build a compact DOM summary: tag structure plus key attributes, with
/// scripts and styles stripped and very large pages truncated to stay within
/// model context limits.
pub fn build_dom_summary(html: &str, max_chars: usize) -> String {
    let text = script_regex().replace_all(html, "");
    let text = style_regex().replace_all(&text, "");

    let mut text = tag_regex()
        .replace_all(&text, |caps: &regex::Captures| {
            let tag = caps.get(1).map(|m| m.as_str().to_lowercase()).unwrap_or_default();
            let rest = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            simplify_tag(&tag, rest)
        })
        .into_owned();

    if text.len() > max_chars {
        let mut end = max_chars;
        while end > 0 && !text.is_char_boundary(end) {
            end -= 1;
        }
        text.truncate(end);
        text.push_str("\n... [truncated]");
    }
    text
}

fn simplify_tag(tag: &str, rest: &str) -> String {
    let mut found: Vec<(usize, String)> = Vec::new();
    for caps in attr_regex().captures_iter(rest) {
        let name = caps.get(1).map(|m| m.as_str().to_lowercase()).unwrap_or_default();
        let value = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        if let Some(idx) = KEPT_ATTRS.iter().position(|a| *a == name) {
            if !found.iter().any(|(i, _)| *i == idx) {
                let short: String = value.chars().take(ATTR_VALUE_MAX).collect();
                found.push((idx, format!("{}=\"{}\"", KEPT_ATTRS[idx], short)));
            }
        }
    }
    found.sort_by_key(|(idx, _)| *idx);

    if found.is_empty() {
        format!("<{}>", tag)
    } else {
        let attrs: Vec<String> = found.into_iter().map(|(_, a)| a).collect();
        format!("<{} {}>", tag, attrs.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_scripts_and_styles() {
        let html = r#"<div><script>var x = 1;</script><style>.a{}</style><p>hi</p></div>"#;
        let summary = build_dom_summary(html, 10_000);
        assert!(!summary.contains("var x"));
        assert!(!summary.contains(".a{}"));
        assert!(summary.contains("<p>hi</p>"));
    }

    #[test]
    fn test_keeps_key_attributes_only() {
        let html = r#"<div id="main" class="hero" onclick="evil()" style="color:red">x</div>"#;
        let summary = build_dom_summary(html, 10_000);
        assert!(summary.contains(r#"<div id="main" class="hero">"#));
        assert!(!summary.contains("onclick"));
        assert!(!summary.contains("color:red"));
    }

    #[test]
    fn test_lowercases_tag_names() {
        let summary = build_dom_summary("<DIV><P>x</P></DIV>", 10_000);
        assert!(summary.contains("<div>"));
        assert!(summary.contains("<p>x</P>"));
    }

    #[test]
    fn test_truncates_with_marker() {
        let html = "<p>".to_string() + &"word ".repeat(1000);
        let summary = build_dom_summary(&html, 100);
        assert!(summary.ends_with("... [truncated]"));
        assert!(summary.len() < html.len());
    }
}
