//! Frontier expansion: candidate harvest, scoring, and priority assignment.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use url::Url;

use crate::models::{PageLink, PagePayload};

use super::canonical::{canonicalize_url, host_affinity};
use super::signals::{keyword_hits, GEO_TERMS, NOISE_TERMS};

const MAX_ANCHOR_TEXT: usize = 220;

/// A scored, admissible link discovered on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct FrontierCandidate {
    /// Canonical absolute URL.
    pub url: String,
    /// Blended score after mixing with the parent page's geo-score.
    pub geo_score: f64,
    /// Queue priority; larger is claimed sooner.
    pub priority: i32,
    /// Provenance tag for the queue's `source` column.
    pub reason: &'static str,
}

/// Inputs to one page's frontier expansion.
#[derive(Debug, Clone, Copy)]
pub struct ExpansionInput<'a> {
    pub parent_url: &'a str,
    pub payload: &'a PagePayload,
    pub html: &'a str,
    pub current_depth: i32,
    pub max_depth: i32,
    pub max_links: usize,
    pub page_geo_score: f64,
}

fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

fn anchor_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?is)<a\s+[^>]*href=["']([^"']+)["'][^>]*>(.*?)</a>"#)
            .expect("valid anchor regex")
    })
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]+>").expect("valid tag regex"))
}

/// Harvest anchors from raw markup, resolved against `base_url` and
/// canonicalized. Anchor text is tag-stripped, whitespace-normalized, and
/// capped at 220 chars. Duplicates collapse to the first occurrence.
pub fn extract_links(html: &str, base_url: &str, max_links: usize) -> Vec<PageLink> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();
    if html.is_empty() {
        return out;
    }
    let base = Url::parse(base_url).ok();

    for caps in anchor_regex().captures_iter(html) {
        let href_raw = caps.get(1).map(|m| m.as_str().trim()).unwrap_or("");
        let anchor_html = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        let stripped = tag_regex().replace_all(anchor_html, " ");
        let text: String = normalize_anchor_text(&stripped);

        let resolved = match &base {
            Some(base) => base.join(href_raw).map(|u| u.to_string()).ok(),
            None => Some(href_raw.to_string()),
        };
        let abs_url = match resolved.as_deref().and_then(canonicalize_url) {
            Some(u) => u,
            None => continue,
        };
        if !seen.insert(abs_url.clone()) {
            continue;
        }
        out.push(PageLink {
            href: abs_url,
            text,
        });
        if out.len() >= max_links {
            break;
        }
    }
    out
}

fn normalize_anchor_text(raw: &str) -> String {
    let joined = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    joined.chars().take(MAX_ANCHOR_TEXT).collect()
}

/// Score one candidate link relative to its parent page.
///
/// Returns the score in [0, 1] and a provenance reason.
pub fn score_candidate(parent_url: &str, href: &str, text: &str) -> (f64, &'static str) {
    let blob = format!("{} {}", href, text).to_lowercase();
    let geo = clamp01(keyword_hits(&blob, GEO_TERMS) * 3.7);
    let noise = clamp01(keyword_hits(&blob, NOISE_TERMS) * 2.6);

    let mut depth_penalty = 0.0;
    if let Ok(parsed) = Url::parse(href) {
        let slash_count = parsed.path().matches('/').count();
        if slash_count > 5 {
            depth_penalty = f64::min(0.28, (slash_count - 5) as f64 * 0.05);
        }
    }

    let host = host_affinity(parent_url, href);
    let score = clamp01(geo * 0.62 + host * 0.28 + (1.0 - noise) * 0.10 - depth_penalty);

    let reason = if geo > 0.7 {
        "geo-dense"
    } else if host > 0.9 {
        "host-affinity"
    } else if noise > 0.3 {
        "likely-noise"
    } else {
        "explore"
    };
    (score, reason)
}

/// Expand a processed page into ranked frontier candidates.
///
/// Returns an empty set once `current_depth` reaches `max_depth`. Candidates
/// come from the extractor's link list, supplemented by a raw-markup scan when
/// the extractor returned fewer than `max_links / 2`. Each candidate's score
/// is blended with the page's geo-score, sorted descending, and truncated to
/// `max_links`; ties keep first-seen order.
pub fn frontier_candidates(input: &ExpansionInput) -> Vec<FrontierCandidate> {
    if input.current_depth >= input.max_depth {
        return Vec::new();
    }

    let mut links: Vec<PageLink> = Vec::new();
    for link in &input.payload.links {
        let href = match canonicalize_url(&link.href) {
            Some(h) => h,
            None => continue,
        };
        let text: String = link.text.chars().take(MAX_ANCHOR_TEXT).collect();
        links.push(PageLink { href, text });
    }

    if links.len() < input.max_links / 2 {
        links.extend(extract_links(input.html, input.parent_url, input.max_links));
    }

    let mut seen: HashSet<String> = HashSet::new();
    let mut deduped: Vec<PageLink> = Vec::new();
    for link in links {
        if seen.insert(link.href.clone()) {
            deduped.push(link);
        }
    }

    let mut out: Vec<FrontierCandidate> = Vec::with_capacity(deduped.len());
    for link in &deduped {
        let (score, reason) = score_candidate(input.parent_url, &link.href, &link.text);
        let blended = clamp01(score * 0.72 + input.page_geo_score * 0.28);
        let priority =
            (blended * 100.0).ceil() as i32 + i32::max(0, 20 - input.current_depth * 6);
        out.push(FrontierCandidate {
            url: link.href.clone(),
            geo_score: blended,
            priority,
            reason,
        });
    }

    // Stable sort keeps insertion order for equal keys.
    out.sort_by(|a, b| {
        b.geo_score
            .partial_cmp(&a.geo_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(b.priority.cmp(&a.priority))
    });
    out.truncate(input.max_links);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload_with_links(links: Vec<(&str, &str)>) -> PagePayload {
        PagePayload {
            links: links
                .into_iter()
                .map(|(href, text)| PageLink {
                    href: href.to_string(),
                    text: text.to_string(),
                })
                .collect(),
            ..Default::default()
        }
    }

    fn expansion<'a>(
        payload: &'a PagePayload,
        html: &'a str,
        current_depth: i32,
        page_geo_score: f64,
    ) -> ExpansionInput<'a> {
        ExpansionInput {
            parent_url: "https://example.com/",
            payload,
            html,
            current_depth,
            max_depth: 2,
            max_links: 10,
            page_geo_score,
        }
    }

    #[test]
    fn test_depth_gate_returns_empty() {
        let payload = payload_with_links(vec![("https://example.com/maps/vps", "VPS mapping")]);
        let input = ExpansionInput {
            current_depth: 2,
            max_depth: 2,
            ..expansion(&payload, "", 0, 0.7)
        };
        assert!(frontier_candidates(&input).is_empty());
    }

    #[test]
    fn test_duplicate_href_keeps_first_seen_text() {
        let payload = payload_with_links(vec![
            ("https://example.com/maps", "first anchor"),
            ("https://example.com/maps#section", "second anchor"),
        ]);
        let input = expansion(&payload, "", 0, 0.0);
        let cands = frontier_candidates(&input);
        assert_eq!(cands.len(), 1);
        assert_eq!(cands[0].url, "https://example.com/maps");
    }

    #[test]
    fn test_priority_follows_blended_score() {
        let payload = payload_with_links(vec![
            ("https://elsewhere.org/about/team/info/page/deep/one/two", "company"),
            ("https://example.com/lidar-mapping-vps-reconstruction", "lidar mapping VPS"),
        ]);
        let input = expansion(&payload, "", 0, 0.5);
        let cands = frontier_candidates(&input);
        assert_eq!(cands.len(), 2);
        assert!(cands[0].url.contains("lidar"));
        assert!(cands[0].geo_score > cands[1].geo_score);
        assert!(cands[0].priority >= cands[1].priority);
    }

    #[test]
    fn test_blended_score_monotonic_in_page_geo_score() {
        let payload = payload_with_links(vec![("https://example.com/maps/vps", "VPS mapping")]);
        let low = frontier_candidates(&expansion(&payload, "", 0, 0.1));
        let high = frontier_candidates(&expansion(&payload, "", 0, 0.9));
        assert!(high[0].geo_score >= low[0].geo_score);
    }

    #[test]
    fn test_shallow_depth_head_start_decays() {
        let payload = payload_with_links(vec![("https://example.com/maps", "maps")]);
        let at_zero = frontier_candidates(&expansion(&payload, "", 0, 0.4));
        let at_one = frontier_candidates(&expansion(&payload, "", 1, 0.4));
        assert_eq!(at_zero[0].priority - at_one[0].priority, 6);
    }

    #[test]
    fn test_markup_supplements_sparse_payload_links() {
        let payload = payload_with_links(vec![]);
        let html = r#"<p>intro</p>
            <a href="/guides/terrain-mapping">Terrain <b>mapping</b> guide</a>
            <a href="https://example.com/careers">Careers</a>"#;
        let input = expansion(&payload, html, 0, 0.0);
        let cands = frontier_candidates(&input);
        assert_eq!(cands.len(), 2);
        assert!(cands
            .iter()
            .any(|c| c.url == "https://example.com/guides/terrain-mapping"));
    }

    #[test]
    fn test_payload_links_suppress_markup_scan_when_plentiful() {
        let links: Vec<(String, String)> = (0..6)
            .map(|i| (format!("https://example.com/p/{}", i), format!("p{}", i)))
            .collect();
        let payload = payload_with_links(
            links
                .iter()
                .map(|(h, t)| (h.as_str(), t.as_str()))
                .collect(),
        );
        let html = r#"<a href="https://example.com/from-markup">extra</a>"#;
        let input = expansion(&payload, html, 0, 0.0);
        let cands = frontier_candidates(&input);
        assert!(!cands.iter().any(|c| c.url.contains("from-markup")));
    }

    #[test]
    fn test_truncates_to_max_links() {
        let links: Vec<(String, String)> = (0..30)
            .map(|i| (format!("https://example.com/page/{}", i), String::new()))
            .collect();
        let payload = payload_with_links(
            links
                .iter()
                .map(|(h, t)| (h.as_str(), t.as_str()))
                .collect(),
        );
        let input = expansion(&payload, "", 0, 0.0);
        assert_eq!(frontier_candidates(&input).len(), 10);
    }

    #[test]
    fn test_score_candidate_in_range() {
        let cases = [
            ("https://example.com/lidar-vps-mapping-3d", "lidar vps mapping"),
            ("https://example.com/login", "Sign in"),
            ("https://other.org/a/b/c/d/e/f/g/h/i", "deep page"),
            ("https://example.com/", ""),
        ];
        for (href, text) in cases {
            let (score, _) = score_candidate("https://example.com/", href, text);
            assert!((0.0..=1.0).contains(&score), "{} out of range", href);
        }
    }

    #[test]
    fn test_reason_precedence() {
        let (_, reason) = score_candidate(
            "https://example.com/",
            "https://example.com/lidar-mapping-vps-pointcloud-reconstruction",
            "lidar mapping vps pointcloud gaussian splatting",
        );
        assert_eq!(reason, "geo-dense");

        let (_, reason) =
            score_candidate("https://example.com/", "https://example.com/next", "more");
        assert_eq!(reason, "host-affinity");

        let (_, reason) = score_candidate(
            "https://example.com/",
            "https://other.org/login-signup-privacy",
            "login signup privacy terms",
        );
        assert_eq!(reason, "likely-noise");

        let (_, reason) =
            score_candidate("https://example.com/", "https://other.org/news", "news");
        assert_eq!(reason, "explore");
    }

    #[test]
    fn test_deep_path_penalized() {
        let shallow = score_candidate("https://e.com/", "https://other.org/one", "").0;
        let deep =
            score_candidate("https://e.com/", "https://other.org/a/b/c/d/e/f/g/h/i/j", "").0;
        assert!(deep < shallow);
    }

    #[test]
    fn test_extract_links_strips_tags_and_normalizes_text() {
        let html = r#"<a href="https://e.com/maps"> <span>City</span>
            <b>maps</b>   index </a>"#;
        let links = extract_links(html, "https://e.com/", 10);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].text, "City maps index");
    }

    #[test]
    fn test_extract_links_resolves_relative() {
        let html = r#"<a href="../maps/vps">VPS</a>"#;
        let links = extract_links(html, "https://e.com/blog/post", 10);
        assert_eq!(links[0].href, "https://e.com/maps/vps");
    }

    #[test]
    fn test_extract_links_skips_non_http() {
        let html = r#"<a href="mailto:x@y.com">mail</a><a href="https://e.com/ok">ok</a>"#;
        let links = extract_links(html, "https://e.com/", 10);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].href, "https://e.com/ok");
    }
}
