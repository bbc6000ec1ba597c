//! Geo-signal scoring of extracted pages.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::PagePayload;

/// Terms indicating geospatial / AR / VPS / 3D-reconstruction relevance.
pub const GEO_TERMS: &[&str] = &[
    "map",
    "mapping",
    "geospatial",
    "geography",
    "terrain",
    "satellite",
    "imagery",
    "street",
    "city",
    "urban",
    "vps",
    "localization",
    "positioning",
    "ar",
    "xr",
    "robot",
    "robotics",
    "autonomous",
    "drone",
    "navigation",
    "wayfinding",
    "3d",
    "reconstruction",
    "sfm",
    "gaussian",
    "splatting",
    "mesh",
    "pointcloud",
    "coordinate",
    "gis",
    "lidar",
];

/// Terms indicating boilerplate/utility links that are rarely worth crawling.
pub const NOISE_TERMS: &[&str] = &[
    "login",
    "signup",
    "privacy",
    "terms",
    "careers",
    "contact",
    "cookie",
    "advertise",
    "sponsor",
];

fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Fraction of the dictionary found in `text`, normalized by 0.35 x |dict|.
pub(crate) fn keyword_hits(text: &str, terms: &[&str]) -> f64 {
    let lowered = text.to_lowercase();
    if lowered.is_empty() {
        return 0.0;
    }
    let hits = terms.iter().filter(|term| lowered.contains(**term)).count();
    hits as f64 / (terms.len() as f64 * 0.35).max(1.0)
}

fn recent_year_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(202[4-9]|203\d)\b").expect("valid year regex"))
}

/// The four weighted sub-signals behind a page's geo-score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoSignals {
    pub geo_term_density: f64,
    pub freshness_signal: f64,
    pub structured_data_signal: f64,
    pub link_quality_signal: f64,
}

impl GeoSignals {
    /// Weighted aggregate in [0, 1]; this is the page's geo-score.
    pub fn aggregate_score(&self) -> f64 {
        clamp01(
            self.geo_term_density * 0.42
                + self.freshness_signal * 0.18
                + self.structured_data_signal * 0.22
                + self.link_quality_signal * 0.18,
        )
    }
}

/// Score a page's geospatial relevance from its extraction payload and URL.
pub fn compute_geo_signals(url: &str, payload: &PagePayload) -> GeoSignals {
    let main_content = payload.main_content.as_deref().unwrap_or("");
    let title = payload.title.as_deref().unwrap_or("");
    let description = payload.description.as_deref().unwrap_or("");
    let blob = format!(
        "{}\n{}\n{}\n{}",
        url,
        title,
        description,
        truncate_chars(main_content, 5000)
    );

    let geo_term_density = clamp01(keyword_hits(&blob, GEO_TERMS) * 3.4);

    let mut freshness_signal = 0.0;
    if payload.article_date.as_deref().is_some_and(|d| !d.is_empty()) {
        freshness_signal = 0.65;
    }
    if recent_year_regex().is_match(&blob) {
        freshness_signal = f64::max(freshness_signal, 0.8);
    }

    let main_lower = main_content.to_lowercase();
    let mut structured_data_signal = 0.0;
    if main_lower.contains("application/ld+json") {
        structured_data_signal = 0.7;
    }
    if ["schema.org", "geo", "latitude", "longitude"]
        .iter()
        .any(|k| main_lower.contains(k))
    {
        structured_data_signal = f64::max(structured_data_signal, 0.6);
    }

    let mut strong = 0usize;
    for link in &payload.links {
        let blob = format!("{} {}", link.href, link.text).to_lowercase();
        if GEO_TERMS.iter().any(|term| blob.contains(term)) {
            strong += 1;
        }
    }
    let denom = payload.links.len().min(15).max(1);
    let link_quality_signal = clamp01(strong as f64 / denom as f64);

    GeoSignals {
        geo_term_density,
        freshness_signal,
        structured_data_signal,
        link_quality_signal,
    }
}

/// Truncate to at most `max` bytes on a char boundary.
pub(crate) fn truncate_chars(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PageLink;

    fn geo_payload() -> PagePayload {
        PagePayload {
            title: Some("City-scale VPS and 3D reconstruction".to_string()),
            description: Some("Mapping pipeline for localization and AR".to_string()),
            main_content: Some(
                "This geospatial system uses VPS localization, pointcloud mesh fusion, and city mapping."
                    .to_string(),
            ),
            links: vec![PageLink {
                href: "https://x.com/vps".to_string(),
                text: "VPS docs".to_string(),
            }],
            article_date: Some("2026-01-10".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_geo_signals_detect_geospatial_text() {
        let signals = compute_geo_signals("https://example.com/research/vps", &geo_payload());
        assert!(signals.aggregate_score() > 0.35);
    }

    #[test]
    fn test_empty_payload_scores_low() {
        let signals = compute_geo_signals("https://example.com/", &PagePayload::default());
        assert_eq!(signals.freshness_signal, 0.0);
        assert_eq!(signals.structured_data_signal, 0.0);
        assert!(signals.aggregate_score() < 0.1);
    }

    #[test]
    fn test_aggregate_score_in_range() {
        let mut payload = geo_payload();
        payload.main_content = Some(GEO_TERMS.join(" ").repeat(50));
        payload.links = (0..40)
            .map(|i| PageLink {
                href: format!("https://example.com/lidar/{}", i),
                text: "lidar mapping".to_string(),
            })
            .collect();
        let signals = compute_geo_signals("https://example.com/gis", &payload);
        let score = signals.aggregate_score();
        assert!((0.0..=1.0).contains(&score));
        assert!(signals.geo_term_density <= 1.0);
        assert!(signals.link_quality_signal <= 1.0);
    }

    #[test]
    fn test_freshness_from_article_date() {
        let payload = PagePayload {
            article_date: Some("2019-03-01".to_string()),
            ..Default::default()
        };
        let signals = compute_geo_signals("https://example.com/", &payload);
        assert_eq!(signals.freshness_signal, 0.65);
    }

    #[test]
    fn test_freshness_raised_by_recent_year_token() {
        let payload = PagePayload {
            main_content: Some("Released in 2025 for urban robotics.".to_string()),
            ..Default::default()
        };
        let signals = compute_geo_signals("https://example.com/", &payload);
        assert_eq!(signals.freshness_signal, 0.8);
    }

    #[test]
    fn test_year_token_requires_word_boundary() {
        let payload = PagePayload {
            main_content: Some("part number X20250 is unrelated".to_string()),
            ..Default::default()
        };
        let signals = compute_geo_signals("https://example.com/", &payload);
        assert_eq!(signals.freshness_signal, 0.0);
    }

    #[test]
    fn test_structured_data_signal_levels() {
        let ld = PagePayload {
            main_content: Some(r#"<script type="application/ld+json">{}</script>"#.to_string()),
            ..Default::default()
        };
        assert_eq!(
            compute_geo_signals("https://e.com/", &ld).structured_data_signal,
            0.7
        );

        let latlon = PagePayload {
            main_content: Some("latitude: 37.77, longitude: -122.41".to_string()),
            ..Default::default()
        };
        assert_eq!(
            compute_geo_signals("https://e.com/", &latlon).structured_data_signal,
            0.6
        );
    }

    #[test]
    fn test_link_quality_fraction() {
        let payload = PagePayload {
            links: vec![
                PageLink {
                    href: "https://e.com/lidar".to_string(),
                    text: String::new(),
                },
                PageLink {
                    href: "https://e.com/about-us".to_string(),
                    text: "About".to_string(),
                },
            ],
            ..Default::default()
        };
        let signals = compute_geo_signals("https://e.com/", &payload);
        assert_eq!(signals.link_quality_signal, 0.5);
    }

    #[test]
    fn test_keyword_hits_empty_text() {
        assert_eq!(keyword_hits("", GEO_TERMS), 0.0);
    }

    #[test]
    fn test_truncate_chars_on_boundary() {
        let s = "héllo";
        // byte 2 falls inside the two-byte 'é'
        assert_eq!(truncate_chars(s, 2), "h");
        assert_eq!(truncate_chars(s, 64), s);
    }
}
