//! Prompt templates for DOM extraction.

pub const SYSTEM_PROMPT: &str = "\
You are an expert at analyzing web page DOM structure to extract content accurately.
Given a simplified DOM (tags with id/class/role/data attributes), infer the best way to describe the page content.
Output valid JSON only, with these keys:
- title: page title or main heading
- main_content: the primary readable body text (concise, no HTML)
- links: list of {href, text} for important links (limit 50)
- description: meta description or short summary if evident
- article_date: publication date in ISO format if present, else null
- author: author if present, else null
- geo_entities: list of named places, regions, or landmarks mentioned
- location_hints: list of coordinate-like or address-like strings
- vps_relevance: 0-1 relevance to visual positioning systems
- reconstruction_relevance: 0-1 relevance to 3D reconstruction
- recency_signal: 0-1 estimate of how recent the content is
Aim for high extraction accuracy; if a field cannot be determined, use null.";

pub const USER_PROMPT_TEMPLATE: &str = "\
Analyze this DOM structure and extract content as JSON.

DOM (simplified):
{dom_summary}

URL: {url}

Return only valid JSON.";
