//! Adaptive frontier: canonicalization, geo-signal scoring, and expansion.

mod canonical;
mod expand;
mod signals;

pub use canonical::{canonicalize_url, host_affinity};
pub use expand::{extract_links, frontier_candidates, score_candidate, ExpansionInput, FrontierCandidate};
pub use signals::{compute_geo_signals, GeoSignals, GEO_TERMS, NOISE_TERMS};
