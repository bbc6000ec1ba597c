//! Geoscout - distributed geospatial-AI crawl fleet.
//!
//! A pool of stateless workers claims URLs from a shared Postgres-backed
//! queue, loads each page in a headless browser, extracts structured content,
//! scores its geospatial relevance, and expands the crawl frontier with
//! discovered links prioritized by that relevance.

pub mod cli;
pub mod config;
pub mod extract;
pub mod frontier;
pub mod llm;
pub mod models;
pub mod repository;
pub mod scrapers;
pub mod services;
