//! Fault-tolerant crawl worker.
//!
//! Long-running loop: claim a batch, then for each row fetch, extract, score,
//! persist, expand the frontier, and complete or retry. Every stage failure
//! is local to its row; the loop itself never terminates on a single-row
//! error. Shutdown is cooperative and observed between rows.

mod types;

use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt};
use serde_json::json;
use tracing::{info, warn};

use crate::config::CrawlSettings;
use crate::extract::PageExtractor;
use crate::frontier::{compute_geo_signals, frontier_candidates, ExpansionInput};
use crate::models::{PagePayload, QueueUrl, WorkerMetricsSample};
use crate::repository::{ContentRepository, QueueRepository, RepositoryError};
use crate::scrapers::PageFetcher;

pub use types::{LatencySummary, LatencyWindow, ShutdownFlag, WorkerCounters};

const EXTRACTION_SCHEMA_NAME: &str = "spatial-default-v2";

/// Shorten a URL for log lines, staying on a char boundary.
fn truncate_url(url: &str, max: usize) -> &str {
    if url.len() <= max {
        return url;
    }
    let mut end = max;
    while end > 0 && !url.is_char_boundary(end) {
        end -= 1;
    }
    &url[..end]
}

/// One crawl worker: claims from the shared queue and processes pages.
pub struct CrawlWorker {
    settings: CrawlSettings,
    queue: QueueRepository,
    content: ContentRepository,
    fetcher: Arc<dyn PageFetcher>,
    extractor: Arc<dyn PageExtractor>,
}

impl CrawlWorker {
    pub fn new(
        settings: CrawlSettings,
        queue: QueueRepository,
        content: ContentRepository,
        fetcher: Arc<dyn PageFetcher>,
        extractor: Arc<dyn PageExtractor>,
    ) -> Self {
        Self {
            settings,
            queue,
            content,
            fetcher,
            extractor,
        }
    }

    /// Run the control loop until the shutdown flag is set.
    ///
    /// The final metrics flush happens on the way out; pool shutdown is the
    /// caller's responsibility.
    pub async fn run(&self, shutdown: ShutdownFlag) -> anyhow::Result<()> {
        info!(
            "Worker {} starting batch_size={} max_depth={} frontier_links={} min_geo={:.2} extractor={}",
            self.settings.worker_id,
            self.settings.batch_size,
            self.settings.frontier_max_depth,
            self.settings.frontier_max_links,
            self.settings.geo_score_threshold,
            self.extractor.name(),
        );

        let counters = WorkerCounters::new();
        let latencies = LatencyWindow::new();

        while !shutdown.is_set() {
            let rows = match self
                .queue
                .claim_pending_urls(&self.settings.worker_id, self.settings.batch_size)
                .await
            {
                Ok(rows) => rows,
                Err(e) => {
                    warn!("Claim failed: {}", e);
                    tokio::time::sleep(self.settings.poll_interval).await;
                    continue;
                }
            };

            if rows.is_empty() {
                self.maybe_flush_metrics(&counters, &latencies).await;
                tokio::time::sleep(self.settings.poll_interval).await;
                continue;
            }

            stream::iter(rows)
                .for_each_concurrent(self.settings.crawl_concurrency, |row| {
                    self.handle_row(row, &counters, &latencies, &shutdown)
                })
                .await;
        }

        if let Err(e) = self.flush_metrics(&counters, &latencies).await {
            warn!("Final metrics flush failed: {}", e);
        }

        info!(
            "Worker {} stopped processed={} failed={} frontier_enqueued={} frontier_new={}",
            self.settings.worker_id,
            counters.processed(),
            counters.failed(),
            counters.frontier_enqueued(),
            counters.frontier_new(),
        );
        Ok(())
    }

    async fn handle_row(
        &self,
        row: QueueUrl,
        counters: &WorkerCounters,
        latencies: &LatencyWindow,
        shutdown: &ShutdownFlag,
    ) {
        // Rows still queued behind the concurrency limit are skipped once
        // shutdown is requested; in-flight rows always drain.
        if shutdown.is_set() {
            return;
        }
        self.process_one(&row, counters, latencies).await;

        let processed = counters.processed();
        if processed > 0 && processed % self.settings.metrics_flush_every == 0 {
            if let Err(e) = self.flush_metrics(counters, latencies).await {
                warn!("Metrics flush failed: {}", e);
            } else {
                info!(
                    "Metrics flushed processed={} failed={} frontier_new={}",
                    processed,
                    counters.failed(),
                    counters.frontier_new(),
                );
            }
        }
    }

    /// Process one claimed row through the full pipeline.
    ///
    /// Each stage recovers locally into `mark_url_failed`; a frontier failure
    /// is logged and swallowed because the page itself succeeded.
    async fn process_one(&self, row: &QueueUrl, counters: &WorkerCounters, latencies: &LatencyWindow) {
        let start = Instant::now();

        let fetched = self.fetcher.fetch(&row.url).await;
        let html = match fetched.html {
            Some(html) => html,
            None => {
                counters.incr_failed();
                self.fail_row(row, "fetch failed or timeout").await;
                warn!("No HTML for {}", row.url);
                return;
            }
        };

        let page_id = match self
            .content
            .insert_raw_page(
                row.id,
                &row.url,
                Some(&html),
                fetched.status_code.map(i32::from),
                fetched.content_type.as_deref(),
            )
            .await
        {
            Ok(id) => id,
            Err(e) => {
                counters.incr_failed();
                self.fail_row(row, &format!("insert raw_page failed: {}", e)).await;
                warn!("Insert raw_page failed {}: {}", row.url, e);
                return;
            }
        };

        let (payload, confidence) = match self.extractor.extract(&html, &row.url).await {
            Ok(result) => result,
            Err(e) => {
                counters.incr_failed();
                self.fail_row(row, &format!("dom analysis failed: {}", e)).await;
                warn!("Extraction failed {}: {}", row.url, e);
                return;
            }
        };

        let signals = compute_geo_signals(&row.url, &payload);
        let page_geo_score = signals.aggregate_score();

        let payload_json = match serde_json::to_value(&payload) {
            Ok(value) => value,
            Err(e) => {
                counters.incr_failed();
                self.fail_row(row, &format!("payload serialization failed: {}", e)).await;
                return;
            }
        };
        let signals_json = json!({
            "geo_term_density": signals.geo_term_density,
            "freshness_signal": signals.freshness_signal,
            "structured_data_signal": signals.structured_data_signal,
            "link_quality_signal": signals.link_quality_signal,
        });

        if let Err(e) = self
            .content
            .insert_extraction(
                row.id,
                page_id,
                EXTRACTION_SCHEMA_NAME,
                &payload_json,
                confidence,
                page_geo_score,
                &signals_json,
            )
            .await
        {
            counters.incr_failed();
            self.fail_row(row, &format!("insert extraction failed: {}", e)).await;
            warn!("Insert extraction failed {}: {}", row.url, e);
            return;
        }

        let frontier_count = match self
            .expand_frontier(row, &payload, &html, page_geo_score, counters)
            .await
        {
            Ok(count) => count,
            Err(e) => {
                warn!("Frontier enqueue failed for {}: {}", row.url, e);
                0
            }
        };

        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        if let Err(e) = self.queue.mark_url_done(row.id).await {
            warn!("Mark done failed {}: {}", row.url, e);
            return;
        }
        counters.incr_processed();
        latencies.record(elapsed_ms);

        info!(
            "Done {} (url_id={} depth={} geo={:.3} frontier={} latency={:.1}ms)",
            truncate_url(&row.url, 120),
            row.id,
            row.depth,
            page_geo_score,
            frontier_count,
            elapsed_ms,
        );
    }

    /// Push a row back through the retry state machine.
    async fn fail_row(&self, row: &QueueUrl, error: &str) {
        if let Err(e) = self.queue.mark_url_failed(row.id, error).await {
            warn!("Mark failed errored for {}: {}", row.url, e);
        }
    }

    /// Score, gate, and enqueue this page's frontier candidates.
    async fn expand_frontier(
        &self,
        row: &QueueUrl,
        payload: &PagePayload,
        html: &str,
        page_geo_score: f64,
        counters: &WorkerCounters,
    ) -> Result<usize, RepositoryError> {
        let input = ExpansionInput {
            parent_url: &row.url,
            payload,
            html,
            current_depth: row.depth,
            max_depth: self.settings.frontier_max_depth,
            max_links: self.settings.frontier_max_links,
            page_geo_score,
        };
        let candidates = frontier_candidates(&input);

        let mut enqueued = 0usize;
        for cand in candidates {
            if cand.geo_score < self.settings.geo_score_threshold {
                continue;
            }
            let inserted = self
                .queue
                .upsert_discovered_url(
                    row.id,
                    &cand.url,
                    cand.priority,
                    cand.geo_score,
                    &format!("frontier:{}", cand.reason),
                    row.depth + 1,
                )
                .await?;
            counters.incr_frontier_enqueued();
            if inserted {
                counters.incr_frontier_new();
            }
            enqueued += 1;
        }
        Ok(enqueued)
    }

    async fn maybe_flush_metrics(&self, counters: &WorkerCounters, latencies: &LatencyWindow) {
        let processed = counters.processed();
        if processed > 0 && processed % self.settings.metrics_flush_every == 0 {
            if let Err(e) = self.flush_metrics(counters, latencies).await {
                warn!("Metrics flush failed: {}", e);
            }
        }
    }

    async fn flush_metrics(
        &self,
        counters: &WorkerCounters,
        latencies: &LatencyWindow,
    ) -> Result<(), RepositoryError> {
        let summary = latencies.summary();
        let queue_depth = self.queue.queue_depth(&["pending", "in_progress"]).await?;
        self.queue
            .record_worker_metrics(&WorkerMetricsSample {
                worker_id: self.settings.worker_id.clone(),
                processed_count: counters.processed() as i64,
                failed_count: counters.failed() as i64,
                frontier_enqueued: counters.frontier_enqueued() as i64,
                avg_latency_ms: summary.avg_ms,
                p95_latency_ms: summary.p95_ms,
                queue_depth,
            })
            .await
    }
}
