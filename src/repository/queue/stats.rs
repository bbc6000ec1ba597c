//! Observational sinks: queue depth and worker metrics.

use sqlx::Row;

use crate::models::WorkerMetricsSample;

use super::QueueRepository;
use crate::repository::Result;

impl QueueRepository {
    /// Count queue rows in any of the given statuses.
    pub async fn queue_depth(&self, statuses: &[&str]) -> Result<i64> {
        let statuses: Vec<String> = statuses.iter().map(|s| s.to_string()).collect();
        let row = sqlx::query(
            "SELECT COUNT(*) AS depth FROM url_queue WHERE status = ANY($1)",
        )
        .bind(&statuses)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.get::<i64, _>("depth"))
    }

    /// Store one periodic worker sample.
    pub async fn record_worker_metrics(&self, sample: &WorkerMetricsSample) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO worker_metrics (
                worker_id, processed_count, failed_count, frontier_enqueued,
                avg_latency_ms, p95_latency_ms, queue_depth
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&sample.worker_id)
        .bind(sample.processed_count)
        .bind(sample.failed_count)
        .bind(sample.frontier_enqueued)
        .bind(sample.avg_latency_ms)
        .bind(sample.p95_latency_ms)
        .bind(sample.queue_depth)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Per-status row counts for the status report.
    pub async fn status_breakdown(&self) -> Result<Vec<(String, i64)>> {
        let rows = sqlx::query(
            "SELECT status, COUNT(*) AS count FROM url_queue GROUP BY status ORDER BY status",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| (r.get::<String, _>("status"), r.get::<i64, _>("count")))
            .collect())
    }
}
