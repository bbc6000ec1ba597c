//! Seed and frontier inserts.

use sqlx::Row;

use super::QueueRepository;
use crate::repository::Result;

impl QueueRepository {
    /// Add a URL to the queue if not already present; returns true on insert.
    pub async fn enqueue_url(
        &self,
        url: &str,
        priority: i32,
        geo_score: f64,
        source: &str,
        depth: i32,
    ) -> Result<bool> {
        let row = sqlx::query(
            r#"
            INSERT INTO url_queue (url, priority, geo_score, source, depth)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (url) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(url)
        .bind(priority)
        .bind(geo_score.clamp(0.0, 1.0))
        .bind(source)
        .bind(depth.max(0))
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.is_some())
    }

    /// Insert a frontier-discovered URL; returns true when a new row was
    /// created.
    ///
    /// On conflict with an existing pending row, priority and geo_score are
    /// raised to the maximum of old and new (never decreased) and the
    /// original parent is kept. Rows already done or failed are left alone.
    pub async fn upsert_discovered_url(
        &self,
        parent_url_id: i64,
        url: &str,
        priority: i32,
        geo_score: f64,
        source: &str,
        depth: i32,
    ) -> Result<bool> {
        let row = sqlx::query(
            r#"
            INSERT INTO url_queue (url, priority, geo_score, source, depth, parent_url_id)
            VALUES ($2, $3, $4, $5, $6, $1)
            ON CONFLICT (url) DO UPDATE SET
                priority = GREATEST(url_queue.priority, EXCLUDED.priority),
                geo_score = GREATEST(url_queue.geo_score, EXCLUDED.geo_score),
                updated_at = now()
            WHERE url_queue.status = 'pending'
            RETURNING (xmax = 0) AS inserted
            "#,
        )
        .bind(parent_url_id)
        .bind(url)
        .bind(priority)
        .bind(geo_score.clamp(0.0, 1.0))
        .bind(source)
        .bind(depth.max(0))
        .fetch_optional(&self.pool)
        .await?;

        // No row comes back when the conflict hit a done/failed row.
        Ok(row.map(|r| r.get::<bool, _>("inserted")).unwrap_or(false))
    }
}
