//! Claiming, completion, and retry transitions.

use sqlx::query_as;

use crate::models::QueueUrl;

use super::{QueueRepository, UrlQueueRow};
use crate::repository::{truncate_error, Result};

const MAX_ERROR_CHARS: usize = 4096;

impl QueueRepository {
    /// Atomically claim up to `batch_size` pending URLs for this worker.
    ///
    /// Rows are taken in `(priority DESC, id ASC)` order under
    /// `FOR UPDATE SKIP LOCKED`, so concurrent claims neither block nor hand
    /// the same row to two workers. In-progress rows whose claim is older
    /// than the lease are treated as abandoned and handed out again without
    /// touching their retry counter.
    pub async fn claim_pending_urls(
        &self,
        worker_id: &str,
        batch_size: u32,
    ) -> Result<Vec<QueueUrl>> {
        let rows = query_as::<_, UrlQueueRow>(
            r#"
            WITH claimable AS (
                SELECT id FROM url_queue
                WHERE status = 'pending'
                   OR (status = 'in_progress'
                       AND claimed_at < now() - make_interval(secs => $3))
                ORDER BY priority DESC, id ASC
                LIMIT $2
                FOR UPDATE SKIP LOCKED
            ),
            claimed AS (
                UPDATE url_queue q
                SET status = 'in_progress',
                    claimed_by = $1,
                    claimed_at = now(),
                    updated_at = now()
                FROM claimable
                WHERE q.id = claimable.id
                RETURNING q.*
            )
            SELECT * FROM claimed ORDER BY priority DESC, id ASC
            "#,
        )
        .bind(worker_id)
        .bind(batch_size as i64)
        .bind(self.claim_lease_secs as f64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(QueueUrl::from).collect())
    }

    /// Mark a claimed URL as processed.
    pub async fn mark_url_done(&self, url_id: i64) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE url_queue
            SET status = 'done',
                claimed_at = NULL,
                claimed_by = NULL,
                processed_at = now(),
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(url_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Record a failure for a claimed URL.
    ///
    /// Goes back to `pending` while retries remain, otherwise to `failed`.
    pub async fn mark_url_failed(&self, url_id: i64, error: &str) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE url_queue
            SET status = CASE
                    WHEN retries + 1 >= max_retries THEN 'failed'
                    ELSE 'pending'
                END,
                retries = retries + 1,
                claimed_at = NULL,
                claimed_by = NULL,
                error = $2,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(url_id)
        .bind(truncate_error(error, MAX_ERROR_CHARS))
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
