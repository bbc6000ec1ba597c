//! Shared URL queue: claim/retry/completion state machine over Postgres.

mod claim;
mod enqueue;
mod stats;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::{QueueUrl, UrlStatus};

use super::Result;

/// Default lease after which an in_progress claim is considered abandoned.
pub const DEFAULT_CLAIM_LEASE_SECS: u64 = 300;

/// Postgres-backed repository for the URL queue.
#[derive(Clone)]
pub struct QueueRepository {
    pub(crate) pool: PgPool,
    pub(crate) claim_lease_secs: u64,
}

impl QueueRepository {
    /// Create a queue repository with the default claim lease.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            claim_lease_secs: DEFAULT_CLAIM_LEASE_SECS,
        }
    }

    /// Create a queue repository with a custom claim lease.
    ///
    /// The lease determines how long a crashed worker's rows stay stranded
    /// before `claim` hands them out again.
    pub fn with_claim_lease(pool: PgPool, lease_secs: u64) -> Self {
        Self {
            pool,
            claim_lease_secs: lease_secs,
        }
    }

    /// Create all queue tables and indexes if they do not exist.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::raw_sql(
            r#"
            -- Shared crawl frontier
            CREATE TABLE IF NOT EXISTS url_queue (
                id BIGSERIAL PRIMARY KEY,
                url TEXT NOT NULL UNIQUE,
                status TEXT NOT NULL DEFAULT 'pending',

                -- Scheduling
                priority INTEGER NOT NULL DEFAULT 0,
                geo_score DOUBLE PRECISION NOT NULL DEFAULT 0,
                source TEXT NOT NULL DEFAULT 'seed',
                depth INTEGER NOT NULL DEFAULT 0,
                parent_url_id BIGINT,

                -- Retry tracking
                retries INTEGER NOT NULL DEFAULT 0,
                max_retries INTEGER NOT NULL DEFAULT 3,

                -- Claim bookkeeping
                claimed_at TIMESTAMPTZ,
                claimed_by TEXT,
                processed_at TIMESTAMPTZ,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                error TEXT
            );

            -- Fetched markup, one row per URL, overwritten on refetch
            CREATE TABLE IF NOT EXISTS raw_pages (
                id BIGSERIAL PRIMARY KEY,
                url_id BIGINT NOT NULL UNIQUE,
                url TEXT NOT NULL,
                html TEXT,
                status_code INTEGER,
                content_type TEXT,
                fetched_at TIMESTAMPTZ NOT NULL DEFAULT now()
            );

            -- Structured extraction, one row per URL, overwritten on re-extract
            CREATE TABLE IF NOT EXISTS extractions (
                id BIGSERIAL PRIMARY KEY,
                url_id BIGINT NOT NULL UNIQUE,
                page_id BIGINT,
                schema_name TEXT,
                payload JSONB,
                confidence DOUBLE PRECISION,
                geo_score DOUBLE PRECISION,
                signals JSONB,
                extracted_at TIMESTAMPTZ NOT NULL DEFAULT now()
            );

            -- Periodic worker samples
            CREATE TABLE IF NOT EXISTS worker_metrics (
                id BIGSERIAL PRIMARY KEY,
                worker_id TEXT NOT NULL,
                processed_count BIGINT NOT NULL,
                failed_count BIGINT NOT NULL,
                frontier_enqueued BIGINT NOT NULL,
                avg_latency_ms DOUBLE PRECISION NOT NULL,
                p95_latency_ms DOUBLE PRECISION NOT NULL,
                queue_depth BIGINT NOT NULL,
                recorded_at TIMESTAMPTZ NOT NULL DEFAULT now()
            );

            CREATE INDEX IF NOT EXISTS idx_url_queue_pending
                ON url_queue (priority DESC, id ASC) WHERE status = 'pending';
            CREATE INDEX IF NOT EXISTS idx_url_queue_claimed
                ON url_queue (claimed_at) WHERE status = 'in_progress';
            CREATE INDEX IF NOT EXISTS idx_url_queue_parent
                ON url_queue (parent_url_id);
            CREATE INDEX IF NOT EXISTS idx_worker_metrics_worker
                ON worker_metrics (worker_id, recorded_at);
        "#,
        )
        .execute(&self.pool)
        .await
        .map_err(super::RepositoryError::from)?;
        Ok(())
    }
}

/// Row type for URL queue query mapping.
#[derive(sqlx::FromRow)]
pub(crate) struct UrlQueueRow {
    pub id: i64,
    pub url: String,
    pub status: String,
    pub priority: i32,
    pub geo_score: f64,
    pub source: String,
    pub depth: i32,
    pub parent_url_id: Option<i64>,
    pub retries: i32,
    pub max_retries: i32,
    pub claimed_at: Option<DateTime<Utc>>,
    pub claimed_by: Option<String>,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub error: Option<String>,
}

impl From<UrlQueueRow> for QueueUrl {
    fn from(row: UrlQueueRow) -> Self {
        QueueUrl {
            id: row.id,
            url: row.url,
            status: UrlStatus::from_str(&row.status).unwrap_or(UrlStatus::Pending),
            priority: row.priority,
            geo_score: row.geo_score,
            source: row.source,
            depth: row.depth,
            parent_url_id: row.parent_url_id,
            retries: row.retries,
            max_retries: row.max_retries,
            claimed_at: row.claimed_at,
            claimed_by: row.claimed_by,
            processed_at: row.processed_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
            error: row.error,
        }
    }
}
