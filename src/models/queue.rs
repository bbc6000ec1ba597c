//! Queue row and metrics models.

use chrono::{DateTime, Utc};

/// Lifecycle state of a queued URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlStatus {
    /// Waiting to be claimed by a worker.
    Pending,
    /// Claimed by exactly one worker.
    InProgress,
    /// Processed successfully.
    Done,
    /// Retries exhausted.
    Failed,
}

impl UrlStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UrlStatus::Pending => "pending",
            UrlStatus::InProgress => "in_progress",
            UrlStatus::Done => "done",
            UrlStatus::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(UrlStatus::Pending),
            "in_progress" => Some(UrlStatus::InProgress),
            "done" => Some(UrlStatus::Done),
            "failed" => Some(UrlStatus::Failed),
            _ => None,
        }
    }
}

/// A unit of work in the shared URL queue.
///
/// `parent_url_id` is a back-reference to the row that discovered this URL;
/// it is a relation, not ownership, and nothing cascades through it.
#[derive(Debug, Clone)]
pub struct QueueUrl {
    pub id: i64,
    pub url: String,
    pub status: UrlStatus,
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

/// One periodic sample of a worker's counters and latency summary.
#[derive(Debug, Clone)]
pub struct WorkerMetricsSample {
    pub worker_id: String,
    pub processed_count: i64,
    pub failed_count: i64,
    pub frontier_enqueued: i64,
    pub avg_latency_ms: f64,
    pub p95_latency_ms: f64,
    pub queue_depth: i64,
}
