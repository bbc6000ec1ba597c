//! Repository layer for Postgres persistence.

mod content;
pub mod queue;

pub use content::ContentRepository;
pub use queue::QueueRepository;

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Open the process-wide connection pool.
///
/// Called once at startup; every repository borrows the pool and the caller
/// closes it on shutdown. Acquisition is bounded so a wedged database surfaces
/// as an error rather than a hang.
pub async fn connect_pool(database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .min_connections(2)
        .max_connections(20)
        .acquire_timeout(Duration::from_secs(60))
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Truncate an error message to at most `max` bytes on a char boundary.
pub(crate) fn truncate_error(error: &str, max: usize) -> &str {
    if error.len() <= max {
        return error;
    }
    let mut end = max;
    while end > 0 && !error.is_char_boundary(end) {
        end -= 1;
    }
    &error[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_error_short_passthrough() {
        assert_eq!(truncate_error("boom", 4096), "boom");
    }

    #[test]
    fn test_truncate_error_respects_char_boundary() {
        let msg = "é".repeat(3000); // 6000 bytes
        let truncated = truncate_error(&msg, 4096);
        assert!(truncated.len() <= 4096);
        assert!(truncated.chars().all(|c| c == 'é'));
    }
}
