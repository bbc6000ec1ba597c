//! Seed enqueue command.

use crate::config::CrawlSettings;
use crate::frontier::canonicalize_url;
use crate::repository::{connect_pool, QueueRepository};

/// Enqueue seed URLs with the given priority.
///
/// Prints a `+` line for each inserted URL, `(skip)` for ones already queued
/// or rejected by canonicalization, and a final summary.
pub async fn cmd_enqueue(
    settings: &CrawlSettings,
    urls: &[String],
    priority: i32,
) -> anyhow::Result<()> {
    let pool = connect_pool(&settings.database_url).await?;
    let queue = QueueRepository::new(pool.clone());
    queue.ensure_schema().await?;

    let mut inserted = 0usize;
    for url in urls {
        let canonical = match canonicalize_url(url) {
            Some(c) => c,
            None => {
                println!("  (skip) {}", url.trim());
                continue;
            }
        };
        let ok = queue
            .enqueue_url(&canonical, priority, 0.0, "seed", 0)
            .await?;
        if ok {
            inserted += 1;
            println!("  + {}", canonical);
        } else {
            println!("  (skip) {}", canonical);
        }
    }

    println!("Inserted {}/{} seed URLs", inserted, urls.len());

    pool.close().await;
    Ok(())
}
