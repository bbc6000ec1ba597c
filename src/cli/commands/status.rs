//! Queue status report.

use console::style;

use crate::config::CrawlSettings;
use crate::repository::{connect_pool, QueueRepository};

/// Print per-status queue depth.
pub async fn cmd_status(settings: &CrawlSettings) -> anyhow::Result<()> {
    let pool = connect_pool(&settings.database_url).await?;
    let queue = QueueRepository::new(pool.clone());
    queue.ensure_schema().await?;

    let breakdown = queue.status_breakdown().await?;

    if breakdown.is_empty() {
        println!(
            "{} Queue is empty. Seed it with 'geoscout enqueue <url>'.",
            style("!").yellow()
        );
        pool.close().await;
        return Ok(());
    }

    println!("\n{}", style("Crawl Queue").bold());
    println!("{}", "-".repeat(30));
    let mut total = 0i64;
    for (status, count) in &breakdown {
        println!("{:<15} {:>10}", status, count);
        total += count;
    }
    println!("{}", "-".repeat(30));
    println!("{:<15} {:>10}", "total", total);

    pool.close().await;
    Ok(())
}
