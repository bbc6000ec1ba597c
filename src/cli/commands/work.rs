//! Worker command: wires collaborators and runs the control loop.

use std::sync::Arc;

use tracing::info;

use crate::config::CrawlSettings;
use crate::extract::extractor_from_env;
use crate::repository::{connect_pool, ContentRepository, QueueRepository};
use crate::scrapers::{BrowserEngineConfig, BrowserFetcher};
use crate::services::worker::{CrawlWorker, ShutdownFlag};

/// Run a crawl worker until SIGINT/SIGTERM.
pub async fn cmd_work(settings: CrawlSettings) -> anyhow::Result<()> {
    let pool = connect_pool(&settings.database_url).await?;
    let queue = QueueRepository::with_claim_lease(pool.clone(), settings.claim_lease_secs);
    queue.ensure_schema().await?;
    let content = ContentRepository::new(pool.clone());

    let fetcher = Arc::new(BrowserFetcher::new(BrowserEngineConfig::default()));
    let extractor = extractor_from_env()?;

    let shutdown = ShutdownFlag::new();
    install_signal_handlers(shutdown.clone());

    let worker = CrawlWorker::new(
        settings,
        queue,
        content,
        fetcher.clone(),
        extractor,
    );
    let result = worker.run(shutdown).await;

    // Release browser and pool on every exit path.
    fetcher.shutdown().await;
    pool.close().await;
    info!("Connection pool closed");

    result
}

/// Set the shutdown flag on SIGINT or SIGTERM; the loop drains in-flight
/// rows and exits between rows.
fn install_signal_handlers(shutdown: ShutdownFlag) {
    let on_interrupt = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, finishing current rows");
            on_interrupt.trigger();
        }
    });

    #[cfg(not(unix))]
    let _ = shutdown;

    #[cfg(unix)]
    {
        let on_terminate = shutdown;
        tokio::spawn(async move {
            use tokio::signal::unix::{signal, SignalKind};
            if let Ok(mut stream) = signal(SignalKind::terminate()) {
                if stream.recv().await.is_some() {
                    info!("Termination requested, finishing current rows");
                    on_terminate.trigger();
                }
            }
        });
    }
}
