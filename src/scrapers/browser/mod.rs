//! Headless-browser page loader.
//!
//! Uses chromiumoxide (CDP) with a shared browser instance and one page per
//! fetch. Page contexts are released on every exit path so a failed load
//! never leaks a tab.

mod config;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub use config::BrowserEngineConfig;

use super::fetcher::{FetchedPage, PageFetcher};

/// JavaScript to wait for page ready state.
const WAIT_FOR_READY_SCRIPT: &str = r#"
    new Promise((resolve) => {
        if (document.readyState === 'complete' || document.readyState === 'interactive') {
            resolve(document.readyState);
        } else {
            document.addEventListener('DOMContentLoaded', () => resolve(document.readyState));
            setTimeout(() => resolve('timeout'), 10000);
        }
    })
"#;

/// Browser-based page fetcher with a lazily launched shared browser.
pub struct BrowserFetcher {
    config: BrowserEngineConfig,
    browser: Mutex<Option<Browser>>,
}

impl BrowserFetcher {
    /// Common Chrome executable paths to check.
    const CHROME_PATHS: &'static [&'static str] = &[
        // Linux
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/snap/bin/chromium",
        // macOS
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
        // Common install locations
        "/opt/google/chrome/google-chrome",
    ];

    /// Create a new browser fetcher; the browser launches on first use.
    pub fn new(config: BrowserEngineConfig) -> Self {
        Self {
            config,
            browser: Mutex::new(None),
        }
    }

    /// Find a Chrome executable.
    fn find_chrome() -> Result<PathBuf> {
        for path in Self::CHROME_PATHS {
            let p = std::path::Path::new(path);
            if p.exists() {
                info!("Found Chrome at: {}", path);
                return Ok(p.to_path_buf());
            }
        }

        for cmd in &[
            "google-chrome",
            "google-chrome-stable",
            "chromium",
            "chromium-browser",
        ] {
            if let Ok(output) = std::process::Command::new("which").arg(cmd).output() {
                if output.status.success() {
                    let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                    if !path.is_empty() {
                        info!("Found Chrome in PATH: {}", path);
                        return Ok(PathBuf::from(path));
                    }
                }
            }
        }

        Err(anyhow::anyhow!(
            "Chrome/Chromium not found. Please install it:\n\
             - Arch/Manjaro: sudo pacman -S chromium\n\
             - Ubuntu/Debian: sudo apt install chromium-browser\n\
             - Fedora: sudo dnf install chromium\n\
             - Or download from: https://www.google.com/chrome/"
        ))
    }

    /// Launch the browser if not already running.
    async fn ensure_browser(&self) -> Result<()> {
        let mut guard = self.browser.lock().await;
        if guard.is_some() {
            return Ok(());
        }

        info!("Launching browser (headless={})", self.config.headless);

        let chrome_path = Self::find_chrome()?;

        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .window_size(1280, 720);

        // with_head means NOT headless, confusingly
        if !self.config.headless {
            builder = builder.with_head();
        }

        builder = builder
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-background-networking")
            .arg("--disable-sync")
            .arg("--no-sandbox") // Often needed for headless in containers/restricted environments
            .arg("--disable-gpu")
            .arg("--disable-software-rasterizer");

        for arg in &self.config.chrome_args {
            builder = builder.arg(arg.clone());
        }

        let config = builder
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build browser config: {}", e))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("Failed to launch browser")?;

        // Spawn handler task
        tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        *guard = Some(browser);
        Ok(())
    }

    /// Close the shared browser, if running.
    pub async fn shutdown(&self) {
        let mut guard = self.browser.lock().await;
        if let Some(mut browser) = guard.take() {
            let _ = browser.close().await;
            let _ = browser.wait().await;
        }
    }

    async fn load_page(&self, url: &str) -> Result<String> {
        self.ensure_browser().await?;

        let page = {
            let guard = self.browser.lock().await;
            let browser = guard
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("browser not initialized after ensure_browser"))?;
            browser.new_page("about:blank").await?
        };

        // Inner function so the page is always closed
        let result = self.load_page_inner(&page, url).await;
        let _ = page.close().await;
        result
    }

    async fn load_page_inner(&self, page: &Page, url: &str) -> Result<String> {
        page.execute(SetUserAgentOverrideParams::new(
            self.config.user_agent.clone(),
        ))
        .await?;

        self.navigate_to_url(page, url).await?;
        self.wait_for_page_ready(page).await;

        let content = page.content().await?;
        Ok(content)
    }

    /// Navigate to a URL with timeout handling.
    async fn navigate_to_url(&self, page: &Page, url: &str) -> Result<()> {
        debug!("Navigating to {}", url);
        let nav_params = NavigateParams::builder()
            .url(url)
            .build()
            .map_err(|e| anyhow::anyhow!("Invalid URL: {}", e))?;

        let nav_timeout = Duration::from_secs(self.config.timeout_secs);
        tokio::time::timeout(nav_timeout, page.execute(nav_params))
            .await
            .map_err(|_| {
                anyhow::anyhow!(
                    "Navigation timed out after {}s for {}",
                    self.config.timeout_secs,
                    url
                )
            })?
            .map_err(|e| anyhow::anyhow!("Navigation failed for {}: {}", url, e))?;

        Ok(())
    }

    /// Wait for the page to reach a ready state.
    async fn wait_for_page_ready(&self, page: &Page) {
        let ready_timeout = Duration::from_secs(self.config.timeout_secs);
        match tokio::time::timeout(
            ready_timeout,
            page.evaluate(WAIT_FOR_READY_SCRIPT.to_string()),
        )
        .await
        {
            Ok(Ok(result)) => {
                let state: String = result
                    .into_value()
                    .unwrap_or_else(|_| "unknown".to_string());
                debug!("Page ready state: {}", state);
            }
            Ok(Err(e)) => {
                debug!("Could not check ready state (possibly non-HTML page): {}", e);
            }
            Err(_) => {
                warn!("Timeout waiting for page ready state");
            }
        }
    }
}

#[async_trait]
impl PageFetcher for BrowserFetcher {
    async fn fetch(&self, url: &str) -> FetchedPage {
        match self.load_page(url).await {
            Ok(html) => FetchedPage {
                html: Some(html),
                status_code: Some(200),
                content_type: Some("text/html".to_string()),
            },
            Err(e) => {
                warn!("Browser fetch failed for {}: {}", url, e);
                FetchedPage::failed(None)
            }
        }
    }
}
