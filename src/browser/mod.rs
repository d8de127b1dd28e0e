//! Headless Chrome plumbing shared by every browser-backed collaborator.
//!
//! Each [`ChromeBrowser`] owns one Chrome process and the task driving its
//! CDP event handler. Callers launch, use and [`close`](ChromeBrowser::close)
//! it within a single operation; nothing keeps a browser alive across users.

mod config;

pub use config::BrowserConfig;

use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;

use crate::app::{Result, TikfeedError};

/// A launched Chrome instance
pub struct ChromeBrowser {
    browser: Browser,
    handler: JoinHandle<()>,
    config: BrowserConfig,
}

impl ChromeBrowser {
    /// Launch a new browser with the given configuration
    pub async fn launch(config: &BrowserConfig) -> Result<Self> {
        let mut builder = ChromeConfig::builder()
            .arg("--no-sandbox")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-software-rasterizer");

        if !config.headless {
            builder = builder.with_head();
        }

        let browser_config = builder
            .build()
            .map_err(|e| TikfeedError::Browser(format!("Failed to build browser config: {}", e)))?;

        let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
            TikfeedError::Browser(format!(
                "Failed to launch browser: {}. Is Chrome or Chromium installed and in PATH?",
                e
            ))
        })?;

        let handler = tokio::spawn(async move {
            while let Some(_event) = handler.next().await {
                // Drive the CDP connection
            }
        });

        Ok(Self {
            browser,
            handler,
            config: config.clone(),
        })
    }

    /// Open a page at `url` and wait for the navigation to finish
    pub async fn open(&self, url: &str) -> Result<Page> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| TikfeedError::Browser(format!("Failed to create page: {}", e)))?;

        if let Some(ref ua) = self.config.user_agent {
            page.set_user_agent(ua)
                .await
                .map_err(|e| TikfeedError::Browser(format!("Failed to set user agent: {}", e)))?;
        }

        page.goto(url)
            .await
            .map_err(|e| TikfeedError::Browser(format!("Navigation to {} failed: {}", url, e)))?;

        page.wait_for_navigation()
            .await
            .map_err(|e| TikfeedError::Browser(format!("Navigation to {} failed: {}", url, e)))?;

        Ok(page)
    }

    /// Pause for dynamic content after a page load
    pub async fn settle(&self) {
        tokio::time::sleep(self.config.wait_after_load()).await;
    }

    /// Close the browser and stop its event handler
    pub async fn close(mut self) -> Result<()> {
        let closed = self
            .browser
            .close()
            .await
            .map_err(|e| TikfeedError::Browser(format!("Failed to close browser: {}", e)));

        if let Err(e) = self.browser.wait().await {
            tracing::debug!("Waiting for browser exit failed: {}", e);
        }
        self.handler.abort();

        closed.map(|_| ())
    }
}
