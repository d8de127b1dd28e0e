use std::path::Path;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::ScreenshotParams;
use tracing::debug;

use crate::app::{Result, TikfeedError};
use crate::browser::{BrowserConfig, ChromeBrowser};
use crate::thumbnail::Capturer;

/// Screenshots a page in a dedicated headless browser per capture
pub struct ChromeCapturer {
    config: BrowserConfig,
}

impl ChromeCapturer {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Capturer for ChromeCapturer {
    async fn capture(&self, url: &str, dest: &Path, quality: u8) -> Result<()> {
        let browser = ChromeBrowser::launch(&self.config).await?;

        let result: Result<Vec<u8>> = async {
            let page = browser.open(url).await?;

            let params = ScreenshotParams::builder()
                .format(CaptureScreenshotFormat::Jpeg)
                .quality(i64::from(quality))
                .full_page(true)
                .build();

            page.screenshot(params)
                .await
                .map_err(|e| TikfeedError::Capture(format!("Screenshot of {} failed: {}", url, e)))
        }
        .await;

        if let Err(e) = browser.close().await {
            debug!("{}", e);
        }

        let bytes = result?;
        tokio::fs::write(dest, &bytes).await?;
        debug!("Wrote {} ({} bytes)", dest.display(), bytes.len());
        Ok(())
    }
}
