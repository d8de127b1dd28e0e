use async_trait::async_trait;
use tracing::debug;

use crate::app::{Result, TikfeedError};
use crate::browser::{BrowserConfig, ChromeBrowser};
use crate::token::TokenSource;

const TOKEN_COOKIE: &str = "msToken";

/// Mints an msToken by loading the site in a throwaway browser and
/// reading the cookie it sets
pub struct ChromeTokenSource {
    config: BrowserConfig,
    url: String,
}

impl ChromeTokenSource {
    pub fn new(config: BrowserConfig, url: impl Into<String>) -> Self {
        Self {
            config,
            url: url.into(),
        }
    }
}

#[async_trait]
impl TokenSource for ChromeTokenSource {
    async fn generate(&self) -> Result<Option<String>> {
        let browser = ChromeBrowser::launch(&self.config).await?;

        let result: Result<Option<String>> = async {
            let page = browser.open(&self.url).await?;
            browser.settle().await;

            let cookies = page
                .get_cookies()
                .await
                .map_err(|e| TikfeedError::Token(format!("Failed to read cookies: {}", e)))?;
            debug!("{} cookies after visiting {}", cookies.len(), self.url);

            Ok(cookies
                .into_iter()
                .find(|c| c.name == TOKEN_COOKIE)
                .map(|c| c.value))
        }
        .await;

        if let Err(e) = browser.close().await {
            debug!("{}", e);
        }

        result
    }
}
