use serde::Deserialize;
use std::time::Duration;

/// Configuration for the headless browser shared by token minting,
/// scraping sessions and thumbnail capture
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Whether to run the browser in headless mode (default: true)
    pub headless: bool,

    /// Wait time after page load for dynamic content in milliseconds (default: 1000)
    pub wait_after_load_ms: u64,

    /// JPEG quality for thumbnail screenshots, 0-100 (default: 20)
    pub jpeg_quality: u8,

    /// User agent string to use
    pub user_agent: Option<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            wait_after_load_ms: 1000,
            jpeg_quality: 20,
            user_agent: Some(
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                    .to_string(),
            ),
        }
    }
}

impl BrowserConfig {
    /// Get the wait time after load as a Duration
    pub fn wait_after_load(&self) -> Duration {
        Duration::from_millis(self.wait_after_load_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = BrowserConfig::default();
        assert!(config.headless);
        assert_eq!(config.wait_after_load_ms, 1000);
        assert_eq!(config.jpeg_quality, 20);
        assert!(config.user_agent.is_some());
    }

    #[test]
    fn test_wait_after_load_duration() {
        let config = BrowserConfig {
            wait_after_load_ms: 250,
            ..Default::default()
        };
        assert_eq!(config.wait_after_load(), Duration::from_millis(250));
    }
}
