//! Configuration management for tikfeed.
//!
//! Configuration is read from `~/.config/tikfeed/config.toml` unless another
//! path is given on the command line. If the default file doesn't exist, a
//! default configuration with comments is created.

use crate::browser::BrowserConfig;
use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub feed: FeedConfig,
    pub paths: PathsConfig,
    pub scrape: ScrapeConfig,
    pub browser: BrowserConfig,
}

/// Fixed metadata written into every generated feed.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Public prefix the `rss/` and `thumbnails/` trees are served from.
    /// Must end with `/`.
    pub base_url: String,
    pub author_name: String,
    pub author_email: String,
    pub language: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: "https://raw.githubusercontent.com/conoro/tiktok-rss-flat/main/".to_string(),
            author_name: "Conor ONeill".to_string(),
            author_email: "conor@conoroneill.com".to_string(),
            language: "en".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// CSV file with one username per row (no header)
    pub subscriptions: PathBuf,
    /// Root directory holding `rss/` and `thumbnails/`
    pub output_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            subscriptions: PathBuf::from("subscriptions.csv"),
            output_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    /// Maximum number of videos fetched per user (default: 10)
    pub fetch_count: usize,
    /// Environment variable holding the fallback msToken
    pub ms_token_env: String,
    /// Page visited to mint a fresh msToken cookie
    pub token_url: String,
    /// Settle delay after a scraping session opens its page, in seconds (default: 3)
    pub sleep_after_secs: u64,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            fetch_count: 10,
            ms_token_env: "MS_TOKEN".to_string(),
            token_url: "https://www.tiktok.com".to_string(),
            sleep_after_secs: 3,
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// With an explicit path the file must exist. Without one the default
    /// path is used, and a commented default file is created if it is missing.
    /// Missing fields in the config file will use default values.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::MissingFile(p.to_path_buf()));
                }
                p.to_path_buf()
            }
            None => {
                let default_path = Self::default_config_path()?;
                if !default_path.exists() {
                    Self::create_default_config(&default_path)?;
                    return Ok(Self::default());
                }
                default_path
            }
        };

        let content = fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: config_path,
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/tikfeed/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("tikfeed").join("config.toml"))
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# tikfeed configuration

[feed]
# Public prefix the rss/ and thumbnails/ directories are served from.
# Must end with a slash.
base_url = "https://raw.githubusercontent.com/conoro/tiktok-rss-flat/main/"
author_name = "Conor ONeill"
author_email = "conor@conoroneill.com"
language = "en"

[paths]
# One TikTok username per line, no header
subscriptions = "subscriptions.csv"
# rss/<user>.xml and thumbnails/<user>/ are written below this directory
output_dir = "."

[scrape]
# Number of most recent videos per user
fetch_count = 10
# Environment variable consulted when a fresh msToken can't be generated
ms_token_env = "MS_TOKEN"
token_url = "https://www.tiktok.com"
# Seconds to wait after a scraping session opens
sleep_after_secs = 3

[browser]
# Run the browser without a visible window
headless = true
# Wait after page load for dynamic content (milliseconds)
wait_after_load_ms = 1000
# JPEG quality for thumbnail screenshots (0-100)
jpeg_quality = 20
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Config file not found: {0}")]
    MissingFile(PathBuf),

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
