use std::path::PathBuf;

use crate::config::Config;
use crate::domain::Credential;
use crate::feed::{FeedTemplate, RSS_DIR};

/// Everything a run needs that doesn't change while it runs
#[derive(Debug, Clone)]
pub struct RunContext {
    pub credential: Credential,
    pub output_dir: PathBuf,
    pub fetch_count: usize,
    pub jpeg_quality: u8,
    pub template: FeedTemplate,
}

impl RunContext {
    pub fn new(config: &Config, credential: Credential) -> Self {
        Self {
            credential,
            output_dir: config.paths.output_dir.clone(),
            fetch_count: config.scrape.fetch_count,
            jpeg_quality: config.browser.jpeg_quality,
            template: FeedTemplate {
                base_url: config.feed.base_url.clone(),
                author_name: config.feed.author_name.clone(),
                author_email: config.feed.author_email.clone(),
                language: config.feed.language.clone(),
            },
        }
    }

    pub fn rss_dir(&self) -> PathBuf {
        self.output_dir.join(RSS_DIR)
    }
}
