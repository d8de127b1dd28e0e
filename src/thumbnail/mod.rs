//! Thumbnail screenshots of video covers, cached on disk.
//!
//! The cache is keyed by the last path segment of the cover URL and is
//! purely presence-based: once `thumbnails/<user>/screenshot_<key>.jpg`
//! exists it is never captured again, refreshed or validated.

mod chrome;

pub use chrome::ChromeCapturer;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use tracing::{debug, info};

use crate::app::Result;

/// Directory under the output root holding per-user thumbnails
pub const THUMBNAILS_DIR: &str = "thumbnails";

/// Characters escaped when a user or key goes into a URL path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Renders a URL and stores it as a JPEG
#[async_trait]
pub trait Capturer: Send + Sync {
    async fn capture(&self, url: &str, dest: &Path, quality: u8) -> Result<()>;
}

pub struct ScreenshotCache {
    output_root: PathBuf,
    base_url: String,
    quality: u8,
    capturer: Arc<dyn Capturer>,
}

impl ScreenshotCache {
    pub fn new(
        output_root: impl Into<PathBuf>,
        base_url: impl Into<String>,
        quality: u8,
        capturer: Arc<dyn Capturer>,
    ) -> Self {
        Self {
            output_root: output_root.into(),
            base_url: base_url.into(),
            quality,
            capturer,
        }
    }

    /// Path of a thumbnail file relative to the output root
    pub fn relative_path(username: &str, key: &str) -> String {
        format!("{}/{}/screenshot_{}.jpg", THUMBNAILS_DIR, username, key)
    }

    /// Public URL of a thumbnail; the file name on disk is used verbatim,
    /// so the URL carries it percent-encoded
    pub fn public_url(&self, username: &str, key: &str) -> String {
        let relative = Self::relative_path(
            &utf8_percent_encode(username, PATH_SEGMENT).to_string(),
            &utf8_percent_encode(key, PATH_SEGMENT).to_string(),
        );
        format!("{}{}", self.base_url, relative)
    }

    /// Make sure the screenshot for `key` exists, capturing `cover_url` on a
    /// miss, and return the public URL of the cached file.
    pub async fn ensure(&self, cover_url: &str, key: &str, username: &str) -> Result<String> {
        let relative = Self::relative_path(username, key);
        let path = self.output_root.join(&relative);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        if tokio::fs::try_exists(&path).await? {
            debug!("Thumbnail cache hit: {}", path.display());
        } else {
            info!("Capturing thumbnail {} for {}", key, username);
            self.capturer.capture(cover_url, &path, self.quality).await?;
        }

        Ok(self.public_url(username, key))
    }
}
