//! Scraping client seam.
//!
//! A [`ScrapeClient`] opens one authenticated [`Session`] per user; the
//! session lists that user's videos as raw JSON items, lazily.

mod tiktok;

pub use tiktok::{TikTokClient, TikTokSession};

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde_json::Value;

use crate::app::Result;
use crate::domain::Credential;

#[async_trait]
pub trait ScrapeClient: Send + Sync {
    /// Open a session authenticated with `credential`
    async fn open_session(&self, credential: &Credential) -> Result<Box<dyn Session>>;
}

#[async_trait]
pub trait Session: Send + Sync {
    /// Raw video items for `username`, most recent first, at most about
    /// `count` of them. Pages are requested only as the stream is polled.
    fn user_videos<'a>(&'a self, username: &'a str, count: usize) -> BoxStream<'a, Result<Value>>;

    /// Release whatever the session holds
    async fn close(&mut self) -> Result<()>;
}
