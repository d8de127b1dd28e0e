//! The per-run pipeline.
//!
//! ```text
//! for each user:  open session → fetch videos → per video: screenshot → add entry
//!                 → finalize feed → close session
//! ```
//!
//! Users are processed one after another. Whatever goes wrong inside one
//! user ends that user only; the error is logged and recorded in the
//! [`RunSummary`] and the next user starts.

use std::path::PathBuf;
use std::sync::Arc;

use futures::StreamExt;
use tracing::{error, info, warn};

use crate::app::{Result, RunContext};
use crate::domain::CoverRef;
use crate::feed::UserFeed;
use crate::fetcher;
use crate::scrape::{ScrapeClient, Session};
use crate::subscriptions::validate_username;
use crate::thumbnail::ScreenshotCache;

/// What a successfully processed user produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedOutcome {
    Written { path: PathBuf, entries: usize },
    /// No videos; any existing feed file was left alone
    Empty,
}

#[derive(Debug)]
pub struct UserOutcome {
    pub username: String,
    pub result: Result<FeedOutcome>,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub outcomes: Vec<UserOutcome>,
}

impl RunSummary {
    pub fn written(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.result, Ok(FeedOutcome::Written { .. })))
            .count()
    }

    pub fn empty(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.result, Ok(FeedOutcome::Empty)))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_err()).count()
    }

    pub fn outcome(&self, username: &str) -> Option<&UserOutcome> {
        self.outcomes.iter().find(|o| o.username == username)
    }
}

pub struct Pipeline {
    ctx: RunContext,
    client: Arc<dyn ScrapeClient>,
    cache: ScreenshotCache,
}

impl Pipeline {
    pub fn new(ctx: RunContext, client: Arc<dyn ScrapeClient>, cache: ScreenshotCache) -> Self {
        Self { ctx, client, cache }
    }

    /// Process every user in order. Never fails as a whole.
    pub async fn run(&self, users: &[String]) -> RunSummary {
        if !self.ctx.credential.is_usable() {
            warn!("No usable msToken for this run; sessions will fail");
        }

        let mut summary = RunSummary::default();

        for username in users {
            info!("Running for user '{}'", username);

            let result = self.process_user(username).await;
            match &result {
                Ok(FeedOutcome::Written { path, entries }) => {
                    info!("{}: {} entries written to {}", username, entries, path.display())
                }
                Ok(FeedOutcome::Empty) => info!("{}: no videos", username),
                Err(e) => error!("Error for user {}: {}", username, e),
            }

            summary.outcomes.push(UserOutcome {
                username: username.clone(),
                result,
            });
        }

        summary
    }

    async fn process_user(&self, username: &str) -> Result<FeedOutcome> {
        validate_username(username)?;

        let mut session = self.client.open_session(&self.ctx.credential).await?;
        let result = self.build_feed(&*session, username).await;

        if let Err(e) = session.close().await {
            warn!("Closing session for {} failed: {}", username, e);
        }

        result
    }

    async fn build_feed(&self, session: &dyn Session, username: &str) -> Result<FeedOutcome> {
        let mut feed = UserFeed::build(&self.ctx.template, username);
        let mut videos = fetcher::fetch(session, username, self.ctx.fetch_count);

        while let Some(video) = videos.next().await {
            let video = video?;

            let thumbnail = match CoverRef::resolve(video.cover_url.as_deref()) {
                CoverRef::NoCover => None,
                CoverRef::CoverWithKey { url, key } => {
                    Some(self.cache.ensure(&url, &key, username).await?)
                }
                CoverRef::CoverUnparseable(url) => {
                    warn!("Skipping thumbnail for video {}: no key in {}", video.id, url);
                    None
                }
            };

            feed.add(&video, thumbnail.as_deref());
        }

        let entries = feed.entries().len();
        Ok(match feed.finalize(&self.ctx.rss_dir())? {
            Some(path) => FeedOutcome::Written { path, entries },
            None => FeedOutcome::Empty,
        })
    }
}
