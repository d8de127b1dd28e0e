//! # tikfeed
//!
//! Publishes one RSS feed per TikTok account, with a locally cached
//! thumbnail screenshot embedded in every entry.
//!
//! ## Architecture
//!
//! ```text
//! Token → for each user: Session → Fetcher → Thumbnail cache → Feed → rss/<user>.xml
//! ```
//!
//! - [`token`]: mints the run's msToken, with an environment fallback
//! - [`scrape`]: per-user TikTok sessions driven through headless Chrome
//! - [`fetcher`]: lazy, bounded stream of parsed videos
//! - [`thumbnail`]: presence-based screenshot cache
//! - [`feed`]: RSS assembly and writing
//! - [`pipeline`]: runs users one by one, isolating failures
//!
//! ## Quick Start
//!
//! ```bash
//! # One username per line
//! echo "some_user" > subscriptions.csv
//!
//! # Scrape everyone and write rss/ and thumbnails/
//! MS_TOKEN=... tikfeed run
//!
//! # Check that a token can be minted
//! tikfeed token
//! ```

/// Run context and error types.
pub mod app;

/// Headless Chrome launch and teardown.
pub mod browser;

/// Command-line interface using clap.
///
/// - `run` - Scrape every subscription and write feeds
/// - `token` - Acquire an msToken and print it redacted
pub mod cli;

/// Configuration loaded from `~/.config/tikfeed/config.toml`.
pub mod config;

/// Core domain models.
///
/// - [`Credential`](domain::Credential): the run's msToken and its source
/// - [`VideoRecord`](domain::VideoRecord): one scraped video
/// - [`CoverRef`](domain::CoverRef): what a video's cover means for thumbnailing
pub mod domain;

/// RSS feed assembly.
pub mod feed;

/// Bounded video streams over a scraping session.
pub mod fetcher;

/// Per-user orchestration and run summaries.
pub mod pipeline;

/// Scraping client and session traits, and the TikTok implementation.
pub mod scrape;

/// Subscription list parsing.
pub mod subscriptions;

/// Thumbnail screenshot cache.
pub mod thumbnail;

/// msToken acquisition.
pub mod token;
