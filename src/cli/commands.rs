use std::sync::Arc;
use std::time::Duration;

use crate::app::{Result, RunContext};
use crate::config::Config;
use crate::domain::Credential;
use crate::pipeline::Pipeline;
use crate::scrape::TikTokClient;
use crate::subscriptions::read_subscriptions;
use crate::thumbnail::{ChromeCapturer, ScreenshotCache};
use crate::token::{ChromeTokenSource, TokenProvider};

async fn acquire_credential(config: &Config) -> Credential {
    let source = ChromeTokenSource::new(config.browser.clone(), config.scrape.token_url.clone());
    TokenProvider::from_env(Box::new(source), &config.scrape.ms_token_env)
        .acquire()
        .await
}

/// Run the whole pipeline once.
///
/// Only an unreadable subscription list fails the command; per-user
/// failures are reported and otherwise ignored.
pub async fn run(config: &Config) -> Result<()> {
    let users = read_subscriptions(&config.paths.subscriptions)?;

    if users.is_empty() {
        println!("No subscriptions in {}", config.paths.subscriptions.display());
        return Ok(());
    }

    let credential = acquire_credential(config).await;
    println!("Using token: {} ({})", credential, credential.source());

    let ctx = RunContext::new(config, credential);
    let client = Arc::new(TikTokClient::new(
        config.browser.clone(),
        config.scrape.token_url.clone(),
        Duration::from_secs(config.scrape.sleep_after_secs),
    ));
    let cache = ScreenshotCache::new(
        ctx.output_dir.clone(),
        ctx.template.base_url.clone(),
        ctx.jpeg_quality,
        Arc::new(ChromeCapturer::new(config.browser.clone())),
    );

    let summary = Pipeline::new(ctx, client, cache).run(&users).await;

    for outcome in &summary.outcomes {
        if let Err(e) = &outcome.result {
            eprintln!("  Error for {}: {}", outcome.username, e);
        }
    }
    println!(
        "Run complete: {} feeds written, {} without videos, {} errors",
        summary.written(),
        summary.empty(),
        summary.failed()
    );

    Ok(())
}

/// Acquire a token the way a run would and print its redacted form
pub async fn token(config: &Config) -> Result<()> {
    let credential = acquire_credential(config).await;

    if credential.is_usable() {
        println!("{} ({})", credential, credential.source());
    } else {
        eprintln!(
            "No msToken: generation failed and {} is not set",
            config.scrape.ms_token_env
        );
    }

    Ok(())
}
