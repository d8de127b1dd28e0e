pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tikfeed")]
#[command(about = "Publish RSS feeds of TikTok accounts", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.config/tikfeed/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory receiving rss/ and thumbnails/
    #[arg(short, long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Subscription list, one username per line
    #[arg(short, long, global = true)]
    pub subscriptions: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scrape every subscription and write its feed
    Run,
    /// Acquire an msToken and show where it came from
    Token,
}
