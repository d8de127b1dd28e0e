use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tikfeed::cli::{commands, Cli, Commands};
use tikfeed::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.output_dir {
        config.paths.output_dir = dir;
    }
    if let Some(path) = cli.subscriptions {
        config.paths.subscriptions = path;
    }

    match cli.command {
        Commands::Run => {
            commands::run(&config).await?;
        }
        Commands::Token => {
            commands::token(&config).await?;
        }
    }

    Ok(())
}
