use thiserror::Error;

#[derive(Error, Debug)]
pub enum TikfeedError {
    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Token acquisition failed: {0}")]
    Token(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Screenshot capture failed: {0}")]
    Capture(String),

    #[error("Invalid username: {0:?}")]
    InvalidUsername(String),

    #[error("Feed serialization error: {0}")]
    Feed(#[from] rss::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Subscription list error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, TikfeedError>;
