//! msToken acquisition.
//!
//! ```text
//! TokenSource (browser) ──ok──────────────→ Credential::Generated
//!        │ error / none / empty
//!        └──→ fallback env var ──set──────→ Credential::Fallback
//!                              └─unset────→ Credential::Missing
//! ```

mod chrome;

pub use chrome::ChromeTokenSource;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::app::Result;
use crate::domain::Credential;

/// Automated token minting
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Try to mint a fresh token. `Ok(None)` means the site handed out none.
    async fn generate(&self) -> Result<Option<String>>;
}

/// Produces the single [`Credential`] of a run
pub struct TokenProvider {
    source: Box<dyn TokenSource>,
    fallback: Option<String>,
}

impl TokenProvider {
    pub fn new(source: Box<dyn TokenSource>, fallback: Option<String>) -> Self {
        Self { source, fallback }
    }

    /// Read the fallback token from the environment variable `var`
    pub fn from_env(source: Box<dyn TokenSource>, var: &str) -> Self {
        Self::new(source, std::env::var(var).ok())
    }

    /// Mint a token, falling back when minting fails or yields nothing.
    ///
    /// Never fails: an unusable credential surfaces later as per-user
    /// session errors.
    pub async fn acquire(&self) -> Credential {
        info!("Fetching fresh msToken");

        match self.source.generate().await {
            Ok(Some(token)) if !token.is_empty() => return Credential::generated(token),
            Ok(_) => warn!("No msToken cookie was issued, using fallback"),
            Err(e) => warn!("msToken generation failed, using fallback: {}", e),
        }

        match self.fallback.as_deref() {
            Some(token) if !token.is_empty() => Credential::fallback(token),
            _ => Credential::missing(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::TikfeedError;
    use crate::domain::CredentialSource;

    enum Scripted {
        Token(&'static str),
        Nothing,
        Fail,
    }

    #[async_trait]
    impl TokenSource for Scripted {
        async fn generate(&self) -> Result<Option<String>> {
            match self {
                Scripted::Token(t) => Ok(Some(t.to_string())),
                Scripted::Nothing => Ok(None),
                Scripted::Fail => Err(TikfeedError::Browser("chrome not found".into())),
            }
        }
    }

    fn provider(source: Scripted, fallback: Option<&str>) -> TokenProvider {
        TokenProvider::new(Box::new(source), fallback.map(String::from))
    }

    #[tokio::test]
    async fn test_generated_token_wins() {
        let cred = provider(Scripted::Token("fresh"), Some("env")).acquire().await;
        assert_eq!(cred.token(), "fresh");
        assert_eq!(cred.source(), CredentialSource::Generated);
    }

    #[tokio::test]
    async fn test_fallback_when_no_cookie() {
        let cred = provider(Scripted::Nothing, Some("env")).acquire().await;
        assert_eq!(cred.token(), "env");
        assert_eq!(cred.source(), CredentialSource::Fallback);
    }

    #[tokio::test]
    async fn test_fallback_when_empty_cookie() {
        let cred = provider(Scripted::Token(""), Some("env")).acquire().await;
        assert_eq!(cred.source(), CredentialSource::Fallback);
    }

    #[tokio::test]
    async fn test_fallback_when_browser_fails() {
        let cred = provider(Scripted::Fail, Some("env")).acquire().await;
        assert_eq!(cred.token(), "env");
    }

    #[test]
    fn test_missing_when_both_unavailable() {
        let cred = tokio_test::block_on(provider(Scripted::Fail, None).acquire());
        assert_eq!(cred.source(), CredentialSource::Missing);
        assert!(!cred.is_usable());

        let cred = tokio_test::block_on(provider(Scripted::Nothing, Some("")).acquire());
        assert!(!cred.is_usable());
    }
}
