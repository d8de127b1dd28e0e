use std::fmt;

/// Where a [`Credential`] came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// Freshly minted by visiting the site in a browser
    Generated,
    /// Read from the fallback environment variable
    Fallback,
    /// Neither path produced a value
    Missing,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CredentialSource::Generated => "generated",
            CredentialSource::Fallback => "fallback",
            CredentialSource::Missing => "missing",
        };
        f.write_str(s)
    }
}

/// The `msToken` shared by every scraping session of a run.
///
/// `Display` and `Debug` only ever show the first ten characters.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
    source: CredentialSource,
}

impl Credential {
    pub fn generated(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            source: CredentialSource::Generated,
        }
    }

    pub fn fallback(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            source: CredentialSource::Fallback,
        }
    }

    pub fn missing() -> Self {
        Self {
            token: String::new(),
            source: CredentialSource::Missing,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }

    /// An empty token cannot authenticate anything
    pub fn is_usable(&self) -> bool {
        !self.token.is_empty()
    }

    pub fn redacted(&self) -> String {
        let prefix: String = self.token.chars().take(10).collect();
        format!("{}...", prefix)
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &self.redacted())
            .field("source", &self.source)
            .finish()
    }
}
