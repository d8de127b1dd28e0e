use percent_encoding::percent_decode_str;
use url::{ParseError, Url};

/// Resolves scheme-relative and bare-path cover URLs
const RELATIVE_BASE: &str = "https://cover.invalid/";

/// What a video's cover image means for thumbnailing, resolved once per video
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoverRef {
    /// The video has no cover image
    NoCover,
    /// Cover URL with the cache key derived from its path
    CoverWithKey { url: String, key: String },
    /// Cover URL present but no cache key can be derived from it
    CoverUnparseable(String),
}

impl CoverRef {
    pub fn resolve(cover_url: Option<&str>) -> Self {
        match cover_url {
            None => CoverRef::NoCover,
            Some(url) => match cache_key(url) {
                Some(key) => CoverRef::CoverWithKey {
                    url: url.to_string(),
                    key,
                },
                None => CoverRef::CoverUnparseable(url.to_string()),
            },
        }
    }
}

/// Derive the screenshot cache key from a cover URL: the last non-empty
/// segment of its path, percent-decoded. Query string and fragment don't
/// take part.
///
/// The path is normalized by `url` first, so `.` and `..` segments are
/// resolved before the last segment is picked. URLs without a scheme are
/// read relative to a placeholder host. A segment that decodes to
/// something unusable as a file name gives `None`.
pub fn cache_key(cover_url: &str) -> Option<String> {
    let url = match Url::parse(cover_url) {
        Ok(url) => url,
        Err(ParseError::RelativeUrlWithoutBase) => {
            Url::parse(RELATIVE_BASE).ok()?.join(cover_url).ok()?
        }
        Err(_) => return None,
    };

    let segment = url.path().split('/').filter(|seg| !seg.is_empty()).last()?;
    let key = percent_decode_str(segment).decode_utf8().ok()?;

    if key.contains(['/', '\\', '\0']) || key == "." || key == ".." {
        return None;
    }
    Some(key.into_owned())
}
