use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::app::{Result, TikfeedError};

/// One scraped video, as much of it as the feed needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRecord {
    pub id: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub cover_url: Option<String>,
}

/// TikTok sends some numeric fields as strings depending on the endpoint
#[derive(Deserialize)]
#[serde(untagged)]
enum NumOrString {
    Num(i64),
    Str(String),
}

#[derive(Deserialize)]
struct RawVideo {
    id: NumOrString,
    #[serde(default)]
    desc: Option<String>,
    #[serde(rename = "createTime")]
    create_time: NumOrString,
    #[serde(default)]
    video: Option<RawVideoMeta>,
}

#[derive(Deserialize)]
struct RawVideoMeta {
    #[serde(default)]
    cover: Option<String>,
}

impl VideoRecord {
    /// Parse one item of an `item_list` response
    pub fn from_raw(raw: Value) -> Result<Self> {
        let raw: RawVideo = serde_json::from_value(raw)?;

        let id = match raw.id {
            NumOrString::Num(n) => n.to_string(),
            NumOrString::Str(s) => s,
        };

        let secs = match raw.create_time {
            NumOrString::Num(n) => n,
            NumOrString::Str(s) => s.trim().parse::<i64>().map_err(|_| {
                TikfeedError::Fetch(format!("Video {} has invalid createTime {:?}", id, s))
            })?,
        };

        let created_at = Utc.timestamp_opt(secs, 0).single().ok_or_else(|| {
            TikfeedError::Fetch(format!("Video {} has out-of-range createTime {}", id, secs))
        })?;

        let cover_url = raw
            .video
            .and_then(|v| v.cover)
            .filter(|c| !c.is_empty());

        Ok(Self {
            id,
            description: raw.desc,
            created_at,
            cover_url,
        })
    }
}
