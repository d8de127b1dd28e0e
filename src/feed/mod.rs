//! Per-user RSS feed assembly.
//!
//! A [`UserFeed`] is built with its channel metadata up front, takes one
//! entry per video in fetch order, and is only written to
//! `rss/<username>.xml` when at least one entry was added. An empty feed
//! leaves any previously published file untouched.

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use html_escape::{encode_double_quoted_attribute, encode_text};
use rss::extension::atom::{AtomExtension, Link};
use rss::{Channel, Guid, Image, Item};
use tracing::info;

use crate::app::Result;
use crate::domain::VideoRecord;

/// Directory under the output root holding the feeds
pub const RSS_DIR: &str = "rss";

const MAX_TITLE_CHARS: usize = 255;
const NO_TITLE: &str = "No Title";
const NO_DESCRIPTION: &str = "No Description";

/// Channel metadata shared by every user's feed
#[derive(Debug, Clone)]
pub struct FeedTemplate {
    pub base_url: String,
    pub author_name: String,
    pub author_email: String,
    pub language: String,
}

/// One feed entry, before RSS encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub id: String,
    pub title: String,
    pub link: String,
    pub content: String,
    pub published: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

pub struct UserFeed {
    username: String,
    channel: Channel,
    entries: Vec<FeedEntry>,
    updated: Option<DateTime<Utc>>,
}

pub fn permalink(username: &str, video_id: &str) -> String {
    format!("https://tiktok.com/@{}/video/{}", username, video_id)
}

/// Feed title for a video: its description cut to 255 characters
pub fn entry_title(description: Option<&str>) -> String {
    let title: String = description
        .unwrap_or_default()
        .chars()
        .take(MAX_TITLE_CHARS)
        .collect();
    if title.is_empty() {
        NO_TITLE.to_string()
    } else {
        title
    }
}

/// HTML body of an entry, with the thumbnail in front when there is one.
///
/// The text is the title text: an absent description reads "No Title", an
/// empty one "No Description".
pub fn entry_content(description: Option<&str>, thumbnail: Option<&str>) -> String {
    let text = match description {
        None => NO_TITLE.to_string(),
        Some(desc) => {
            let text: String = desc.chars().take(MAX_TITLE_CHARS).collect();
            if text.is_empty() {
                NO_DESCRIPTION.to_string()
            } else {
                encode_text(&text).into_owned()
            }
        }
    };

    match thumbnail {
        Some(src) => format!(
            "<img src=\"{}\" /> {}",
            encode_double_quoted_attribute(src),
            text
        ),
        None => text,
    }
}

impl UserFeed {
    /// Start a feed for `username` with all channel metadata filled in
    pub fn build(template: &FeedTemplate, username: &str) -> Self {
        let mut channel = Channel::default();
        channel.set_title(format!("{} TikTok", username));
        channel.set_link("http://tiktok.com");
        channel.set_description(format!("Latest TikToks from {}", username));
        channel.set_language(Some(template.language.clone()));
        channel.set_managing_editor(Some(format!(
            "{} ({})",
            template.author_email, template.author_name
        )));
        channel.set_generator(Some("tikfeed".to_string()));

        let mut image = Image::default();
        image.set_url(format!("{}tiktok-rss.png", template.base_url));
        image.set_title(format!("{} TikTok", username));
        image.set_link(format!("https://www.tiktok.com/@{}", username));
        channel.set_image(Some(image));

        let mut self_link = Link::default();
        self_link.set_href(format!("{}{}/{}.xml", template.base_url, RSS_DIR, username));
        self_link.set_rel("self");
        self_link.set_mime_type(Some("application/rss+xml".to_string()));
        let mut atom = AtomExtension::default();
        atom.set_links(vec![self_link]);
        channel.set_atom_ext(Some(atom));

        Self {
            username: username.to_string(),
            channel,
            entries: Vec::new(),
            updated: None,
        }
    }

    /// Append the entry for `video`
    pub fn add(&mut self, video: &VideoRecord, thumbnail: Option<&str>) {
        let link = permalink(&self.username, &video.id);
        let ts = video.created_at;

        self.updated = Some(self.updated.map_or(ts, |u| u.max(ts)));
        self.entries.push(FeedEntry {
            id: link.clone(),
            title: entry_title(video.description.as_deref()),
            link,
            content: entry_content(video.description.as_deref(), thumbnail),
            published: ts,
            updated: ts,
        });
    }

    pub fn entries(&self) -> &[FeedEntry] {
        &self.entries
    }

    /// Latest entry timestamp so far
    pub fn updated(&self) -> Option<DateTime<Utc>> {
        self.updated
    }

    /// Write the feed to `<rss_dir>/<username>.xml` if it has any entries.
    ///
    /// Returns the written path, or `None` when there was nothing to write.
    pub fn finalize(mut self, rss_dir: &Path) -> Result<Option<PathBuf>> {
        let Some(updated) = self.updated else {
            info!("No videos for {}, leaving feed untouched", self.username);
            return Ok(None);
        };

        self.channel.set_last_build_date(Some(updated.to_rfc2822()));
        self.channel.set_items(
            self.entries
                .iter()
                .map(to_rss_item)
                .collect::<Vec<_>>(),
        );

        std::fs::create_dir_all(rss_dir)?;
        let path = rss_dir.join(format!("{}.xml", self.username));
        let tmp = rss_dir.join(format!("{}.xml.tmp", self.username));

        // The published file is only replaced once the new one is complete
        if let Err(e) = write_channel(&self.channel, &tmp) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e);
        }
        std::fs::rename(&tmp, &path)?;

        info!(
            "Wrote {} entries to {}",
            self.entries.len(),
            path.display()
        );
        Ok(Some(path))
    }
}

fn write_channel(channel: &Channel, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;
    let mut writer = channel.write_to(BufWriter::new(file))?;
    writer.flush()?;
    Ok(())
}

fn to_rss_item(entry: &FeedEntry) -> Item {
    let mut guid = Guid::default();
    guid.set_value(entry.id.clone());
    guid.set_permalink(false);

    let mut item = Item::default();
    item.set_guid(Some(guid));
    item.set_title(Some(entry.title.clone()));
    item.set_link(Some(entry.link.clone()));
    item.set_description(Some(entry.content.clone()));
    item.set_pub_date(Some(entry.published.to_rfc2822()));
    item
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn template() -> FeedTemplate {
        FeedTemplate {
            base_url: "https://cdn.test/".into(),
            author_name: "Test Author".into(),
            author_email: "author@test".into(),
            language: "en".into(),
        }
    }

    fn video(id: &str, desc: Option<&str>, secs: i64) -> VideoRecord {
        VideoRecord {
            id: id.into(),
            description: desc.map(String::from),
            created_at: Utc.timestamp_opt(secs, 0).unwrap(),
            cover_url: None,
        }
    }

    fn parse(path: &Path) -> feed_rs::model::Feed {
        let bytes = std::fs::read(path).unwrap();
        feed_rs::parser::parse(&bytes[..]).unwrap()
    }

    #[test]
    fn test_entry_title_truncates_to_255_chars() {
        let long = "é".repeat(300);
        let title = entry_title(Some(&long));
        assert_eq!(title.chars().count(), 255);
    }

    #[test]
    fn test_entry_title_fallbacks() {
        assert_eq!(entry_title(None), "No Title");
        assert_eq!(entry_title(Some("")), "No Title");
        assert_eq!(entry_title(Some("dance")), "dance");
    }

    #[test]
    fn test_entry_content_variants() {
        assert_eq!(entry_content(None, None), "No Title");
        assert_eq!(entry_content(Some(""), None), "No Description");
        assert_eq!(entry_content(Some("hi"), None), "hi");
        assert_eq!(
            entry_content(Some("hi"), Some("https://cdn.test/t.jpg")),
            "<img src=\"https://cdn.test/t.jpg\" /> hi"
        );
        assert_eq!(
            entry_content(None, Some("https://cdn.test/t.jpg")),
            "<img src=\"https://cdn.test/t.jpg\" /> No Title"
        );
        assert_eq!(
            entry_content(Some(""), Some("https://cdn.test/t.jpg")),
            "<img src=\"https://cdn.test/t.jpg\" /> No Description"
        );
    }

    #[test]
    fn test_entry_content_escapes_text() {
        assert_eq!(entry_content(Some("a <b> & c"), None), "a &lt;b&gt; &amp; c");
    }

    #[test]
    fn test_add_tracks_order_and_max_timestamp() {
        let mut feed = UserFeed::build(&template(), "alice");
        feed.add(&video("3", Some("newest"), 300), None);
        feed.add(&video("1", Some("oldest"), 100), None);
        feed.add(&video("2", None, 200), None);

        let ids: Vec<&str> = feed.entries().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "https://tiktok.com/@alice/video/3",
                "https://tiktok.com/@alice/video/1",
                "https://tiktok.com/@alice/video/2",
            ]
        );
        assert_eq!(feed.updated(), Some(Utc.timestamp_opt(300, 0).unwrap()));

        let entry = &feed.entries()[2];
        assert_eq!(entry.title, "No Title");
        assert_eq!(entry.published, entry.updated);
        assert_eq!(entry.link, entry.id);
    }

    #[test]
    fn test_finalize_empty_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let rss_dir = dir.path().join("rss");

        let feed = UserFeed::build(&template(), "bob");
        assert_eq!(feed.finalize(&rss_dir).unwrap(), None);
        assert!(!rss_dir.exists());
    }

    #[test]
    fn test_failed_write_keeps_published_feed() {
        let dir = tempfile::tempdir().unwrap();
        let rss_dir = dir.path().join("rss");
        std::fs::create_dir_all(&rss_dir).unwrap();
        let published = rss_dir.join("alice.xml");
        std::fs::write(&published, "<rss>old</rss>").unwrap();
        // Occupy the staging path so the new feed can't be written
        std::fs::create_dir(rss_dir.join("alice.xml.tmp")).unwrap();

        let mut feed = UserFeed::build(&template(), "alice");
        feed.add(&video("1", Some("new"), 100), None);

        assert!(feed.finalize(&rss_dir).is_err());
        assert_eq!(std::fs::read_to_string(&published).unwrap(), "<rss>old</rss>");
    }

    #[test]
    fn test_finalize_replaces_published_feed() {
        let dir = tempfile::tempdir().unwrap();
        let rss_dir = dir.path().join("rss");
        std::fs::create_dir_all(&rss_dir).unwrap();
        std::fs::write(rss_dir.join("alice.xml"), "<rss>old</rss>").unwrap();

        let mut feed = UserFeed::build(&template(), "alice");
        feed.add(&video("1", Some("new"), 100), None);
        let path = feed.finalize(&rss_dir).unwrap().unwrap();

        assert_eq!(parse(&path).entries.len(), 1);
        assert!(!rss_dir.join("alice.xml.tmp").exists());
    }

    #[test]
    fn test_finalize_writes_parseable_feed() {
        let dir = tempfile::tempdir().unwrap();
        let rss_dir = dir.path().join("rss");

        let mut feed = UserFeed::build(&template(), "alice");
        feed.add(&video("10", Some("first"), 1_700_000_500), Some("https://cdn.test/a.jpg"));
        feed.add(&video("9", Some("second"), 1_700_000_000), None);

        let path = feed.finalize(&rss_dir).unwrap().unwrap();
        assert_eq!(path, rss_dir.join("alice.xml"));

        let parsed = parse(&path);
        assert_eq!(parsed.title.unwrap().content, "alice TikTok");
        assert_eq!(parsed.entries.len(), 2);
        assert_eq!(parsed.entries[0].id, "https://tiktok.com/@alice/video/10");
        assert_eq!(parsed.entries[1].id, "https://tiktok.com/@alice/video/9");
        assert_eq!(
            parsed.updated.map(|u| u.timestamp()),
            Some(1_700_000_500)
        );

        let first = parsed.entries[0].summary.as_ref().unwrap();
        assert!(first.content.contains("<img src=\"https://cdn.test/a.jpg\""));
        let second = parsed.entries[1].summary.as_ref().unwrap();
        assert!(!second.content.contains("<img"));

        let xml = std::fs::read_to_string(&path).unwrap();
        assert!(xml.contains("https://cdn.test/rss/alice.xml"));
        assert!(xml.contains("https://cdn.test/tiktok-rss.png"));
    }
}
