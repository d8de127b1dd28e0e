use futures::stream::{BoxStream, StreamExt};

use crate::app::Result;
use crate::domain::VideoRecord;
use crate::scrape::Session;

/// Stream at most `limit` of `username`'s most recent videos, parsed.
///
/// Order is whatever the session returns; nothing is re-sorted. The stream
/// is single-pass: call `fetch` again to start over.
pub fn fetch<'a>(
    session: &'a dyn Session,
    username: &'a str,
    limit: usize,
) -> BoxStream<'a, Result<VideoRecord>> {
    session
        .user_videos(username, limit)
        .take(limit)
        .map(|raw| raw.and_then(VideoRecord::from_raw))
        .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use futures::stream;
    use futures::TryStreamExt;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::app::TikfeedError;

    /// Yields `total` items and counts how many were pulled
    struct Numbered {
        total: usize,
        pulled: AtomicUsize,
        fail_at: Option<usize>,
    }

    #[async_trait]
    impl Session for Numbered {
        fn user_videos<'a>(&'a self, _username: &'a str, _count: usize) -> BoxStream<'a, Result<Value>> {
            stream::iter(0..self.total)
                .map(move |i| {
                    self.pulled.fetch_add(1, Ordering::SeqCst);
                    if Some(i) == self.fail_at {
                        return Err(TikfeedError::Fetch("boom".into()));
                    }
                    Ok(json!({ "id": i.to_string(), "createTime": 1700000000 - i as i64 }))
                })
                .boxed()
        }

        async fn close(&mut self) -> Result<()> {
            Ok(())
        }
    }

    fn session(total: usize, fail_at: Option<usize>) -> Numbered {
        Numbered {
            total,
            pulled: AtomicUsize::new(0),
            fail_at,
        }
    }

    #[tokio::test]
    async fn test_fetch_respects_limit_lazily() {
        let s = session(50, None);
        let videos: Vec<VideoRecord> = fetch(&s, "alice", 10).try_collect().await.unwrap();

        assert_eq!(videos.len(), 10);
        assert_eq!(s.pulled.load(Ordering::SeqCst), 10);
    }

    #[tokio::test]
    async fn test_fetch_keeps_session_order() {
        let s = session(3, None);
        let ids: Vec<String> = fetch(&s, "alice", 10)
            .map_ok(|v| v.id)
            .try_collect()
            .await
            .unwrap();

        assert_eq!(ids, vec!["0", "1", "2"]);
    }

    #[tokio::test]
    async fn test_fetch_empty() {
        let s = session(0, None);
        let videos: Vec<VideoRecord> = fetch(&s, "bob", 10).try_collect().await.unwrap();
        assert!(videos.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_error_mid_stream() {
        let s = session(5, Some(2));
        let mut stream = fetch(&s, "alice", 10);

        assert!(stream.next().await.unwrap().is_ok());
        assert!(stream.next().await.unwrap().is_ok());
        assert!(matches!(
            stream.next().await.unwrap(),
            Err(TikfeedError::Fetch(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_malformed_item() {
        struct Malformed;

        #[async_trait]
        impl Session for Malformed {
            fn user_videos<'a>(&'a self, _u: &'a str, _c: usize) -> BoxStream<'a, Result<Value>> {
                stream::iter(vec![Ok(json!({ "desc": "no id" }))]).boxed()
            }

            async fn close(&mut self) -> Result<()> {
                Ok(())
            }
        }

        let result: Result<Vec<VideoRecord>> = fetch(&Malformed, "alice", 10).try_collect().await;
        assert!(matches!(result, Err(TikfeedError::Json(_))));
    }
}
