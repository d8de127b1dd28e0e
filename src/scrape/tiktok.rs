use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::CookieParam;
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::Page;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::app::{Result, TikfeedError};
use crate::browser::{BrowserConfig, ChromeBrowser};
use crate::domain::Credential;
use crate::scrape::{ScrapeClient, Session};

/// The web API refuses larger pages
const MAX_PAGE_SIZE: usize = 35;

/// TikTok web client. Requests are issued from inside a real browser page
/// so the site's own scripts sign them.
pub struct TikTokClient {
    browser: BrowserConfig,
    home_url: String,
    sleep_after: Duration,
}

impl TikTokClient {
    pub fn new(browser: BrowserConfig, home_url: impl Into<String>, sleep_after: Duration) -> Self {
        Self {
            browser,
            home_url: home_url.into(),
            sleep_after,
        }
    }
}

#[async_trait]
impl ScrapeClient for TikTokClient {
    async fn open_session(&self, credential: &Credential) -> Result<Box<dyn Session>> {
        if !credential.is_usable() {
            return Err(TikfeedError::Session(
                "no usable msToken (generation failed and no fallback is set)".into(),
            ));
        }

        let api_base = Url::parse(&self.home_url)?;
        let browser = ChromeBrowser::launch(&self.browser).await?;

        let page: Result<Page> = async {
            let page = browser.open(&self.home_url).await?;

            let cookie = CookieParam::builder()
                .name("msToken")
                .value(credential.token())
                .url(self.home_url.clone())
                .build()
                .map_err(|e| TikfeedError::Session(format!("Invalid msToken cookie: {}", e)))?;
            page.set_cookie(cookie)
                .await
                .map_err(|e| TikfeedError::Session(format!("Failed to set msToken: {}", e)))?;

            tokio::time::sleep(self.sleep_after).await;
            Ok(page)
        }
        .await;

        match page {
            Ok(page) => Ok(Box::new(TikTokSession {
                browser: Some(browser),
                page,
                token: credential.token().to_string(),
                api_base,
            })),
            Err(e) => {
                if let Err(close_err) = browser.close().await {
                    debug!("{}", close_err);
                }
                Err(e)
            }
        }
    }
}

pub struct TikTokSession {
    browser: Option<ChromeBrowser>,
    page: Page,
    token: String,
    api_base: Url,
}

#[derive(Deserialize)]
struct UserDetail {
    #[serde(rename = "statusCode", default)]
    status_code: i64,
    #[serde(rename = "userInfo")]
    user_info: Option<UserInfo>,
}

#[derive(Deserialize)]
struct UserInfo {
    user: UserRef,
}

#[derive(Deserialize)]
struct UserRef {
    #[serde(rename = "secUid")]
    sec_uid: String,
}

#[derive(Deserialize)]
struct ItemListPage {
    #[serde(rename = "statusCode", default)]
    status_code: i64,
    #[serde(rename = "itemList", default)]
    item_list: Vec<Value>,
    #[serde(rename = "hasMore", default)]
    has_more: bool,
    #[serde(default)]
    cursor: Value,
}

#[derive(Debug, PartialEq, Eq)]
enum Cursor {
    Start,
    Next { sec_uid: String, cursor: String },
    Done,
}

impl TikTokSession {
    fn api_url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url> {
        let mut url = self.api_base.join(path)?;
        url.query_pairs_mut()
            .append_pair("aid", "1988")
            .append_pair("app_name", "tiktok_web")
            .append_pair("device_platform", "web_pc")
            .extend_pairs(params)
            .append_pair("msToken", &self.token);
        Ok(url)
    }

    /// GET `url` from within the page and parse the body as JSON
    async fn fetch_json(&self, url: &Url) -> Result<Value> {
        let script = format!(
            "(async () => {{ const r = await fetch({}, {{ credentials: 'include' }}); return await r.text(); }})()",
            serde_json::to_string(url.as_str())?
        );

        let params = EvaluateParams::builder()
            .expression(script)
            .await_promise(true)
            .return_by_value(true)
            .build()
            .map_err(|e| TikfeedError::Fetch(format!("Invalid evaluate params: {}", e)))?;

        let body: String = self
            .page
            .evaluate_expression(params)
            .await
            .map_err(|e| TikfeedError::Fetch(format!("Request to {} failed: {}", url.path(), e)))?
            .into_value()?;

        if body.is_empty() {
            return Err(TikfeedError::Fetch(format!(
                "Empty response from {}; the msToken was probably rejected",
                url.path()
            )));
        }

        Ok(serde_json::from_str(&body)?)
    }

    async fn sec_uid(&self, username: &str) -> Result<String> {
        let url = self.api_url("api/user/detail/", &[("uniqueId", username), ("secUid", "")])?;
        let detail: UserDetail = serde_json::from_value(self.fetch_json(&url).await?)?;
        sec_uid_of(detail, username)
    }

    async fn next_page(
        &self,
        username: &str,
        count: usize,
        state: Cursor,
    ) -> Result<Option<(Vec<Value>, Cursor)>> {
        let (sec_uid, cursor) = match state {
            Cursor::Done => return Ok(None),
            Cursor::Start => (self.sec_uid(username).await?, "0".to_string()),
            Cursor::Next { sec_uid, cursor } => (sec_uid, cursor),
        };

        let page_size = count.clamp(1, MAX_PAGE_SIZE).to_string();
        let url = self.api_url(
            "api/post/item_list/",
            &[
                ("secUid", sec_uid.as_str()),
                ("count", page_size.as_str()),
                ("cursor", cursor.as_str()),
            ],
        )?;
        let page: ItemListPage = serde_json::from_value(self.fetch_json(&url).await?)?;

        advance(page, sec_uid, username).map(Some)
    }
}

fn sec_uid_of(detail: UserDetail, username: &str) -> Result<String> {
    match detail.user_info {
        Some(info) if detail.status_code == 0 => Ok(info.user.sec_uid),
        _ => Err(TikfeedError::Fetch(format!(
            "User {} not found (status {})",
            username, detail.status_code
        ))),
    }
}

/// Check a listing page and work out where the next one starts.
///
/// Paging continues only while `hasMore` is set, the page had items and the
/// cursor is a string or number.
fn advance(page: ItemListPage, sec_uid: String, username: &str) -> Result<(Vec<Value>, Cursor)> {
    if page.status_code != 0 {
        return Err(TikfeedError::Fetch(format!(
            "Listing videos of {} failed with status {}",
            username, page.status_code
        )));
    }

    debug!("{} videos in page for {}", page.item_list.len(), username);

    let more = page.has_more && !page.item_list.is_empty();
    let next = match page.cursor {
        Value::String(c) if more => Cursor::Next { sec_uid, cursor: c },
        Value::Number(c) if more => Cursor::Next {
            sec_uid,
            cursor: c.to_string(),
        },
        _ => Cursor::Done,
    };

    Ok((page.item_list, next))
}

#[async_trait]
impl Session for TikTokSession {
    fn user_videos<'a>(&'a self, username: &'a str, count: usize) -> BoxStream<'a, Result<Value>> {
        stream::try_unfold(Cursor::Start, move |state| self.next_page(username, count, state))
            .map_ok(|items| stream::iter(items.into_iter().map(Ok)))
            .try_flatten()
            .boxed()
    }

    async fn close(&mut self) -> Result<()> {
        match self.browser.take() {
            Some(browser) => browser.close().await,
            None => Ok(()),
        }
    }
}
