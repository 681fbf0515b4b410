//! reqwest ラッパー
//!
//! 全リクエストに固定のブラウザ User-Agent を付け、レスポンスの
//! `Set-Cookie` を `SessionCookies` として返す。リトライはしない。

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE, COOKIE};
use tracing::debug;

use crate::auth::SessionCookies;
use crate::error::FeedError;

/// サーバーは User-Agent によって応答を変えるため実ブラウザの値を使う
pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                              AppleWebKit/537.36 (KHTML, like Gecko) \
                              Chrome/131.0.0.0 Safari/537.36";

/// テキストレスポンス
#[derive(Debug, Clone)]
pub struct SiteResponse {
    pub body: String,
    /// このレスポンスで発行された Cookie
    pub cookies: SessionCookies,
}

/// バイナリレスポンス
#[derive(Debug, Clone)]
pub struct BinaryResponse {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
    /// このレスポンスで発行された Cookie
    pub cookies: SessionCookies,
}

#[derive(Debug, Clone)]
pub struct SiteClient {
    client: reqwest::Client,
    base_url: String,
}

impl SiteClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// ベースURLからの絶対URL
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(
        &self,
        path: &str,
        cookies: &SessionCookies,
    ) -> Result<SiteResponse, FeedError> {
        let url = self.url(path);
        debug!(url = %url, cookies = cookies.len(), "GET");

        let mut builder = self.client.get(&url);
        if !cookies.is_empty() {
            builder = builder.header(COOKIE, cookies.header_value());
        }

        let response = builder.send().await?.error_for_status()?;
        let issued = SessionCookies::from_headers(response.headers());
        let body = response.text().await?;

        Ok(SiteResponse {
            body,
            cookies: issued,
        })
    }

    /// 画像などのバイナリを取得する。`url` は絶対URL。
    pub async fn get_bytes(
        &self,
        url: &str,
        accept: &str,
        cookies: &SessionCookies,
    ) -> Result<BinaryResponse, FeedError> {
        debug!(url = %url, cookies = cookies.len(), "GET (binary)");

        let mut builder = self.client.get(url).header(ACCEPT, accept);
        if !cookies.is_empty() {
            builder = builder.header(COOKIE, cookies.header_value());
        }

        let response = builder.send().await?.error_for_status()?;
        let issued = SessionCookies::from_headers(response.headers());
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());
        let bytes = response.bytes().await?.to_vec();

        Ok(BinaryResponse {
            bytes,
            content_type,
            cookies: issued,
        })
    }

    /// URLエンコードしたフォームを POST する
    pub async fn post_form(
        &self,
        path: &str,
        form_fields: &[(String, String)],
        cookies: &SessionCookies,
    ) -> Result<SiteResponse, FeedError> {
        let url = self.url(path);
        debug!(url = %url, fields = form_fields.len(), "POST form");

        let mut builder = self.client.post(&url).form(form_fields);
        if !cookies.is_empty() {
            builder = builder.header(COOKIE, cookies.header_value());
        }

        let response = builder.send().await?.error_for_status()?;

        let issued = SessionCookies::from_headers(response.headers());
        let body = response.text().await?;

        Ok(SiteResponse {
            body,
            cookies: issued,
        })
    }
}
