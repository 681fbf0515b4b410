//! 結合テスト用のモックサイト

#![allow(dead_code)]

use std::time::Duration;

use basket_feed::{FeedConfig, SiteClient};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const LOGIN_PAGE: &str = include_str!("../fixtures/login.html");
pub const LOGIN_PAGE_CAPTCHA: &str = include_str!("../fixtures/login_captcha.html");
pub const LOGIN_FAILED: &str = include_str!("../fixtures/login_failed.html");
pub const LOGIN_OK: &str = include_str!("../fixtures/login_ok.html");
pub const BASKET_PAGE: &str = include_str!("../fixtures/basket.html");

pub const LOGIN_PATH: &str = "/login/wlogin.aspx";
pub const CAPTCHA_PATH: &str = "/ucl/aladdin/captcha.ashx";
pub const BASKET_PATH: &str = "/shop/wsafebasket.aspx";

/// PNG シグネチャだけのダミー画像
pub const CAPTCHA_PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

pub fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html; charset=utf-8")
        .set_body_string(body)
}

pub async fn mount_login_page(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path(LOGIN_PATH))
        .respond_with(html(body).insert_header("set-cookie", "ASP.NET_SessionId=abc123; path=/; HttpOnly"))
        .expect(1)
        .mount(server)
        .await;
}

pub async fn mount_login_submit(server: &MockServer, body: &str) {
    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(html(body).insert_header("set-cookie", "AladdinUser=reader; path=/"))
        .expect(1)
        .mount(server)
        .await;
}

pub fn config(server: &MockServer) -> FeedConfig {
    FeedConfig::new("reader@example.com", "secret", "sk-test")
        .with_base_url(server.uri())
        .with_captcha_image_path(None)
        .with_timeout(Duration::from_secs(5))
}

pub fn client(server: &MockServer) -> SiteClient {
    SiteClient::new(server.uri(), Duration::from_secs(5)).expect("client builds")
}
