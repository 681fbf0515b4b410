mod common;

use std::sync::Arc;

use async_trait::async_trait;
use basket_feed::auth::AuthState;
use basket_feed::captcha::{CaptchaImage, StaticCaptchaSolver};
use basket_feed::{CaptchaSolver, Credentials, FeedError, SessionAuthenticator};
use chrono::{DateTime, Utc};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::*;

fn credentials() -> Credentials {
    Credentials::new("reader@example.com", "secret")
}

/// 常に失敗するソルバー
struct FailingSolver;

#[async_trait]
impl CaptchaSolver for FailingSolver {
    async fn solve(&self, _image: &CaptchaImage) -> Result<String, FeedError> {
        Err(FeedError::CaptchaService("inference unavailable".into()))
    }
}

async fn mount_captcha_image(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(CAPTCHA_PATH))
        .and(header("accept", "image/*"))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

fn png() -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "image/png")
        .set_body_bytes(CAPTCHA_PNG)
}

#[tokio::test]
async fn test_login_without_captcha() {
    let server = MockServer::start().await;
    mount_login_page(&server, LOGIN_PAGE).await;
    mount_login_submit(&server, LOGIN_OK).await;

    let solver = Arc::new(StaticCaptchaSolver::new("0000"));
    let mut auth = SessionAuthenticator::new(client(&server), solver.clone());

    let cookies = auth.authenticate(&credentials()).await.unwrap();

    assert_eq!(auth.state(), AuthState::Authenticated);
    assert_eq!(solver.calls(), 0);
    assert_eq!(
        cookies.header_value(),
        "ASP.NET_SessionId=abc123; AladdinUser=reader"
    );

    let requests = server.received_requests().await.unwrap();
    let submit = requests
        .iter()
        .find(|r| r.method.as_str() == "POST")
        .expect("login form submitted");
    let body = String::from_utf8_lossy(&submit.body);
    assert!(body.contains("Email=reader%40example.com"));
    assert!(body.contains("Action=1"));
    assert!(!body.contains("txtCaptcha"));
}

#[tokio::test]
async fn test_login_with_captcha_submits_answer() {
    let server = MockServer::start().await;
    mount_login_page(&server, LOGIN_PAGE_CAPTCHA).await;

    Mock::given(method("GET"))
        .and(path(CAPTCHA_PATH))
        .and(header("cookie", "ASP.NET_SessionId=abc123"))
        .and(header("accept", "image/*"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/png")
                .set_body_bytes(CAPTCHA_PNG),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .and(body_string_contains("txtCaptcha=4821"))
        .and(header("cookie", "ASP.NET_SessionId=abc123"))
        .respond_with(html(LOGIN_OK).insert_header("set-cookie", "AladdinUser=reader; path=/"))
        .expect(1)
        .mount(&server)
        .await;

    let solver = Arc::new(StaticCaptchaSolver::new("4821"));
    let mut auth = SessionAuthenticator::new(client(&server), solver.clone());

    let before = Utc::now();
    let cookies = auth.authenticate(&credentials()).await.unwrap();
    let after = Utc::now();

    assert_eq!(solver.calls(), 1);
    assert_eq!(cookies.get("AladdinUser"), Some("reader"));
    assert_eq!(cookies.get("ASP.NET_SessionId"), Some("abc123"));

    // 画像URLには取得時刻（GMT）が付く
    let requests = server.received_requests().await.unwrap();
    let captcha = requests
        .iter()
        .find(|r| r.url.path() == CAPTCHA_PATH)
        .expect("captcha image requested");
    let stamp = captcha
        .url
        .query_pairs()
        .find(|(key, _)| key == "x")
        .map(|(_, value)| value.into_owned())
        .expect("cache-busting parameter");
    assert!(stamp.ends_with(" GMT"), "{stamp}");
    let issued = DateTime::parse_from_rfc2822(&stamp).unwrap();
    assert!(issued.timestamp() >= before.timestamp());
    assert!(issued.timestamp() <= after.timestamp());
}

#[tokio::test]
async fn test_captcha_solver_failure_stops_login() {
    let server = MockServer::start().await;
    mount_login_page(&server, LOGIN_PAGE_CAPTCHA).await;
    mount_captcha_image(&server, png()).await;
    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(html(LOGIN_OK))
        .expect(0)
        .mount(&server)
        .await;

    let mut auth = SessionAuthenticator::new(client(&server), Arc::new(FailingSolver));

    let err = auth.authenticate(&credentials()).await.unwrap_err();

    assert!(matches!(err, FeedError::CaptchaService(_)));
    assert_eq!(auth.state(), AuthState::CaptchaRequired);
}

#[tokio::test]
async fn test_captcha_cookie_is_carried_to_submit() {
    let server = MockServer::start().await;
    // ログインページは Cookie を発行しない
    Mock::given(method("GET"))
        .and(path(LOGIN_PATH))
        .respond_with(html(LOGIN_PAGE_CAPTCHA))
        .expect(1)
        .mount(&server)
        .await;
    mount_captcha_image(
        &server,
        png().insert_header("set-cookie", "CaptchaToken=t1; path=/"),
    )
    .await;
    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .and(header("cookie", "CaptchaToken=t1"))
        .respond_with(html(LOGIN_OK).insert_header("set-cookie", "AladdinUser=reader; path=/"))
        .expect(1)
        .mount(&server)
        .await;

    let mut auth = SessionAuthenticator::new(
        client(&server),
        Arc::new(StaticCaptchaSolver::new("4821")),
    );

    let cookies = auth.authenticate(&credentials()).await.unwrap();
    assert_eq!(cookies.header_value(), "CaptchaToken=t1; AladdinUser=reader");

    // 空の Cookie ヘッダーは送らない
    let requests = server.received_requests().await.unwrap();
    assert!(requests
        .iter()
        .filter(|r| r.method.as_str() == "GET")
        .all(|r| !r.headers.contains_key("cookie")));
}

#[tokio::test]
async fn test_login_failure_message_is_surfaced() {
    let server = MockServer::start().await;
    mount_login_page(&server, LOGIN_PAGE).await;
    mount_login_submit(&server, LOGIN_FAILED).await;

    let solver = Arc::new(StaticCaptchaSolver::new("0000"));
    let mut auth = SessionAuthenticator::new(client(&server), solver);

    let err = auth.authenticate(&credentials()).await.unwrap_err();

    assert_eq!(auth.state(), AuthState::LoginFailed);
    match err {
        FeedError::Login(message) => {
            assert_eq!(message, "아이디 또는 비밀번호가 일치하지 않습니다")
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_server_error_is_network_fault() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(LOGIN_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let mut auth = SessionAuthenticator::new(
        client(&server),
        Arc::new(StaticCaptchaSolver::new("0000")),
    );

    let err = auth.authenticate(&credentials()).await.unwrap_err();
    assert!(matches!(err, FeedError::Network(_)));
}
