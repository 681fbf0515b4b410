//! ログイン処理
//!
//! ログインページ取得 → （必要なら）キャプチャ解読 → フォーム送信 の順に進み、
//! 認証済み Cookie を返す。リトライはしない。

use std::sync::{Arc, OnceLock};

use chrono::Utc;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::{debug, info, warn};

use crate::captcha::{CaptchaChallenge, CaptchaImage};
use crate::error::FeedError;
use crate::http::SiteClient;
use crate::traits::CaptchaSolver;

use super::cookies::SessionCookies;

pub const LOGIN_PATH: &str = "/login/wlogin.aspx?returnurl=/";
const CAPTCHA_IMAGE_PATH: &str = "/ucl/aladdin/captcha.ashx";
const CAPTCHA_MARKER: &str = "#imgCaptcha";
const CAPTCHA_FIELD: &str = "txtCaptcha";
/// ログイン成功時のレスポンスに含まれるリダイレクト命令
const REDIRECT_MARKER: &str = "document.location.href";

/// ログイン情報
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// ログイン処理の状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Init,
    LoginPageFetched,
    CaptchaRequired,
    NoCaptcha,
    CredentialsSubmitted,
    Authenticated,
    LoginFailed,
}

/// ログインページにキャプチャ画像があるか
pub fn has_captcha(html: &str) -> bool {
    let document = Html::parse_document(html);
    match Selector::parse(CAPTCHA_MARKER) {
        Ok(selector) => document.select(&selector).next().is_some(),
        Err(_) => false,
    }
}

/// ログイン失敗時に埋め込まれる `<script>alert("...")` のメッセージ
pub fn find_login_failure(html: &str) -> Option<String> {
    static ALERT: OnceLock<Regex> = OnceLock::new();
    let re = ALERT.get_or_init(|| {
        Regex::new(r#"<script>alert\("(.*)"\)"#).expect("alert pattern is valid")
    });
    re.captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

pub struct SessionAuthenticator {
    client: SiteClient,
    solver: Arc<dyn CaptchaSolver>,
    state: AuthState,
}

impl SessionAuthenticator {
    pub fn new(client: SiteClient, solver: Arc<dyn CaptchaSolver>) -> Self {
        Self {
            client,
            solver,
            state: AuthState::Init,
        }
    }

    /// 直近の状態
    pub fn state(&self) -> AuthState {
        self.state
    }

    /// ログインして認証済み Cookie を返す
    pub async fn authenticate(
        &mut self,
        credentials: &Credentials,
    ) -> Result<SessionCookies, FeedError> {
        self.state = AuthState::Init;
        info!("Fetching login page...");

        let login_page = self.client.get(LOGIN_PATH, &SessionCookies::new()).await?;
        let page_cookies = login_page.cookies;
        self.state = AuthState::LoginPageFetched;
        debug!(cookies = page_cookies.len(), "Login page fetched");

        // キャプチャ取得時に発行された Cookie もフォーム送信に引き継ぐ
        let (captcha_answer, submit_cookies) = if has_captcha(&login_page.body) {
            self.state = AuthState::CaptchaRequired;
            info!("Captcha detected, solving...");
            let challenge = self.fetch_captcha(&page_cookies).await?;
            let answer = self.solver.solve(&challenge.image).await?;
            (Some(answer), challenge.cookies)
        } else {
            self.state = AuthState::NoCaptcha;
            debug!("No captcha on login page");
            (None, page_cookies)
        };

        let form = login_form(credentials, captcha_answer.as_deref());
        info!("Submitting login form...");
        let response = self
            .client
            .post_form(LOGIN_PATH, &form, &submit_cookies)
            .await?;
        self.state = AuthState::CredentialsSubmitted;

        if let Some(message) = find_login_failure(&response.body) {
            self.state = AuthState::LoginFailed;
            warn!("Login failed: {}", message);
            return Err(FeedError::Login(message));
        }

        // 成功判定は失敗マーカーの有無のみ。リダイレクト命令がなくても失敗にはしない。
        if !response.body.contains(REDIRECT_MARKER) {
            warn!("Login response has no redirect instruction; treating as authenticated");
        }

        let cookies = submit_cookies.merge(&response.cookies);
        self.state = AuthState::Authenticated;
        info!(cookies = cookies.len(), "Login succeeded");
        Ok(cookies)
    }

    /// キャッシュを避けるため現在時刻をクエリに付けて画像を取得する
    async fn fetch_captcha(
        &self,
        cookies: &SessionCookies,
    ) -> Result<CaptchaChallenge, FeedError> {
        let timestamp = Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        let url = url::Url::parse_with_params(
            &self.client.url(CAPTCHA_IMAGE_PATH),
            &[("x", timestamp.as_str())],
        )
        .map_err(|e| FeedError::Configuration(format!("キャプチャURLが不正です: {}", e)))?;

        let response = self
            .client
            .get_bytes(url.as_str(), "image/*", cookies)
            .await?;
        debug!(bytes = response.bytes.len(), "Captcha image fetched");

        Ok(CaptchaChallenge {
            image: CaptchaImage::new(response.bytes, response.content_type),
            cookies: cookies.merge(&response.cookies),
        })
    }
}

fn login_form(credentials: &Credentials, captcha_answer: Option<&str>) -> Vec<(String, String)> {
    let mut form = vec![
        ("Email".to_string(), credentials.email.clone()),
        ("Password".to_string(), credentials.password.clone()),
        ("Action".to_string(), "1".to_string()),
        ("ReturnUrl".to_string(), String::new()),
    ];
    if let Some(answer) = captcha_answer {
        form.push((CAPTCHA_FIELD.to_string(), answer.to_string()));
    }
    form
}
