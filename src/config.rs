use std::path::PathBuf;
use std::time::Duration;

use crate::error::FeedError;

pub const DEFAULT_BASE_URL: &str = "https://www.aladin.co.kr";
pub const DEFAULT_INFERENCE_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o";

pub const ENV_EMAIL: &str = "ALADIN_EMAIL";
pub const ENV_PASSWORD: &str = "ALADIN_PASSWORD";
pub const ENV_API_KEY: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub email: String,
    pub password: String,
    pub api_key: String,
    pub base_url: String,
    pub inference_url: String,
    pub model: String,
    /// キャプチャ画像の保存先（監査用）
    pub captcha_image_path: Option<PathBuf>,
    pub timeout: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            inference_url: DEFAULT_INFERENCE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            captcha_image_path: Some(PathBuf::from("captcha.png")),
            timeout: Duration::from_secs(60),
        }
    }
}

impl FeedConfig {
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// 環境変数から必須値を読み込む
    ///
    /// 未設定・空文字の変数はまとめて `Configuration` エラーとして返す。
    pub fn from_env() -> Result<Self, FeedError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, FeedError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let mut read = |key: &'static str| match lookup(key) {
            Some(value) if !value.is_empty() => value,
            _ => {
                missing.push(key);
                String::new()
            }
        };

        let email = read(ENV_EMAIL);
        let password = read(ENV_PASSWORD);
        let api_key = read(ENV_API_KEY);

        if !missing.is_empty() {
            return Err(FeedError::Configuration(format!(
                "必須の環境変数が設定されていません: {}",
                missing.join(", ")
            )));
        }

        Ok(Self::new(email, password, api_key))
    }

    /// 必須値が空でないことを確認する（通信前に呼ぶ）
    pub fn validate(&self) -> Result<(), FeedError> {
        let missing: Vec<&str> = [
            ("email", &self.email),
            ("password", &self.password),
            ("api_key", &self.api_key),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(FeedError::Configuration(format!(
                "必須の設定値が空です: {}",
                missing.join(", ")
            )))
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_inference_url(mut self, url: impl Into<String>) -> Self {
        self.inference_url = url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_captcha_image_path(mut self, path: Option<PathBuf>) -> Self {
        self.captcha_image_path = path;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
