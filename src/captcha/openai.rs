//! OpenAI Chat Completions を使ったキャプチャ解読

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::FeedConfig;
use crate::error::FeedError;
use crate::traits::CaptchaSolver;

use super::types::CaptchaImage;

pub const CAPTCHA_PROMPT: &str =
    "What is the 4 numbers in this image? Please include only 4 numbers in your response.";

/// 想定する答えの桁数
const EXPECTED_DIGITS: usize = 4;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponseRaw {
    #[serde(default)]
    choices: Vec<ChoiceRaw>,
}

#[derive(Debug, Deserialize)]
struct ChoiceRaw {
    message: MessageRaw,
}

#[derive(Debug, Deserialize)]
struct MessageRaw {
    content: Option<String>,
}

/// 画像理解APIにキャプチャを送るソルバー
#[derive(Debug, Clone)]
pub struct OpenAiCaptchaSolver {
    http_client: reqwest::Client,
    api_key: String,
    endpoint: String,
    model: String,
    audit_path: Option<PathBuf>,
}

impl OpenAiCaptchaSolver {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, FeedError> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        let defaults = FeedConfig::default();
        Ok(Self {
            http_client,
            api_key: api_key.into(),
            endpoint: defaults.inference_url,
            model: defaults.model,
            audit_path: None,
        })
    }

    pub fn from_config(config: &FeedConfig) -> Result<Self, FeedError> {
        Ok(Self::new(&config.api_key, config.timeout)?
            .with_endpoint(&config.inference_url)
            .with_model(&config.model)
            .with_audit_path(config.captcha_image_path.clone()))
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// 解読した画像の保存先。`None` なら保存しない。
    ///
    /// 画像形式にかかわらず指定どおりのパスに書き込む。
    pub fn with_audit_path(mut self, path: Option<PathBuf>) -> Self {
        self.audit_path = path;
        self
    }

    /// 監査用に画像を保存する。失敗しても解読は続ける。
    async fn save_image(&self, image: &CaptchaImage) {
        let Some(path) = &self.audit_path else {
            return;
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                warn!("Failed to create captcha image directory: {}", e);
                return;
            }
        }

        match tokio::fs::write(path, &image.bytes).await {
            Ok(()) => info!("Saved captcha image to {}", path.display()),
            Err(e) => warn!("Failed to save captcha image: {}", e),
        }
    }
}

/// 最初の choice の本文を取り出す
fn extract_answer(body: &str) -> Result<String, FeedError> {
    let response: ChatResponseRaw = serde_json::from_str(body)
        .map_err(|e| FeedError::CaptchaService(format!("レスポンスが不正です: {}", e)))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .ok_or_else(|| FeedError::CaptchaService("choices が空です".into()))
}

#[async_trait]
impl CaptchaSolver for OpenAiCaptchaSolver {
    async fn solve(&self, image: &CaptchaImage) -> Result<String, FeedError> {
        let start = std::time::Instant::now();
        self.save_image(image).await;

        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text {
                        text: CAPTCHA_PROMPT,
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: image.data_url(),
                        },
                    },
                ],
            }],
        };

        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            warn!(status = %status, "Captcha inference API error");
            return Err(FeedError::CaptchaService(format!(
                "APIエラー ({}): {}",
                status, body
            )));
        }

        let answer = extract_answer(&body)?;
        if answer.len() != EXPECTED_DIGITS || !answer.chars().all(|c| c.is_ascii_digit()) {
            warn!(answer = %answer, "Captcha answer is not a {}-digit number", EXPECTED_DIGITS);
        }

        debug!(
            model = %self.model,
            duration_ms = start.elapsed().as_millis(),
            "Captcha solved"
        );
        Ok(answer)
    }
}
