use async_trait::async_trait;

use crate::captcha::CaptchaImage;
use crate::error::FeedError;

/// キャプチャ解読
///
/// ネットワーク実装 (`OpenAiCaptchaSolver`) とテスト用の固定応答実装
/// (`StaticCaptchaSolver`) がある。
#[async_trait]
pub trait CaptchaSolver: Send + Sync {
    /// 画像から数字列を読み取る
    async fn solve(&self, image: &CaptchaImage) -> Result<String, FeedError>;
}
