//! キャプチャ関連の型定義

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use base64::Engine;

use crate::auth::SessionCookies;
use crate::error::FeedError;
use crate::traits::CaptchaSolver;

/// キャプチャ画像
#[derive(Debug, Clone)]
pub struct CaptchaImage {
    pub bytes: Vec<u8>,
    /// `Content-Type`（不明なら `image/png` とみなす）
    pub content_type: String,
}

impl CaptchaImage {
    pub fn new(bytes: Vec<u8>, content_type: Option<String>) -> Self {
        let content_type = content_type
            .map(|ct| ct.split(';').next().unwrap_or_default().trim().to_string())
            .filter(|ct| ct.starts_with("image/"))
            .unwrap_or_else(|| "image/png".to_string());
        Self {
            bytes,
            content_type,
        }
    }

    /// 送信用の data URL
    pub fn data_url(&self) -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&self.bytes);
        format!("data:{};base64,{}", self.content_type, encoded)
    }
}

/// ログイン中に発行されたキャプチャ（画像 + 取得後の Cookie）
#[derive(Debug, Clone)]
pub struct CaptchaChallenge {
    pub image: CaptchaImage,
    pub cookies: SessionCookies,
}

/// 固定の答えを返すソルバー（テスト・オフライン確認用）
#[derive(Debug, Default)]
pub struct StaticCaptchaSolver {
    answer: String,
    calls: AtomicUsize,
}

impl StaticCaptchaSolver {
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            calls: AtomicUsize::new(0),
        }
    }

    /// `solve` が呼ばれた回数
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CaptchaSolver for StaticCaptchaSolver {
    async fn solve(&self, _image: &CaptchaImage) -> Result<String, FeedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.answer.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_normalized() {
        let image = CaptchaImage::new(vec![1, 2, 3], Some("image/gif; charset=binary".into()));
        assert_eq!(image.content_type, "image/gif");

        let unknown = CaptchaImage::new(vec![1, 2, 3], Some("text/html".into()));
        assert_eq!(unknown.content_type, "image/png");
    }

    #[test]
    fn test_data_url() {
        let image = CaptchaImage::new(b"abc".to_vec(), None);
        assert_eq!(image.data_url(), "data:image/png;base64,YWJj");
    }

    #[tokio::test]
    async fn test_static_solver_counts_calls() {
        let solver = StaticCaptchaSolver::new("1234");
        let image = CaptchaImage::new(vec![0], None);

        assert_eq!(solver.solve(&image).await.unwrap(), "1234");
        assert_eq!(solver.solve(&image).await.unwrap(), "1234");
        assert_eq!(solver.calls(), 2);
    }
}
