//! キャプチャ解読モジュール
//!
//! 画像理解APIに画像を送り、4桁の数字を読み取らせる。

mod openai;
mod types;

pub use openai::{OpenAiCaptchaSolver, CAPTCHA_PROMPT};
pub use types::{CaptchaChallenge, CaptchaImage, StaticCaptchaSolver};
