//! アラジン保管箱フィードライブラリ
//!
//! - アラジンにログイン（キャプチャが出たら画像理解APIで解読）
//! - 保管箱ページから商品一覧を抽出
//! - RSS 2.0 フィードを生成
//!
//! # 使用例
//!
//! ```rust,ignore
//! use basket_feed::{BasketFeedService, FeedConfig, FeedRequest};
//! use tower::Service;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = FeedConfig::from_env().unwrap();
//!     let mut service = BasketFeedService::new();
//!
//!     let output = service.call(FeedRequest::new(config)).await.unwrap();
//!     println!("items: {}", output.items.len());
//!     std::fs::write("feed.xml", output.rss).unwrap();
//! }
//! ```
//!
//! # ステージ単位での使用例
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use basket_feed::{BasketScraper, Credentials, FeedBuilder, SessionAuthenticator, SiteClient};
//! use basket_feed::captcha::StaticCaptchaSolver;
//!
//! let client = SiteClient::new("https://www.aladin.co.kr", Duration::from_secs(60))?;
//! let mut auth = SessionAuthenticator::new(client.clone(), Arc::new(StaticCaptchaSolver::new("1234")));
//! let cookies = auth.authenticate(&Credentials::new("email", "password")).await?;
//! let items = BasketScraper::new(client).scrape(&cookies).await?;
//! let rss = basket_feed::feed::serialize(&FeedBuilder::new().build_now(&items)?)?;
//! ```

pub mod auth;
pub mod basket;
pub mod captcha;
pub mod config;
pub mod error;
pub mod feed;
pub mod http;
pub mod service;
pub mod traits;

// 主要な型をリエクスポート
pub use auth::{Credentials, SessionAuthenticator, SessionCookies};
pub use basket::{BasketItem, BasketPageContract, BasketScraper};
pub use config::FeedConfig;
pub use error::FeedError;
pub use feed::{FeedBuilder, FeedDocument};
pub use http::SiteClient;
pub use service::{BasketFeedService, FeedOutput, FeedRequest};
pub use traits::CaptchaSolver;
