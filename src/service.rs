use std::sync::Arc;
use std::task::{Context, Poll};

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use tower::Service;
use tracing::info;

use crate::auth::{Credentials, SessionAuthenticator};
use crate::basket::{BasketItem, BasketPageContract, BasketScraper};
use crate::captcha::OpenAiCaptchaSolver;
use crate::config::FeedConfig;
use crate::error::FeedError;
use crate::feed::{serialize, FeedBuilder, FeedDocument, FeedMetadata};
use crate::http::SiteClient;
use crate::traits::CaptchaSolver;

/// フィード生成リクエスト
#[derive(Debug, Clone)]
pub struct FeedRequest {
    pub config: FeedConfig,
    /// フィードの更新日時（未指定なら現在時刻）
    pub updated: Option<DateTime<Utc>>,
}

impl FeedRequest {
    pub fn new(config: FeedConfig) -> Self {
        Self {
            config,
            updated: None,
        }
    }

    pub fn with_updated(mut self, updated: DateTime<Utc>) -> Self {
        self.updated = Some(updated);
        self
    }
}

impl From<FeedConfig> for FeedRequest {
    fn from(config: FeedConfig) -> Self {
        Self::new(config)
    }
}

/// フィード生成結果
#[derive(Debug, Clone)]
pub struct FeedOutput {
    pub items: Vec<BasketItem>,
    pub document: FeedDocument,
    /// RSS 2.0 文字列
    pub rss: String,
}

/// tower::Serviceを実装したフィード生成サービス
///
/// ログイン → 保管箱取得 → フィード生成 を1リクエストで順に実行する。
/// どこかで失敗したら部分的な結果は返さない。
#[derive(Clone, Default)]
pub struct BasketFeedService {
    /// 未設定ならリクエストの設定から `OpenAiCaptchaSolver` を作る
    solver: Option<Arc<dyn CaptchaSolver>>,
    contract: BasketPageContract,
    metadata: FeedMetadata,
}

impl BasketFeedService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_solver(mut self, solver: Arc<dyn CaptchaSolver>) -> Self {
        self.solver = Some(solver);
        self
    }

    pub fn with_contract(mut self, contract: BasketPageContract) -> Self {
        self.contract = contract;
        self
    }

    pub fn with_metadata(mut self, metadata: FeedMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

impl Service<FeedRequest> for BasketFeedService {
    type Response = FeedOutput;
    type Error = FeedError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: FeedRequest) -> Self::Future {
        let this = self.clone();
        Box::pin(async move { this.run(req).await })
    }
}

impl BasketFeedService {
    async fn run(self, req: FeedRequest) -> Result<FeedOutput, FeedError> {
        let FeedRequest { config, updated } = req;
        config.validate()?;
        info!("フィード生成リクエスト受信: email={}", config.email);

        let solver = match self.solver {
            Some(solver) => solver,
            None => Arc::new(OpenAiCaptchaSolver::from_config(&config)?),
        };
        let client = SiteClient::new(&config.base_url, config.timeout)?;

        let credentials = Credentials::new(&config.email, &config.password);
        let mut authenticator = SessionAuthenticator::new(client.clone(), solver);
        let cookies = authenticator.authenticate(&credentials).await?;

        let scraper = BasketScraper::with_contract(client, self.contract);
        let items = scraper.scrape(&cookies).await?;

        let builder = FeedBuilder::new().with_metadata(self.metadata);
        let document = builder.build(&items, updated.unwrap_or_else(Utc::now))?;
        let rss = serialize(&document)?;

        info!(
            "フィード生成完了: items={}, size={}bytes",
            items.len(),
            rss.len()
        );

        Ok(FeedOutput {
            items,
            document,
            rss,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower::ServiceExt;

    #[test]
    fn test_feed_request_builder() {
        let updated = Utc::now();
        let req = FeedRequest::new(FeedConfig::new("user", "pass", "key")).with_updated(updated);

        assert_eq!(req.config.email, "user");
        assert_eq!(req.updated, Some(updated));
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_before_network() {
        // 接続先は存在しないが、設定エラーが先に返る
        let config = FeedConfig::new("", "pass", "key").with_base_url("http://127.0.0.1:9");

        let err = BasketFeedService::new()
            .oneshot(FeedRequest::new(config))
            .await
            .unwrap_err();

        assert!(matches!(err, FeedError::Configuration(_)));
    }
}
