use std::path::PathBuf;

use anyhow::Context;
use basket_feed::{BasketFeedService, FeedConfig, FeedRequest};
use clap::Parser;
use tower::ServiceExt;
use tracing_subscriber::EnvFilter;

/// アラジンの保管箱を RSS フィードにする
#[derive(Debug, Parser)]
#[command(name = "basket-feed", version, about)]
struct Cli {
    /// フィードの出力先
    #[arg(short, long, default_value = "feed.xml")]
    output: PathBuf,

    /// 解読したキャプチャ画像の保存先（画像形式にかかわらずこのパスに書く）
    #[arg(long, default_value = "captcha.png")]
    captcha_image: PathBuf,

    /// キャプチャ画像を保存しない
    #[arg(long)]
    no_captcha_image: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // .env は任意
    let _ = dotenvy::dotenv();

    let captcha_image = (!cli.no_captcha_image).then_some(cli.captcha_image);
    let config = FeedConfig::from_env()?.with_captcha_image_path(captcha_image);

    let output = BasketFeedService::new()
        .oneshot(FeedRequest::new(config))
        .await?;

    tokio::fs::write(&cli.output, &output.rss)
        .await
        .with_context(|| format!("フィードを書き込めません: {}", cli.output.display()))?;

    tracing::info!(
        "Feed generated successfully: {} ({} items)",
        cli.output.display(),
        output.items.len()
    );
    Ok(())
}
