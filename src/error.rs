use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("設定エラー: {0}")]
    Configuration(String),

    /// サーバーが返したログイン失敗メッセージ（そのまま保持）
    #[error("ログインエラー: {0}")]
    Login(String),

    #[error("キャプチャ解析エラー: {0}")]
    CaptchaService(String),

    /// ページ構造がコントラクトと一致しない
    #[error("スクレイピングエラー: {0}")]
    Scraping(String),

    #[error("通信エラー: {0}")]
    Network(#[from] reqwest::Error),

    #[error("ファイル操作エラー: {0}")]
    FileIO(#[from] std::io::Error),

    #[error("フィード生成エラー: {0}")]
    Feed(String),
}
