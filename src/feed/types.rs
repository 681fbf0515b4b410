//! フィード関連の型定義

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedAuthor {
    pub name: String,
    pub link: String,
}

impl Default for FeedAuthor {
    fn default() -> Self {
        Self {
            name: "chitacan".to_string(),
            link: "https://github.com/chitacan".to_string(),
        }
    }
}

/// チャンネル情報（商品からは導出しない固定値）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedMetadata {
    pub title: String,
    pub description: String,
    pub id: String,
    pub link: String,
    pub image: String,
    /// RSS 2.0 には対応する要素がないため出力しない
    pub favicon: String,
    pub copyright: String,
    pub author: FeedAuthor,
    pub generator: String,
}

impl Default for FeedMetadata {
    fn default() -> Self {
        Self {
            title: "aladin basket".to_string(),
            description: "chitacan's personal dogdrip feed".to_string(),
            id: "aladin".to_string(),
            link: "https://www.aladin.co.kr/shop/wsafebasket.aspx".to_string(),
            image: "https://image.aladin.co.kr/img/logo_big.jpg".to_string(),
            favicon: "https://image.aladin.co.kr/img/home/aladin.ico".to_string(),
            copyright: "All rights reserved 2025, chiatacn".to_string(),
            author: FeedAuthor::default(),
            generator: concat!("basket-feed ", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// `content:encoded` に入れる機械向けデータ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryContent {
    pub price: u64,
    #[serde(rename = "coverImage", skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub id: String,
    pub guid: String,
    pub title: String,
    pub link: String,
    /// 表紙画像と価格表記の2行
    pub description: String,
    /// `EntryContent` の JSON
    pub content: String,
    pub author: FeedAuthor,
    pub published: DateTime<FixedOffset>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedDocument {
    pub metadata: FeedMetadata,
    pub updated: DateTime<Utc>,
    pub entries: Vec<FeedEntry>,
}
