//! 保管箱関連の型定義

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 保管箱の商品1件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasketItem {
    /// リンクの `ItemId` クエリ値
    pub id: String,
    pub title: String,
    pub link: String,
    /// 価格（取得できなければ 0）
    pub price: u64,
    /// ページ上の価格表記（"12,300" など）
    pub price_text: Option<String>,
    pub cover_image: Option<String>,
    /// 保管日
    pub saved_on: NaiveDate,
}
