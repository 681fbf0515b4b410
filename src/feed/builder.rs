use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use tracing::debug;

use crate::basket::BasketItem;
use crate::error::FeedError;

use super::types::{EntryContent, FeedDocument, FeedEntry, FeedMetadata};

/// 保管日は韓国時間 (UTC+9) の0時として扱う
const KST_OFFSET_SECS: i32 = 9 * 3600;

#[derive(Debug, Clone, Default)]
pub struct FeedBuilder {
    metadata: FeedMetadata,
}

impl FeedBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metadata(mut self, metadata: FeedMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// 現在時刻を更新日時としてドキュメントを作る
    pub fn build_now(&self, items: &[BasketItem]) -> Result<FeedDocument, FeedError> {
        self.build(items, Utc::now())
    }

    /// 商品1件につきエントリ1件、順序はそのまま
    pub fn build(
        &self,
        items: &[BasketItem],
        updated: DateTime<Utc>,
    ) -> Result<FeedDocument, FeedError> {
        let entries = items
            .iter()
            .map(|item| self.entry(item))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(entries = entries.len(), "Feed document built");

        Ok(FeedDocument {
            metadata: self.metadata.clone(),
            updated,
            entries,
        })
    }

    fn entry(&self, item: &BasketItem) -> Result<FeedEntry, FeedError> {
        let cover = item.cover_image.as_deref().unwrap_or_default();
        let price_text = item
            .price_text
            .clone()
            .unwrap_or_else(|| item.price.to_string());

        let content = serde_json::to_string(&EntryContent {
            price: item.price,
            cover_image: item.cover_image.clone(),
        })
        .map_err(|e| FeedError::Feed(format!("content のシリアライズに失敗: {}", e)))?;

        Ok(FeedEntry {
            id: item.id.clone(),
            guid: item.id.clone(),
            title: item.title.clone(),
            link: item.link.clone(),
            description: format!("![]({})\n  {}원", cover, price_text),
            content,
            author: self.metadata.author.clone(),
            published: published_at(item)?,
        })
    }
}

fn published_at(item: &BasketItem) -> Result<DateTime<FixedOffset>, FeedError> {
    let kst = FixedOffset::east_opt(KST_OFFSET_SECS)
        .ok_or_else(|| FeedError::Feed("タイムゾーンが不正です".into()))?;
    let midnight = item
        .saved_on
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| FeedError::Feed(format!("保管日が不正です: {}", item.saved_on)))?;

    kst.from_local_datetime(&midnight)
        .single()
        .ok_or_else(|| FeedError::Feed(format!("保管日が不正です: {}", item.saved_on)))
}
