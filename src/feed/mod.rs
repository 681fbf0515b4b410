//! フィード生成モジュール
//!
//! `BasketItem` の一覧を RSS 2.0 ドキュメントにする。

mod builder;
mod rss;
mod types;

pub use builder::FeedBuilder;
pub use rss::serialize;
pub use types::{EntryContent, FeedAuthor, FeedDocument, FeedEntry, FeedMetadata};
