//! 保管箱スクレイパーモジュール
//!
//! 認証済み Cookie で保管箱ページを取得し、商品行を `BasketItem` に変換する。

mod contract;
mod scrape;
mod types;

pub use contract::{BasketPageContract, BASKET_PAGE_V1};
pub use scrape::{normalize_saved_date, parse_basket, parse_price, parse_saved_date, BasketScraper};
pub use types::BasketItem;
