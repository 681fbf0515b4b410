//! 保管箱ページの構造コントラクト
//!
//! セレクタはページのレイアウトに固定で依存している。レイアウトが変わったら
//! ここを更新して `version` を上げ、`tests/fixtures/` のHTMLも差し替えること。

use scraper::Selector;

use crate::error::FeedError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasketPageContract {
    pub version: u32,
    /// 保管箱ページのパス
    pub path: &'static str,
    /// 商品行
    pub row_selector: &'static str,
    /// 行内のタイトル/リンク
    pub anchor_selector: &'static str,
    pub price_selector: &'static str,
    pub saved_date_selector: &'static str,
    /// 直前の行から表紙画像を探すセレクタ
    pub cover_selector: &'static str,
    /// リンクから商品IDを読むクエリパラメータ
    pub item_id_param: &'static str,
    /// 保管日テキスト末尾の「〜日に保管」
    pub saved_on_suffix: &'static str,
    /// 表示モード Cookie（最大件数・シンプル表示）
    pub display_cookie: (&'static str, &'static str),
}

pub const BASKET_PAGE_V1: BasketPageContract = BasketPageContract {
    version: 1,
    path: "/shop/wsafebasket.aspx?start=we",
    row_selector: "#Myform > *:nth-child(2) > table > * > * > td tr:nth-child(2)",
    anchor_selector: "a",
    price_selector: ".ss_p",
    saved_date_selector: ".fontcolor_gray",
    cover_selector: "img",
    item_id_param: "ItemId",
    saved_on_suffix: "일에 보관",
    display_cookie: ("ordersavebasket", "ViewType=Simple&ViewRowsCount=96"),
};

impl Default for BasketPageContract {
    fn default() -> Self {
        BASKET_PAGE_V1
    }
}

/// パース済みセレクタ
pub(crate) struct CompiledContract {
    pub row: Selector,
    pub anchor: Selector,
    pub price: Selector,
    pub saved_date: Selector,
    pub cover: Selector,
}

impl BasketPageContract {
    pub(crate) fn compile(&self) -> Result<CompiledContract, FeedError> {
        Ok(CompiledContract {
            row: parse_selector(self.row_selector)?,
            anchor: parse_selector(self.anchor_selector)?,
            price: parse_selector(self.price_selector)?,
            saved_date: parse_selector(self.saved_date_selector)?,
            cover: parse_selector(self.cover_selector)?,
        })
    }
}

fn parse_selector(selector: &str) -> Result<Selector, FeedError> {
    Selector::parse(selector).map_err(|e| {
        FeedError::Scraping(format!("セレクタが不正です ({}): {}", selector, e))
    })
}
