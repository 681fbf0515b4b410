//! 保管箱ページの取得とパース

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use scraper::{ElementRef, Html};
use tracing::{debug, info};
use url::Url;

use crate::auth::SessionCookies;
use crate::error::FeedError;
use crate::http::SiteClient;

use super::contract::{BasketPageContract, CompiledContract};
use super::types::BasketItem;

pub struct BasketScraper {
    client: SiteClient,
    contract: BasketPageContract,
}

impl BasketScraper {
    pub fn new(client: SiteClient) -> Self {
        Self::with_contract(client, BasketPageContract::default())
    }

    pub fn with_contract(client: SiteClient, contract: BasketPageContract) -> Self {
        Self { client, contract }
    }

    /// 保管箱ページを取得して商品一覧を返す（ページ上の順序のまま）
    pub async fn scrape(&self, cookies: &SessionCookies) -> Result<Vec<BasketItem>, FeedError> {
        let (name, value) = self.contract.display_cookie;
        let cookies = cookies.with(name, value);

        info!("Fetching basket page...");
        let page = self.client.get(self.contract.path, &cookies).await?;
        debug!(bytes = page.body.len(), "Basket page fetched");

        let base_url = Url::parse(self.client.base_url())
            .map_err(|e| FeedError::Configuration(format!("ベースURLが不正です: {}", e)))?;

        let items = parse_basket(&page.body, &self.contract, &base_url)?;
        info!(items = items.len(), "Basket items extracted");
        Ok(items)
    }
}

/// 保管箱HTMLをパースする
///
/// 行が一つもない、または必須要素が欠けている行がある場合は
/// `FeedError::Scraping` を返す（部分的な結果は返さない）。
pub fn parse_basket(
    html: &str,
    contract: &BasketPageContract,
    base_url: &Url,
) -> Result<Vec<BasketItem>, FeedError> {
    let selectors = contract.compile()?;
    let document = Html::parse_document(html);

    let items = document
        .select(&selectors.row)
        .enumerate()
        .map(|(index, row)| parse_row(index, row, &selectors, contract, base_url))
        .collect::<Result<Vec<_>, _>>()?;

    if items.is_empty() {
        return Err(FeedError::Scraping(format!(
            "商品行が見つかりません (contract v{}: {})",
            contract.version, contract.row_selector
        )));
    }

    Ok(items)
}

fn parse_row(
    index: usize,
    row: ElementRef<'_>,
    selectors: &CompiledContract,
    contract: &BasketPageContract,
    base_url: &Url,
) -> Result<BasketItem, FeedError> {
    let fault = |what: &str| FeedError::Scraping(format!("{}行目: {}", index + 1, what));

    let anchor = row
        .select(&selectors.anchor)
        .next()
        .ok_or_else(|| fault("リンクがありません"))?;
    let title = element_text(anchor);
    let href = anchor
        .value()
        .attr("href")
        .ok_or_else(|| fault("リンクに href がありません"))?;

    let link = base_url
        .join(href)
        .map_err(|e| fault(&format!("リンクが不正です ({}): {}", href, e)))?;
    let id = link
        .query_pairs()
        .find(|(key, _)| key == contract.item_id_param)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| fault(&format!("{} がありません: {}", contract.item_id_param, href)))?;

    let price_text = row.select(&selectors.price).next().map(element_text);
    let price = parse_price(price_text.as_deref());

    let raw_date = row
        .select(&selectors.saved_date)
        .next()
        .map(element_text)
        .ok_or_else(|| fault("保管日がありません"))?;
    let normalized = normalize_saved_date(&raw_date, contract.saved_on_suffix);
    let saved_on = parse_saved_date(&normalized)
        .ok_or_else(|| fault(&format!("保管日を解釈できません: {}", raw_date)))?;

    // 表紙画像は同じ行ではなく直前の行にある
    let cover_image = row
        .prev_siblings()
        .find_map(ElementRef::wrap)
        .and_then(|prev| prev.select(&selectors.cover).next())
        .and_then(|img| img.value().attr("src"))
        .map(|src| src.to_string());

    Ok(BasketItem {
        id,
        title,
        link: link.to_string(),
        price,
        price_text,
        cover_image,
        saved_on,
    })
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// 価格表記を整数にする。桁区切りを除いた先頭の数字を読み、なければ 0。
pub fn parse_price(text: Option<&str>) -> u64 {
    let Some(text) = text else {
        return 0;
    };
    let digits: String = text
        .replace(',', "")
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

/// 「2025년 1월 2일에 보관」→「2025-1-2」
///
/// 末尾の保管フレーズと空白を除き、数字以外の連続を `-` 一つに置き換える。
pub fn normalize_saved_date(text: &str, saved_on_suffix: &str) -> String {
    static NON_DIGITS: OnceLock<Regex> = OnceLock::new();
    let re = NON_DIGITS.get_or_init(|| Regex::new(r"\D+").expect("non-digit pattern is valid"));

    let trimmed = text.trim();
    let without_suffix = trimmed.strip_suffix(saved_on_suffix).unwrap_or(trimmed);
    let compact: String = without_suffix.chars().filter(|c| !c.is_whitespace()).collect();

    re.replace_all(&compact, "-").trim_matches('-').to_string()
}

/// `YYYY-M-D` 形式（ゼロ埋めなしも可）を日付にする
pub fn parse_saved_date(normalized: &str) -> Option<NaiveDate> {
    let mut parts = normalized.split('-');
    let year = parts.next()?.parse().ok()?;
    let month = parts.next()?.parse().ok()?;
    let day = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}
