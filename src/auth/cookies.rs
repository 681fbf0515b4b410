//! セッションCookie
//!
//! 各ステージは受け取った `SessionCookies` を変更せず、マージした新しい値を返す。

use std::fmt;

use reqwest::header::{HeaderMap, SET_COOKIE};

/// 名前で一意な Cookie の順序付き集合
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionCookies {
    entries: Vec<(String, String)>,
}

impl SessionCookies {
    pub fn new() -> Self {
        Self::default()
    }

    /// `name=value` 形式の文字列から作る。`=` を含まない要素は捨てる。
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        pairs
            .into_iter()
            .filter_map(|pair| split_pair(pair.as_ref()))
            .fold(Self::new(), |cookies, (name, value)| cookies.with(name, value))
    }

    /// レスポンスヘッダーの `Set-Cookie` から作る（属性部分は捨てる）
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self::from_pairs(
            headers
                .get_all(SET_COOKIE)
                .iter()
                .filter_map(|value| value.to_str().ok())
                .map(|value| value.split(';').next().unwrap_or_default().to_string()),
        )
    }

    /// Cookie を一つ追加した新しい集合を返す。同名なら値を上書きし位置は保つ。
    pub fn with(&self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        let mut entries = self.entries.clone();
        match entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => entries.push((name, value)),
        }
        Self { entries }
    }

    /// `later` の値を優先してマージする
    pub fn merge(&self, later: &SessionCookies) -> Self {
        later
            .entries
            .iter()
            .fold(self.clone(), |cookies, (name, value)| cookies.with(name, value))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `Cookie` リクエストヘッダーの値
    pub fn header_value(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SessionCookies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}={}", name, value)?;
        }
        Ok(())
    }
}

fn split_pair(pair: &str) -> Option<(String, String)> {
    let (name, value) = pair.trim().split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name.to_string(), value.trim().to_string()))
}
