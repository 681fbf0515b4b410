//! RSS 2.0 シリアライザ

use chrono::{DateTime, TimeZone};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::FeedError;

use super::types::{FeedDocument, FeedEntry};

const RSS_DOCS: &str = "https://validator.w3.org/feed/docs/rss2.html";
const NS_DC: &str = "http://purl.org/dc/elements/1.1/";
const NS_CONTENT: &str = "http://purl.org/rss/1.0/modules/content/";

type XmlWriter = Writer<Vec<u8>>;

/// ドキュメントを RSS 2.0 の文字列にする
///
/// 同じドキュメントからは常に同じ文字列ができる。
pub fn serialize(document: &FeedDocument) -> Result<String, FeedError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    write(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    write(
        &mut writer,
        Event::Start(BytesStart::new("rss").with_attributes([
            ("version", "2.0"),
            ("xmlns:dc", NS_DC),
            ("xmlns:content", NS_CONTENT),
        ])),
    )?;
    write(&mut writer, Event::Start(BytesStart::new("channel")))?;

    let meta = &document.metadata;
    text_element(&mut writer, "title", &meta.title)?;
    text_element(&mut writer, "link", &meta.link)?;
    text_element(&mut writer, "description", &meta.description)?;
    text_element(&mut writer, "lastBuildDate", &rfc2822(&document.updated))?;
    text_element(&mut writer, "docs", RSS_DOCS)?;
    text_element(&mut writer, "generator", &meta.generator)?;

    write(&mut writer, Event::Start(BytesStart::new("image")))?;
    text_element(&mut writer, "title", &meta.title)?;
    text_element(&mut writer, "url", &meta.image)?;
    text_element(&mut writer, "link", &meta.link)?;
    write(&mut writer, Event::End(BytesEnd::new("image")))?;

    text_element(&mut writer, "copyright", &meta.copyright)?;

    for entry in &document.entries {
        write_item(&mut writer, entry)?;
    }

    write(&mut writer, Event::End(BytesEnd::new("channel")))?;
    write(&mut writer, Event::End(BytesEnd::new("rss")))?;

    String::from_utf8(writer.into_inner())
        .map_err(|e| FeedError::Feed(format!("UTF-8 変換に失敗: {}", e)))
}

fn write_item(writer: &mut XmlWriter, entry: &FeedEntry) -> Result<(), FeedError> {
    write(writer, Event::Start(BytesStart::new("item")))?;
    text_element(writer, "title", &entry.title)?;
    text_element(writer, "link", &entry.link)?;

    write(
        writer,
        Event::Start(BytesStart::new("guid").with_attributes([("isPermaLink", "false")])),
    )?;
    write(writer, Event::Text(BytesText::new(&entry.guid)))?;
    write(writer, Event::End(BytesEnd::new("guid")))?;

    text_element(writer, "dc:creator", &entry.author.name)?;
    text_element(writer, "pubDate", &rfc2822(&entry.published))?;
    text_element(writer, "description", &entry.description)?;
    text_element(writer, "content:encoded", &entry.content)?;
    write(writer, Event::End(BytesEnd::new("item")))
}

/// RFC 822 形式（日は2桁）
fn rfc2822<Tz>(datetime: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    datetime.format("%a, %d %b %Y %H:%M:%S %z").to_string()
}

fn text_element(writer: &mut XmlWriter, name: &str, text: &str) -> Result<(), FeedError> {
    write(writer, Event::Start(BytesStart::new(name)))?;
    write(writer, Event::Text(BytesText::new(text)))?;
    write(writer, Event::End(BytesEnd::new(name)))
}

fn write(writer: &mut XmlWriter, event: Event<'_>) -> Result<(), FeedError> {
    writer
        .write_event(event)
        .map_err(|e| FeedError::Feed(format!("XML 書き込みに失敗: {}", e)))
}
