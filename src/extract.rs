use chrono::{DateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use crate::error::{AppError, Result};

// Compile the page patterns once
static CONTENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<div class="rich_media_content "[^>]*?id="js_content"[^>]*>([\s\S]*?)</div>"#)
        .expect("Failed to compile content pattern")
});
static NICKNAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<span class="rich_media_meta rich_media_meta_text">(.*?)</span>"#)
        .expect("Failed to compile nickname pattern")
});
static TITLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"var msg_title = "(.*?)";"#).expect("Failed to compile title pattern")
});
static DESCRIPTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"var msg_desc = "(.*?)";"#).expect("Failed to compile description pattern")
});
static COVER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"var msg_cdn_url = "(.*?)";"#).expect("Failed to compile cover pattern")
});
static SOURCE_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"var msg_source_url = '(.*?)';"#).expect("Failed to compile source url pattern")
});
static TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"var ct = "([0-9]*)";"#).expect("Failed to compile time pattern")
});

#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    pub title: String,
    pub description: String,
    pub author: Option<String>,
    /// Raw body markup. Rewritten in place before rendering.
    pub content: String,
    pub publish_date: DateTime<Utc>,
    /// Remote cover URL until localized, then the local asset path.
    pub cover_image: String,
    pub original_url: Option<String>,
}

/// Outcome of running the extractor over one page.
#[derive(Debug, Clone, PartialEq)]
pub enum Extracted {
    Article(Article),
    /// The page has no standalone body, e.g. a repost.
    NotOriginal,
}

pub fn extract_article(html: &str) -> Result<Extracted> {
    let content = match first_capture(&CONTENT_RE, html) {
        Some(content) => content.to_string(),
        None => return Ok(Extracted::NotOriginal),
    };

    let description = required(&DESCRIPTION_RE, html, "description")?;
    let original_url = required(&SOURCE_URL_RE, html, "original_url")?;
    let title = required(&TITLE_RE, html, "title")?;
    let cover_image = required(&COVER_RE, html, "cover_image")?;
    let ts = required(&TIME_RE, html, "publish_time")?;

    let author = first_capture(&NICKNAME_RE, html)
        .map(decode_text)
        .filter(|name| !name.is_empty());

    let publish_date = parse_timestamp(ts)?;

    Ok(Extracted::Article(Article {
        title: decode_text(title),
        description: decode_text(description),
        author,
        content,
        publish_date,
        cover_image: cover_image.to_string(),
        original_url: Some(original_url.to_string()).filter(|url| !url.is_empty()),
    }))
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let secs = raw
        .parse::<i64>()
        .map_err(|_| AppError::InvalidTimestamp(raw.to_string()))?;
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| AppError::InvalidTimestamp(raw.to_string()))
}

fn first_capture<'a>(re: &Regex, haystack: &'a str) -> Option<&'a str> {
    re.captures(haystack)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn required<'a>(re: &Regex, haystack: &'a str, field: &'static str) -> Result<&'a str> {
    first_capture(re, haystack).ok_or(AppError::MissingField(field))
}

fn decode_text(raw: &str) -> String {
    html_escape::decode_html_entities(raw.trim()).into_owned()
}
