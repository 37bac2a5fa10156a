use std::fs;
use std::path::{Path, PathBuf};
use once_cell::sync::Lazy;
use regex::Regex;
use crate::error::{AppError, Result};

static CONTENT_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""content_url":"(.*?)""#).expect("Failed to compile content_url pattern")
});

/// What the single CLI argument refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Url(String),
    /// A saved `/mp/profile_ext` response.
    JsonBatch(PathBuf),
    /// One article URL per line.
    UrlList(PathBuf),
}

impl Input {
    pub fn classify(arg: &str) -> Result<Self> {
        if arg.contains("http") {
            return Ok(Input::Url(arg.to_string()));
        }

        let path = PathBuf::from(arg);
        if !path.exists() {
            return Err(AppError::InputNotFound(path));
        }
        if arg.contains(".json") {
            Ok(Input::JsonBatch(path))
        } else {
            Ok(Input::UrlList(path))
        }
    }

    /// Resolve the input into the article URLs to process.
    pub fn urls(&self) -> Result<Vec<String>> {
        match self {
            Input::Url(url) => Ok(vec![url.clone()]),
            Input::JsonBatch(path) => {
                let bytes = read(path)?;
                Ok(urls_from_json(&String::from_utf8_lossy(&bytes)))
            }
            Input::UrlList(path) => {
                let bytes = read(path)?;
                Ok(urls_from_lines(&String::from_utf8_lossy(&bytes)))
            }
        }
    }
}

fn read(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| AppError::io(path, e))
}

/// Pull every `content_url` out of a (possibly doubly string-encoded) JSON
/// blob. Entries without a usable URL are dropped.
pub fn urls_from_json(raw: &str) -> Vec<String> {
    let unquoted = raw.replace(r#"\""#, "\"");
    CONTENT_URL_RE
        .captures_iter(&unquoted)
        .filter_map(|caps| caps.get(1))
        .map(|m| {
            let url = m.as_str().replace('\\', "");
            html_escape::decode_html_entities(&url).into_owned()
        })
        .filter(|url| url.contains("http"))
        .collect()
}

pub fn urls_from_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| line.contains("http"))
        .map(str::to_string)
        .collect()
}
