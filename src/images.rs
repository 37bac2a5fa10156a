use std::fmt;
use std::fs;
use std::path::Path;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;
use crate::error::{AppError, Result};
use crate::fetch::Fetcher;

const DEFAULT_IMAGE_TYPE: &str = "jpeg";

static WX_FMT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"wx_fmt=([A-Za-z0-9]+)").expect("Failed to compile wx_fmt pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    /// `<img data-src="...">`
    InlineTag,
    /// `url(&quot;...&quot;)` inside a style attribute
    BackgroundStyle,
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageKind::InlineTag => f.write_str("inline image"),
            ImageKind::BackgroundStyle => f.write_str("background image"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    pub remote_url: String,
    pub kind: ImageKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalizedImage {
    /// File extension, from `wx_fmt` or defaulted.
    pub image_type: String,
    pub id: String,
    pub local_path: String,
}

impl LocalizedImage {
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.id, self.image_type)
    }
}

/// Derive the local name of a remote image. Pure: the same URL always maps to
/// the same path.
pub fn parse_image_url(url: &str, asset_dir: &str) -> LocalizedImage {
    let image_type = WX_FMT_RE
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(DEFAULT_IMAGE_TYPE)
        .to_string();

    let id = match penultimate_segment(url) {
        id if id.is_empty() || id == "." || id == ".." => "image".to_string(),
        id => id,
    };

    let local_path = format!("{}/{}.{}", asset_dir, id, image_type);
    LocalizedImage {
        image_type,
        id,
        local_path,
    }
}

fn penultimate_segment(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let trimmed = match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => path,
    };
    let segment = match trimmed.rfind('/') {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    };
    segment.replace(['\\', '/', ':', '*', '?', '"', '<', '>', '|'], "_")
}

/// Downloads remote images into the asset directory.
pub struct ImageLocalizer<'a, F: Fetcher + ?Sized> {
    fetcher: &'a F,
    /// On-disk location of the asset directory.
    asset_root: &'a Path,
    /// Prefix used in the rewritten markup.
    asset_dir: &'a str,
}

impl<'a, F: Fetcher + ?Sized> ImageLocalizer<'a, F> {
    pub fn new(fetcher: &'a F, asset_root: &'a Path, asset_dir: &'a str) -> Self {
        ImageLocalizer {
            fetcher,
            asset_root,
            asset_dir,
        }
    }

    /// Fetch `url` and return the local path to substitute for it. Strings
    /// without `http` are already local and come back unchanged.
    pub fn localize(&self, url: &str) -> Result<String> {
        if !url.contains("http") {
            return Ok(url.to_string());
        }

        let image = parse_image_url(url, self.asset_dir);
        // References lifted from markup may still carry `&amp;`
        let bytes = self.fetcher.get(&html_escape::decode_html_entities(url))?;

        let target = self.asset_root.join(image.file_name());
        fs::write(&target, &bytes).map_err(|e| AppError::io(&target, e))?;
        debug!("Saved {} ({} bytes) to {}", url, bytes.len(), target.display());

        Ok(image.local_path)
    }
}
