use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;
use crate::error::Result;
use crate::fetch::Fetcher;
use crate::images::{ImageKind, ImageLocalizer, ImageReference};

const LAZY_SRC_ATTR: &str = "data-src";
const SRC_ATTR: &str = "src";

static INLINE_IMG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<img[^>]*data-src="(.*?)".*?>"#).expect("Failed to compile img pattern")
});
static BACKGROUND_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"url\(&quot;(.*?)&quot;\)").expect("Failed to compile background pattern")
});

/// Lazy-loaded `<img>` references, in document order.
pub fn scan_inline(body: &str) -> Vec<ImageReference> {
    scan(&INLINE_IMG_RE, body, ImageKind::InlineTag)
}

/// `background-image: url(&quot;...&quot;)` references, in document order.
pub fn scan_background(body: &str) -> Vec<ImageReference> {
    scan(&BACKGROUND_URL_RE, body, ImageKind::BackgroundStyle)
}

fn scan(re: &Regex, body: &str, kind: ImageKind) -> Vec<ImageReference> {
    re.captures_iter(body)
        .filter_map(|caps| caps.get(1))
        .map(|m| ImageReference {
            remote_url: m.as_str().to_string(),
            kind,
        })
        .collect()
}

/// Replace every remote image in `body` with its downloaded copy.
///
/// Inline images go first, then `data-src` becomes `src`, then background
/// images. An image that fails to download keeps its remote URL.
pub fn rewrite_content<F: Fetcher + ?Sized>(
    body: &str,
    localizer: &ImageLocalizer<'_, F>,
) -> Result<String> {
    let mut content = body.to_string();

    let inline = scan_inline(&content);
    localize_all(&mut content, &inline, localizer)?;

    content = content.replace(LAZY_SRC_ATTR, SRC_ATTR);

    let background = scan_background(&content);
    localize_all(&mut content, &background, localizer)?;

    Ok(content)
}

fn localize_all<F: Fetcher + ?Sized>(
    content: &mut String,
    references: &[ImageReference],
    localizer: &ImageLocalizer<'_, F>,
) -> Result<()> {
    let mut seen: Vec<&str> = Vec::with_capacity(references.len());

    for reference in references {
        let url = reference.remote_url.as_str();
        if seen.contains(&url) {
            continue;
        }
        seen.push(url);

        match localizer.localize(url) {
            Ok(local) if local != url => *content = content.replace(url, &local),
            Ok(_) => {}
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => warn!("Skipping {} {}: {}", reference.kind, url, err),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::tests::FakeFetcher;

    #[test]
    fn scans_inline_images_in_order() {
        let body = r#"<p><img class="a" data-src="http://x/1/0?wx_fmt=png" /></p><img data-src="http://x/2/0">"#;
        let refs = scan_inline(body);
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].remote_url, "http://x/1/0?wx_fmt=png");
        assert_eq!(refs[1].remote_url, "http://x/2/0");
        assert!(refs.iter().all(|r| r.kind == ImageKind::InlineTag));
    }

    #[test]
    fn scans_entity_quoted_background_urls() {
        let body = r#"<section style="background-image: url(&quot;http://x/bg/0?wx_fmt=gif&quot;);"></section>"#;
        let refs = scan_background(body);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].remote_url, "http://x/bg/0?wx_fmt=gif");
        assert_eq!(refs[0].kind, ImageKind::BackgroundStyle);
    }

    #[test]
    fn single_inline_image_becomes_local_src() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = FakeFetcher::default().with("http://x/img1.png", b"img");
        let localizer = ImageLocalizer::new(&fetcher, dir.path(), "pic");

        let out = rewrite_content(r#"<img data-src="http://x/img1.png">"#, &localizer).unwrap();

        assert_eq!(out, r#"<img src="pic/x.jpeg">"#);
        assert!(dir.path().join("x.jpeg").exists());
    }

    #[test]
    fn both_passes_run_and_repeated_urls_fetch_once() {
        let dir = tempfile::tempdir().unwrap();
        let img = "http://cdn/mmbiz_png/AAA/640?wx_fmt=png";
        let bg = "http://cdn/mmbiz_gif/BBB/0?wx_fmt=gif";
        let fetcher = FakeFetcher::default().with(img, b"a").with(bg, b"b");
        let localizer = ImageLocalizer::new(&fetcher, dir.path(), "pic");

        let body = format!(
            r#"<img data-src="{img}"><section style="background-image: url(&quot;{bg}&quot;)"></section><img data-src="{img}">"#
        );
        let out = rewrite_content(&body, &localizer).unwrap();

        assert_eq!(
            out,
            r#"<img src="pic/AAA.png"><section style="background-image: url(&quot;pic/BBB.gif&quot;)"></section><img src="pic/AAA.png">"#
        );
        assert_eq!(fetcher.requests.borrow().as_slice(), &[img.to_string(), bg.to_string()]);
    }

    #[test]
    fn failed_download_keeps_remote_url() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = FakeFetcher::default();
        let localizer = ImageLocalizer::new(&fetcher, dir.path(), "pic");

        let out = rewrite_content(r#"<img data-src="http://x/missing/0">"#, &localizer).unwrap();
        assert_eq!(out, r#"<img src="http://x/missing/0">"#);
    }

    #[test]
    fn local_references_are_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = FakeFetcher::default();
        let localizer = ImageLocalizer::new(&fetcher, dir.path(), "pic");

        let out = rewrite_content(r#"<img data-src="pic/a.png">"#, &localizer).unwrap();
        assert_eq!(out, r#"<img src="pic/a.png">"#);
        assert!(fetcher.requests.borrow().is_empty());
    }
}
