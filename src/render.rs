use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use crate::error::{AppError, Result};
use crate::extract::Article;

const FORBIDDEN_FILENAME_CHARS: [char; 9] = ['\\', '/', '*', ':', '?', '|', '"', '<', '>'];

/// Replace characters that are not allowed in file names with `_`.
pub fn slugify(title: &str) -> String {
    title.replace(FORBIDDEN_FILENAME_CHARS, "_")
}

/// `<YY-MM-DD>_<slug>.html`
pub fn output_file_name(article: &Article) -> String {
    format!(
        "{}_{}.html",
        article.publish_date.format("%y-%m-%d"),
        slugify(&article.title)
    )
}

/// Render the standalone page. Text fields are escaped, the body is inserted
/// verbatim.
pub fn render_page(article: &Article) -> String {
    let mut page = String::with_capacity(article.content.len() + 1024);

    // Writing into a String cannot fail
    let _ = write!(
        page,
        r#"<!DOCTYPE html>
<html>
    <head>
        <meta charset="UTF-8">
        <link href="style.css" rel="stylesheet" type="text/css">
        <title>{title}</title>
    </head>
    <body>
        <header style="background-image: url({cover})">
            <div class="warpper">
                <div class="title">
                    <h1>{title}</h1>
                    <h2>{description}</h2>
                </div>
                <div class="info">
"#,
        title = text(&article.title),
        cover = attr(&article.cover_image),
        description = text(&article.description),
    );

    if let Some(author) = article.author.as_deref().filter(|a| !a.is_empty()) {
        let _ = writeln!(
            page,
            r#"                    <span class="author">{}</span>"#,
            text(author)
        );
    }

    let _ = writeln!(
        page,
        r#"                    <span class="time"><time datetime="{}">{}</time></span>"#,
        article.publish_date.to_rfc3339(),
        article.publish_date.format("%Y-%m-%d")
    );

    if let Some(url) = article.original_url.as_deref().filter(|u| !u.is_empty()) {
        let _ = writeln!(
            page,
            r#"                    <span class="origin"><a href="{}">查看原文</a></span>"#,
            attr(url)
        );
    }

    let _ = write!(
        page,
        r#"                </div>
            </div>
        </header>
        <div class="container">{content}</div>
        <footer></footer>
    </body>
</html>
"#,
        content = article.content,
    );

    page
}

/// Render `article` into `output_dir` and return the written path.
pub fn write_article(article: &Article, output_dir: &Path) -> Result<PathBuf> {
    let path = output_dir.join(output_file_name(article));
    fs::write(&path, render_page(article)).map_err(|e| AppError::io(&path, e))?;
    Ok(path)
}
