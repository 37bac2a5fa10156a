use std::fs;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::extract::{Extracted, extract_article};
use crate::fetch::Fetcher;
use crate::images::ImageLocalizer;
use crate::input::Input;
use crate::render::write_article;
use crate::rewrite::rewrite_content;

/// What happened to a single article URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Saved(PathBuf),
    Skipped,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub saved: Vec<PathBuf>,
    pub skipped: usize,
    pub failed: usize,
}

pub struct Archiver<F: Fetcher> {
    fetcher: F,
    config: Config,
}

impl<F: Fetcher> Archiver<F> {
    pub fn new(fetcher: F, config: Config) -> Self {
        Archiver { fetcher, config }
    }

    /// Create the output and asset directories if missing.
    pub fn prepare(&self) -> Result<()> {
        let asset_path = self.config.asset_path();
        fs::create_dir_all(&asset_path).map_err(|e| AppError::io(&asset_path, e))
    }

    /// Fetch, extract, localize and render one article.
    pub fn process_url(&self, url: &str) -> Result<Outcome> {
        if !url.contains("http") {
            return Ok(Outcome::Skipped);
        }

        info!("Fetching {}", url);
        let html = self.fetcher.get_text(url)?;

        let mut article = match extract_article(&html)? {
            Extracted::Article(article) => article,
            Extracted::NotOriginal => {
                info!("Not original article, skipping {}", url);
                return Ok(Outcome::Skipped);
            }
        };

        let asset_root = self.config.asset_path();
        let localizer = ImageLocalizer::new(&self.fetcher, &asset_root, &self.config.asset_dir);

        article.content = rewrite_content(&article.content, &localizer)?;
        match localizer.localize(&article.cover_image) {
            Ok(local) => article.cover_image = local,
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => warn!("Skipping cover image {}: {}", article.cover_image, err),
        }

        let path = write_article(&article, &self.config.output_dir)?;
        info!("Saved \"{}\" to {}", article.title, path.display());
        Ok(Outcome::Saved(path))
    }

    /// Process every URL of `input`, continuing past per-page failures.
    /// Returns early only on errors that make further work pointless.
    pub fn run(&self, input: &Input) -> Result<RunSummary> {
        self.prepare()?;

        let urls = input.urls()?;
        let start = Instant::now();
        let mut summary = RunSummary::default();

        for url in &urls {
            match self.process_url(url) {
                Ok(Outcome::Saved(path)) => summary.saved.push(path),
                Ok(Outcome::Skipped) => summary.skipped += 1,
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    warn!("Failed to archive {}: {}", url, err);
                    summary.failed += 1;
                }
            }
        }

        info!(
            "Finished {} url(s) in {:?}: {} saved, {} skipped, {} failed",
            urls.len(),
            start.elapsed(),
            summary.saved.len(),
            summary.skipped,
            summary.failed
        );
        Ok(summary)
    }
}
