use std::process::ExitCode;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use wechat_mp_archiver::{Archiver, Config, HttpFetcher, Input, Result};

/// Archive WeChat official-account articles as standalone local pages.
#[derive(Parser, Debug)]
#[command(name = "wxmp", version, about)]
#[command(after_help = "Usage:
  wxmp <URL>          Download an article with the article url.
  wxmp <json-file>    Parse the /mp/profile_ext json file and download all articles.
  wxmp <text-file>    Download articles with the multi-line text file.")]
struct Args {
    /// Article URL, a profile_ext JSON file, or a text file with one URL per line
    target: String,
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let config = Config::load()?;
    let input = Input::classify(&args.target)?;
    info!("Writing articles to {}", config.output_dir.display());

    let fetcher = HttpFetcher::new(&config)?;
    let archiver = Archiver::new(fetcher, config);
    archiver.run(&input)?;
    Ok(())
}
