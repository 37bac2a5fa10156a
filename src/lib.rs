pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod images;
pub mod input;
pub mod pipeline;
pub mod render;
pub mod rewrite;

pub use config::Config;
pub use error::{AppError, Result};
pub use extract::{Article, Extracted};
pub use fetch::{Fetcher, HttpFetcher};
pub use input::Input;
pub use pipeline::{Archiver, Outcome, RunSummary};
