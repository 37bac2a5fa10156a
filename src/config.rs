use std::env;
use std::path::PathBuf;
use std::time::Duration;
use crate::error::{AppError, Result};

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

#[derive(Clone, Debug)]
pub struct Config {
    /// Directory the rendered article pages are written to.
    pub output_dir: PathBuf,
    /// Asset directory, relative to `output_dir`. Also the prefix of every
    /// rewritten image reference.
    pub asset_dir: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            output_dir: PathBuf::from("."),
            asset_dir: "pic".to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let output_dir = lookup("WXMP_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.output_dir);

        let asset_dir = match lookup("WXMP_ASSET_DIR") {
            Some(dir) => {
                let dir = dir.trim().trim_end_matches('/').to_string();
                if dir.is_empty() {
                    return Err(AppError::Config(
                        "WXMP_ASSET_DIR must not be empty".to_string(),
                    ));
                }
                dir
            }
            None => defaults.asset_dir,
        };

        let timeout = match lookup("WXMP_TIMEOUT_SECS") {
            Some(raw) => parse_secs("WXMP_TIMEOUT_SECS", &raw)?,
            None => defaults.timeout,
        };
        let connect_timeout = match lookup("WXMP_CONNECT_TIMEOUT_SECS") {
            Some(raw) => parse_secs("WXMP_CONNECT_TIMEOUT_SECS", &raw)?,
            None => defaults.connect_timeout,
        };

        let user_agent = lookup("WXMP_USER_AGENT").unwrap_or(defaults.user_agent);

        Ok(Config {
            output_dir,
            asset_dir,
            timeout,
            connect_timeout,
            user_agent,
        })
    }

    /// Where downloaded images land on disk.
    pub fn asset_path(&self) -> PathBuf {
        self.output_dir.join(&self.asset_dir)
    }
}

fn parse_secs(key: &str, raw: &str) -> Result<Duration> {
    let secs = raw
        .trim()
        .parse::<u64>()
        .map_err(|e| AppError::Config(format!("Invalid {}: {}", key, e)))?;
    if secs == 0 {
        return Err(AppError::Config(format!("{} must be greater than zero", key)));
    }
    Ok(Duration::from_secs(secs))
}
