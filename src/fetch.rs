use reqwest::StatusCode;
use reqwest::blocking::{Client, ClientBuilder};
use crate::config::Config;
use crate::error::{AppError, Result};

/// Blocking GET returning the full response body.
///
/// Anything other than `200 OK` is reported as [`AppError::HttpStatus`].
pub trait Fetcher {
    fn get(&self, url: &str) -> Result<Vec<u8>>;

    fn get_text(&self, url: &str) -> Result<String> {
        let bytes = self.get(url)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl<T: Fetcher + ?Sized> Fetcher for &T {
    fn get(&self, url: &str) -> Result<Vec<u8>> {
        (**self).get(url)
    }
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &Config) -> Result<Self> {
        Self::from_builder(client_builder(config))
    }

    fn from_builder(builder: ClientBuilder) -> Result<Self> {
        let client = builder
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(HttpFetcher { client })
    }
}

fn client_builder(config: &Config) -> ClientBuilder {
    ClientBuilder::new()
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .user_agent(config.user_agent.as_str())
}

impl Fetcher for HttpFetcher {
    fn get(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send()?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(AppError::HttpStatus {
                url: url.to_string(),
                status,
            });
        }
        let bytes = response.bytes()?;
        Ok(bytes.to_vec())
    }
}
