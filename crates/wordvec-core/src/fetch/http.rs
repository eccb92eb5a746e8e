//! Blocking HTTP fetcher (reqwest)

use std::io::Write;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};

use super::{FetchError, Fetcher};

const USER_AGENT: &str = concat!("wordvec/", env!("CARGO_PKG_VERSION"));

/// Connect timeout; whole-request time is unbounded since archives run to gigabytes
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// [`Fetcher`] over HTTPS
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(None::<Duration>)
            .build()
            .map_err(|e| FetchError::Transport {
                url: String::new(),
                message: e.to_string(),
            })?;
        Ok(Self { client })
    }

    fn get(&self, url: &str) -> Result<Response, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| FetchError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        match response.status() {
            s if s.is_success() => Ok(response),
            StatusCode::NOT_FOUND => Err(FetchError::NotFound(url.to_string())),
            s => Err(FetchError::Status {
                url: url.to_string(),
                status: s.as_u16(),
            }),
        }
    }
}

impl Fetcher for HttpFetcher {
    fn fetch_to(&self, url: &str, writer: &mut dyn Write) -> Result<u64, FetchError> {
        let mut response = self.get(url)?;
        if let Some(len) = response.content_length() {
            tracing::info!(url = %url, mib = len / (1024 * 1024), "Starting download");
        }
        Ok(std::io::copy(&mut response, writer)?)
    }

    fn fetch_string(&self, url: &str) -> Result<String, FetchError> {
        self.get(url)?.text().map_err(|e| FetchError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}
