//! reqwest-backed `Fetcher`.

use super::{FetchError, FetchResult, Fetcher};
use log::{error, info};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking HTTP client issuing JSON GET requests.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Builds a client with the default request timeout.
    pub fn new() -> FetchResult<Self> {
        Self::with_timeout(REQUEST_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> FetchResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("pokedex/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| FetchError::Transport(err.to_string()))?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn get<T: DeserializeOwned>(&self, url: &str) -> FetchResult<T> {
        let started_at = Instant::now();
        info!("event=http_get module=fetch status=start url={url}");

        let response = self.client.get(url).send().map_err(|err| {
            error!(
                "event=http_get module=fetch status=error duration_ms={} error_code=transport error={}",
                started_at.elapsed().as_millis(),
                err
            );
            FetchError::Transport(err.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            error!(
                "event=http_get module=fetch status=error duration_ms={} error_code=http_status http_status={}",
                started_at.elapsed().as_millis(),
                status.as_u16()
            );
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.json::<T>().map_err(|err| {
            error!(
                "event=http_get module=fetch status=error duration_ms={} error_code=decode error={}",
                started_at.elapsed().as_millis(),
                err
            );
            FetchError::Decode(err.to_string())
        })?;

        info!(
            "event=http_get module=fetch status=ok duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(body)
    }
}
