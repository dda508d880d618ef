//! Outbound HTTP fetch capability.
//!
//! # Responsibility
//! - Define the `Fetcher` seam used by the seed service.
//! - Classify transport, status and decode failures.
//!
//! # Invariants
//! - Fetchers never retry; one call is one request.

use serde::de::DeserializeOwned;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod http;

pub use http::HttpFetcher;

pub type FetchResult<T> = Result<T, FetchError>;

/// Failure while pulling or interpreting remote data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Connection, TLS or timeout failure.
    Transport(String),
    /// Remote answered with a non-success status.
    Status { url: String, status: u16 },
    /// Body could not be decoded into the expected shape.
    Decode(String),
}

impl Display for FetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(message) => write!(f, "request failed: {message}"),
            Self::Status { url, status } => write!(f, "GET {url} returned status {status}"),
            Self::Decode(message) => write!(f, "invalid response body: {message}"),
        }
    }
}

impl Error for FetchError {}

/// Generic JSON GET capability.
pub trait Fetcher {
    fn get<T: DeserializeOwned>(&self, url: &str) -> FetchResult<T>;
}

impl<F: Fetcher + ?Sized> Fetcher for &F {
    fn get<T: DeserializeOwned>(&self, url: &str) -> FetchResult<T> {
        (**self).get(url)
    }
}
