//! Download of videos returned by URL.

use crate::error::{GenVidError, Result};
use std::time::Duration;

/// Default limit for a single video download.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(300);

/// Blocking-per-call HTTP downloader for returned video URLs.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    /// Creates a fetcher whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Wraps an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Downloads the whole body at `url`.
    ///
    /// A non-success status, a connection failure or a broken body are all
    /// reported as [`GenVidError::Fetch`].
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!(url = %url, "downloading video");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| GenVidError::fetch_transport(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GenVidError::fetch_status(url, status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| GenVidError::fetch_transport(url, &e))?;
        Ok(body.to_vec())
    }
}
