//! Fetches source panel images over HTTP.

use std::time::Duration;

use tracing::{debug, instrument};
use url::Url;

use crate::constants::{FETCH_TIMEOUT_SECONDS, MAX_FETCH_BYTES};
use crate::error::ComicError;

/// Downloads panel images; cheap to clone.
#[derive(Clone, Debug)]
pub struct ImageFetcher {
    client: reqwest::Client,
    max_bytes: usize,
}

impl ImageFetcher {
    /// Fetcher with the default timeout and body limit.
    pub fn new() -> Result<Self, ComicError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECONDS))
            .build()
            .map_err(|err| ComicError::InternalServerError(err.to_string()))?;
        Ok(Self {
            client,
            max_bytes: MAX_FETCH_BYTES,
        })
    }

    /// Caps the body size, in bytes.
    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Returns the raw bytes behind `url`.
    ///
    /// Only `http` and `https` URLs are accepted. Non-2xx responses and
    /// transport failures come back as [`ComicError::Fetch`]; nothing is
    /// retried.
    #[instrument(skip(self))]
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, ComicError> {
        let url = parse_image_url(url)?;
        let mut response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ComicError::Fetch(format!("{url} returned {status}")));
        }
        let too_large = || {
            ComicError::Fetch(format!(
                "{url} is larger than the {} byte limit",
                self.max_bytes
            ))
        };
        if let Some(length) = response.content_length()
            && length > self.max_bytes as u64
        {
            return Err(too_large());
        }

        // the declared length can be absent or wrong, so count as we read
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > self.max_bytes {
                return Err(too_large());
            }
            body.extend_from_slice(&chunk);
        }
        debug!(bytes = body.len(), "fetched source image");
        Ok(body)
    }
}

/// Parses `raw` and rejects anything but `http`/`https`.
pub fn parse_image_url(raw: &str) -> Result<Url, ComicError> {
    let url = Url::parse(raw.trim())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ComicError::BadRequest(format!(
            "unsupported image url scheme {other:?}"
        ))),
    }
}
