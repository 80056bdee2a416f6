//! HTTP downloads for installer scripts.
use anyhow::{Context as _, Result, bail};

/// Fetches remote text content.
pub trait Downloader: Send + Sync {
    /// Download `url` and return its body as text.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or a non-success HTTP status.
    fn fetch(&self, url: &str) -> Result<String>;
}

/// [`Downloader`] backed by `ureq`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpDownloader;

impl Downloader for HttpDownloader {
    fn fetch(&self, url: &str) -> Result<String> {
        tracing::debug!("downloading {url}");
        match ureq::get(url).call() {
            Ok(mut response) => response
                .body_mut()
                .read_to_string()
                .with_context(|| format!("reading response from {url}")),
            Err(ureq::Error::StatusCode(code)) => bail!("download failed: HTTP {code} ({url})"),
            Err(e) => Err(e).with_context(|| format!("downloading {url}")),
        }
    }
}
