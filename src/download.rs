//! # HTTP transfer for tldr
//!
//! A single blocking GET with optional proxy and a fixed timeout. Every
//! failure (connection, timeout, non-success status) becomes a
//! [`DownloadError`]; [`fetch`] additionally separates "this resource does
//! not exist" from real failures. No retries happen here.

use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::Proxy;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Timeout for single page and index requests.
pub const PAGE_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout for the bulk pages archive and the command manifest.
pub const BULK_TIMEOUT: Duration = Duration::from_secs(60);

/// A failed download, with the HTTP status when the server answered.
#[derive(Debug, Error)]
#[error("Failed to download {url}: {reason}")]
pub struct DownloadError {
    /// The requested URL.
    pub url: String,
    /// HTTP status code, `None` when no response was received.
    pub status: Option<u16>,
    reason: String,
}

impl DownloadError {
    /// A server response with a non-success status.
    pub fn status(url: &str, code: u16) -> Self {
        Self {
            url: url.to_string(),
            status: Some(code),
            reason: format!("HTTP {code}"),
        }
    }

    /// No usable response: connection refused, timeout, bad URL, bad proxy.
    pub fn transport(url: &str, err: &reqwest::Error) -> Self {
        Self {
            url: url.to_string(),
            status: err.status().map(|s| s.as_u16()),
            reason: err.to_string(),
        }
    }

    /// Whether the server reported that the resource does not exist.
    pub fn is_not_found(&self) -> bool {
        self.status == Some(StatusCode::NOT_FOUND.as_u16())
    }
}

/// Outcome of a targeted fetch.
#[derive(Debug, PartialEq, Eq)]
pub enum Fetched {
    /// The resource body.
    Content(Vec<u8>),
    /// The server answered 404.
    NotFound,
}

/// Download `url` and return the response body.
///
/// # Arguments
/// * `url` - Absolute URL to request.
/// * `proxy` - Optional proxy URL; empty strings are ignored.
/// * `timeout` - Total request timeout.
///
/// # Errors
/// Returns a [`DownloadError`] if the client cannot be built, the request
/// fails or times out, or the server responds with a non-success status.
pub fn download(url: &str, proxy: Option<&str>, timeout: Duration) -> Result<Vec<u8>, DownloadError> {
    let mut builder = Client::builder().timeout(timeout);
    if let Some(proxy_url) = proxy.filter(|p| !p.is_empty()) {
        let proxy = Proxy::all(proxy_url).map_err(|e| DownloadError::transport(url, &e))?;
        builder = builder.proxy(proxy);
    }
    let client = builder
        .build()
        .map_err(|e| DownloadError::transport(url, &e))?;

    debug!(url, "sending request");
    let response = client
        .get(url)
        .send()
        .map_err(|e| DownloadError::transport(url, &e))?;

    let status = response.status();
    if !status.is_success() {
        debug!(url, status = status.as_u16(), "request failed");
        return Err(DownloadError::status(url, status.as_u16()));
    }

    let body = response
        .bytes()
        .map_err(|e| DownloadError::transport(url, &e))?;
    Ok(body.to_vec())
}

/// Like [`download`], but a 404 is an expected [`Fetched::NotFound`].
pub fn fetch(url: &str, proxy: Option<&str>, timeout: Duration) -> Result<Fetched, DownloadError> {
    match download(url, proxy, timeout) {
        Ok(body) => Ok(Fetched::Content(body)),
        Err(err) if err.is_not_found() => Ok(Fetched::NotFound),
        Err(err) => Err(err),
    }
}
