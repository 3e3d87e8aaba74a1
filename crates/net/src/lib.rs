#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Network operations for keg
//!
//! This crate handles all HTTP operations: artifact downloads with
//! SHA-256 verification, small text fetches, and retry logic.

mod client;
mod download;

pub use client::{NetClient, NetConfig};
pub use download::{partial_path, Download, DownloadResult};

use keg_errors::{Error, NetworkError};
use keg_events::{EventEmitter, EventSender};
use keg_hash::Checksum;
use std::path::Path;
use url::Url;

/// Download a file, verifying it against `expected` when given
///
/// # Errors
///
/// Returns an error if the URL is invalid, the download fails, the checksum
/// does not match, or there are I/O errors while writing the file.
pub async fn download_file(
    client: &NetClient,
    url: &str,
    dest: &Path,
    expected: Option<&Checksum>,
    tx: &EventSender,
) -> Result<DownloadResult, Error> {
    let download = Download::new(url)?;
    download.execute(client, dest, expected, tx).await
}

/// Fetch text content from a URL
///
/// # Errors
///
/// Returns an error if the HTTP request fails, the server returns an error status,
/// or the response body cannot be decoded as text.
pub async fn fetch_text(client: &NetClient, url: &str, tx: &EventSender) -> Result<String, Error> {
    tx.emit_debug(format!("Fetching text from {url}"));

    let response = client.get(url, Some(tx)).await?;

    if !response.status().is_success() {
        return Err(NetworkError::HttpError {
            status: response.status().as_u16(),
            message: response.status().to_string(),
        }
        .into());
    }

    response
        .text()
        .await
        .map_err(|e| NetworkError::DownloadFailed(e.to_string()).into())
}

/// Check if a URL is accessible
///
/// # Errors
///
/// Never fails in practice; inaccessible URLs yield `Ok(false)`.
pub async fn check_url(client: &NetClient, url: &str) -> Result<bool, Error> {
    match client.head(url).await {
        Ok(response) => Ok(response.status().is_success()),
        Err(_) => Ok(false),
    }
}

/// Parse and validate a URL
///
/// # Errors
///
/// Returns an error if the URL string is malformed.
pub fn parse_url(url: &str) -> Result<Url, Error> {
    Url::parse(url).map_err(|e| NetworkError::InvalidUrl(e.to_string()).into())
}
