//! File download with progress reporting and checksum verification

use futures::StreamExt;
use keg_errors::{Error, NetworkError};
use keg_events::{AppEvent, DownloadEvent, EventEmitter, EventSender, FailureContext};
use keg_hash::{Checksum, StreamingHasher};
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::NetClient;

/// Download operation handle
pub struct Download {
    url: Url,
    package: Option<String>,
}

/// Result of a download operation
#[derive(Debug, Clone)]
pub struct DownloadResult {
    pub url: String,
    pub path: PathBuf,
    pub size: u64,
    pub sha256: Checksum,
}

/// Temporary path a download is streamed to before it is moved into place
#[must_use]
pub fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".download");
    dest.with_file_name(name)
}

impl Download {
    /// Create a new download
    ///
    /// # Errors
    ///
    /// Returns an error if the provided URL is invalid or cannot be parsed.
    pub fn new(url: &str) -> Result<Self, Error> {
        Ok(Self::from_url(crate::parse_url(url)?))
    }

    #[must_use]
    pub fn from_url(url: Url) -> Self {
        Self { url, package: None }
    }

    /// Attribute the download to a formula in emitted events
    #[must_use]
    pub fn for_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    /// Execute the download
    ///
    /// The body is streamed to `<dest>.download` while being hashed. When
    /// `expected` is given and does not match, the partial file is removed
    /// and `NetworkError::ChecksumMismatch` is returned; `dest` is never
    /// touched in that case.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails, the server returns an error
    /// status, the file cannot be written, or checksum verification fails.
    pub async fn execute(
        self,
        client: &NetClient,
        dest: &Path,
        expected: Option<&Checksum>,
        tx: &EventSender,
    ) -> Result<DownloadResult, Error> {
        let url_str = self.url.to_string();
        let temp_path = partial_path(dest);

        let result = self
            .stream_to(client, &url_str, dest, &temp_path, expected, tx)
            .await;

        match result {
            Ok(result) => {
                tx.emit(AppEvent::Download(DownloadEvent::Completed {
                    url: url_str,
                    package: self.package,
                    final_size: result.size,
                    sha256: result.sha256.to_hex(),
                }));
                Ok(result)
            }
            Err(e) => {
                let _ = tokio::fs::remove_file(&temp_path).await;
                tx.emit(AppEvent::Download(DownloadEvent::Failed {
                    url: url_str,
                    package: self.package,
                    failure: FailureContext::from_error(&e),
                }));
                Err(e)
            }
        }
    }

    async fn stream_to(
        &self,
        client: &NetClient,
        url_str: &str,
        dest: &Path,
        temp_path: &Path,
        expected: Option<&Checksum>,
        tx: &EventSender,
    ) -> Result<DownloadResult, Error> {
        let response = client.get(url_str, Some(tx)).await?;

        if !response.status().is_success() {
            return Err(NetworkError::HttpError {
                status: response.status().as_u16(),
                message: response.status().to_string(),
            }
            .into());
        }

        let content_length = response.content_length();

        tx.emit(AppEvent::Download(DownloadEvent::Started {
            url: url_str.to_string(),
            package: self.package.clone(),
            total_size: content_length,
        }));

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::io_with_path(&e, parent))?;
        }

        let mut file = File::create(temp_path)
            .await
            .map_err(|e| Error::io_with_path(&e, temp_path))?;

        let mut stream = response.bytes_stream();
        let mut downloaded = 0u64;
        let mut hasher = StreamingHasher::new();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| NetworkError::DownloadFailed(e.to_string()))?;

            hasher.update(&chunk);
            file.write_all(&chunk)
                .await
                .map_err(|e| Error::io_with_path(&e, temp_path))?;

            downloaded += chunk.len() as u64;

            if let Some(total) = content_length {
                tx.emit(AppEvent::Download(DownloadEvent::Progress {
                    url: url_str.to_string(),
                    bytes_downloaded: downloaded,
                    total_bytes: total,
                }));
            }
        }

        file.flush()
            .await
            .map_err(|e| Error::io_with_path(&e, temp_path))?;
        drop(file);

        let sha256 = hasher.finalize();

        if let Some(expected) = expected {
            if sha256 != *expected {
                return Err(NetworkError::ChecksumMismatch {
                    expected: expected.to_hex(),
                    actual: sha256.to_hex(),
                }
                .into());
            }
        }

        tokio::fs::rename(temp_path, dest)
            .await
            .map_err(|e| Error::io_with_path(&e, dest))?;

        Ok(DownloadResult {
            url: url_str.to_string(),
            path: dest.to_path_buf(),
            size: downloaded,
            sha256,
        })
    }
}
