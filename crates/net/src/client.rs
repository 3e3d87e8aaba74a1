//! HTTP client with connection pooling and retry logic

use keg_config::Config;
use keg_errors::{Error, NetworkError};
use keg_events::{AppEvent, DownloadEvent, EventEmitter, EventSender};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;

/// Network client configuration
#[derive(Debug, Clone)]
pub struct NetConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub pool_idle_timeout: Duration,
    pub pool_max_idle_per_host: usize,
    pub retry_count: u32,
    pub retry_delay: Duration,
    pub user_agent: String,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(300), // 5 minutes for large downloads
            connect_timeout: Duration::from_secs(30),
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 4,
            retry_count: 3,
            retry_delay: Duration::from_secs(1),
            user_agent: format!("keg/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl NetConfig {
    /// Network settings from the `[network]` section of the config
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            timeout: config.timeout(),
            retry_count: config.network.retries,
            retry_delay: config.retry_delay(),
            ..Self::default()
        }
    }
}

/// HTTP client wrapper with retry logic
#[derive(Clone)]
pub struct NetClient {
    client: Client,
    config: NetConfig,
}

impl NetClient {
    /// Create a new network client
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client fails to initialize.
    pub fn new(config: NetConfig) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| NetworkError::ConnectionRefused(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Create with default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created with default settings.
    pub fn with_defaults() -> Result<Self, Error> {
        Self::new(NetConfig::default())
    }

    #[must_use]
    pub fn config(&self) -> &NetConfig {
        &self.config
    }

    /// Execute a GET request with retries
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails after all retry attempts, including
    /// network timeouts, connection failures, or server errors.
    pub async fn get(&self, url: &str, tx: Option<&EventSender>) -> Result<Response, Error> {
        self.retry_request(url, tx, || self.client.get(url).send())
            .await
    }

    /// Execute a HEAD request with retries
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails after all retry attempts.
    pub async fn head(&self, url: &str) -> Result<Response, Error> {
        self.retry_request(url, None, || self.client.head(url).send())
            .await
    }

    /// Execute a request with retries
    ///
    /// Timeouts, connection failures and 5xx responses are retried with a
    /// linearly growing delay. Any other response is returned to the caller.
    async fn retry_request<F, Fut>(
        &self,
        url: &str,
        tx: Option<&EventSender>,
        mut f: F,
    ) -> Result<Response, Error>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<Response, reqwest::Error>>,
    {
        let max_attempts = self.config.retry_count.saturating_add(1);
        let mut last_error: Option<Error> = None;

        for attempt in 0..max_attempts {
            if attempt > 0 {
                let reason = last_error
                    .as_ref()
                    .map_or_else(String::new, ToString::to_string);
                tracing::debug!(url, attempt, %reason, "retrying request");
                if let Some(tx) = tx {
                    tx.emit(AppEvent::Download(DownloadEvent::Retrying {
                        url: url.to_string(),
                        attempt: attempt + 1,
                        max_attempts,
                        reason,
                    }));
                }
                tokio::time::sleep(self.config.retry_delay.saturating_mul(attempt)).await;
            }

            match f().await {
                Ok(response) => {
                    let status = response.status();

                    if status == StatusCode::TOO_MANY_REQUESTS {
                        if let Some(retry_after) = response
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|s| s.parse::<u64>().ok())
                        {
                            return Err(NetworkError::RateLimited {
                                seconds: retry_after,
                            }
                            .into());
                        }
                    }

                    if status.is_server_error() {
                        last_error = Some(
                            NetworkError::HttpError {
                                status: status.as_u16(),
                                message: status.to_string(),
                            }
                            .into(),
                        );
                        continue;
                    }

                    return Ok(response);
                }
                Err(e) => {
                    let retry = Self::should_retry(&e);
                    last_error = Some(Self::convert_error(url, &e));

                    // Don't retry on certain errors
                    if !retry {
                        break;
                    }
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| NetworkError::DownloadFailed("Unknown error".to_string()).into()))
    }

    fn convert_error(url: &str, error: &reqwest::Error) -> Error {
        if error.is_timeout() {
            NetworkError::Timeout {
                url: url.to_string(),
            }
            .into()
        } else if error.is_connect() {
            NetworkError::ConnectionRefused(error.to_string()).into()
        } else {
            NetworkError::DownloadFailed(error.to_string()).into()
        }
    }

    /// Determine if an error should be retried
    fn should_retry(error: &reqwest::Error) -> bool {
        error.is_timeout()
            || error.is_connect()
            || error.status().is_some_and(|s| s.is_server_error())
    }

    /// Get the underlying reqwest client for advanced usage
    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }
}
