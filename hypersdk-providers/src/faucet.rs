use crate::DEFAULT_REQUEST_TIMEOUT;
use hypersdk_core::ErrorKind;
use reqwest::{Client, StatusCode};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// The number of attempts of [`Faucet::request_transfer_with_retry`] unless configured otherwise
pub const DEFAULT_FAUCET_ATTEMPTS: usize = 10;

/// The backoff grows by this much after every failed attempt
const BACKOFF_STEP: Duration = Duration::from_millis(100);

// the first retry is immediate
fn backoff(failures: u32) -> Duration {
    BACKOFF_STEP * failures
}

/// Client of a development faucet, which funds addresses on request.
///
/// ```no_run
/// # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
/// use hypersdk_providers::{Faucet, DEFAULT_FAUCET_ATTEMPTS};
///
/// let faucet = Faucet::new("http://localhost:8765");
/// faucet.request_transfer_with_retry("morpheus1qqds", DEFAULT_FAUCET_ATTEMPTS).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Faucet {
    client: Client,
    host: String,
    timeout: Duration,
}

#[derive(Debug, Error)]
/// Error thrown when the faucet could not fund an address
pub enum FaucetError {
    /// The faucet answered with a non-success status
    #[error("HTTP error! status: {}", .0.as_u16())]
    Status(StatusCode),

    /// The request could not be sent
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
}

impl FaucetError {
    /// The category of this failure
    pub fn kind(&self) -> ErrorKind {
        match self {
            FaucetError::Reqwest(err) if err.is_timeout() => ErrorKind::Timeout,
            _ => ErrorKind::Transport,
        }
    }
}

impl Faucet {
    /// Creates a client of the faucet served at `host`
    pub fn new(host: impl Into<String>) -> Self {
        Self::new_with_client(host, Client::new())
    }

    /// Creates a faucet client with a custom http client
    pub fn new_with_client(host: impl Into<String>, client: Client) -> Self {
        let host = host.into();
        let host = host.trim_end_matches('/').to_owned();
        Self { client, host, timeout: DEFAULT_REQUEST_TIMEOUT }
    }

    /// Sets the deadline of a single faucet request, 3 seconds by default
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The faucet's base url
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Asks the faucet to fund `address` once
    pub async fn request_transfer(&self, address: &str) -> Result<(), FaucetError> {
        let url = format!("{}/faucet/{address}", self.host);
        let res = self.client.post(url).timeout(self.timeout).json(&json!({})).send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(FaucetError::Status(status))
        }
        debug!(address, "faucet transfer requested");
        Ok(())
    }

    /// Asks the faucet to fund `address`, trying up to `max_attempts` times.
    ///
    /// The first retry is immediate, the wait before each later one grows by 100ms. Failed
    /// attempts are logged, only the last failure is returned.
    pub async fn request_transfer_with_retry(
        &self,
        address: &str,
        max_attempts: usize,
    ) -> Result<(), FaucetError> {
        let max_attempts = max_attempts.max(1);
        let mut failures = 0u32;
        loop {
            match self.request_transfer(address).await {
                Ok(()) => return Ok(()),
                Err(err) if failures as usize + 1 >= max_attempts => return Err(err),
                Err(err) => {
                    let attempt = failures + 1;
                    warn!(%err, attempt, max_attempts, "faucet request failed, retrying");
                    tokio::time::sleep(backoff(failures)).await;
                    failures += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_message() {
        let err = FaucetError::Status(StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(err.to_string(), "HTTP error! status: 429");
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[test]
    fn backoff_starts_immediately() {
        assert_eq!(backoff(0), Duration::ZERO);
        assert_eq!(backoff(1), Duration::from_millis(100));
        assert_eq!(backoff(9), Duration::from_millis(900));
    }

    #[test]
    fn trims_host() {
        assert_eq!(Faucet::new("http://localhost:8765/").host(), "http://localhost:8765");
    }
}
