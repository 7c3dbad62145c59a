//! Blocking HTTP client with retry and exponential backoff.
//!
//! Retries connection failures, timeouts, 429 and 5xx responses. Other
//! client errors fail immediately. Delay before attempt `n` (n >= 1) is
//! `base_delay * 2^(n-1)`, or the server's `retry-after` after a 429 when
//! that is longer.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::SourceError;

#[derive(Clone)]
pub struct RetryingClient {
    client: reqwest::blocking::Client,
    max_retries: u32,
    base_delay: Duration,
}

impl RetryingClient {
    pub fn new(timeout: Duration, max_retries: u32, base_delay: Duration) -> Result<Self, SourceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("indicated/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SourceError::Client(e.to_string()))?;

        Ok(Self {
            client,
            max_retries,
            base_delay,
        })
    }

    /// Backoff before `attempt` (0 = first try, no delay).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            Duration::ZERO
        } else {
            self.base_delay * 2u32.saturating_pow(attempt - 1)
        }
    }

    /// Wait before `attempt`, never shorter than a server-requested pause.
    pub fn wait_before(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        let backoff = self.delay_for(attempt);
        retry_after.map_or(backoff, |pause| pause.max(backoff))
    }

    /// GET `url` and decode the JSON body as `T`.
    pub fn get_json<T: DeserializeOwned>(&self, provider: &str, url: &str) -> Result<T, SourceError> {
        let mut last_error = None;
        let mut retry_after = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.wait_before(attempt, retry_after.take());
                warn!(provider, attempt, delay_ms = delay.as_millis() as u64, "retrying request");
                std::thread::sleep(delay);
            }

            debug!(provider, attempt, "GET");
            let resp = match self.client.get(url).send() {
                Ok(resp) => resp,
                Err(e) if e.is_connect() || e.is_timeout() => {
                    last_error = Some(SourceError::NetworkUnreachable {
                        provider: provider.to_string(),
                        reason: e.to_string(),
                    });
                    continue;
                }
                Err(e) => {
                    return Err(SourceError::NetworkUnreachable {
                        provider: provider.to_string(),
                        reason: e.to_string(),
                    })
                }
            };

            let status = resp.status();
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                let retry_after_secs = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(60);
                retry_after = Some(Duration::from_secs(retry_after_secs));
                last_error = Some(SourceError::RateLimited {
                    provider: provider.to_string(),
                    retry_after_secs,
                });
                continue;
            }
            if status.is_server_error() {
                last_error = Some(SourceError::HttpStatus {
                    provider: provider.to_string(),
                    status: status.as_u16(),
                });
                continue;
            }
            if !status.is_success() {
                return Err(SourceError::HttpStatus {
                    provider: provider.to_string(),
                    status: status.as_u16(),
                });
            }

            return resp.json::<T>().map_err(|e| SourceError::ResponseFormatChanged {
                provider: provider.to_string(),
                reason: e.to_string(),
            });
        }

        Err(last_error.unwrap_or_else(|| SourceError::NetworkUnreachable {
            provider: provider.to_string(),
            reason: "max retries exceeded".into(),
        }))
    }
}
