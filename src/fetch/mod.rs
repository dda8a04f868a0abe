//! HTTP access to the match data providers.
//!
//! - **stratz**: paginated league match metadata (primary source)
//! - **opendota**: per-match detail and replay parse jobs (secondary source)
//!
//! Both clients share the retry policy and error type defined here, and the
//! OpenDota client sends through a [`Throttle`].

pub mod limiter;
pub mod opendota;
pub mod stratz;

use std::future::Future;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use thiserror::Error;
use tracing::warn;

pub use limiter::Throttle;

const DEFAULT_USER_AGENT: &str = concat!("league-stats/", env!("CARGO_PKG_VERSION"));

/// Errors that can occur while talking to a provider.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Rate limited by {host}, retry after {retry_after_secs}s")]
    RateLimited { host: String, retry_after_secs: u64 },

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Gave up after {attempts} attempts: {source}")]
    Exhausted {
        attempts: u32,
        #[source]
        source: Box<FetchError>,
    },

    #[error("Match {match_id}: {source}")]
    MatchFailed {
        match_id: i64,
        #[source]
        source: Box<FetchError>,
    },
}

impl FetchError {
    /// Network failures, timeouts, 5xx and 429 are worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            FetchError::RateLimited { .. } => true,
            FetchError::HttpStatus { status, .. } => {
                *status >= 500 || *status == StatusCode::TOO_MANY_REQUESTS.as_u16()
            }
            FetchError::InvalidUrl(_)
            | FetchError::Json(_)
            | FetchError::Exhausted { .. }
            | FetchError::MatchFailed { .. } => false,
        }
    }

    /// Attach the match a batched request was made for.
    pub fn for_match(self, match_id: i64) -> Self {
        FetchError::MatchFailed {
            match_id,
            source: Box::new(self),
        }
    }
}

/// Retry policy for provider requests.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 1000,
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    fn delay_for(&self, retry: u32) -> Duration {
        let factor = self.backoff_multiplier.powi(retry.saturating_sub(1) as i32);
        Duration::from_millis(self.initial_delay_ms).mul_f64(factor.max(0.0))
    }
}

/// Run `op` until it succeeds, fails permanently, or the retry budget is spent.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    what: &str,
    mut op: F,
) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut retries = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_transient() => return Err(e),
            Err(e) if retries >= policy.max_retries => {
                return Err(FetchError::Exhausted {
                    attempts: retries + 1,
                    source: Box::new(e),
                });
            }
            Err(e) => {
                retries += 1;
                let mut wait = policy.delay_for(retries);
                if let FetchError::RateLimited {
                    retry_after_secs, ..
                } = &e
                {
                    wait = wait.max(Duration::from_secs(*retry_after_secs));
                }
                warn!(
                    "{} failed (retry {}/{}), waiting {:?}: {}",
                    what, retries, policy.max_retries, wait, e
                );
                tokio::time::sleep(wait).await;
            }
        }
    }
}

/// Build an HTTP client with our user agent and any extra default headers.
pub fn build_client(timeout: Duration, mut headers: HeaderMap) -> Result<Client, FetchError> {
    headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));

    Ok(Client::builder()
        .timeout(timeout)
        .default_headers(headers)
        .build()?)
}

/// Turn non-success responses into errors, keeping the retry-after hint for 429s.
pub(crate) fn check_status(response: Response) -> Result<Response, FetchError> {
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(60);

        return Err(FetchError::RateLimited {
            host: response.url().host_str().unwrap_or("unknown").to_string(),
            retry_after_secs: retry_after,
        });
    }

    if !status.is_success() {
        return Err(FetchError::HttpStatus {
            status: status.as_u16(),
            message: status.canonical_reason().unwrap_or("Unknown").to_string(),
        });
    }

    Ok(response)
}
