//! OpenDota client: match details and replay parse jobs.
//!
//! Every request goes through a shared [`Throttle`], so a whole batch of
//! detail fetches can be issued at once while the provider only sees one
//! request per period.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::future::try_join_all;
use reqwest::header::HeaderMap;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use super::{build_client, check_status, with_retry, FetchError, RetryPolicy, Throttle};
use crate::models::RawSecondaryMatch;

/// Used when a pending job does not say when it will next be attempted.
const FALLBACK_POLL_DELAY: Duration = Duration::from_secs(5);

/// Settings for the OpenDota client.
#[derive(Debug, Clone)]
pub struct OpenDotaConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
    pub retry: RetryPolicy,
    /// Minimum spacing between any two requests.
    pub rate_limit: Duration,
}

/// A replay parse job that has not finished yet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ParseJob {
    #[serde(default, alias = "nextAttemptTime")]
    pub next_attempt_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub attempts: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct JobRequestResponse {
    job: JobHandle,
}

#[derive(Debug, Deserialize)]
struct JobHandle {
    #[serde(alias = "jobId")]
    job_id: u64,
}

/// Source of per-match detail records and parse jobs.
#[async_trait]
pub trait SecondarySource: Send + Sync {
    async fn fetch_match(&self, match_id: i64) -> Result<RawSecondaryMatch, FetchError>;

    /// Ask the provider to parse the match replay; returns the job id.
    async fn request_parse(&self, match_id: i64) -> Result<u64, FetchError>;

    /// `None` once the job is finished or unknown.
    async fn job_status(&self, job_id: u64) -> Result<Option<ParseJob>, FetchError>;
}

pub struct OpenDotaClient {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
    retry: RetryPolicy,
    throttle: Throttle,
}

impl OpenDotaClient {
    pub fn new(config: OpenDotaConfig) -> Result<Self, FetchError> {
        let base_url = Url::parse(&format!("{}/", config.base_url.trim_end_matches('/')))
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;

        Ok(Self {
            client: build_client(config.timeout, HeaderMap::new())?,
            base_url,
            api_key: config.api_key,
            retry: config.retry,
            throttle: Throttle::per_period(config.rate_limit),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, FetchError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
        if let Some(key) = &self.api_key {
            url.query_pairs_mut().append_pair("api_key", key);
        }
        Ok(url)
    }

    async fn get_json<T>(&self, url: Url, what: &str) -> Result<T, FetchError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let url = &url;
        let client = &self.client;
        let throttle = &self.throttle;

        with_retry(&self.retry, what, || async move {
            throttle.ready().await;
            debug!("GET {}", url.path());
            let response = client.get(url.clone()).send().await?;
            Ok(check_status(response)?.json::<T>().await?)
        })
        .await
    }
}

#[async_trait]
impl SecondarySource for OpenDotaClient {
    async fn fetch_match(&self, match_id: i64) -> Result<RawSecondaryMatch, FetchError> {
        let url = self.endpoint(&format!("matches/{}", match_id))?;
        self.get_json(url, "OpenDota match").await
    }

    async fn request_parse(&self, match_id: i64) -> Result<u64, FetchError> {
        let url = &self.endpoint(&format!("request/{}", match_id))?;
        let client = &self.client;
        let throttle = &self.throttle;

        let response: JobRequestResponse =
            with_retry(&self.retry, "OpenDota parse request", || async move {
                throttle.ready().await;
                debug!("POST {}", url.path());
                let response = client.post(url.clone()).send().await?;
                Ok(check_status(response)?.json().await?)
            })
            .await?;
        Ok(response.job.job_id)
    }

    async fn job_status(&self, job_id: u64) -> Result<Option<ParseJob>, FetchError> {
        let url = self.endpoint(&format!("request/{}", job_id))?;
        self.get_json(url, "OpenDota job status").await
    }
}

/// Fetch details for every match concurrently. The first failure fails the
/// whole batch and names the match it came from.
pub async fn fetch_match_details<S: SecondarySource + ?Sized>(
    source: &S,
    match_ids: &[i64],
) -> Result<Vec<RawSecondaryMatch>, FetchError> {
    info!("Fetching details for {} matches", match_ids.len());
    try_join_all(match_ids.iter().map(|&id| async move {
        source.fetch_match(id).await.map_err(|e| e.for_match(id))
    }))
    .await
}

/// Wait for every parse job to finish.
///
/// Each round sleeps until the latest `next_attempt_time` among the pending
/// jobs, then polls only those jobs again. There is no overall timeout.
pub async fn wait_for_jobs<S: SecondarySource + ?Sized>(
    source: &S,
    job_ids: Vec<u64>,
) -> Result<(), FetchError> {
    let mut pending = poll_jobs(source, job_ids).await?;

    while !pending.is_empty() {
        let now = Utc::now();
        let wait = pending
            .iter()
            .map(|(_, job)| match job.next_attempt_time {
                Some(at) => (at - now).to_std().unwrap_or(Duration::ZERO),
                None => FALLBACK_POLL_DELAY,
            })
            .max()
            .unwrap_or(Duration::ZERO);

        info!(
            "{} parse jobs pending, checking again in {:?}",
            pending.len(),
            wait
        );
        tokio::time::sleep(wait).await;

        let ids = pending.into_iter().map(|(id, _)| id).collect();
        pending = poll_jobs(source, ids).await?;
    }

    Ok(())
}

async fn poll_jobs<S: SecondarySource + ?Sized>(
    source: &S,
    job_ids: Vec<u64>,
) -> Result<Vec<(u64, ParseJob)>, FetchError> {
    let statuses = try_join_all(
        job_ids
            .into_iter()
            .map(|id| async move { source.job_status(id).await.map(|s| (id, s)) }),
    )
    .await?;

    Ok(statuses
        .into_iter()
        .filter_map(|(id, status)| status.map(|job| (id, job)))
        .collect())
}

/// Get matches the provider has not fully parsed re-parsed, then refetch them.
///
/// Returns the already-parsed records followed by the refetched ones.
pub async fn refresh_unparsed<S: SecondarySource + ?Sized>(
    source: &S,
    details: Vec<RawSecondaryMatch>,
) -> Result<Vec<RawSecondaryMatch>, FetchError> {
    let (mut parsed, unparsed): (Vec<_>, Vec<_>) =
        details.into_iter().partition(RawSecondaryMatch::is_parsed);

    if unparsed.is_empty() {
        return Ok(parsed);
    }

    let unparsed_ids: Vec<i64> = unparsed.iter().map(|m| m.match_id).collect();
    info!("Requesting replay parse for {} matches", unparsed_ids.len());

    let job_ids = try_join_all(unparsed_ids.iter().map(|&id| async move {
        source.request_parse(id).await.map_err(|e| e.for_match(id))
    }))
    .await?;

    wait_for_jobs(source, job_ids).await?;

    info!("Parse jobs finished, refetching {} matches", unparsed_ids.len());
    let refreshed = fetch_match_details(source, &unparsed_ids).await?;
    parsed.extend(refreshed);
    Ok(parsed)
}
