//! Stratz client: paginated league match metadata.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use tracing::{debug, info};
use url::Url;

use super::{build_client, check_status, with_retry, FetchError, RetryPolicy, Throttle};
use crate::models::RawPrimaryMatch;

/// Settings for the Stratz client.
#[derive(Debug, Clone)]
pub struct StratzConfig {
    pub base_url: String,
    /// Full `Authorization` header value, `Bearer <token>`.
    pub authorization: HeaderValue,
    pub page_size: usize,
    pub timeout: Duration,
    pub retry: RetryPolicy,
    /// Minimum spacing between any two requests.
    pub rate_limit: Duration,
}

/// Source of league match pages.
#[async_trait]
pub trait PrimarySource: Send + Sync {
    /// Number of matches requested per page.
    fn page_size(&self) -> usize;

    /// Fetch one page of league matches starting at `skip`.
    async fn match_page(
        &self,
        league_id: u32,
        skip: usize,
    ) -> Result<Vec<RawPrimaryMatch>, FetchError>;
}

pub struct StratzClient {
    client: Client,
    base_url: Url,
    page_size: usize,
    retry: RetryPolicy,
    throttle: Throttle,
}

impl StratzClient {
    pub fn new(config: StratzConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, config.authorization);

        let base_url = Url::parse(&format!("{}/", config.base_url.trim_end_matches('/')))
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;

        Ok(Self {
            client: build_client(config.timeout, headers)?,
            base_url,
            page_size: config.page_size,
            retry: config.retry,
            throttle: Throttle::per_period(config.rate_limit),
        })
    }

    fn league_matches_url(&self, league_id: u32) -> Result<Url, FetchError> {
        self.base_url
            .join(&format!("league/{}/matches", league_id))
            .map_err(|e| FetchError::InvalidUrl(e.to_string()))
    }
}

#[async_trait]
impl PrimarySource for StratzClient {
    fn page_size(&self) -> usize {
        self.page_size
    }

    async fn match_page(
        &self,
        league_id: u32,
        skip: usize,
    ) -> Result<Vec<RawPrimaryMatch>, FetchError> {
        let url = &self.league_matches_url(league_id)?;
        let take = &self.page_size.to_string();
        let skip = &skip.to_string();
        let client = &self.client;
        let throttle = &self.throttle;

        with_retry(&self.retry, "Stratz league page", || async move {
            throttle.ready().await;
            debug!("GET {} skip={}", url, skip);
            let response = client
                .get(url.clone())
                .query(&[
                    ("include", "Player,Team"),
                    ("take", take.as_str()),
                    ("skip", skip.as_str()),
                ])
                .send()
                .await?;
            let page: Vec<RawPrimaryMatch> = check_status(response)?.json().await?;
            Ok(page)
        })
        .await
    }
}

/// Fetch every match of a league, one page at a time.
///
/// Paging stops once the running total falls short of the number of slots
/// requested so far, so a league whose size is an exact multiple of the page
/// size costs one extra, empty request.
pub async fn fetch_all_matches<S: PrimarySource + ?Sized>(
    source: &S,
    league_id: u32,
) -> Result<Vec<RawPrimaryMatch>, FetchError> {
    let page_size = source.page_size();

    info!("Fetching first batch of league {} matches", league_id);
    let mut matches = source.match_page(league_id, 0).await?;
    let mut requested = page_size;

    while matches.len() >= requested {
        info!(
            "Fetching next batch of league {} matches (skip={})",
            league_id, requested
        );
        let page = source.match_page(league_id, requested).await?;
        matches.extend(page);
        requested += page_size;
    }

    info!("Fetched {} matches for league {}", matches.len(), league_id);
    Ok(matches)
}
