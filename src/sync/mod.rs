//! Sync orchestrator.
//!
//! Runs the one-shot ingestion pipeline for a league:
//! 1. Page through the league's matches on Stratz
//! 2. Fetch OpenDota details for every match, throttled
//! 3. Get unparsed matches parsed and refetch them
//! 4. Merge both sources with the hero catalog
//!
//! Any failure aborts the run; nothing partial is returned.

use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::info;

use crate::config::{AppConfig, ConfigError};
use crate::fetch::opendota::{
    fetch_match_details, refresh_unparsed, OpenDotaClient, SecondarySource,
};
use crate::fetch::stratz::{fetch_all_matches, PrimarySource, StratzClient};
use crate::fetch::FetchError;
use crate::merge::{merge, MergeError};
use crate::models::{HeroCatalog, UnifiedMatch};

/// Errors that can occur during sync.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Data integrity error: {0}")]
    Merge(#[from] MergeError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result of a sync run.
#[derive(Debug, Clone)]
pub struct SyncResult {
    pub matches: Vec<UnifiedMatch>,
    /// Matches that had to be sent for replay parsing first.
    pub reparsed: usize,
    pub duration: Duration,
}

/// Sync orchestrator.
pub struct SyncOrchestrator {
    primary: Arc<dyn PrimarySource>,
    secondary: Arc<dyn SecondarySource>,
    heroes: Arc<HeroCatalog>,
}

impl SyncOrchestrator {
    /// Create a new sync orchestrator.
    pub fn new(
        primary: Arc<dyn PrimarySource>,
        secondary: Arc<dyn SecondarySource>,
        heroes: Arc<HeroCatalog>,
    ) -> Self {
        Self {
            primary,
            secondary,
            heroes,
        }
    }

    /// Build the HTTP clients described by `config`.
    pub fn from_config(config: &AppConfig, heroes: Arc<HeroCatalog>) -> Result<Self, SyncError> {
        let stratz = StratzClient::new(config.stratz.client_config()?)?;
        let opendota = OpenDotaClient::new(config.opendota.client_config())?;
        Ok(Self::new(Arc::new(stratz), Arc::new(opendota), heroes))
    }

    /// Fetch and merge every match of a league.
    pub async fn sync_league(&self, league_id: u32) -> Result<SyncResult, SyncError> {
        let started = Instant::now();
        info!("Starting sync for league {}", league_id);

        let league_matches = fetch_all_matches(self.primary.as_ref(), league_id).await?;
        let match_ids: Vec<i64> = league_matches.iter().map(|m| m.id).collect();

        let details = fetch_match_details(self.secondary.as_ref(), &match_ids).await?;
        let reparsed = details.iter().filter(|d| !d.is_parsed()).count();
        let details = refresh_unparsed(self.secondary.as_ref(), details).await?;

        let matches = merge(&league_matches, details, &self.heroes)?;

        let duration = started.elapsed();
        info!(
            "Synced {} matches for league {} in {:?} ({} reparsed)",
            matches.len(),
            league_id,
            duration,
            reparsed
        );

        Ok(SyncResult {
            matches,
            reparsed,
            duration,
        })
    }
}

/// Fetch and merge every match of a league using the given sources.
pub async fn fetch_and_merge_matches(
    primary: Arc<dyn PrimarySource>,
    secondary: Arc<dyn SecondarySource>,
    heroes: Arc<HeroCatalog>,
    league_id: u32,
) -> Result<Vec<UnifiedMatch>, SyncError> {
    let orchestrator = SyncOrchestrator::new(primary, secondary, heroes);
    Ok(orchestrator.sync_league(league_id).await?.matches)
}
