//! Merged match records produced by the merge stage.

use serde::{Deserialize, Serialize};

use super::{HeroDescriptor, RawSecondaryPlayer, SteamAccount, TeamRef};

/// A draft slot with its hero resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnifiedPickBan {
    pub is_pick: bool,
    pub hero: HeroDescriptor,
    pub team: Option<u8>,
    pub order: Option<u32>,
}

/// Secondary player stats joined with the primary profile and catalog hero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnifiedPlayer {
    #[serde(flatten)]
    pub stats: RawSecondaryPlayer,
    pub steam_account: SteamAccount,
    pub hero: HeroDescriptor,
}

/// Secondary match record overlaid with primary match metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnifiedMatch {
    pub match_id: i64,
    pub region_id: i32,
    pub start_date_time: i64,
    pub end_date_time: i64,
    pub duration_seconds: i64,
    pub radiant_team: Option<TeamRef>,
    pub dire_team: Option<TeamRef>,
    pub radiant_score: i64,
    pub dire_score: i64,
    pub radiant_win: bool,
    pub first_blood_time: Option<i64>,
    /// Null slots reported by the provider are kept as `None`.
    pub picks_bans: Vec<Option<UnifiedPickBan>>,
    pub players: Vec<UnifiedPlayer>,
}

impl UnifiedMatch {
    pub fn total_kills(&self) -> i64 {
        self.radiant_score + self.dire_score
    }
}
