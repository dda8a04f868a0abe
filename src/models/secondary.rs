//! Match detail records as returned by the OpenDota match endpoint.

use serde::{Deserialize, Deserializer, Serialize};

/// OpenDota reports unparsed counters as `null`; treat them as zero.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One slot of the draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickBan {
    pub is_pick: bool,
    pub hero_id: u32,
    #[serde(default)]
    pub team: Option<u8>,
    #[serde(default)]
    pub order: Option<u32>,
}

/// Per-player gameplay statistics.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawSecondaryPlayer {
    #[serde(default)]
    pub account_id: Option<i64>,
    pub hero_id: u32,
    #[serde(default)]
    pub player_slot: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub kills: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub deaths: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub assists: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_hits: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub denies: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub gold_per_min: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub xp_per_min: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hero_damage: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tower_damage: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hero_healing: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rune_pickups: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub camps_stacked: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub courier_kills: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_gold: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSecondaryMatch {
    pub match_id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub radiant_score: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dire_score: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub radiant_win: bool,
    #[serde(default)]
    pub first_blood_time: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub picks_bans: Vec<Option<PickBan>>,
    /// `None` until OpenDota has fully parsed the replay.
    #[serde(default)]
    pub draft_timings: Option<serde_json::Value>,
    #[serde(default)]
    pub players: Vec<RawSecondaryPlayer>,
}

impl RawSecondaryMatch {
    pub fn is_parsed(&self) -> bool {
        self.draft_timings.is_some()
    }
}
