//! Superlative statistics over a filtered set of matches.

use serde::{Deserialize, Serialize};

use super::{HeroDescriptor, TeamRef, UnifiedMatch, UnifiedPlayer};

/// A match holding an extreme value, with the value it was ranked by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameHighlight<V> {
    pub match_id: i64,
    pub value: V,
    pub radiant: Option<TeamRef>,
    pub dire: Option<TeamRef>,
    pub radiant_win: bool,
}

impl<V> GameHighlight<V> {
    pub fn new(m: &UnifiedMatch, value: V) -> Self {
        Self {
            match_id: m.match_id,
            value,
            radiant: m.radiant_team.clone(),
            dire: m.dire_team.clone(),
            radiant_win: m.radiant_win,
        }
    }
}

/// A player holding an extreme value of one stat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerHighlight {
    pub match_id: i64,
    pub value: i64,
    pub player: UnifiedPlayer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerHighlights {
    pub most_kills: PlayerHighlight,
    pub most_deaths: PlayerHighlight,
    pub most_assists: PlayerHighlight,
    pub highest_gpm: PlayerHighlight,
    pub highest_xpm: PlayerHighlight,
    pub highest_last_hits: PlayerHighlight,
    pub highest_denies: PlayerHighlight,
    pub highest_hero_damage: PlayerHighlight,
    pub highest_tower_damage: PlayerHighlight,
    pub highest_healing: PlayerHighlight,
    pub most_runes: PlayerHighlight,
    pub most_camps_stacked: PlayerHighlight,
    pub most_courier_kills: PlayerHighlight,
    pub highest_total_gold: PlayerHighlight,
    pub lowest_total_gold: PlayerHighlight,
}

/// A hero with how many times it was picked or banned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroCount {
    #[serde(flatten)]
    pub hero: HeroDescriptor,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateReport {
    /// Number of matches that passed the region and time filter.
    pub match_count: usize,
    pub shortest_game: GameHighlight<String>,
    pub longest_game: GameHighlight<String>,
    pub least_kills_game: GameHighlight<i64>,
    pub most_kills_game: GameHighlight<i64>,
    pub first_first_blood_game: Option<GameHighlight<String>>,
    pub last_first_blood_game: Option<GameHighlight<String>>,
    pub players: PlayerHighlights,
    /// Top three most picked heroes, ascending by count.
    pub heroes: Vec<HeroCount>,
    /// Top three most banned heroes, ascending by count.
    pub bans: Vec<HeroCount>,
}
