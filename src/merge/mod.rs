//! Merge stage.
//!
//! Joins OpenDota detail records with Stratz league metadata by match id,
//! players by steam account id, and heroes through the catalog. Any join
//! that does not find exactly one record means the two providers disagree,
//! so the whole merge fails rather than producing a partial record.

use std::collections::HashMap;

use thiserror::Error;

use crate::models::{
    HeroCatalog, HeroDescriptor, PickBan, RawPrimaryMatch, RawSecondaryMatch,
    RawSecondaryPlayer, UnifiedMatch, UnifiedPickBan, UnifiedPlayer,
};

/// Cross-reference failures between the two providers and the catalog.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MergeError {
    #[error("No league match found for match {0}")]
    MissingPrimaryMatch(i64),

    #[error("Match {match_id}: player on hero {hero_id} has no account id")]
    MissingAccountId { match_id: i64, hero_id: u32 },

    #[error("League match {0} was listed more than once")]
    DuplicatePrimaryMatch(i64),

    #[error("Match {match_id}: no league player with account {account_id}")]
    MissingPlayer { match_id: i64, account_id: i64 },

    #[error("Match {match_id}: account {account_id} appears on {count} league players")]
    DuplicatePlayer {
        match_id: i64,
        account_id: i64,
        count: usize,
    },

    #[error("Match {match_id}: hero {hero_id} is not in the catalog")]
    UnknownHero { match_id: i64, hero_id: u32 },
}

/// Merge every detail record with its league match.
pub fn merge(
    primary: &[RawPrimaryMatch],
    details: Vec<RawSecondaryMatch>,
    heroes: &HeroCatalog,
) -> Result<Vec<UnifiedMatch>, MergeError> {
    let mut by_id: HashMap<i64, &RawPrimaryMatch> = HashMap::with_capacity(primary.len());
    for league_match in primary {
        if by_id.insert(league_match.id, league_match).is_some() {
            return Err(MergeError::DuplicatePrimaryMatch(league_match.id));
        }
    }

    details
        .into_iter()
        .map(|detail| {
            let league_match = by_id
                .get(&detail.match_id)
                .ok_or(MergeError::MissingPrimaryMatch(detail.match_id))?;
            merge_match(league_match, detail, heroes)
        })
        .collect()
}

fn merge_match(
    league_match: &RawPrimaryMatch,
    detail: RawSecondaryMatch,
    heroes: &HeroCatalog,
) -> Result<UnifiedMatch, MergeError> {
    let match_id = detail.match_id;

    let players = detail
        .players
        .into_iter()
        .map(|p| merge_player(league_match, match_id, p, heroes))
        .collect::<Result<Vec<_>, _>>()?;

    let picks_bans = detail
        .picks_bans
        .into_iter()
        .map(|slot| slot.map(|pb| resolve_pick_ban(match_id, pb, heroes)).transpose())
        .collect::<Result<Vec<_>, _>>()?;

    Ok(UnifiedMatch {
        match_id,
        region_id: league_match.region_id,
        start_date_time: league_match.start_date_time,
        end_date_time: league_match.end_date_time,
        duration_seconds: league_match.duration_seconds,
        radiant_team: league_match.radiant_team.clone(),
        dire_team: league_match.dire_team.clone(),
        radiant_score: detail.radiant_score,
        dire_score: detail.dire_score,
        radiant_win: detail.radiant_win,
        first_blood_time: detail.first_blood_time,
        picks_bans,
        players,
    })
}

fn merge_player(
    league_match: &RawPrimaryMatch,
    match_id: i64,
    stats: RawSecondaryPlayer,
    heroes: &HeroCatalog,
) -> Result<UnifiedPlayer, MergeError> {
    let account_id = stats.account_id.ok_or(MergeError::MissingAccountId {
        match_id,
        hero_id: stats.hero_id,
    })?;
    let league_player = league_match
        .player(account_id)
        .map_err(|count| match count {
            0 => MergeError::MissingPlayer {
                match_id,
                account_id,
            },
            count => MergeError::DuplicatePlayer {
                match_id,
                account_id,
                count,
            },
        })?;
    let hero = resolve_hero(match_id, stats.hero_id, heroes)?;

    Ok(UnifiedPlayer {
        steam_account: league_player.steam_account.clone(),
        hero,
        stats,
    })
}

fn resolve_pick_ban(
    match_id: i64,
    pick_ban: PickBan,
    heroes: &HeroCatalog,
) -> Result<UnifiedPickBan, MergeError> {
    Ok(UnifiedPickBan {
        is_pick: pick_ban.is_pick,
        hero: resolve_hero(match_id, pick_ban.hero_id, heroes)?,
        team: pick_ban.team,
        order: pick_ban.order,
    })
}

fn resolve_hero(
    match_id: i64,
    hero_id: u32,
    heroes: &HeroCatalog,
) -> Result<HeroDescriptor, MergeError> {
    heroes
        .get(hero_id)
        .cloned()
        .ok_or(MergeError::UnknownHero { match_id, hero_id })
}
