//! Statistics calculation engine.
//!
//! Reduces a filtered set of merged matches into an [`AggregateReport`]:
//! - Shortest/longest game and least/most kills game
//! - Earliest/latest first blood
//! - Per-stat player leaders
//! - Most picked and most banned heroes
//!
//! Ties always go to input order: the first of equal values is the lowest,
//! the last is the highest.

use std::collections::HashMap;

use thiserror::Error;

use crate::models::{
    AggregateReport, GameHighlight, HeroCount, HeroDescriptor, PlayerHighlight, PlayerHighlights,
    RawSecondaryPlayer, UnifiedMatch, UnifiedPlayer,
};

const TOP_HEROES: usize = 3;

/// Errors from report calculation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregateError {
    #[error("No matches in regions {regions:?} ending between {from} and {to}")]
    EmptyResult { regions: Vec<i32>, from: i64, to: i64 },

    #[error("Filtered matches contain no players")]
    NoPlayers,
}

/// Per-player statistics tracked in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerStat {
    Kills,
    Deaths,
    Assists,
    GoldPerMin,
    XpPerMin,
    LastHits,
    Denies,
    HeroDamage,
    TowerDamage,
    HeroHealing,
    RunePickups,
    CampsStacked,
    CourierKills,
    TotalGold,
}

impl PlayerStat {
    pub fn value(self, p: &RawSecondaryPlayer) -> i64 {
        match self {
            PlayerStat::Kills => p.kills,
            PlayerStat::Deaths => p.deaths,
            PlayerStat::Assists => p.assists,
            PlayerStat::GoldPerMin => p.gold_per_min,
            PlayerStat::XpPerMin => p.xp_per_min,
            PlayerStat::LastHits => p.last_hits,
            PlayerStat::Denies => p.denies,
            PlayerStat::HeroDamage => p.hero_damage,
            PlayerStat::TowerDamage => p.tower_damage,
            PlayerStat::HeroHealing => p.hero_healing,
            PlayerStat::RunePickups => p.rune_pickups,
            PlayerStat::CampsStacked => p.camps_stacked,
            PlayerStat::CourierKills => p.courier_kills,
            PlayerStat::TotalGold => p.total_gold,
        }
    }
}

/// Format seconds as `HH:MM:SS`, prefixed with `-` when negative.
pub fn format_duration(seconds: i64) -> String {
    let sign = if seconds < 0 { "-" } else { "" };
    let abs = seconds.unsigned_abs();
    format!(
        "{}{:02}:{:02}:{:02}",
        sign,
        abs / 3600,
        (abs % 3600) / 60,
        abs % 60
    )
}

/// Keep matches in an allowed region that ended strictly inside `(from, to)`.
pub fn filter_matches<'a>(
    matches: &'a [UnifiedMatch],
    regions: &[i32],
    from: i64,
    to: i64,
) -> Vec<&'a UnifiedMatch> {
    matches
        .iter()
        .filter(|m| {
            regions.contains(&m.region_id) && from < m.end_date_time && m.end_date_time < to
        })
        .collect()
}

/// Compute the report over the matches that pass the region and time filter.
pub fn aggregate(
    matches: &[UnifiedMatch],
    regions: &[i32],
    from: i64,
    to: i64,
) -> Result<AggregateReport, AggregateError> {
    let filtered = filter_matches(matches, regions, from, to);
    let empty = || AggregateError::EmptyResult {
        regions: regions.to_vec(),
        from,
        to,
    };

    // min_by_key keeps the first of equal elements, max_by_key the last.
    let shortest = filtered
        .iter()
        .min_by_key(|m| m.duration_seconds)
        .ok_or_else(empty)?;
    let longest = filtered
        .iter()
        .max_by_key(|m| m.duration_seconds)
        .ok_or_else(empty)?;
    let least_kills = filtered
        .iter()
        .min_by_key(|m| m.total_kills())
        .ok_or_else(empty)?;
    let most_kills = filtered
        .iter()
        .max_by_key(|m| m.total_kills())
        .ok_or_else(empty)?;

    let first_bloods: Vec<(&UnifiedMatch, i64)> = filtered
        .iter()
        .filter_map(|m| m.first_blood_time.map(|t| (*m, t)))
        .collect();
    let first_first_blood = first_bloods
        .iter()
        .min_by_key(|(_, t)| *t)
        .map(|(m, t)| GameHighlight::new(m, format_duration(*t)));
    let last_first_blood = first_bloods
        .iter()
        .max_by_key(|(_, t)| *t)
        .map(|(m, t)| GameHighlight::new(m, format_duration(*t)));

    let players: Vec<(i64, &UnifiedPlayer)> = filtered
        .iter()
        .flat_map(|m| m.players.iter().map(move |p| (m.match_id, p)))
        .collect();

    Ok(AggregateReport {
        match_count: filtered.len(),
        shortest_game: GameHighlight::new(shortest, format_duration(shortest.duration_seconds)),
        longest_game: GameHighlight::new(longest, format_duration(longest.duration_seconds)),
        least_kills_game: GameHighlight::new(least_kills, least_kills.total_kills()),
        most_kills_game: GameHighlight::new(most_kills, most_kills.total_kills()),
        first_first_blood_game: first_first_blood,
        last_first_blood_game: last_first_blood,
        players: player_highlights(&players)?,
        heroes: top_heroes(players.iter().map(|(_, p)| &p.hero)),
        bans: top_heroes(
            filtered
                .iter()
                .flat_map(|m| m.picks_bans.iter().flatten())
                .filter(|pb| !pb.is_pick)
                .map(|pb| &pb.hero),
        ),
    })
}

fn player_highlights(
    players: &[(i64, &UnifiedPlayer)],
) -> Result<PlayerHighlights, AggregateError> {
    let highest = |stat| leader(players, stat, true);
    let lowest = |stat| leader(players, stat, false);

    Ok(PlayerHighlights {
        most_kills: highest(PlayerStat::Kills)?,
        most_deaths: highest(PlayerStat::Deaths)?,
        most_assists: highest(PlayerStat::Assists)?,
        highest_gpm: highest(PlayerStat::GoldPerMin)?,
        highest_xpm: highest(PlayerStat::XpPerMin)?,
        highest_last_hits: highest(PlayerStat::LastHits)?,
        highest_denies: highest(PlayerStat::Denies)?,
        highest_hero_damage: highest(PlayerStat::HeroDamage)?,
        highest_tower_damage: highest(PlayerStat::TowerDamage)?,
        highest_healing: highest(PlayerStat::HeroHealing)?,
        most_runes: highest(PlayerStat::RunePickups)?,
        most_camps_stacked: highest(PlayerStat::CampsStacked)?,
        most_courier_kills: highest(PlayerStat::CourierKills)?,
        highest_total_gold: highest(PlayerStat::TotalGold)?,
        lowest_total_gold: lowest(PlayerStat::TotalGold)?,
    })
}

fn leader(
    players: &[(i64, &UnifiedPlayer)],
    stat: PlayerStat,
    highest: bool,
) -> Result<PlayerHighlight, AggregateError> {
    let key = |entry: &&(i64, &UnifiedPlayer)| stat.value(&entry.1.stats);
    let found = if highest {
        players.iter().max_by_key(key)
    } else {
        players.iter().min_by_key(key)
    };

    let (match_id, player) = found.ok_or(AggregateError::NoPlayers)?;
    Ok(PlayerHighlight {
        match_id: *match_id,
        value: stat.value(&player.stats),
        player: (*player).clone(),
    })
}

/// Count heroes in first-seen order, then keep the most frequent few.
fn top_heroes<'a>(heroes: impl Iterator<Item = &'a HeroDescriptor>) -> Vec<HeroCount> {
    let mut index: HashMap<u32, usize> = HashMap::new();
    let mut counts: Vec<HeroCount> = Vec::new();

    for hero in heroes {
        match index.get(&hero.id) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(hero.id, counts.len());
                counts.push(HeroCount {
                    hero: hero.clone(),
                    count: 1,
                });
            }
        }
    }

    // Stable, so equal counts stay in first-seen order.
    counts.sort_by_key(|c| c.count);
    let keep_from = counts.len().saturating_sub(TOP_HEROES);
    counts.split_off(keep_from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SteamAccount, UnifiedPickBan};
    use pretty_assertions::assert_eq;

    fn hero(id: u32) -> HeroDescriptor {
        HeroDescriptor {
            id,
            display_name: format!("Hero {}", id),
            portrait_url: format!("https://cdn.example.com/{}_vert.jpg", id),
            icon_url: format!("https://cdn.example.com/{}_full.png", id),
        }
    }

    fn player(account_id: i64, hero_id: u32, kills: i64, total_gold: i64) -> UnifiedPlayer {
        UnifiedPlayer {
            stats: RawSecondaryPlayer {
                account_id: Some(account_id),
                hero_id,
                kills,
                total_gold,
                ..Default::default()
            },
            steam_account: SteamAccount {
                id: account_id,
                ..Default::default()
            },
            hero: hero(hero_id),
        }
    }

    fn game(match_id: i64, duration: i64, kills: (i64, i64), players: Vec<UnifiedPlayer>) -> UnifiedMatch {
        UnifiedMatch {
            match_id,
            region_id: 3,
            start_date_time: 1000,
            end_date_time: 1000 + duration,
            duration_seconds: duration,
            radiant_team: None,
            dire_team: None,
            radiant_score: kills.0,
            dire_score: kills.1,
            radiant_win: kills.0 > kills.1,
            first_blood_time: None,
            picks_bans: Vec::new(),
            players,
        }
    }

    fn ban(hero_id: u32) -> Option<UnifiedPickBan> {
        Some(UnifiedPickBan {
            is_pick: false,
            hero: hero(hero_id),
            team: Some(0),
            order: None,
        })
    }

    fn sample() -> Vec<UnifiedMatch> {
        let mut a = game(
            1,
            2400,
            (30, 12),
            vec![player(11, 1, 10, 20_000), player(12, 2, 4, 9_000)],
        );
        a.first_blood_time = Some(95);
        a.picks_bans = vec![ban(5), None, ban(6)];
        let mut b = game(
            2,
            1500,
            (8, 9),
            vec![player(21, 1, 10, 15_000), player(22, 3, 2, 9_000)],
        );
        b.first_blood_time = Some(-20);
        b.picks_bans = vec![ban(5)];
        let c = game(
            3,
            3100,
            (25, 20),
            vec![player(31, 4, 7, 30_000), player(32, 1, 1, 12_000)],
        );
        vec![a, b, c]
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(125), "00:02:05");
        assert_eq!(format_duration(-5), "-00:00:05");
        assert_eq!(format_duration(0), "00:00:00");
        assert_eq!(format_duration(3661), "01:01:01");
    }

    #[test]
    fn test_filter_is_strict_on_both_ends() {
        let matches = sample();
        // End times: 3400, 2500, 4100.
        let kept: Vec<i64> = filter_matches(&matches, &[3], 2500, 4100)
            .iter()
            .map(|m| m.match_id)
            .collect();
        assert_eq!(kept, vec![1]);

        let none = filter_matches(&matches, &[8, 9], 0, i64::MAX);
        assert!(none.is_empty());
    }

    #[test]
    fn test_game_superlatives() {
        let report = aggregate(&sample(), &[3], 0, i64::MAX).unwrap();

        assert_eq!(report.match_count, 3);
        assert_eq!(report.shortest_game.match_id, 2);
        assert_eq!(report.shortest_game.value, "00:25:00");
        assert_eq!(report.longest_game.match_id, 3);
        assert_eq!(report.longest_game.value, "00:51:40");
        assert_eq!(report.least_kills_game.match_id, 2);
        assert_eq!(report.least_kills_game.value, 17);
        assert_eq!(report.most_kills_game.match_id, 3);
        assert_eq!(report.most_kills_game.value, 45);
        assert!(!report.least_kills_game.radiant_win);
    }

    #[test]
    fn test_first_blood_superlatives() {
        let report = aggregate(&sample(), &[3], 0, i64::MAX).unwrap();

        let first = report.first_first_blood_game.unwrap();
        let last = report.last_first_blood_game.unwrap();
        assert_eq!(first.match_id, 2);
        assert_eq!(first.value, "-00:00:20");
        assert_eq!(last.match_id, 1);
        assert_eq!(last.value, "00:01:35");
    }

    #[test]
    fn test_first_blood_absent() {
        let matches = vec![game(1, 100, (1, 1), vec![player(1, 1, 1, 1)])];

        let report = aggregate(&matches, &[3], 0, i64::MAX).unwrap();

        assert!(report.first_first_blood_game.is_none());
        assert!(report.last_first_blood_game.is_none());
    }

    #[test]
    fn test_player_ties_pick_last_for_highest_first_for_lowest() {
        let report = aggregate(&sample(), &[3], 0, i64::MAX).unwrap();

        // Accounts 11 and 21 both have 10 kills; 21 comes later.
        assert_eq!(report.players.most_kills.value, 10);
        assert_eq!(report.players.most_kills.player.steam_account.id, 21);
        assert_eq!(report.players.most_kills.match_id, 2);

        // Accounts 12 and 22 both have 9000 gold; 12 comes first.
        assert_eq!(report.players.lowest_total_gold.value, 9_000);
        assert_eq!(report.players.lowest_total_gold.player.steam_account.id, 12);
        assert_eq!(report.players.highest_total_gold.player.steam_account.id, 31);
    }

    #[test]
    fn test_all_zero_stat_picks_last_player() {
        let report = aggregate(&sample(), &[3], 0, i64::MAX).unwrap();

        assert_eq!(report.players.most_courier_kills.value, 0);
        assert_eq!(report.players.most_courier_kills.player.steam_account.id, 32);
    }

    #[test]
    fn test_match_kills_tie_picks_later_match() {
        let matches = vec![
            game(1, 100, (10, 10), vec![player(1, 1, 0, 0)]),
            game(2, 200, (15, 5), vec![player(2, 1, 0, 0)]),
            game(3, 300, (5, 15), vec![player(3, 1, 0, 0)]),
        ];

        let report = aggregate(&matches, &[3], 0, i64::MAX).unwrap();

        assert_eq!(report.most_kills_game.match_id, 3);
        assert_eq!(report.least_kills_game.match_id, 1);
    }

    #[test]
    fn test_top_heroes_ascending() {
        // Hero 1 x1, hero 2 x5, hero 3 x3, hero 4 x2, hero 5 x4.
        let heroes: Vec<HeroDescriptor> = [(1, 1), (2, 5), (3, 3), (4, 2), (5, 4)]
            .iter()
            .flat_map(|&(id, n)| std::iter::repeat(hero(id)).take(n))
            .collect();

        let top = top_heroes(heroes.iter());

        let counts: Vec<usize> = top.iter().map(|c| c.count).collect();
        let ids: Vec<u32> = top.iter().map(|c| c.hero.id).collect();
        assert_eq!(counts, vec![3, 4, 5]);
        assert_eq!(ids, vec![3, 5, 2]);
    }

    #[test]
    fn test_top_heroes_ties_keep_first_seen_order() {
        let heroes = vec![hero(7), hero(3), hero(9), hero(1)];

        let top = top_heroes(heroes.iter());

        let ids: Vec<u32> = top.iter().map(|c| c.hero.id).collect();
        assert_eq!(ids, vec![3, 9, 1]);
    }

    #[test]
    fn test_picks_and_bans() {
        let report = aggregate(&sample(), &[3], 0, i64::MAX).unwrap();

        let picks: Vec<(u32, usize)> = report.heroes.iter().map(|c| (c.hero.id, c.count)).collect();
        assert_eq!(picks, vec![(3, 1), (4, 1), (1, 3)]);

        let bans: Vec<(u32, usize)> = report.bans.iter().map(|c| (c.hero.id, c.count)).collect();
        assert_eq!(bans, vec![(6, 1), (5, 2)]);
    }

    #[test]
    fn test_picks_ignored_in_bans() {
        let mut matches = sample();
        matches[0].picks_bans.push(Some(UnifiedPickBan {
            is_pick: true,
            hero: hero(6),
            team: Some(1),
            order: None,
        }));

        let report = aggregate(&matches, &[3], 0, i64::MAX).unwrap();

        let six = report.bans.iter().find(|c| c.hero.id == 6).unwrap();
        assert_eq!(six.count, 1);
    }

    #[test]
    fn test_empty_filter_is_an_error() {
        let err = aggregate(&sample(), &[8], 0, i64::MAX).unwrap_err();
        assert_eq!(
            err,
            AggregateError::EmptyResult {
                regions: vec![8],
                from: 0,
                to: i64::MAX
            }
        );

        let err = aggregate(&sample(), &[3], 5000, 6000).unwrap_err();
        assert!(matches!(err, AggregateError::EmptyResult { .. }));

        let err = aggregate(&[], &[3], 0, i64::MAX).unwrap_err();
        assert!(matches!(err, AggregateError::EmptyResult { .. }));
    }

    #[test]
    fn test_matches_without_players_is_an_error() {
        let matches = vec![game(1, 100, (1, 0), Vec::new())];

        let err = aggregate(&matches, &[3], 0, i64::MAX).unwrap_err();

        assert_eq!(err, AggregateError::NoPlayers);
    }

    #[test]
    fn test_aggregate_is_repeatable() {
        let matches = sample();

        let first = aggregate(&matches, &[3], 0, i64::MAX).unwrap();
        let second = aggregate(&matches, &[3], 0, i64::MAX).unwrap();

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
