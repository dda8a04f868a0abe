//! Match records as returned by the Stratz league endpoint.

use serde::{Deserialize, Serialize};

/// Team reference carried through to reports untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamRef {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default, alias = "logo")]
    pub logo_url: Option<String>,
}

/// Steam profile attached to a primary player.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SteamAccount {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub smurf_flag: Option<i32>,
    #[serde(default)]
    pub is_anonymous: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPrimaryPlayer {
    pub steam_account_id: i64,
    #[serde(default)]
    pub steam_account: SteamAccount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPrimaryMatch {
    pub id: i64,
    #[serde(default)]
    pub region_id: i32,
    #[serde(default)]
    pub duration_seconds: i64,
    #[serde(default)]
    pub start_date_time: i64,
    #[serde(default)]
    pub end_date_time: i64,
    #[serde(default)]
    pub radiant_team: Option<TeamRef>,
    #[serde(default)]
    pub dire_team: Option<TeamRef>,
    #[serde(default)]
    pub players: Vec<RawPrimaryPlayer>,
}

impl RawPrimaryMatch {
    /// Find the one player with `account_id`.
    ///
    /// When there is not exactly one, the error holds how many were found.
    pub fn player(&self, account_id: i64) -> Result<&RawPrimaryPlayer, usize> {
        let mut hits = self
            .players
            .iter()
            .filter(|p| p.steam_account_id == account_id);
        match (hits.next(), hits.next()) {
            (Some(player), None) => Ok(player),
            (None, _) => Err(0),
            (Some(_), Some(_)) => Err(2 + hits.count()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_match_deserialization() {
        let json = r#"{
            "id": 6012345678,
            "didRadiantWin": true,
            "durationSeconds": 2405,
            "startDateTime": 1622505600,
            "endDateTime": 1622508005,
            "regionId": 3,
            "radiantTeam": {"id": 15, "name": "PSG.LGD", "tag": "PSG.LGD", "logo": "https://example.com/lgd.png"},
            "direTeam": {"id": 2163, "name": "Team Liquid", "tag": "Liquid"},
            "players": [
                {"steamAccountId": 111, "heroId": 1, "steamAccount": {"id": 111, "name": "Ame", "smurfFlag": 0}},
                {"steamAccountId": 222, "heroId": 2}
            ]
        }"#;

        let m: RawPrimaryMatch = serde_json::from_str(json).unwrap();

        assert_eq!(m.id, 6012345678);
        assert_eq!(m.region_id, 3);
        assert_eq!(m.duration_seconds, 2405);
        assert_eq!(m.end_date_time, 1622508005);
        assert_eq!(
            m.radiant_team.as_ref().unwrap().logo_url.as_deref(),
            Some("https://example.com/lgd.png")
        );
        assert_eq!(m.players.len(), 2);
        assert_eq!(m.player(111).unwrap().steam_account.name.as_deref(), Some("Ame"));
        assert_eq!(m.player(222).unwrap().steam_account, SteamAccount::default());
        assert_eq!(m.player(333).unwrap_err(), 0);
    }

    #[test]
    fn test_player_lookup_rejects_duplicate_accounts() {
        let player = RawPrimaryPlayer {
            steam_account_id: 111,
            steam_account: SteamAccount::default(),
        };
        let m = RawPrimaryMatch {
            id: 1,
            region_id: 3,
            duration_seconds: 0,
            start_date_time: 0,
            end_date_time: 0,
            radiant_team: None,
            dire_team: None,
            players: vec![player.clone(), player.clone(), player],
        };

        assert_eq!(m.player(111).unwrap_err(), 3);
    }
}
