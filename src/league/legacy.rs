//! Import of the JSON document written by the first version of the bot.
//!
//! That format grew field by field, so older records lack keys that newer ones have. Every
//! missing key is defaulted here, once, and the result is a fully typed [`Ledger`].

use std::collections::{BTreeMap, BTreeSet};

use chrono::DateTime;
use serde::Deserialize;

use super::ledger::Ledger;
use super::model::{CardStyle, Match, MatchId, MvpVote, Participant, Player, PlayerId, SkillProfile};
use crate::utils::error::LeagueError;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LegacyDocument {
    players: BTreeMap<String, LegacyPlayer>,
    matches: BTreeMap<String, LegacyMatch>,
    last_match_id: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LegacyPlayer {
    id: Option<u64>,
    name: String,
    rating: Option<f64>,
    tir: Option<f64>,
    passes: Option<f64>,
    physique: Option<f64>,
    influence: Option<f64>,
    gardien: Option<f64>,
    points: f64,
    wins: u32,
    losses: u32,
    draws: u32,
    matches: u32,
    goals: u32,
    assists: u32,
    mvps: u32,
    card_color: Option<String>,
    card_tagline: Option<String>,
    card_border: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LegacyMatch {
    id: Option<u64>,
    channel_id: Option<u64>,
    created_at: Option<String>,
    team_a: Vec<i64>,
    team_b: Vec<i64>,
    score_a: Option<i64>,
    score_b: Option<i64>,
    result_recorded: bool,
    mvp_open: Option<bool>,
    mvp_votes: BTreeMap<String, serde_json::Value>,
    mvp_winners: Vec<i64>,
    stats_entered: BTreeMap<String, bool>,
}

/// Summary of an import, for the reply and the logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    pub players: usize,
    pub matches: usize,
    pub last_match_id: MatchId,
}

fn skill(value: Option<f64>) -> Option<u8> {
    value.map(|v| v.round().clamp(0.0, SkillProfile::MAX as f64) as u8)
}

fn parse_key(key: &str, what: &str) -> Result<u64, LeagueError> {
    key.parse()
        .map_err(|_| LeagueError::Internal(format!("{} key `{}` is not a number", what, key)))
}

fn score(raw: Option<i64>, match_id: MatchId) -> Result<Option<u32>, LeagueError> {
    raw.map(|value| {
        u32::try_from(value).map_err(|_| {
            LeagueError::Internal(format!("match #{} has an invalid score {}", match_id, value))
        })
    })
    .transpose()
}

fn participant(raw: i64) -> Participant {
    if raw < 0 {
        // Guest ratings were never stored.
        Participant::Guest {
            seq: raw.unsigned_abs() as u32,
            rating: 0,
        }
    } else {
        Participant::Registered(raw as PlayerId)
    }
}

impl LegacyPlayer {
    fn into_player(self, key_id: PlayerId) -> Player {
        let skills = [self.tir, self.passes, self.physique, self.influence, self.gardien];
        let skills = if skills.iter().all(Option::is_none) {
            // Profiles from before skills existed only carry a rating.
            SkillProfile::uniform(skill(self.rating).unwrap_or(0))
        } else {
            let [shot, pass, physical, influence, goalkeeping] = skills.map(|s| skill(s).unwrap_or(0));
            SkillProfile {
                shot,
                pass,
                physical,
                influence,
                goalkeeping,
            }
        };
        let defaults = CardStyle::default();
        Player {
            id: self.id.unwrap_or(key_id),
            name: self.name,
            rating: self.rating.unwrap_or_else(|| skills.rating()),
            skills,
            points: self.points,
            wins: self.wins,
            losses: self.losses,
            draws: self.draws,
            matches: self.matches,
            goals: self.goals,
            assists: self.assists,
            mvps: self.mvps,
            card: CardStyle {
                color: self.card_color.unwrap_or(defaults.color),
                border: self.card_border.unwrap_or(defaults.border),
                tagline: self.card_tagline.unwrap_or(defaults.tagline),
            },
        }
    }
}

impl LegacyMatch {
    fn into_match(self, key_id: MatchId) -> Result<Match, LeagueError> {
        let id = self.id.unwrap_or(key_id);
        let created_at = self
            .created_at
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|at| at.timestamp())
            .unwrap_or_default();

        let mut mvp_votes = Vec::with_capacity(self.mvp_votes.len());
        for (voter, target) in self.mvp_votes {
            let target = match &target {
                serde_json::Value::String(raw) => raw.parse::<i64>().ok(),
                serde_json::Value::Number(raw) => raw.as_i64(),
                _ => None,
            }
            .ok_or_else(|| {
                LeagueError::Internal(format!("unreadable MVP vote `{}` in match #{}", target, id))
            })?;
            mvp_votes.push(MvpVote {
                voter: parse_key(&voter, "voter")?,
                target: participant(target),
            });
        }

        let stats_entered = self
            .stats_entered
            .into_iter()
            .filter(|(_, entered)| *entered)
            .map(|(player, _)| parse_key(&player, "stats player"))
            .collect::<Result<BTreeSet<_>, _>>()?;

        Ok(Match {
            id,
            channel_id: self.channel_id,
            created_at,
            team_a: self.team_a.into_iter().map(participant).collect(),
            team_b: self.team_b.into_iter().map(participant).collect(),
            score_a: score(self.score_a, id)?,
            score_b: score(self.score_b, id)?,
            result_recorded: self.result_recorded,
            mvp_open: self.mvp_open.unwrap_or(true),
            mvp_votes,
            mvp_winners: self.mvp_winners.into_iter().map(participant).collect(),
            stats_entered,
        })
    }
}

pub fn parse_document(raw: &[u8]) -> Result<LegacyDocument, LeagueError> {
    serde_json::from_slice(raw)
        .map_err(|e| LeagueError::Internal(format!("not a legacy data file: {}", e)))
}

/// Loads a legacy document into an empty ledger.
pub fn import_legacy(
    ledger: &mut Ledger,
    document: LegacyDocument,
) -> Result<ImportReport, LeagueError> {
    if !ledger.is_empty() {
        return Err(LeagueError::LedgerNotEmpty);
    }

    let mut players = Vec::with_capacity(document.players.len());
    for (key, player) in document.players {
        players.push(player.into_player(parse_key(&key, "player")?));
    }
    let mut matches = Vec::with_capacity(document.matches.len());
    for (key, game_match) in document.matches {
        matches.push(game_match.into_match(parse_key(&key, "match")?)?);
    }

    // IDs already handed out stay used, even when their matches were deleted.
    let highest = matches.iter().map(|m| m.id).max().unwrap_or(0);
    let last_match_id = document
        .last_match_id
        .unwrap_or(0)
        .max(highest)
        .max(ledger.last_match_id());
    let report = ImportReport {
        players: players.len(),
        matches: matches.len(),
        last_match_id,
    };

    for player in players {
        ledger.upsert_player(player);
    }
    for game_match in matches {
        ledger.insert_imported_match(game_match);
    }
    ledger.set_last_match_id(last_match_id);
    Ok(report)
}
