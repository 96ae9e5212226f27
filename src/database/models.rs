use std::collections::BTreeSet;

use sqlx::types::Json;

use crate::{
    league::model::{CardStyle, Match, MvpVote, Participant, Player, PlayerId, SkillProfile},
    BotError,
};

/// A row of the `players` table.
#[derive(Debug, sqlx::FromRow)]
pub struct PlayerRow {
    pub id: i64,
    pub name: String,
    pub shot: i16,
    pub pass: i16,
    pub physical: i16,
    pub influence: i16,
    pub goalkeeping: i16,
    pub rating: f64,
    pub points: f64,
    pub wins: i64,
    pub losses: i64,
    pub draws: i64,
    pub matches: i64,
    pub goals: i64,
    pub assists: i64,
    pub mvps: i64,
    pub card_color: String,
    pub card_border: String,
    pub card_tagline: String,
}

impl TryFrom<PlayerRow> for Player {
    type Error = BotError;

    fn try_from(row: PlayerRow) -> Result<Self, Self::Error> {
        Ok(Player {
            id: row.id.try_into()?,
            name: row.name,
            skills: SkillProfile {
                shot: row.shot.try_into()?,
                pass: row.pass.try_into()?,
                physical: row.physical.try_into()?,
                influence: row.influence.try_into()?,
                goalkeeping: row.goalkeeping.try_into()?,
            },
            rating: row.rating,
            points: row.points,
            wins: row.wins.try_into()?,
            losses: row.losses.try_into()?,
            draws: row.draws.try_into()?,
            matches: row.matches.try_into()?,
            goals: row.goals.try_into()?,
            assists: row.assists.try_into()?,
            mvps: row.mvps.try_into()?,
            card: CardStyle {
                color: row.card_color,
                border: row.card_border,
                tagline: row.card_tagline,
            },
        })
    }
}

/// A row of the `matches` table. Team, vote and stat lists are stored as JSONB.
#[derive(Debug, sqlx::FromRow)]
pub struct MatchRow {
    pub id: i64,
    pub channel_id: Option<i64>,
    pub created_at: i64,
    pub team_a: Json<Vec<Participant>>,
    pub team_b: Json<Vec<Participant>>,
    pub score_a: Option<i32>,
    pub score_b: Option<i32>,
    pub result_recorded: bool,
    pub mvp_open: bool,
    pub mvp_votes: Json<Vec<MvpVote>>,
    pub mvp_winners: Json<Vec<Participant>>,
    pub stats_entered: Json<BTreeSet<PlayerId>>,
}

impl TryFrom<MatchRow> for Match {
    type Error = BotError;

    fn try_from(row: MatchRow) -> Result<Self, Self::Error> {
        Ok(Match {
            id: row.id.try_into()?,
            channel_id: row.channel_id.map(u64::try_from).transpose()?,
            created_at: row.created_at,
            team_a: row.team_a.0,
            team_b: row.team_b.0,
            score_a: row.score_a.map(u32::try_from).transpose()?,
            score_b: row.score_b.map(u32::try_from).transpose()?,
            result_recorded: row.result_recorded,
            mvp_open: row.mvp_open,
            mvp_votes: row.mvp_votes.0,
            mvp_winners: row.mvp_winners.0,
            stats_entered: row.stats_entered.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_counters_are_rejected() {
        let row = PlayerRow {
            id: 5,
            name: "Ana".to_string(),
            shot: 4,
            pass: 4,
            physical: 4,
            influence: 4,
            goalkeeping: 4,
            rating: 4.0,
            points: 1.5,
            wins: -1,
            losses: 0,
            draws: 0,
            matches: 0,
            goals: 0,
            assists: 0,
            mvps: 0,
            card_color: "#1E1E46".to_string(),
            card_border: "#D4AF37".to_string(),
            card_tagline: String::new(),
        };
        assert!(Player::try_from(row).is_err());
    }

    #[test]
    fn match_rows_keep_guests_and_votes() {
        let guest = Participant::Guest { seq: 1, rating: 7 };
        let row = MatchRow {
            id: 3,
            channel_id: Some(99),
            created_at: 1_700_000_000,
            team_a: Json(vec![Participant::Registered(1), guest]),
            team_b: Json(vec![Participant::Registered(2)]),
            score_a: Some(2),
            score_b: None,
            result_recorded: false,
            mvp_open: true,
            mvp_votes: Json(vec![MvpVote {
                voter: 2,
                target: guest,
            }]),
            mvp_winners: Json(vec![]),
            stats_entered: Json(BTreeSet::from([1])),
        };
        let game_match = Match::try_from(row).unwrap();
        assert_eq!(game_match.id, 3);
        assert_eq!(game_match.channel_id, Some(99));
        assert_eq!(game_match.team_a[1], guest);
        assert_eq!(game_match.mvp_votes[0].target, guest);
        assert!(game_match.stats_entered.contains(&1));
    }
}
