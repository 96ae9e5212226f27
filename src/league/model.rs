use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

use crate::utils::error::LeagueError;

/// Discord user ID of a registered player.
pub type PlayerId = u64;
/// Sequential match number handed out by the ledger.
pub type MatchId = u64;

/// One of the five skill dimensions a player is rated on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display)]
pub enum Skill {
    #[strum(to_string = "Shot")]
    Shot,
    #[strum(to_string = "Pass")]
    Pass,
    #[strum(to_string = "Physical")]
    Physical,
    #[strum(to_string = "Influence")]
    Influence,
    #[strum(to_string = "Goalkeeping")]
    Goalkeeping,
}

impl Skill {
    /// How much an imbalance on this skill counts when splitting teams.
    pub fn weight(self) -> f64 {
        match self {
            Skill::Shot => 5.0,
            Skill::Pass => 5.0,
            Skill::Physical => 2.5,
            Skill::Influence => 4.5,
            Skill::Goalkeeping => 2.0,
        }
    }
}

/// The five skill attributes of a participant, each in `0..=10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SkillProfile {
    pub shot: u8,
    pub pass: u8,
    pub physical: u8,
    pub influence: u8,
    pub goalkeeping: u8,
}

impl SkillProfile {
    pub const MAX: u8 = 10;

    pub fn new(
        shot: u8,
        pass: u8,
        physical: u8,
        influence: u8,
        goalkeeping: u8,
    ) -> Result<Self, LeagueError> {
        let profile = Self {
            shot,
            pass,
            physical,
            influence,
            goalkeeping,
        };
        for skill in Skill::iter() {
            let value = profile.get(skill);
            if value > Self::MAX {
                return Err(LeagueError::SkillOutOfRange {
                    skill: skill.to_string(),
                    value,
                });
            }
        }
        Ok(profile)
    }

    /// Every skill set to the same value, as used for guests.
    pub fn uniform(value: u8) -> Self {
        Self {
            shot: value,
            pass: value,
            physical: value,
            influence: value,
            goalkeeping: value,
        }
    }

    pub fn get(&self, skill: Skill) -> u8 {
        match skill {
            Skill::Shot => self.shot,
            Skill::Pass => self.pass,
            Skill::Physical => self.physical,
            Skill::Influence => self.influence,
            Skill::Goalkeeping => self.goalkeeping,
        }
    }

    pub fn total(&self) -> u32 {
        Skill::iter().map(|skill| self.get(skill) as u32).sum()
    }

    /// Mean of the five skills rounded to one decimal place.
    ///
    /// The mean of five integers is always a multiple of 0.2, so this is exact.
    pub fn rating(&self) -> f64 {
        (self.total() * 2) as f64 / 10.0
    }
}

/// Cosmetic settings for a player's stat card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardStyle {
    pub color: String,
    pub border: String,
    pub tagline: String,
}

impl Default for CardStyle {
    fn default() -> Self {
        Self {
            color: "#1E1E46".to_string(),
            border: "#D4AF37".to_string(),
            tagline: String::new(),
        }
    }
}

impl CardStyle {
    pub const MAX_TAGLINE: usize = 100;

    /// Parses a `#RRGGBB` color into its numeric value.
    pub fn parse_color(raw: &str) -> Result<u32, LeagueError> {
        let hex = raw
            .strip_prefix('#')
            .filter(|hex| hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()))
            .ok_or_else(|| LeagueError::InvalidColor(raw.to_string()))?;
        u32::from_str_radix(hex, 16).map_err(|_| LeagueError::InvalidColor(raw.to_string()))
    }

    pub fn color_value(&self) -> Option<u32> {
        Self::parse_color(&self.color).ok()
    }
}

/// A registered player and everything the league has counted for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub skills: SkillProfile,
    /// Overall rating. Derived from `skills` whenever the profile is set, but imported records
    /// may carry a rating of their own.
    pub rating: f64,
    pub points: f64,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub matches: u32,
    pub goals: u32,
    pub assists: u32,
    pub mvps: u32,
    pub card: CardStyle,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, skills: SkillProfile) -> Self {
        Self {
            id,
            name: name.into(),
            skills,
            rating: skills.rating(),
            points: 0.0,
            wins: 0,
            losses: 0,
            draws: 0,
            matches: 0,
            goals: 0,
            assists: 0,
            mvps: 0,
            card: CardStyle::default(),
        }
    }

    pub fn win_balance(&self) -> i64 {
        self.wins as i64 - self.losses as i64
    }
}

/// Someone taking one of the ten slots of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Participant {
    Registered(PlayerId),
    /// An unregistered player rated for a single match. `seq` starts at 1 within a match.
    Guest { seq: u32, rating: u8 },
}

impl Participant {
    pub fn player_id(&self) -> Option<PlayerId> {
        match self {
            Participant::Registered(id) => Some(*id),
            Participant::Guest { .. } => None,
        }
    }

}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Participant::Registered(id) => write!(f, "<@{}>", id),
            Participant::Guest { seq, .. } => write!(f, "Guest #{}", seq),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    A,
    B,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::A => write!(f, "Team A 🔴"),
            Side::B => write!(f, "Team B 🔵"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win(Side),
    Draw,
}

impl Outcome {
    pub fn from_scores(score_a: u32, score_b: u32) -> Self {
        match score_a.cmp(&score_b) {
            std::cmp::Ordering::Greater => Outcome::Win(Side::A),
            std::cmp::Ordering::Less => Outcome::Win(Side::B),
            std::cmp::Ordering::Equal => Outcome::Draw,
        }
    }
}

/// Where and when a match was organised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchOrigin {
    pub channel_id: Option<u64>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MvpVote {
    pub voter: PlayerId,
    pub target: Participant,
}

/// A 5-a-side match with its result, MVP vote and per-player stat guard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub channel_id: Option<u64>,
    pub created_at: i64,
    pub team_a: Vec<Participant>,
    pub team_b: Vec<Participant>,
    pub score_a: Option<u32>,
    pub score_b: Option<u32>,
    pub result_recorded: bool,
    pub mvp_open: bool,
    /// Votes in the order they were cast. A voter appears at most once.
    pub mvp_votes: Vec<MvpVote>,
    pub mvp_winners: Vec<Participant>,
    pub stats_entered: BTreeSet<PlayerId>,
}

impl Match {
    pub fn new(
        id: MatchId,
        team_a: Vec<Participant>,
        team_b: Vec<Participant>,
        origin: MatchOrigin,
    ) -> Self {
        Self {
            id,
            channel_id: origin.channel_id,
            created_at: origin.created_at,
            team_a,
            team_b,
            score_a: None,
            score_b: None,
            result_recorded: false,
            mvp_open: true,
            mvp_votes: Vec::new(),
            mvp_winners: Vec::new(),
            stats_entered: BTreeSet::new(),
        }
    }

    pub fn side_of(&self, participant: &Participant) -> Option<Side> {
        if self.team_a.contains(participant) {
            Some(Side::A)
        } else if self.team_b.contains(participant) {
            Some(Side::B)
        } else {
            None
        }
    }

    pub fn contains(&self, participant: &Participant) -> bool {
        self.side_of(participant).is_some()
    }

    pub fn participants(&self) -> impl Iterator<Item = &Participant> {
        self.team_a.iter().chain(self.team_b.iter())
    }

    pub fn has_voted(&self, voter: PlayerId) -> bool {
        self.mvp_votes.iter().any(|vote| vote.voter == voter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_is_the_rounded_mean_of_the_skills() {
        let skills = SkillProfile::new(9, 8, 7, 6, 3).unwrap();
        assert_eq!(skills.total(), 33);
        assert_eq!(skills.rating(), 6.6);
        assert_eq!(SkillProfile::uniform(7).rating(), 7.0);
    }

    #[test]
    fn rejects_skills_above_ten() {
        let err = SkillProfile::new(5, 11, 5, 5, 5).unwrap_err();
        assert_eq!(
            err,
            LeagueError::SkillOutOfRange {
                skill: "Pass".to_string(),
                value: 11
            }
        );
    }

    #[test]
    fn only_registered_participants_have_a_player_id() {
        assert_eq!(Participant::Registered(42).player_id(), Some(42));
        assert!(Participant::Guest { seq: 1, rating: 5 }.player_id().is_none());
    }

    #[test]
    fn parses_card_colors() {
        assert_eq!(CardStyle::parse_color("#1E1E46"), Ok(0x1E1E46));
        assert!(CardStyle::parse_color("1E1E46").is_err());
        assert!(CardStyle::parse_color("#12345").is_err());
        assert!(CardStyle::parse_color("#GGGGGG").is_err());
        assert!(CardStyle::parse_color("#+12345").is_err());
    }

    #[test]
    fn scores_decide_the_outcome() {
        assert_eq!(Outcome::from_scores(3, 1), Outcome::Win(Side::A));
        assert_eq!(Outcome::from_scores(0, 2), Outcome::Win(Side::B));
        assert_eq!(Outcome::from_scores(2, 2), Outcome::Draw);
    }
}
