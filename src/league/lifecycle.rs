//! Operations that move players and matches through their lifecycle.
//!
//! Every function works on a [`Ledger`] and either applies its whole change or returns an error
//! before touching anything, so a store can persist the ledger only on success.

use std::collections::HashSet;

use super::ledger::Ledger;
use super::model::{
    CardStyle, Match, MatchId, MatchOrigin, MvpVote, Outcome, Participant, Player, PlayerId,
    SkillProfile,
};
use crate::utils::error::LeagueError;

/// Players per team.
pub const TEAM_SIZE: usize = 5;
/// The point shared between the MVPs of a match.
pub const MVP_POINT: f64 = 1.0;

/// `current + amount`, or an error naming the player and counter that would wrap.
fn add_to(
    player: &Player,
    counter: &'static str,
    current: u32,
    amount: u32,
) -> Result<u32, LeagueError> {
    current.checked_add(amount).ok_or(LeagueError::CounterOverflow {
        player_id: player.id,
        counter,
    })
}

/// Creates or updates a player's profile. Counters of an existing player are kept.
pub fn set_profile(
    ledger: &mut Ledger,
    id: PlayerId,
    name: &str,
    skills: SkillProfile,
) -> Result<Player, LeagueError> {
    let skills = SkillProfile::new(
        skills.shot,
        skills.pass,
        skills.physical,
        skills.influence,
        skills.goalkeeping,
    )?;
    if let Some(player) = ledger.player_mut(id) {
        player.name = name.to_string();
        player.skills = skills;
        player.rating = skills.rating();
        return Ok(player.clone());
    }
    Ok(ledger.upsert_player(Player::new(id, name, skills)).clone())
}

/// Updates the cosmetic card fields that were given.
pub fn set_card(
    ledger: &mut Ledger,
    id: PlayerId,
    color: Option<&str>,
    border: Option<&str>,
    tagline: Option<&str>,
) -> Result<Player, LeagueError> {
    for raw in [color, border].into_iter().flatten() {
        CardStyle::parse_color(raw)?;
    }
    if let Some(tagline) = tagline {
        let len = tagline.chars().count();
        if len > CardStyle::MAX_TAGLINE {
            return Err(LeagueError::TaglineTooLong(len));
        }
    }
    let player = ledger
        .player_mut(id)
        .ok_or(LeagueError::NotRegistered(id))?;
    if let Some(color) = color {
        player.card.color = color.to_uppercase();
    }
    if let Some(border) = border {
        player.card.border = border.to_uppercase();
    }
    if let Some(tagline) = tagline {
        player.card.tagline = tagline.trim().to_string();
    }
    Ok(player.clone())
}

/// Stores a new match from two already balanced teams.
pub fn create_match(
    ledger: &mut Ledger,
    team_a: Vec<Participant>,
    team_b: Vec<Participant>,
    origin: MatchOrigin,
) -> Result<Match, LeagueError> {
    if team_a.len() != TEAM_SIZE || team_b.len() != TEAM_SIZE {
        return Err(LeagueError::WrongTeamSize {
            team_a: team_a.len(),
            team_b: team_b.len(),
        });
    }
    let mut seen = HashSet::with_capacity(TEAM_SIZE * 2);
    if let Some(duplicate) = team_a.iter().chain(team_b.iter()).find(|p| !seen.insert(**p)) {
        return Err(LeagueError::DuplicateParticipant(duplicate.to_string()));
    }
    Ok(ledger.insert_match(team_a, team_b, origin).clone())
}

/// The recorded result of a match and how it was classified.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub game_match: Match,
    pub outcome: Outcome,
}

/// Records the final score once and credits every registered participant.
///
/// Each registered player gets one more match played. Winners get a win and a point, losers a
/// loss; a draw gives everyone a draw and no points.
pub fn record_result(
    ledger: &mut Ledger,
    match_id: MatchId,
    score_a: u32,
    score_b: u32,
) -> Result<MatchResult, LeagueError> {
    let game_match = ledger
        .get_match(match_id)
        .ok_or(LeagueError::MatchNotFound(match_id))?;
    if game_match.result_recorded {
        return Err(LeagueError::ResultAlreadyRecorded(match_id));
    }
    let outcome = Outcome::from_scores(score_a, score_b);

    let mut credited = Vec::with_capacity(TEAM_SIZE * 2);
    for participant in game_match.participants() {
        let Some(player) = participant.player_id().and_then(|id| ledger.player(id)) else {
            continue;
        };
        let mut player = player.clone();
        player.matches = add_to(&player, "matches", player.matches, 1)?;
        match outcome {
            Outcome::Draw => player.draws = add_to(&player, "draws", player.draws, 1)?,
            Outcome::Win(winner) if game_match.side_of(participant) == Some(winner) => {
                player.wins = add_to(&player, "wins", player.wins, 1)?;
                player.points += 1.0;
            }
            Outcome::Win(_) => player.losses = add_to(&player, "losses", player.losses, 1)?,
        }
        credited.push(player);
    }

    let game_match = ledger.match_mut(match_id).ok_or_else(|| {
        LeagueError::Internal(format!("match #{} vanished while recording its result", match_id))
    })?;
    game_match.score_a = Some(score_a);
    game_match.score_b = Some(score_b);
    game_match.result_recorded = true;
    let game_match = game_match.clone();
    for player in credited {
        ledger.upsert_player(player);
    }

    Ok(MatchResult {
        game_match,
        outcome,
    })
}

/// Records a voter's MVP pick. The first vote of a voter is final.
pub fn cast_vote(
    ledger: &mut Ledger,
    match_id: MatchId,
    voter: PlayerId,
    target: Participant,
) -> Result<(), LeagueError> {
    let game_match = ledger
        .match_mut(match_id)
        .ok_or(LeagueError::MatchNotFound(match_id))?;
    if !game_match.contains(&target) {
        return Err(LeagueError::NotParticipant(target));
    }
    if !game_match.mvp_open {
        return Err(LeagueError::VoteClosed(match_id));
    }
    if game_match.has_voted(voter) {
        return Err(LeagueError::AlreadyVoted(match_id));
    }
    game_match.mvp_votes.push(MvpVote { voter, target });
    Ok(())
}

/// Outcome of closing (or re-reading) an MVP vote.
#[derive(Debug, Clone, PartialEq)]
pub struct MvpClosure {
    pub match_id: MatchId,
    /// Vote counts per target, highest first. Ties keep the order the targets were first voted.
    pub tally: Vec<(Participant, u32)>,
    pub winners: Vec<Participant>,
    /// `true` only for the call that actually closed the vote and awarded the points.
    pub just_closed: bool,
}

impl MvpClosure {
    /// Points each winner received, if there were winners.
    pub fn share(&self) -> Option<f64> {
        (!self.winners.is_empty()).then(|| MVP_POINT / self.winners.len() as f64)
    }
}

/// Counts votes per target, in order of each target's first vote.
pub fn tally_votes(game_match: &Match) -> Vec<(Participant, u32)> {
    let mut tally: Vec<(Participant, u32)> = Vec::new();
    for vote in &game_match.mvp_votes {
        match tally.iter_mut().find(|(target, _)| *target == vote.target) {
            Some((_, count)) => *count += 1,
            None => tally.push((vote.target, 1)),
        }
    }
    tally
}

/// Closes the MVP vote and splits one point between every target tied at the top.
///
/// Only the first call awards anything. Later calls report the stored winners again.
pub fn close_vote(ledger: &mut Ledger, match_id: MatchId) -> Result<MvpClosure, LeagueError> {
    let game_match = ledger
        .get_match(match_id)
        .ok_or(LeagueError::MatchNotFound(match_id))?;
    let mut tally = tally_votes(game_match);

    if !game_match.mvp_open {
        let winners = game_match.mvp_winners.clone();
        tally.sort_by(|a, b| b.1.cmp(&a.1));
        return Ok(MvpClosure {
            match_id,
            tally,
            winners,
            just_closed: false,
        });
    }

    let top = tally.iter().map(|(_, count)| *count).max().unwrap_or(0);
    let winners: Vec<Participant> = tally
        .iter()
        .filter(|(_, count)| top > 0 && *count == top)
        .map(|(target, _)| *target)
        .collect();

    for winner in &winners {
        if let Some(player) = winner.player_id().and_then(|id| ledger.player(id)) {
            add_to(player, "MVP", player.mvps, 1)?;
        }
    }
    if !winners.is_empty() {
        let share = MVP_POINT / winners.len() as f64;
        for winner in &winners {
            ledger.credit(winner, |player| {
                player.points += share;
                player.mvps += 1;
            });
        }
    }

    let game_match = ledger.match_mut(match_id).ok_or_else(|| {
        LeagueError::Internal(format!("match #{} vanished while closing its vote", match_id))
    })?;
    game_match.mvp_open = false;
    game_match.mvp_winners = winners.clone();

    tally.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(MvpClosure {
        match_id,
        tally,
        winners,
        just_closed: true,
    })
}

/// Adds a player's goals and assists for one match. Allowed once per player and match.
pub fn enter_stats(
    ledger: &mut Ledger,
    match_id: MatchId,
    player_id: PlayerId,
    goals: u32,
    assists: u32,
) -> Result<Player, LeagueError> {
    let game_match = ledger
        .get_match(match_id)
        .ok_or(LeagueError::MatchNotFound(match_id))?;
    let participant = Participant::Registered(player_id);
    if !game_match.contains(&participant) {
        return Err(LeagueError::NotParticipant(participant));
    }
    let player = ledger
        .player(player_id)
        .ok_or(LeagueError::NotRegistered(player_id))?;
    if game_match.stats_entered.contains(&player_id) {
        return Err(LeagueError::StatsAlreadyEntered {
            match_id,
            player_id,
        });
    }
    let total_goals = add_to(player, "goals", player.goals, goals)?;
    let total_assists = add_to(player, "assists", player.assists, assists)?;

    if let Some(game_match) = ledger.match_mut(match_id) {
        game_match.stats_entered.insert(player_id);
    }
    let player = ledger
        .player_mut(player_id)
        .ok_or(LeagueError::NotRegistered(player_id))?;
    player.goals = total_goals;
    player.assists = total_assists;
    Ok(player.clone())
}

/// Removes a match for good.
///
/// Counters already credited from it (results, MVP points, goals) are left untouched.
pub fn delete_match(ledger: &mut Ledger, match_id: MatchId) -> Result<Match, LeagueError> {
    ledger
        .remove_match(match_id)
        .ok_or(LeagueError::MatchNotFound(match_id))
}
