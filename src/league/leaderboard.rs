use std::cmp::Ordering;

use super::model::{Player, PlayerId};

fn by_name(a: &Player, b: &Player) -> Ordering {
    a.name.to_lowercase().cmp(&b.name.to_lowercase())
}

/// Ordering of the general ranking: points, goals, assists, wins, wins minus losses and MVPs,
/// all descending, then name ascending.
pub fn general_order(a: &Player, b: &Player) -> Ordering {
    b.points
        .total_cmp(&a.points)
        .then_with(|| b.goals.cmp(&a.goals))
        .then_with(|| b.assists.cmp(&a.assists))
        .then_with(|| b.wins.cmp(&a.wins))
        .then_with(|| b.win_balance().cmp(&a.win_balance()))
        .then_with(|| b.mvps.cmp(&a.mvps))
        .then_with(|| by_name(a, b))
}

fn ranked<'a>(
    players: impl IntoIterator<Item = &'a Player>,
    order: impl Fn(&Player, &Player) -> Ordering,
) -> Vec<Player> {
    let mut ranking: Vec<Player> = players.into_iter().cloned().collect();
    ranking.sort_by(|a, b| order(a, b));
    ranking
}

pub fn rank_general<'a>(players: impl IntoIterator<Item = &'a Player>) -> Vec<Player> {
    ranked(players, general_order)
}

pub fn rank_goals<'a>(players: impl IntoIterator<Item = &'a Player>) -> Vec<Player> {
    ranked(players, |a, b| b.goals.cmp(&a.goals).then_with(|| by_name(a, b)))
}

pub fn rank_assists<'a>(players: impl IntoIterator<Item = &'a Player>) -> Vec<Player> {
    ranked(players, |a, b| b.assists.cmp(&a.assists).then_with(|| by_name(a, b)))
}

/// Player directory order: best rated first.
pub fn rank_rating<'a>(players: impl IntoIterator<Item = &'a Player>) -> Vec<Player> {
    ranked(players, |a, b| b.rating.total_cmp(&a.rating).then_with(|| by_name(a, b)))
}

/// 1-based position of a player in the general ranking.
pub fn general_position<'a>(
    players: impl IntoIterator<Item = &'a Player>,
    id: PlayerId,
) -> Option<usize> {
    rank_general(players)
        .iter()
        .position(|p| p.id == id)
        .map(|i| i + 1)
}

/// Highest MVP count in the league, if anyone has one.
pub fn top_mvp_count<'a>(players: impl IntoIterator<Item = &'a Player>) -> Option<u32> {
    players.into_iter().map(|p| p.mvps).max().filter(|&n| n > 0)
}
