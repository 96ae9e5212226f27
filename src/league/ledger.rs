use std::collections::{BTreeMap, BTreeSet};

use super::model::{Match, MatchId, MatchOrigin, Participant, Player, PlayerId};

/// Records written or removed since the ledger was loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changes {
    pub players: BTreeSet<PlayerId>,
    pub matches: BTreeSet<MatchId>,
    pub deleted_matches: BTreeSet<MatchId>,
    pub sequence: bool,
}

impl Changes {
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
            && self.matches.is_empty()
            && self.deleted_matches.is_empty()
            && !self.sequence
    }
}

/// The whole league held in memory: every player, every match and the match counter.
///
/// Stores load a ledger, let one operation mutate it, then write back what [`Changes`] lists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    players: BTreeMap<PlayerId, Player>,
    matches: BTreeMap<MatchId, Match>,
    last_match_id: MatchId,
    changes: Changes,
}

impl Ledger {
    /// Builds a ledger from stored records without marking anything as changed.
    pub fn from_records(
        players: impl IntoIterator<Item = Player>,
        matches: impl IntoIterator<Item = Match>,
        last_match_id: MatchId,
    ) -> Self {
        Self {
            players: players.into_iter().map(|p| (p.id, p)).collect(),
            matches: matches.into_iter().map(|m| (m.id, m)).collect(),
            last_match_id,
            changes: Changes::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty() && self.matches.is_empty()
    }

    pub fn players(&self) -> &BTreeMap<PlayerId, Player> {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        let player = self.players.get_mut(&id)?;
        self.changes.players.insert(id);
        Some(player)
    }

    /// Applies `update` to the participant's record. Guests and unknown IDs are skipped.
    pub fn credit(&mut self, participant: &Participant, update: impl FnOnce(&mut Player)) {
        if let Some(player) = participant.player_id().and_then(|id| self.player_mut(id)) {
            update(player);
        }
    }

    pub fn upsert_player(&mut self, player: Player) -> &Player {
        let id = player.id;
        self.changes.players.insert(id);
        self.players.insert(id, player);
        &self.players[&id]
    }

    pub fn matches(&self) -> &BTreeMap<MatchId, Match> {
        &self.matches
    }

    pub fn get_match(&self, id: MatchId) -> Option<&Match> {
        self.matches.get(&id)
    }

    pub fn match_mut(&mut self, id: MatchId) -> Option<&mut Match> {
        let game_match = self.matches.get_mut(&id)?;
        self.changes.matches.insert(id);
        Some(game_match)
    }

    pub fn last_match_id(&self) -> MatchId {
        self.last_match_id
    }

    /// Stores a new match under the next sequential ID. IDs are never handed out twice.
    pub fn insert_match(
        &mut self,
        team_a: Vec<Participant>,
        team_b: Vec<Participant>,
        origin: MatchOrigin,
    ) -> &Match {
        self.last_match_id += 1;
        let id = self.last_match_id;
        self.changes.sequence = true;
        self.changes.matches.insert(id);
        self.matches
            .insert(id, Match::new(id, team_a, team_b, origin));
        &self.matches[&id]
    }

    pub fn remove_match(&mut self, id: MatchId) -> Option<Match> {
        let removed = self.matches.remove(&id)?;
        self.changes.matches.remove(&id);
        self.changes.deleted_matches.insert(id);
        Some(removed)
    }

    /// Replaces the match counter, e.g. when importing records that already used IDs.
    pub fn set_last_match_id(&mut self, id: MatchId) {
        self.last_match_id = id;
        self.changes.sequence = true;
    }

    pub fn insert_imported_match(&mut self, game_match: Match) {
        let id = game_match.id;
        self.changes.matches.insert(id);
        self.matches.insert(id, game_match);
    }

    #[cfg(test)]
    pub fn changes(&self) -> &Changes {
        &self.changes
    }

    pub fn take_changes(&mut self) -> Changes {
        std::mem::take(&mut self.changes)
    }
}
