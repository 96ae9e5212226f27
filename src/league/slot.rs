use std::collections::{BTreeMap, HashSet};

use super::model::{Participant, Player, PlayerId, SkillProfile};
use crate::utils::error::LeagueError;

/// Marker that starts an inline guest token such as `***7` or `*** 7`.
const GUEST_MARKER: &str = "***";
const GUEST_MIN_RATING: u64 = 1;
const GUEST_MAX_RATING: u64 = 10;

/// A slot token resolved to a participant and the skills the balancer will use.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSlot {
    pub participant: Participant,
    pub name: String,
    pub skills: SkillProfile,
    pub rating: f64,
}

impl ResolvedSlot {
    fn registered(player: &Player) -> Self {
        Self {
            participant: Participant::Registered(player.id),
            name: player.name.clone(),
            skills: player.skills,
            rating: player.rating,
        }
    }
}

/// Resolves one raw token against the player directory.
///
/// Tried in order: guest marker, user mention, case-insensitive registered name. `next_guest`
/// is the sequence number the next guest receives; the returned value is the one after.
pub fn resolve_slot(
    token: &str,
    directory: &BTreeMap<PlayerId, Player>,
    next_guest: u32,
) -> Result<(ResolvedSlot, u32), LeagueError> {
    let token = token.trim();

    if let Some(raw) = guest_rating(token) {
        let rating = raw
            .parse::<u64>()
            .ok()
            .filter(|n| (GUEST_MIN_RATING..=GUEST_MAX_RATING).contains(n))
            .ok_or_else(|| LeagueError::GuestRatingOutOfRange(raw.to_string()))?
            as u8;
        let slot = ResolvedSlot {
            participant: Participant::Guest {
                seq: next_guest,
                rating,
            },
            name: format!("Guest #{}", next_guest),
            skills: SkillProfile::uniform(rating),
            rating: rating as f64,
        };
        return Ok((slot, next_guest + 1));
    }

    if let Some(id) = mentioned_user(token) {
        let player = directory.get(&id).ok_or(LeagueError::NoProfile(id))?;
        return Ok((ResolvedSlot::registered(player), next_guest));
    }

    directory
        .values()
        .find(|player| player.name.to_lowercase() == token.to_lowercase())
        .map(|player| (ResolvedSlot::registered(player), next_guest))
        .ok_or_else(|| LeagueError::UnknownParticipant(token.to_string()))
}

/// Resolves every slot of a match request. The first failure aborts the whole batch.
pub fn resolve_slots<S: AsRef<str>>(
    tokens: &[S],
    directory: &BTreeMap<PlayerId, Player>,
) -> Result<Vec<ResolvedSlot>, LeagueError> {
    let mut next_guest = 1;
    let mut seen = HashSet::with_capacity(tokens.len());
    let mut slots = Vec::with_capacity(tokens.len());
    for token in tokens {
        let (slot, next) = resolve_slot(token.as_ref(), directory, next_guest)?;
        next_guest = next;
        if !seen.insert(slot.participant) {
            return Err(LeagueError::DuplicateParticipant(slot.name));
        }
        slots.push(slot);
    }
    Ok(slots)
}

/// Digits following the guest marker, if the token is a guest token.
fn guest_rating(token: &str) -> Option<&str> {
    let digits = token.strip_prefix(GUEST_MARKER)?.trim_start();
    (!digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())).then_some(digits)
}

/// User ID of a `<@123>` or `<@!123>` mention.
fn mentioned_user(token: &str) -> Option<PlayerId> {
    let inner = token.strip_prefix("<@")?.strip_suffix('>')?;
    let digits = inner.strip_prefix('!').unwrap_or(inner);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> BTreeMap<PlayerId, Player> {
        [
            Player::new(100, "Zidane", SkillProfile::new(9, 10, 6, 9, 2).unwrap()),
            Player::new(200, "Barthez", SkillProfile::new(2, 5, 6, 7, 10).unwrap()),
        ]
        .into_iter()
        .map(|p| (p.id, p))
        .collect()
    }

    #[test]
    fn guest_token_gets_a_uniform_profile() {
        let (slot, next) = resolve_slot("***7", &directory(), 1).unwrap();
        assert_eq!(slot.participant, Participant::Guest { seq: 1, rating: 7 });
        assert_eq!(slot.skills, SkillProfile::uniform(7));
        assert_eq!(slot.rating, 7.0);
        assert_eq!(next, 2);

        let (spaced, _) = resolve_slot("***   4", &directory(), 3).unwrap();
        assert_eq!(spaced.skills, SkillProfile::uniform(4));
        assert_eq!(spaced.participant, Participant::Guest { seq: 3, rating: 4 });
    }

    #[test]
    fn guest_rating_must_be_between_one_and_ten() {
        for token in ["***0", "***11", "*** 99999999999999999999999"] {
            let err = resolve_slot(token, &directory(), 1).unwrap_err();
            assert!(matches!(err, LeagueError::GuestRatingOutOfRange(_)), "{token}");
        }
        assert_eq!(
            resolve_slot("***10", &directory(), 1).unwrap().0.rating,
            10.0
        );
    }

    #[test]
    fn consecutive_guests_are_numbered_in_order() {
        let slots = resolve_slots(&["***5", "zidane", "***6"], &directory()).unwrap();
        let participants: Vec<Participant> = slots.iter().map(|s| s.participant).collect();
        assert_eq!(
            participants,
            vec![
                Participant::Guest { seq: 1, rating: 5 },
                Participant::Registered(100),
                Participant::Guest { seq: 2, rating: 6 },
            ]
        );
    }

    #[test]
    fn mentions_resolve_to_registered_profiles() {
        let (slot, next) = resolve_slot("<@!200>", &directory(), 1).unwrap();
        assert_eq!(slot.participant, Participant::Registered(200));
        assert_eq!(slot.name, "Barthez");
        assert_eq!(next, 1);

        let err = resolve_slot("<@999>", &directory(), 1).unwrap_err();
        assert_eq!(err, LeagueError::NoProfile(999));
    }

    #[test]
    fn names_match_case_insensitively() {
        let (slot, _) = resolve_slot("  bARTHEZ ", &directory(), 1).unwrap();
        assert_eq!(slot.participant, Participant::Registered(200));
    }

    #[test]
    fn unknown_tokens_are_rejected() {
        for token in ["Pires", "***", "***-3", "<@abc>"] {
            let err = resolve_slot(token, &directory(), 1).unwrap_err();
            assert_eq!(err, LeagueError::UnknownParticipant(token.to_string()));
        }
    }

    #[test]
    fn one_bad_slot_fails_the_batch() {
        let err = resolve_slots(&["***5", "***12", "Zidane"], &directory()).unwrap_err();
        assert_eq!(err, LeagueError::GuestRatingOutOfRange("12".to_string()));
    }

    #[test]
    fn the_same_player_cannot_fill_two_slots() {
        let err = resolve_slots(&["Zidane", "<@100>"], &directory()).unwrap_err();
        assert_eq!(err, LeagueError::DuplicateParticipant("Zidane".to_string()));
    }
}
