use strum::IntoEnumIterator;

use super::model::{Participant, Side, Skill, SkillProfile};
use super::slot::ResolvedSlot;
use crate::utils::error::LeagueError;

/// Per-skill averages of one team.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SkillAverages {
    pub shot: f64,
    pub pass: f64,
    pub physical: f64,
    pub influence: f64,
    pub goalkeeping: f64,
}

impl SkillAverages {
    fn of(profiles: &[SkillProfile]) -> Self {
        if profiles.is_empty() {
            return Self::default();
        }
        let mean = |skill: Skill| {
            profiles.iter().map(|p| p.get(skill) as f64).sum::<f64>() / profiles.len() as f64
        };
        Self {
            shot: mean(Skill::Shot),
            pass: mean(Skill::Pass),
            physical: mean(Skill::Physical),
            influence: mean(Skill::Influence),
            goalkeeping: mean(Skill::Goalkeeping),
        }
    }

    pub fn get(&self, skill: Skill) -> f64 {
        match skill {
            Skill::Shot => self.shot,
            Skill::Pass => self.pass,
            Skill::Physical => self.physical,
            Skill::Influence => self.influence,
            Skill::Goalkeeping => self.goalkeeping,
        }
    }

    /// Mean of the five averages: the team's overall rating.
    pub fn overall(&self) -> f64 {
        Skill::iter().map(|skill| self.get(skill)).sum::<f64>() / 5.0
    }
}

/// The chosen partition of the participants into two teams.
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub team_a: Vec<ResolvedSlot>,
    pub team_b: Vec<ResolvedSlot>,
    pub averages_a: SkillAverages,
    pub averages_b: SkillAverages,
    /// Weighted squared difference of the team averages. Lower is fairer.
    pub cost: f64,
}

impl Split {
    pub fn participants(&self, side: Side) -> Vec<Participant> {
        let team = match side {
            Side::A => &self.team_a,
            Side::B => &self.team_b,
        };
        team.iter().map(|slot| slot.participant).collect()
    }

    /// The side with the strictly higher overall average, if any.
    pub fn favorite(&self) -> Option<Side> {
        // Teams have the same size, so comparing integer skill totals compares the averages
        // without floating point noise.
        let total = |team: &[ResolvedSlot]| team.iter().map(|s| s.skills.total()).sum::<u32>();
        match total(&self.team_a).cmp(&total(&self.team_b)) {
            std::cmp::Ordering::Greater => Some(Side::A),
            std::cmp::Ordering::Less => Some(Side::B),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// Skill weights in half units, so that split costs compare as exact integers.
fn half_weight(skill: Skill) -> u64 {
    (skill.weight() * 2.0) as u64
}

/// Exact cost of a split, in half-weight units times the squared team size.
fn cost_units(team_a: &[SkillProfile], team_b: &[SkillProfile]) -> u64 {
    Skill::iter()
        .map(|skill| {
            let sum = |team: &[SkillProfile]| team.iter().map(|p| p.get(skill) as i64).sum::<i64>();
            let diff = sum(team_a) - sum(team_b);
            half_weight(skill) * (diff * diff) as u64
        })
        .sum()
}

/// Weighted imbalance between two equally sized teams:
/// `Σ weight(skill) × (meanA(skill) − meanB(skill))²`.
pub fn weighted_cost(team_a: &[SkillProfile], team_b: &[SkillProfile]) -> f64 {
    let size = team_a.len().max(1) as f64;
    cost_units(team_a, team_b) as f64 / (2.0 * size * size)
}

/// Splits an even number of participants into two equal teams with the lowest weighted cost.
///
/// Every subset of `n / 2` participants is tried as team A, in lexicographic order of their
/// positions, and the first split reaching the minimum wins. This is `O(C(n, n/2))`: 252 splits
/// for ten players, but it grows too fast to be used much past twenty.
pub fn balance_teams(slots: &[ResolvedSlot]) -> Result<Split, LeagueError> {
    if slots.len() % 2 != 0 {
        return Err(LeagueError::OddParticipantCount(slots.len()));
    }
    let half = slots.len() / 2;
    let profiles: Vec<SkillProfile> = slots.iter().map(|s| s.skills).collect();

    let mut best: Option<(u64, Vec<usize>)> = None;
    for chosen in Combinations::new(slots.len(), half) {
        let (team_a, team_b) = partition(&profiles, &chosen);
        let units = cost_units(&team_a, &team_b);
        if best.as_ref().map_or(true, |(lowest, _)| units < *lowest) {
            best = Some((units, chosen));
        }
    }
    let chosen = best.map(|(_, chosen)| chosen).unwrap_or_default();

    let (team_a, team_b) = partition(slots, &chosen);
    let profiles_a: Vec<SkillProfile> = team_a.iter().map(|s| s.skills).collect();
    let profiles_b: Vec<SkillProfile> = team_b.iter().map(|s| s.skills).collect();
    Ok(Split {
        averages_a: SkillAverages::of(&profiles_a),
        averages_b: SkillAverages::of(&profiles_b),
        cost: weighted_cost(&profiles_a, &profiles_b),
        team_a,
        team_b,
    })
}

/// Splits `items` into the chosen positions (sorted) and the rest, keeping input order.
fn partition<T: Clone>(items: &[T], chosen: &[usize]) -> (Vec<T>, Vec<T>) {
    let mut picked = Vec::with_capacity(chosen.len());
    let mut rest = Vec::with_capacity(items.len() - chosen.len());
    let mut next = chosen.iter().peekable();
    for (i, item) in items.iter().enumerate() {
        if next.peek() == Some(&&i) {
            next.next();
            picked.push(item.clone());
        } else {
            rest.push(item.clone());
        }
    }
    (picked, rest)
}

/// Index combinations of size `k` out of `n`, in lexicographic order.
struct Combinations {
    n: usize,
    current: Option<Vec<usize>>,
}

impl Combinations {
    fn new(n: usize, k: usize) -> Self {
        let current = (k <= n).then(|| (0..k).collect());
        Self { n, current }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let out = self.current.take()?;
        let k = out.len();
        let mut advanced = out.clone();
        // Rightmost position that can still move forward.
        if let Some(i) = (0..k).rev().find(|&i| advanced[i] < self.n - k + i) {
            advanced[i] += 1;
            for j in i + 1..k {
                advanced[j] = advanced[j - 1] + 1;
            }
            self.current = Some(advanced);
        }
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(id: u64, skills: SkillProfile) -> ResolvedSlot {
        ResolvedSlot {
            participant: Participant::Registered(id),
            name: format!("P{}", id),
            skills,
            rating: skills.rating(),
        }
    }

    fn uniform_slots(ratings: &[u8]) -> Vec<ResolvedSlot> {
        ratings
            .iter()
            .enumerate()
            .map(|(i, r)| slot(i as u64 + 1, SkillProfile::uniform(*r)))
            .collect()
    }

    fn assert_is_partition(split: &Split, slots: &[ResolvedSlot]) {
        let mut all: Vec<Participant> = split
            .participants(Side::A)
            .into_iter()
            .chain(split.participants(Side::B))
            .collect();
        assert_eq!(split.team_a.len(), split.team_b.len());
        all.sort();
        let mut expected: Vec<Participant> = slots.iter().map(|s| s.participant).collect();
        expected.sort();
        assert_eq!(all, expected);
    }

    #[test]
    fn enumerates_every_half() {
        assert_eq!(Combinations::new(10, 5).count(), 252);
        assert_eq!(Combinations::new(4, 2).count(), 6);
        assert_eq!(
            Combinations::new(4, 2).collect::<Vec<_>>()[..3],
            [vec![0, 1], vec![0, 2], vec![0, 3]]
        );
        assert_eq!(Combinations::new(0, 0).count(), 1);
    }

    #[test]
    fn rejects_odd_counts() {
        let err = balance_teams(&uniform_slots(&[5, 5, 5])).unwrap_err();
        assert_eq!(err, LeagueError::OddParticipantCount(3));
    }

    #[test]
    fn identical_players_cost_nothing() {
        let slots = uniform_slots(&[6; 10]);
        let split = balance_teams(&slots).unwrap();
        assert_eq!(split.cost, 0.0);
        assert_is_partition(&split, &slots);
        assert_eq!(split.favorite(), None);
        // First split in enumeration order.
        assert_eq!(
            split.participants(Side::A),
            (1..=5).map(Participant::Registered).collect::<Vec<_>>()
        );
    }

    #[test]
    fn every_even_size_yields_a_partition() {
        for size in [0usize, 2, 4, 6, 8, 10, 12] {
            let ratings: Vec<u8> = (0..size).map(|i| (i * 7 % 11) as u8).collect();
            let slots = uniform_slots(&ratings);
            let split = balance_teams(&slots).unwrap();
            assert_is_partition(&split, &slots);
        }
    }

    #[test]
    fn no_other_split_beats_the_chosen_one() {
        let slots = uniform_slots(&[9, 8, 8, 7, 7, 6, 6, 5, 5, 4]);
        let split = balance_teams(&slots).unwrap();
        assert_is_partition(&split, &slots);

        let profiles: Vec<SkillProfile> = slots.iter().map(|s| s.skills).collect();
        for chosen in Combinations::new(10, 5) {
            let (a, b) = partition(&profiles, &chosen);
            assert!(weighted_cost(&a, &b) >= split.cost);
        }
        // 65 points over ten players cannot be split evenly, the best gap is one point.
        assert_eq!(split.cost, 19.0 * 1.0 / 25.0);
    }

    #[test]
    fn weights_favour_shot_and_pass_balance() {
        // Two specialists of each kind: a fair split puts one of each per team.
        let slots = vec![
            slot(1, SkillProfile::new(10, 0, 0, 0, 0).unwrap()),
            slot(2, SkillProfile::new(10, 0, 0, 0, 0).unwrap()),
            slot(3, SkillProfile::new(0, 0, 0, 0, 10).unwrap()),
            slot(4, SkillProfile::new(0, 0, 0, 0, 10).unwrap()),
        ];
        let split = balance_teams(&slots).unwrap();
        assert_eq!(split.cost, 0.0);
        assert_eq!(
            split.participants(Side::A),
            vec![Participant::Registered(1), Participant::Registered(3)]
        );
    }

    #[test]
    fn reports_averages_and_favorite() {
        let split = balance_teams(&uniform_slots(&[10, 2])).unwrap();
        assert_eq!(split.averages_a.overall(), 10.0);
        assert_eq!(split.averages_b.shot, 2.0);
        assert_eq!(split.favorite(), Some(Side::A));
        assert_eq!(split.cost, 19.0 * 64.0);
    }
}
