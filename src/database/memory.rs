use tokio::sync::Mutex;

use super::LeagueDatabase;
use crate::league::ledger::Ledger;
use crate::utils::error::LeagueError;

/// A league kept in process memory. Operations run on a copy that replaces the ledger only
/// when they succeed.
#[derive(Debug, Default)]
pub struct MemoryDatabase {
    ledger: Mutex<Ledger>,
}

impl MemoryDatabase {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            ledger: Mutex::new(ledger),
        }
    }
}

impl LeagueDatabase for MemoryDatabase {
    type Error = LeagueError;

    async fn snapshot(&self) -> Result<Ledger, Self::Error> {
        Ok(self.ledger.lock().await.clone())
    }

    async fn transact<T, F>(&self, op: F) -> Result<T, Self::Error>
    where
        F: FnOnce(&mut Ledger) -> Result<T, LeagueError> + Send,
        T: Send,
    {
        let mut guard = self.ledger.lock().await;
        let mut working = guard.clone();
        let output = op(&mut working)?;
        working.take_changes();
        *guard = working;
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use futures::future::join_all;

    use super::*;
    use crate::league::lifecycle::{cast_vote, close_vote, create_match, record_result, set_profile};
    use crate::league::model::{MatchOrigin, Participant, SkillProfile};

    async fn league_with_match() -> (Arc<MemoryDatabase>, u64) {
        let db = Arc::new(MemoryDatabase::new(Ledger::default()));
        let match_id = db
            .transact(|ledger| {
                for id in 1..=10 {
                    set_profile(ledger, id, &format!("Player {}", id), SkillProfile::uniform(5))?;
                }
                let team_a = (1..=5).map(Participant::Registered).collect();
                let team_b = (6..=10).map(Participant::Registered).collect();
                Ok(create_match(ledger, team_a, team_b, MatchOrigin::default())?.id)
            })
            .await
            .unwrap();
        (db, match_id)
    }

    #[tokio::test]
    async fn failed_operations_leave_the_ledger_untouched() {
        let (db, match_id) = league_with_match().await;
        let before = db.snapshot().await.unwrap();

        let err = db
            .transact(|ledger| {
                record_result(ledger, match_id, 3, 1)?;
                // Fails after the result was applied to the working copy.
                record_result(ledger, match_id, 3, 1)
            })
            .await
            .unwrap_err();
        assert_eq!(err, LeagueError::ResultAlreadyRecorded(match_id));
        assert_eq!(db.snapshot().await.unwrap(), before);
    }

    #[tokio::test]
    async fn committed_ledgers_carry_no_pending_changes() {
        let (db, _) = league_with_match().await;
        let ledger = db.snapshot().await.unwrap();
        assert!(ledger.changes().is_empty());
        assert_eq!(ledger.players().len(), 10);
        assert_eq!(ledger.last_match_id(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_results_are_recorded_once() {
        let (db, match_id) = league_with_match().await;

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let db = Arc::clone(&db);
                tokio::spawn(async move {
                    db.transact(move |ledger| record_result(ledger, match_id, i % 3, 1))
                        .await
                })
            })
            .collect();

        let recorded = join_all(handles)
            .await
            .into_iter()
            .filter(|outcome| outcome.as_ref().unwrap().is_ok())
            .count();
        assert_eq!(recorded, 1);

        let ledger = db.snapshot().await.unwrap();
        for player in ledger.players().values() {
            assert_eq!(player.matches, 1);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn results_of_overlapping_matches_are_all_counted() {
        let (db, first) = league_with_match().await;
        let others = db
            .transact(|ledger| {
                let mut ids = Vec::new();
                for _ in 0..5 {
                    // Same ten players, sides swapped.
                    let team_a = (6..=10).map(Participant::Registered).collect();
                    let team_b = (1..=5).map(Participant::Registered).collect();
                    ids.push(create_match(ledger, team_a, team_b, MatchOrigin::default())?.id);
                }
                Ok(ids)
            })
            .await
            .unwrap();

        let handles: Vec<_> = std::iter::once(first)
            .chain(others)
            .map(|match_id| {
                let db = Arc::clone(&db);
                tokio::spawn(async move {
                    db.transact(move |ledger| record_result(ledger, match_id, 2, 0))
                        .await
                })
            })
            .collect();
        for outcome in join_all(handles).await {
            outcome.unwrap().unwrap();
        }

        let ledger = db.snapshot().await.unwrap();
        let early = ledger.player(1).unwrap();
        assert_eq!((early.matches, early.wins, early.losses), (6, 1, 5));
        let late = ledger.player(10).unwrap();
        assert_eq!((late.matches, late.wins, late.losses), (6, 5, 1));
        assert_eq!(late.points, 5.0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_votes_are_all_kept() {
        let (db, match_id) = league_with_match().await;

        let handles: Vec<_> = (1..=10u64)
            .map(|voter| {
                let db = Arc::clone(&db);
                tokio::spawn(async move {
                    db.transact(move |ledger| {
                        cast_vote(ledger, match_id, voter, Participant::Registered(3))
                    })
                    .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let closure = db
            .transact(move |ledger| close_vote(ledger, match_id))
            .await
            .unwrap();
        assert_eq!(closure.tally, vec![(Participant::Registered(3), 10)]);
        let ledger = db.snapshot().await.unwrap();
        assert_eq!(ledger.player(3).unwrap().points, 1.0);
        assert_eq!(ledger.player(3).unwrap().mvps, 1);
    }
}
