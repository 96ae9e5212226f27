/// Ranking orders over the player directory.
pub mod leaderboard;
/// Team balancing by exhaustive search over every 5/5 split.
pub mod balancer;
/// The in-memory league document and its change tracking.
pub mod ledger;
pub mod legacy;
pub mod lifecycle;
/// Players, matches, participants and the values they carry.
pub mod model;
/// Turning raw slot tokens into participants.
pub mod slot;
