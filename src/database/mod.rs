use crate::league::ledger::{Changes, Ledger};
use crate::league::model::{Match, Player};
use crate::utils::error::LeagueError;
use crate::BotError;
use models::{MatchRow, PlayerRow};
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};
use tracing::{info, instrument};

/// Row types of the Postgres schema and their conversions to league records.
pub mod models;

/// In-memory store used by the tests.
#[cfg(test)]
pub mod memory;

/// Key of the advisory lock that serializes every read-modify-write of the league.
const LEDGER_LOCK_KEY: i64 = 0x4649_5645;

/// Any store that can hold the league.
///
/// The contract is a whole-ledger read-modify-write: [`LeagueDatabase::transact`] hands the
/// operation the current ledger while holding the store's write lock, and writes back only if
/// the operation succeeded. Two transactions never interleave.
#[allow(async_fn_in_trait)]
pub trait LeagueDatabase {
    type Error;

    /// A copy of the current ledger, for read-only views.
    async fn snapshot(&self) -> Result<Ledger, Self::Error>;

    /// Runs `op` against the ledger and persists its changes atomically.
    async fn transact<T, F>(&self, op: F) -> Result<T, Self::Error>
    where
        F: FnOnce(&mut Ledger) -> Result<T, LeagueError> + Send,
        T: Send;
}

/// The Postgres database backing the league.
#[derive(Debug)]
pub struct PgDatabase {
    pub pool: PgPool,
}

impl PgDatabase {
    pub async fn connect(database_url: &str) -> Result<Self, BotError> {
        let pool = PgPool::connect(database_url).await?;
        info!("Successfully connected to the database.");

        Ok(PgDatabase { pool })
    }

    pub async fn migrate(&self) -> Result<(), BotError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn load(conn: &mut PgConnection) -> Result<Ledger, BotError> {
        let players = sqlx::query_as::<_, PlayerRow>(
            r#"
            SELECT id, name, shot, pass, physical, influence, goalkeeping, rating, points,
                wins, losses, draws, matches, goals, assists, mvps,
                card_color, card_border, card_tagline
            FROM players
            "#,
        )
        .fetch_all(&mut *conn)
        .await?
        .into_iter()
        .map(Player::try_from)
        .collect::<Result<Vec<_>, _>>()?;

        let matches = sqlx::query_as::<_, MatchRow>(
            r#"
            SELECT id, channel_id, created_at, team_a, team_b, score_a, score_b,
                result_recorded, mvp_open, mvp_votes, mvp_winners, stats_entered
            FROM matches
            "#,
        )
        .fetch_all(&mut *conn)
        .await?
        .into_iter()
        .map(Match::try_from)
        .collect::<Result<Vec<_>, _>>()?;

        let last_match_id: Option<i64> =
            sqlx::query_scalar("SELECT last_match_id FROM league_state WHERE id = 1")
                .fetch_optional(&mut *conn)
                .await?;

        Ok(Ledger::from_records(
            players,
            matches,
            last_match_id.unwrap_or(0).try_into()?,
        ))
    }

    async fn store(
        conn: &mut PgConnection,
        ledger: &Ledger,
        changes: &Changes,
    ) -> Result<(), BotError> {
        for player in changes.players.iter().filter_map(|id| ledger.player(*id)) {
            sqlx::query(
                r#"
                INSERT INTO players (id, name, shot, pass, physical, influence, goalkeeping,
                    rating, points, wins, losses, draws, matches, goals, assists, mvps,
                    card_color, card_border, card_tagline)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                    $17, $18, $19)
                ON CONFLICT (id)
                DO UPDATE SET
                    name = EXCLUDED.name,
                    shot = EXCLUDED.shot,
                    pass = EXCLUDED.pass,
                    physical = EXCLUDED.physical,
                    influence = EXCLUDED.influence,
                    goalkeeping = EXCLUDED.goalkeeping,
                    rating = EXCLUDED.rating,
                    points = EXCLUDED.points,
                    wins = EXCLUDED.wins,
                    losses = EXCLUDED.losses,
                    draws = EXCLUDED.draws,
                    matches = EXCLUDED.matches,
                    goals = EXCLUDED.goals,
                    assists = EXCLUDED.assists,
                    mvps = EXCLUDED.mvps,
                    card_color = EXCLUDED.card_color,
                    card_border = EXCLUDED.card_border,
                    card_tagline = EXCLUDED.card_tagline
                "#,
            )
            .bind(i64::try_from(player.id)?)
            .bind(&player.name)
            .bind(player.skills.shot as i16)
            .bind(player.skills.pass as i16)
            .bind(player.skills.physical as i16)
            .bind(player.skills.influence as i16)
            .bind(player.skills.goalkeeping as i16)
            .bind(player.rating)
            .bind(player.points)
            .bind(player.wins as i64)
            .bind(player.losses as i64)
            .bind(player.draws as i64)
            .bind(player.matches as i64)
            .bind(player.goals as i64)
            .bind(player.assists as i64)
            .bind(player.mvps as i64)
            .bind(&player.card.color)
            .bind(&player.card.border)
            .bind(&player.card.tagline)
            .execute(&mut *conn)
            .await?;
        }

        for game_match in changes.matches.iter().filter_map(|id| ledger.get_match(*id)) {
            sqlx::query(
                r#"
                INSERT INTO matches (id, channel_id, created_at, team_a, team_b, score_a, score_b,
                    result_recorded, mvp_open, mvp_votes, mvp_winners, stats_entered)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                ON CONFLICT (id)
                DO UPDATE SET
                    score_a = EXCLUDED.score_a,
                    score_b = EXCLUDED.score_b,
                    result_recorded = EXCLUDED.result_recorded,
                    mvp_open = EXCLUDED.mvp_open,
                    mvp_votes = EXCLUDED.mvp_votes,
                    mvp_winners = EXCLUDED.mvp_winners,
                    stats_entered = EXCLUDED.stats_entered
                "#,
            )
            .bind(i64::try_from(game_match.id)?)
            .bind(game_match.channel_id.map(i64::try_from).transpose()?)
            .bind(game_match.created_at)
            .bind(Json(&game_match.team_a))
            .bind(Json(&game_match.team_b))
            .bind(game_match.score_a.map(i32::try_from).transpose()?)
            .bind(game_match.score_b.map(i32::try_from).transpose()?)
            .bind(game_match.result_recorded)
            .bind(game_match.mvp_open)
            .bind(Json(&game_match.mvp_votes))
            .bind(Json(&game_match.mvp_winners))
            .bind(Json(&game_match.stats_entered))
            .execute(&mut *conn)
            .await?;
        }

        for id in &changes.deleted_matches {
            sqlx::query("DELETE FROM matches WHERE id = $1")
                .bind(i64::try_from(*id)?)
                .execute(&mut *conn)
                .await?;
        }

        if changes.sequence {
            sqlx::query(
                r#"
                INSERT INTO league_state (id, last_match_id)
                VALUES (1, $1)
                ON CONFLICT (id)
                DO UPDATE SET
                    last_match_id = EXCLUDED.last_match_id
                "#,
            )
            .bind(i64::try_from(ledger.last_match_id())?)
            .execute(&mut *conn)
            .await?;
        }

        Ok(())
    }
}

impl LeagueDatabase for PgDatabase {
    type Error = BotError;

    async fn snapshot(&self) -> Result<Ledger, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        Self::load(&mut conn).await
    }

    #[instrument(skip_all)]
    async fn transact<T, F>(&self, op: F) -> Result<T, Self::Error>
    where
        F: FnOnce(&mut Ledger) -> Result<T, LeagueError> + Send,
        T: Send,
    {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(LEDGER_LOCK_KEY)
            .execute(&mut *tx)
            .await?;

        let mut ledger = Self::load(&mut *tx).await?;
        // Dropping `tx` on error rolls the transaction back and releases the lock.
        let output = op(&mut ledger)?;
        let changes = ledger.take_changes();
        if !changes.is_empty() {
            Self::store(&mut *tx, &ledger, &changes).await?;
        }
        tx.commit().await?;

        Ok(output)
    }
}
