use poise::{serenity_prelude::CreateEmbed, CreateReply};
use tracing::{error, info};

use crate::{
    database::LeagueDatabase,
    league::ledger::Ledger,
    utils::error::{ErrorKind, LeagueError},
    BotContext, BotError,
};

#[allow(async_fn_in_trait)]
pub trait BotContextExt {
    /// Runs a league operation as one atomic read-modify-write.
    ///
    /// A [`LeagueError`] is answered with an ephemeral "❌" reply and yields `Ok(None)`. Any
    /// other failure is returned for the framework's error handler.
    async fn league<T, F>(&self, op: F) -> Result<Option<T>, BotError>
    where
        F: FnOnce(&mut Ledger) -> Result<T, LeagueError> + Send,
        T: Send;

    /// A read-only copy of the league.
    async fn ledger(&self) -> Result<Ledger, BotError>;

    async fn reply_failure(&self, error: &LeagueError) -> Result<(), BotError>;

    async fn reply_embed(&self, embed: CreateEmbed, ephemeral: bool) -> Result<(), BotError>;
}

impl BotContextExt for BotContext<'_> {
    async fn league<T, F>(&self, op: F) -> Result<Option<T>, BotError>
    where
        F: FnOnce(&mut Ledger) -> Result<T, LeagueError> + Send,
        T: Send,
    {
        match self.data().database.transact(op).await {
            Ok(output) => Ok(Some(output)),
            Err(e) => match e.downcast::<LeagueError>() {
                Ok(league_error) if league_error.kind() == ErrorKind::Internal => {
                    error!("League data is inconsistent: {}", league_error);
                    self.reply_failure(&league_error).await?;
                    Ok(None)
                }
                Ok(league_error) => {
                    info!(
                        "Rejected /{} from {}: {}",
                        self.command().name,
                        self.author().name,
                        league_error
                    );
                    self.reply_failure(&league_error).await?;
                    Ok(None)
                }
                Err(e) => Err(e),
            },
        }
    }

    async fn ledger(&self) -> Result<Ledger, BotError> {
        self.data().database.snapshot().await
    }

    async fn reply_failure(&self, error: &LeagueError) -> Result<(), BotError> {
        self.send(
            CreateReply::default()
                .content(format!("❌ {}", error))
                .ephemeral(true),
        )
        .await?;
        Ok(())
    }

    async fn reply_embed(&self, embed: CreateEmbed, ephemeral: bool) -> Result<(), BotError> {
        self.send(CreateReply::default().embed(embed).ephemeral(ephemeral))
            .await?;
        Ok(())
    }
}
