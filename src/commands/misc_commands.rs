use poise::serenity_prelude::{Color, CreateEmbed};
use tracing::instrument;

use crate::{utils::shorthand::BotContextExt, BotContext, BotData, BotError};

use super::CommandsContainer;

/// CommandsContainer for the general purpose commands
pub struct MiscCommands;

impl CommandsContainer for MiscCommands {
    type Data = BotData;
    type Error = BotError;

    fn get_all() -> Vec<poise::Command<Self::Data, Self::Error>> {
        vec![help(), ping()]
    }
}

/// Show the available commands.
#[poise::command(slash_command)]
#[instrument]
async fn help(ctx: BotContext<'_>) -> Result<(), BotError> {
    let lines = ctx
        .framework()
        .options()
        .commands
        .iter()
        .filter(|command| !command.owners_only)
        .map(|command| {
            format!(
                "`/{}`: {}",
                command.name,
                command.description.as_deref().unwrap_or("")
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    ctx.reply_embed(
        CreateEmbed::new()
            .title("Five-a-side bot")
            .description(format!(
                "Register players, build balanced 5v5 matches, record results, vote for the MVP \
                 and follow the rankings.\n\nGuests can join a match with `*** 7` (a guest rated 7).\n\n{}",
                lines
            ))
            .color(Color::BLURPLE),
        true,
    )
    .await
}

/// Check that the bot is alive.
#[poise::command(slash_command)]
#[instrument]
async fn ping(ctx: BotContext<'_>) -> Result<(), BotError> {
    let latency = ctx.ping().await;
    ctx.say(format!("🏓 Pong! ({} ms)", latency.as_millis()))
        .await?;
    Ok(())
}
