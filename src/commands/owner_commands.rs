use poise::serenity_prelude as serenity;
use tracing::{info, instrument};

use crate::{
    league::legacy::{import_legacy, parse_document},
    log::discord_log_info,
    utils::shorthand::BotContextExt,
    BotContext, BotData, BotError,
};

use super::CommandsContainer;

/// CommandsContainer for the commands reserved to the bot owners
pub struct OwnerCommands;

impl CommandsContainer for OwnerCommands {
    type Data = BotData;
    type Error = BotError;

    fn get_all() -> Vec<poise::Command<Self::Data, Self::Error>> {
        vec![import_data()]
    }
}

/// Import the data file of the previous bot into an empty league. Only usable by the bot owner.
#[poise::command(slash_command, guild_only, owners_only, rename = "import_legacy")]
#[instrument(skip(file))]
async fn import_data(
    ctx: BotContext<'_>,
    #[description = "The data.json file of the previous bot"] file: serenity::Attachment,
) -> Result<(), BotError> {
    ctx.defer_ephemeral().await?;
    let raw = file.download().await?;
    let document = match parse_document(&raw) {
        Ok(document) => document,
        Err(e) => {
            ctx.reply_failure(&e).await?;
            return Ok(());
        }
    };

    let Some(report) = ctx
        .league(move |ledger| import_legacy(ledger, document))
        .await?
    else {
        return Ok(());
    };
    info!(
        "Imported {} players and {} matches from {}",
        report.players, report.matches, file.filename
    );

    ctx.send(
        poise::CreateReply::default()
            .content(format!(
                "✅ Imported {} players and {} matches. The next match will be #{}.",
                report.players,
                report.matches,
                report.last_match_id + 1
            ))
            .ephemeral(true),
    )
    .await?;

    let players_field = report.players.to_string();
    let matches_field = report.matches.to_string();
    discord_log_info(
        ctx,
        "Legacy data imported",
        vec![
            ("File", file.filename.as_str(), false),
            ("Players", players_field.as_str(), true),
            ("Matches", matches_field.as_str(), true),
        ],
    )
    .await?;

    Ok(())
}
