use std::time::SystemTime;

use poise::serenity_prelude::{Color, CreateEmbed, CreateMessage};
use tracing::{info, warn};

use crate::{BotContext, BotError};

fn now_string() -> String {
    format!(
        "<t:{}:F>",
        SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    )
}

/// Creates an info log message in the configured log channel.
pub async fn discord_log_info(
    ctx: BotContext<'_>,
    title: &str,
    fields: Vec<(&str, &str, bool)>,
) -> Result<(), BotError> {
    info!("ℹ️ {}\n\n{:#?}", title, fields);

    let Some(log_channel) = ctx.data().config.log_channel_id else {
        return Ok(());
    };

    let now_string = now_string();
    let mut fields: Vec<(&str, &str, bool)> = fields;
    fields.push(("Happened at", &now_string, false));
    fields.push(("By", &ctx.author().name, false));

    log_channel
        .send_message(
            ctx,
            CreateMessage::default().content("").embed(
                CreateEmbed::new()
                    .title(format!("ℹ️ {}", title))
                    .fields(fields)
                    .color(Color::BLURPLE),
            ),
        )
        .await?;

    Ok(())
}

/// Creates an error log message in the configured log channel.
pub async fn discord_log_error(
    ctx: BotContext<'_>,
    title: &str,
    fields: Vec<(&str, &str, bool)>,
) -> Result<(), BotError> {
    let Some(log_channel) = ctx.data().config.log_channel_id else {
        warn!("No log channel configured. Cannot forward error: {}", title);
        return Ok(());
    };

    let now_string = now_string();
    let mut fields: Vec<(&str, &str, bool)> = fields;
    fields.push(("Seen at", &now_string, false));

    log_channel
        .send_message(
            ctx,
            CreateMessage::default()
                .content("⚠️ An error occured in a command!")
                .embed(
                    CreateEmbed::new()
                        .title(title)
                        .description("Please check the logs for more information.")
                        .fields(fields)
                        .color(Color::RED),
                ),
        )
        .await?;

    Ok(())
}
