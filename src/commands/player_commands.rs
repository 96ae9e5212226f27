use poise::serenity_prelude::{self as serenity, Color, CreateEmbed, CreateEmbedFooter};
use strum::IntoEnumIterator;
use tracing::{info, instrument};

use crate::{
    league::{
        leaderboard::{general_position, rank_rating},
        lifecycle::{set_card, set_profile},
        model::{Player, Skill, SkillProfile},
    },
    utils::shorthand::BotContextExt,
    BotContext, BotData, BotError,
};

use super::{
    chunk_lines, format_points, user_display_name, user_id, CommandsContainer, FIELD_LIMIT,
};

/// CommandsContainer for the player profile commands
pub struct PlayerCommands;

impl CommandsContainer for PlayerCommands {
    type Data = BotData;
    type Error = BotError;

    fn get_all() -> Vec<poise::Command<Self::Data, Self::Error>> {
        vec![set_player(), set_card_style(), players(), player_stats()]
    }
}

fn skills_line(skills: &SkillProfile) -> String {
    Skill::iter()
        .map(|skill| format!("{} {}", skill, skills.get(skill)))
        .collect::<Vec<_>>()
        .join(" · ")
}

/// Create or update a player's profile with five skills out of 10.
#[poise::command(slash_command, guild_only)]
#[instrument]
async fn set_player(
    ctx: BotContext<'_>,
    #[description = "The player to create or update"] player: serenity::User,
    #[description = "Shooting"]
    #[min = 0]
    #[max = 10]
    shot: u8,
    #[description = "Passing"]
    #[min = 0]
    #[max = 10]
    pass: u8,
    #[description = "Physical"]
    #[min = 0]
    #[max = 10]
    physical: u8,
    #[description = "Influence on the game"]
    #[min = 0]
    #[max = 10]
    influence: u8,
    #[description = "Goalkeeping"]
    #[min = 0]
    #[max = 10]
    goalkeeping: u8,
    #[description = "Name used in teams and rankings (defaults to the Discord name)"]
    name: Option<String>,
) -> Result<(), BotError> {
    let id = user_id(&player);
    let name = name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| user_display_name(&player));
    let skills = SkillProfile {
        shot,
        pass,
        physical,
        influence,
        goalkeeping,
    };

    let Some(updated) = ctx
        .league(move |ledger| set_profile(ledger, id, &name, skills))
        .await?
    else {
        return Ok(());
    };
    info!("Profile of {} ({}) set to {:?}", updated.name, updated.id, updated.skills);

    ctx.reply_embed(
        CreateEmbed::new()
            .title("Player profile updated")
            .description(format!("Player: <@{}>", updated.id))
            .fields(vec![
                ("Rating", format!("**{}/10**", updated.rating), true),
                ("Points", format_points(updated.points), true),
                ("Skills", skills_line(&updated.skills), false),
            ])
            .thumbnail(player.face())
            .color(Color::DARK_GREEN),
        false,
    )
    .await
}

/// Customize your stat card.
#[poise::command(slash_command, guild_only, rename = "set_card")]
#[instrument]
async fn set_card_style(
    ctx: BotContext<'_>,
    #[description = "Card color as #RRGGBB"] color: Option<String>,
    #[description = "Border color as #RRGGBB"] border: Option<String>,
    #[description = "A short tagline (100 characters at most)"] tagline: Option<String>,
) -> Result<(), BotError> {
    let id = user_id(ctx.author());
    let Some(updated) = ctx
        .league(move |ledger| {
            set_card(
                ledger,
                id,
                color.as_deref().map(str::trim),
                border.as_deref().map(str::trim),
                tagline.as_deref(),
            )
        })
        .await?
    else {
        return Ok(());
    };

    ctx.reply_embed(player_card(&updated, None), true).await
}

/// Show every registered player, best rated first.
#[poise::command(slash_command, guild_only)]
#[instrument]
async fn players(ctx: BotContext<'_>) -> Result<(), BotError> {
    let ledger = ctx.ledger().await?;
    if ledger.players().is_empty() {
        ctx.say("No players registered yet. Use /set_player to add one.")
            .await?;
        return Ok(());
    }

    let lines = rank_rating(ledger.players().values()).into_iter().map(|p| {
        format!(
            "**{}**  ·  {}/10  ·  {} pts",
            p.name,
            p.rating,
            format_points(p.points)
        )
    });
    let embed = chunk_lines(lines, FIELD_LIMIT)
        .into_iter()
        .fold(
            CreateEmbed::new()
                .title(format!("Players ({})", ledger.players().len()))
                .color(Color::BLURPLE),
            |embed, chunk| embed.field("\u{200b}", chunk, false),
        );

    ctx.reply_embed(embed, false).await
}

/// Show a player's full stat card.
#[poise::command(slash_command, guild_only)]
#[instrument]
async fn player_stats(
    ctx: BotContext<'_>,
    #[description = "The player to look up"] player: serenity::User,
) -> Result<(), BotError> {
    let ledger = ctx.ledger().await?;
    let Some(record) = ledger.player(user_id(&player)) else {
        ctx.send(
            poise::CreateReply::default()
                .content("❌ This player is not registered yet (/set_player).")
                .ephemeral(true),
        )
        .await?;
        return Ok(());
    };
    let position = general_position(ledger.players().values(), record.id);

    ctx.reply_embed(player_card(record, position).thumbnail(player.face()), false)
        .await
}

fn player_card(player: &Player, position: Option<usize>) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(format!("Stats of {}", player.name))
        .fields(vec![
            ("Rating", format!("{}/10", player.rating), true),
            ("Points", format_points(player.points), true),
            ("Matches played", player.matches.to_string(), true),
            ("Wins", player.wins.to_string(), true),
            ("Draws", player.draws.to_string(), true),
            ("Losses", player.losses.to_string(), true),
            ("Goals", player.goals.to_string(), true),
            ("Assists", player.assists.to_string(), true),
            ("MVP", player.mvps.to_string(), true),
            ("Skills", skills_line(&player.skills), false),
        ])
        .color(Color::new(player.card.color_value().unwrap_or(0xD4AF37)))
        .footer(CreateEmbedFooter::new(format!("Border {}", player.card.border)));
    if !player.card.tagline.is_empty() {
        embed = embed.description(format!("*{}*", player.card.tagline));
    }
    if let Some(position) = position {
        embed = embed.field("General ranking", format!("#{}", position), false);
    }
    embed
}
