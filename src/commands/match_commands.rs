use poise::serenity_prelude::{self as serenity, Color, CreateEmbed, CreateEmbedFooter};
use strum::IntoEnumIterator;
use tracing::{info, instrument};

use crate::{
    league::{
        balancer::{balance_teams, SkillAverages, Split},
        lifecycle::{
            cast_vote, close_vote, create_match, delete_match, enter_stats, record_result,
            MatchResult,
        },
        model::{MatchOrigin, Outcome, Participant, Side, Skill},
        slot::{resolve_slots, ResolvedSlot},
    },
    log::discord_log_info,
    utils::shorthand::BotContextExt,
    BotContext, BotData, BotError,
};

use super::{format_points, participant_name, user_display_name, user_id, CommandsContainer};

/// CommandsContainer for the match lifecycle commands
pub struct MatchCommands;

impl CommandsContainer for MatchCommands {
    type Data = BotData;
    type Error = BotError;

    fn get_all() -> Vec<poise::Command<Self::Data, Self::Error>> {
        vec![
            new_match(),
            match_result(),
            vote_mvp(),
            close_mvp(),
            add_stats(),
            remove_match(),
        ]
    }
}

fn team_lines(side: Side, slots: &[ResolvedSlot]) -> Vec<String> {
    let mut lines = vec![side.to_string().to_uppercase()];
    lines.extend(
        slots
            .iter()
            .enumerate()
            .map(|(i, slot)| format!("{}. {} ({}/10)", i + 1, slot.name, slot.rating)),
    );
    lines
}

fn team_total(slots: &[ResolvedSlot]) -> f64 {
    slots.iter().map(|slot| slot.rating).sum()
}

fn averages_line(averages: &SkillAverages) -> String {
    let per_skill = Skill::iter()
        .map(|skill| format!("{} {:.1}", skill, averages.get(skill)))
        .collect::<Vec<_>>()
        .join(" · ");
    format!("{}\nOverall **{:.2}**", per_skill, averages.overall())
}

fn split_embed(match_id: u64, split: &Split) -> CreateEmbed {
    let mut lines = team_lines(Side::A, &split.team_a);
    lines.push(String::new());
    lines.extend(team_lines(Side::B, &split.team_b));

    let favorite = match split.favorite() {
        Some(side) => side.to_string(),
        None => "No favorite ⚖️".to_string(),
    };

    CreateEmbed::new()
        .title(format!("⚽ Match #{}", match_id))
        .description(format!(
            "**Match #{id}** created!\n\n\
             🔴 **Team A** (Total: **{total_a:.1}**)\n\
             🔵 **Team B** (Total: **{total_b:.1}**)\n\n\
             ```txt\n{teams}\n```\n\
             **Favorite**: {favorite}\n\n\
             ➡️ Keep the match ID: **#{id}** (needed for the result, the MVP vote and the stats).",
            id = match_id,
            total_a = team_total(&split.team_a),
            total_b = team_total(&split.team_b),
            teams = lines.join("\n"),
            favorite = favorite,
        ))
        .fields(vec![
            ("Team A averages", averages_line(&split.averages_a), false),
            ("Team B averages", averages_line(&split.averages_b), false),
            ("Balance cost", format!("{:.2}", split.cost), false),
        ])
        .footer(CreateEmbedFooter::new(
            "Use /match_result for the score, then /vote_mvp and /add_stats.",
        ))
        .color(Color::ORANGE)
}

/// Create a balanced 5v5 match. Use names, mentions, or `*** 7` for a guest rated 7.
#[allow(clippy::too_many_arguments)]
#[poise::command(slash_command, guild_only, rename = "create_match")]
#[instrument]
async fn new_match(
    ctx: BotContext<'_>,
    #[description = "Name, mention, or `*** 7` for a guest"] player1: String,
    #[description = "Name, mention, or `*** 7` for a guest"] player2: String,
    #[description = "Name, mention, or `*** 7` for a guest"] player3: String,
    #[description = "Name, mention, or `*** 7` for a guest"] player4: String,
    #[description = "Name, mention, or `*** 7` for a guest"] player5: String,
    #[description = "Name, mention, or `*** 7` for a guest"] player6: String,
    #[description = "Name, mention, or `*** 7` for a guest"] player7: String,
    #[description = "Name, mention, or `*** 7` for a guest"] player8: String,
    #[description = "Name, mention, or `*** 7` for a guest"] player9: String,
    #[description = "Name, mention, or `*** 7` for a guest"] player10: String,
) -> Result<(), BotError> {
    let tokens = vec![
        player1, player2, player3, player4, player5, player6, player7, player8, player9, player10,
    ];
    let origin = MatchOrigin {
        channel_id: Some(ctx.channel_id().get()),
        created_at: ctx.created_at().unix_timestamp(),
    };

    let Some((game_match, split)) = ctx
        .league(move |ledger| {
            let slots = resolve_slots(&tokens, ledger.players())?;
            let split = balance_teams(&slots)?;
            let game_match = create_match(
                ledger,
                split.participants(Side::A),
                split.participants(Side::B),
                origin,
            )?;
            Ok((game_match, split))
        })
        .await?
    else {
        return Ok(());
    };
    info!(
        "Created match #{} with cost {:.2}",
        game_match.id, split.cost
    );

    ctx.reply_embed(split_embed(game_match.id, &split), false)
        .await
}

/// Record the final score of a match.
#[poise::command(slash_command, guild_only)]
#[instrument]
async fn match_result(
    ctx: BotContext<'_>,
    #[description = "Match ID (shown by /create_match)"] match_id: u64,
    #[description = "Goals of team A"]
    #[max = 99]
    score_a: u32,
    #[description = "Goals of team B"]
    #[max = 99]
    score_b: u32,
) -> Result<(), BotError> {
    let Some(MatchResult {
        game_match,
        outcome,
    }) = ctx
        .league(move |ledger| record_result(ledger, match_id, score_a, score_b))
        .await?
    else {
        return Ok(());
    };
    info!(
        "Recorded {}-{} for match #{}",
        score_a, score_b, game_match.id
    );

    let headline = match outcome {
        Outcome::Win(side) => format!("Victory for **{}**", side),
        Outcome::Draw => "It's a **draw**.".to_string(),
    };

    ctx.reply_embed(
        CreateEmbed::new()
            .title(format!("📌 Result of match #{}", game_match.id))
            .description(format!(
                "{}\n\n🔴 Team A: **{}**\n🔵 Team B: **{}**\n\n\
                 Players can now use `/vote_mvp` and `/add_stats` with the match ID.",
                headline, score_a, score_b
            ))
            .color(Color::DARK_GREEN),
        false,
    )
    .await
}

/// Vote for the MVP of a match. Your first vote is final.
#[poise::command(slash_command, guild_only)]
#[instrument]
async fn vote_mvp(
    ctx: BotContext<'_>,
    #[description = "Match ID"] match_id: u64,
    #[description = "The player you vote for (must have played the match)"] player: serenity::User,
) -> Result<(), BotError> {
    let voter = user_id(ctx.author());
    let target = Participant::Registered(user_id(&player));

    if ctx
        .league(move |ledger| cast_vote(ledger, match_id, voter, target))
        .await?
        .is_none()
    {
        return Ok(());
    }

    ctx.send(
        poise::CreateReply::default()
            .content(format!(
                "✅ Your vote for **{}** has been counted for match #{}.",
                user_display_name(&player),
                match_id
            ))
            .ephemeral(true),
    )
    .await?;

    Ok(())
}

/// Close the MVP vote of a match and show the result.
#[poise::command(slash_command, guild_only)]
#[instrument]
async fn close_mvp(
    ctx: BotContext<'_>,
    #[description = "Match ID"] match_id: u64,
) -> Result<(), BotError> {
    let Some((closure, tally, winners)) = ctx
        .league(move |ledger| {
            let closure = close_vote(ledger, match_id)?;
            let tally: Vec<(String, u32)> = closure
                .tally
                .iter()
                .map(|(target, count)| (participant_name(ledger, target), *count))
                .collect();
            let winners: Vec<String> = closure
                .winners
                .iter()
                .map(|winner| participant_name(ledger, winner))
                .collect();
            Ok((closure, tally, winners))
        })
        .await?
    else {
        return Ok(());
    };

    let headline = if closure.just_closed {
        format!("🏁 MVP vote closed for match #{}", match_id)
    } else {
        format!("ℹ️ MVP vote result for match #{}", match_id)
    };

    let Some(share) = closure.share() else {
        let text = if closure.just_closed {
            "The vote is closed, but nobody voted. No MVP is awarded."
        } else {
            "The vote was already closed and nobody had voted. No MVP was awarded."
        };
        ctx.reply_embed(
            CreateEmbed::new()
                .title(headline)
                .description(text)
                .color(Color::GOLD),
            false,
        )
        .await?;
        return Ok(());
    };
    info!(
        "MVP of match #{}: {:?} (newly awarded: {})",
        match_id, closure.winners, closure.just_closed
    );

    let mvp_line = match (winners.as_slice(), closure.just_closed) {
        ([winner], true) => format!("🏆 **MVP: {}** (1 point and +1 MVP).", winner),
        ([winner], false) => format!("🏆 **MVP: {}** (points were already awarded).", winner),
        (_, true) => format!(
            "🏆 **Shared MVP: {}**\nThey split 1 point, {} each (+1 MVP each).",
            winners.join(", "),
            format_points(share)
        ),
        (_, false) => format!(
            "🏆 **Shared MVP: {}**\nThey split 1 point when the vote was first closed.",
            winners.join(", ")
        ),
    };
    let votes = tally
        .iter()
        .map(|(name, count)| format!("• **{}**: {} vote(s)", name, count))
        .collect::<Vec<_>>()
        .join("\n");
    let footer = if closure.just_closed {
        "The vote was just closed. MVP points have been awarded now."
    } else {
        "The vote was already closed. No new points were added."
    };

    ctx.reply_embed(
        CreateEmbed::new()
            .title(headline)
            .description(format!("{}\n\n**Votes:**\n{}", mvp_line, votes))
            .footer(CreateEmbedFooter::new(footer))
            .color(Color::GOLD),
        false,
    )
    .await
}

/// Add a player's goals and assists for one match.
#[poise::command(slash_command, guild_only)]
#[instrument]
async fn add_stats(
    ctx: BotContext<'_>,
    #[description = "Match ID"] match_id: u64,
    #[description = "The player who scored or assisted"] player: serenity::User,
    #[description = "Goals in this match"]
    #[max = 99]
    goals: Option<u32>,
    #[description = "Assists in this match"]
    #[max = 99]
    assists: Option<u32>,
) -> Result<(), BotError> {
    let player_id = user_id(&player);
    let goals = goals.unwrap_or(0);
    let assists = assists.unwrap_or(0);

    let Some(updated) = ctx
        .league(move |ledger| enter_stats(ledger, match_id, player_id, goals, assists))
        .await?
    else {
        return Ok(());
    };

    let mut fields = Vec::new();
    if goals > 0 {
        fields.push(("Goals added (this match)", goals.to_string(), true));
    }
    if assists > 0 {
        fields.push(("Assists added (this match)", assists.to_string(), true));
    }
    fields.push(("Total goals", updated.goals.to_string(), true));
    fields.push(("Total assists", updated.assists.to_string(), true));

    ctx.reply_embed(
        CreateEmbed::new()
            .title(format!("📈 Stats updated for match #{}", match_id))
            .description(format!("Player: <@{}>", updated.id))
            .fields(fields)
            .color(Color::BLUE),
        false,
    )
    .await
}

/// Delete a match. Points and stats already credited from it are kept.
#[poise::command(
    slash_command,
    guild_only,
    rename = "delete_match",
    default_member_permissions = "MANAGE_GUILD"
)]
#[instrument]
async fn remove_match(
    ctx: BotContext<'_>,
    #[description = "Match ID"] match_id: u64,
) -> Result<(), BotError> {
    let Some(deleted) = ctx
        .league(move |ledger| delete_match(ledger, match_id))
        .await?
    else {
        return Ok(());
    };

    ctx.send(
        poise::CreateReply::default()
            .content(format!("🗑️ Match #{} has been deleted.", deleted.id))
            .ephemeral(true),
    )
    .await?;

    let match_field = format!("#{}", deleted.id);
    let recorded_field = match (deleted.score_a, deleted.score_b) {
        (Some(a), Some(b)) => format!("{} - {}", a, b),
        _ => "No result".to_string(),
    };
    discord_log_info(
        ctx,
        "A match has been deleted",
        vec![
            ("Match", match_field.as_str(), false),
            ("Score", recorded_field.as_str(), false),
        ],
    )
    .await?;

    Ok(())
}
