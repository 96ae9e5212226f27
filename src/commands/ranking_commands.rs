use poise::serenity_prelude::{Color, CreateEmbed};
use prettytable::{format, row, Table};
use tracing::instrument;

use crate::{
    league::{
        leaderboard::{rank_assists, rank_general, rank_goals, top_mvp_count},
        model::Player,
    },
    utils::shorthand::BotContextExt,
    BotContext, BotData, BotError,
};

use super::{chunk_lines, format_points, CommandsContainer, FIELD_LIMIT};

/// Rows shown in a ranking. An embed holds 6000 characters at most.
const RANKING_ROWS: usize = 25;

/// CommandsContainer for the ranking commands
pub struct RankingCommands;

impl CommandsContainer for RankingCommands {
    type Data = BotData;
    type Error = BotError;

    fn get_all() -> Vec<poise::Command<Self::Data, Self::Error>> {
        vec![rankings(), top_scorers(), top_assists()]
    }
}

fn new_table() -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_CLEAN);
    table
}

fn general_table(ranking: &[Player], top_mvps: Option<u32>) -> Table {
    let mut table = new_table();
    table.set_titles(row!["#", "Name", "Pts", "W", "D", "L", "G", "A", "MVP"]);
    for (i, player) in ranking.iter().take(RANKING_ROWS).enumerate() {
        let name = if top_mvps == Some(player.mvps) {
            format!("{} ⭐", player.name)
        } else {
            player.name.clone()
        };
        table.add_row(row![
            i + 1,
            name,
            format_points(player.points),
            player.wins,
            player.draws,
            player.losses,
            player.goals,
            player.assists,
            player.mvps,
        ]);
    }
    table
}

fn counter_table(ranking: &[Player], title: &str, counter: impl Fn(&Player) -> u32) -> Table {
    let mut table = new_table();
    table.set_titles(row!["#", "Name", title, "Matches"]);
    for (i, player) in ranking.iter().take(RANKING_ROWS).enumerate() {
        table.add_row(row![i + 1, player.name, counter(player), player.matches]);
    }
    table
}

/// Splits a rendered table into code blocks that each fit an embed field.
fn table_embed(title: &str, table: &Table, color: Color) -> CreateEmbed {
    let rendered = table.to_string();
    chunk_lines(rendered.lines(), FIELD_LIMIT - "```txt\n```".len())
        .into_iter()
        .fold(
            CreateEmbed::new().title(title).color(color),
            |embed, chunk| embed.field("\u{200b}", format!("```txt\n{}```", chunk), false),
        )
}

async fn send_ranking(
    ctx: BotContext<'_>,
    title: &str,
    table: Option<Table>,
    color: Color,
) -> Result<(), BotError> {
    match table {
        Some(table) => ctx.reply_embed(table_embed(title, &table, color), false).await,
        None => {
            ctx.say("No players registered yet. Use /set_player to add one.")
                .await?;
            Ok(())
        }
    }
}

/// General ranking: points, then goals, assists, wins and MVPs.
#[poise::command(slash_command, guild_only)]
#[instrument]
async fn rankings(ctx: BotContext<'_>) -> Result<(), BotError> {
    let ledger = ctx.ledger().await?;
    let ranking = rank_general(ledger.players().values());
    let table = (!ranking.is_empty())
        .then(|| general_table(&ranking, top_mvp_count(ledger.players().values())));
    send_ranking(ctx, "🏆 General ranking", table, Color::GOLD).await
}

/// Top scorers.
#[poise::command(slash_command, guild_only)]
#[instrument]
async fn top_scorers(ctx: BotContext<'_>) -> Result<(), BotError> {
    let ledger = ctx.ledger().await?;
    let ranking = rank_goals(ledger.players().values());
    let table = (!ranking.is_empty()).then(|| counter_table(&ranking, "Goals", |p| p.goals));
    send_ranking(ctx, "⚽ Top scorers", table, Color::ORANGE).await
}

/// Top assist providers.
#[poise::command(slash_command, guild_only)]
#[instrument]
async fn top_assists(ctx: BotContext<'_>) -> Result<(), BotError> {
    let ledger = ctx.ledger().await?;
    let ranking = rank_assists(ledger.players().values());
    let table =
        (!ranking.is_empty()).then(|| counter_table(&ranking, "Assists", |p| p.assists));
    send_ranking(ctx, "🎯 Top assists", table, Color::TEAL).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::league::model::SkillProfile;

    fn player(id: u64, name: &str, points: f64, mvps: u32) -> Player {
        let mut player = Player::new(id, name, SkillProfile::uniform(5));
        player.points = points;
        player.mvps = mvps;
        player
    }

    #[test]
    fn mvp_leaders_are_starred() {
        let ranking = vec![player(1, "Ana", 3.0, 2), player(2, "Bo", 2.5, 2), player(3, "Cy", 1.0, 1)];
        let rendered = general_table(&ranking, Some(2)).to_string();
        assert!(rendered.contains("Ana ⭐"));
        assert!(rendered.contains("Bo ⭐"));
        assert!(!rendered.contains("Cy ⭐"));
        assert!(rendered.contains("2.5"));
    }

    #[test]
    fn nobody_is_starred_without_mvps() {
        let ranking = vec![player(1, "Ana", 0.0, 0)];
        assert!(!general_table(&ranking, None).to_string().contains('⭐'));
    }

    #[test]
    fn rankings_are_capped() {
        let ranking: Vec<Player> = (1..=40)
            .map(|i| player(i, &format!("P{}", i), 0.0, 0))
            .collect();
        let table = counter_table(&ranking, "Goals", |p| p.goals);
        assert_eq!(table.len(), RANKING_ROWS);
    }
}
