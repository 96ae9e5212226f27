pub mod match_commands;
pub mod misc_commands;
pub mod owner_commands;
pub mod player_commands;
pub mod ranking_commands;

use poise::serenity_prelude::User;

use crate::league::{
    ledger::Ledger,
    model::{Participant, PlayerId},
};

/// Embed field values are capped by Discord at 1024 characters. Leave room for code fences.
pub(crate) const FIELD_LIMIT: usize = 1000;

/// A way to group commands together.
///
/// Implementors of this trait can return a list of their commands within their own module.
/// Commands are grouped by what they act on: players, matches, rankings and so on.
///
/// Additionally, the implementors of this trait should not directly "own" the commands.
/// You should simply generate them by running Poise's function and returning the result.
/// This way, you only need to `pub` the implementor and not the commands themselves.
pub trait CommandsContainer {
    type Data;
    type Error;

    fn get_all() -> Vec<poise::Command<Self::Data, Self::Error>>;
}

/// Packs lines into chunks no longer than `limit` characters each.
///
/// A single line longer than `limit` still gets a chunk of its own.
pub(crate) fn chunk_lines<I, S>(lines: I, limit: usize) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut chunks = Vec::new();
    let mut chunk = String::new();
    for line in lines {
        let line = line.as_ref();
        if !chunk.is_empty() && chunk.chars().count() + line.chars().count() + 1 > limit {
            chunks.push(std::mem::take(&mut chunk));
        }
        chunk.push_str(line);
        chunk.push('\n');
    }
    if !chunk.is_empty() {
        chunks.push(chunk);
    }
    chunks
}

/// Formats a point total without trailing zeros: `3`, `2.5`, `0.33`.
pub(crate) fn format_points(points: f64) -> String {
    let formatted = format!("{:.2}", points);
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Name shown for a participant: the registered name, a mention if the profile is gone, or the
/// guest label.
pub(crate) fn participant_name(ledger: &Ledger, participant: &Participant) -> String {
    match participant {
        Participant::Registered(id) => ledger
            .player(*id)
            .map(|player| player.name.clone())
            .unwrap_or_else(|| participant.to_string()),
        Participant::Guest { .. } => participant.to_string(),
    }
}

pub(crate) fn user_id(user: &User) -> PlayerId {
    user.id.get()
}

/// The name a Discord user goes by, used for new profiles.
pub(crate) fn user_display_name(user: &User) -> String {
    user.global_name.clone().unwrap_or_else(|| user.name.clone())
}
