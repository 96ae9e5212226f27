use std::fs::File;
use tracing::{error, info, info_span, level_filters::LevelFilter};
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

use database::{LeagueDatabase, PgDatabase};
use poise::{serenity_prelude as serenity, CreateReply};

use commands::{
    match_commands::MatchCommands, misc_commands::MiscCommands, owner_commands::OwnerCommands,
    player_commands::PlayerCommands, ranking_commands::RankingCommands, CommandsContainer,
};
use config::BotConfig;

use crate::log::discord_log_error;

/// All the commands that the bot can run.
///
/// Additionally, it contains the `CommandsContainer` trait that groups all the commands together.
mod commands;
/// Settings read from the environment.
mod config;
/// Traits and types used for interacting with the database.
mod database;
/// The league itself: players, matches, balancing and rankings.
///
/// Nothing in here touches Discord or the database, so every rule can be tested on its own.
mod league;
/// Contains functions for logging.
mod log;

mod utils;

/// Stores data used by the bot.
///
/// Accessible by all bot commands through Context.
#[derive(Debug)]
pub struct Data<DB> {
    database: DB,
    config: BotConfig,
}

impl<DB> Data<DB>
where
    DB: LeagueDatabase,
{
    /// Create a new data struct with a given Database.
    fn new(database: DB, config: BotConfig) -> Self {
        Self { database, config }
    }
}

/// Convenience type for the bot's data with generics filled in.
pub type BotData = Data<PgDatabase>;

/// A thread-safe Error type used by the bot.
pub type BotError = anyhow::Error;

/// A context that gives the bot information about the action that invoked it.
///
/// It also includes other useful data that the bot uses such as the database.
/// You can access the data in commands by using ``ctx.data()``.
pub type BotContext<'a> = poise::Context<'a, BotData, BotError>;

#[tokio::main]
async fn main() {
    if let Err(e) = setup_tracing() {
        panic!("Error trying to setup tracing: {}", e);
    }

    if let Err(e) = run().await {
        panic!("Error trying to run the bot: {}", e);
    }
}

/// The main function that runs the bot.
async fn run() -> Result<(), BotError> {
    let setup_span = info_span!("bot_setup");
    let _guard = setup_span.enter();
    // Load the .env file only in the development environment (bypassed with the --release flag)
    #[cfg(debug_assertions)]
    dotenv::dotenv().ok();

    let config = BotConfig::from_env()?;
    info!("Successfully loaded the configuration");

    let pg_database = PgDatabase::connect(&config.database_url).await?;
    pg_database.migrate().await?;
    info!("Database schema is up to date");

    let commands: Vec<_> = vec![
        PlayerCommands::get_all(),
        MatchCommands::get_all(),
        RankingCommands::get_all(),
        MiscCommands::get_all(),
        OwnerCommands::get_all(),
    ]
    .into_iter()
    .flatten()
    .collect();
    commands.iter().for_each(|c| info!("Command: {}", c.name));

    let intents = serenity::GatewayIntents::non_privileged();
    let discord_token = config.discord_token.clone();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands,
            on_error: |error| {
                Box::pin(async move {
                    let error_msg;
                    match error {
                        poise::FrameworkError::NotAnOwner { .. } => return,
                        poise::FrameworkError::GuildOnly { .. } => return,
                        poise::FrameworkError::DmOnly { .. } => return,
                        poise::FrameworkError::NsfwOnly { .. } => return,
                        poise::FrameworkError::CommandCheckFailed { ref error, .. } => {
                            match error {
                                Some(error) => error_msg = format!("{}", error),
                                None => return,
                            }
                        }
                        poise::FrameworkError::UnknownCommand { .. } => return,
                        poise::FrameworkError::Setup { ref error, .. } => {
                            error_msg = format!("{}", error)
                        }
                        poise::FrameworkError::EventHandler { ref error, .. } => {
                            error_msg = format!("{}", error)
                        }
                        poise::FrameworkError::Command { ref error, .. } => {
                            error_msg = format!("{}", error)
                        }
                        poise::FrameworkError::ArgumentParse { ref error, .. } => {
                            error_msg = format!("{}", error)
                        }
                        _ => error_msg = "No cause available for this error type.".to_string(),
                    }
                    error!("Error in command: {:?}", error);
                    let ctx = match error.ctx() {
                        Some(ctx) => ctx,
                        None => {
                            error!("No context in this error");
                            return;
                        }
                    };
                    match ctx
                        .send(
                            CreateReply::default()
                                .content("Something went wrong. Please let the bot maintainers know if the issue persists.")
                                .ephemeral(true),
                        )
                        .await
                    {
                        Ok(_) => (),
                        Err(e) => error!("Error sending generic error message to user: {}", e),
                    }

                    let user_field = &format!("<@{}>", ctx.author().id);
                    let command_field = &format!("/{}", ctx.command().name);
                    let fields = vec![
                        ("Cause", error_msg.as_str(), false),
                        ("User", user_field.as_str(), false),
                        ("Command", command_field.as_str(), false),
                    ];

                    discord_log_error(ctx, &error.to_string(), fields)
                        .await
                        .unwrap_or_else(|e| {
                            error!("Error sending error message to log channel: {:?}", e)
                        });
                })
            },
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                match config.guild_id {
                    Some(guild_id) => {
                        poise::builtins::register_in_guild(
                            ctx,
                            &framework.options().commands,
                            guild_id,
                        )
                        .await?;
                        info!("Registered commands in guild {}", guild_id);
                    }
                    None => {
                        poise::builtins::register_globally(ctx, &framework.options().commands)
                            .await?;
                        info!("Registered commands globally");
                    }
                }
                info!("Ready as {}", ready.user.name);
                Ok(Data::new(pg_database, config))
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(discord_token, intents)
        .framework(framework)
        .await?;

    client.start().await?;

    Ok(())
}

/// Sets up the tracing subscriber for the bot.
fn setup_tracing() -> Result<(), BotError> {
    if cfg!(debug_assertions) {
        let filter = EnvFilter::from_default_env()
            .add_directive("none".parse()?)
            .add_directive("five_bot=info".parse()?);

        tracing_subscriber::fmt::fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::NONE)
            .pretty()
            .init();

        return Ok(());
    }

    let log_file = File::create("debug.log")?;

    // Set up tracing with a filter that only logs errors in production
    tracing_subscriber::fmt::fmt()
        .with_span_events(FmtSpan::NONE)
        .with_max_level(LevelFilter::ERROR)
        .with_writer(log_file)
        .pretty()
        .init();

    Ok(())
}
