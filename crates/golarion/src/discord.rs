use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Datelike;
use golarion_calendar::clock::current_adjusted_date;
use serenity::all::{
    ChannelId, Command, CommandDataOptionValue, CommandInteraction, CreateInteractionResponse,
    CreateInteractionResponseMessage, GatewayIntents, GuildId, Http,
};
use serenity::async_trait;
use serenity::client::Context as SerenityContext;
use serenity::prelude::*;
use tracing::{debug, error, info, warn};

use crate::auth::{Invoker, is_admin};
use crate::commands::{BotCommand, CommandError, validate_year_offset};
use crate::config::Config;
use crate::daily::{DailyUpdate, LookupMiss, Transport};
use crate::messages;
use crate::scheduler::Scheduler;
use crate::store::{Store, TrackedDestination};
use crate::year_offset::YearOffset;

pub struct Handler {
    config: Config,
    store: Store,
    year_offset: YearOffset,
    scheduler: Arc<Scheduler>,
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: SerenityContext, ready: serenity::model::gateway::Ready) {
        info!(user = %ready.user.name, "Bot connected, ready to track Golarion dates");

        let commands = BotCommand::ALL.iter().map(|c| c.create()).collect();

        if let Err(e) = Command::set_global_commands(&ctx.http, commands).await {
            error!(error = %e, "Failed to register commands");
        } else {
            info!("Slash commands registered");
        }

        // 再接続で ready が再度呼ばれても、開始と登録はそれぞれ 1 回だけ行われる
        self.scheduler.start().await;

        let transport = Arc::new(SerenityTransport::new(ctx.http.clone()));
        let job = DailyUpdate::new(self.store.clone(), self.year_offset.clone(), transport);
        self.scheduler
            .add_daily_job(
                &self.config.schedule.job_id,
                self.config.schedule.time,
                Arc::new(job),
            )
            .await;

        for job in self.scheduler.jobs().await {
            info!(
                job_id = %job.id,
                next_run = ?job.next_run,
                active = job.active,
                "Scheduled job"
            );
        }
    }

    async fn interaction_create(
        &self,
        ctx: SerenityContext,
        interaction: serenity::model::application::Interaction,
    ) {
        if let serenity::model::application::Interaction::Command(command) = interaction
            && let Err(e) = self.handle_command(&ctx, &command).await
        {
            error!(error = %e, command = %command.data.name, "Command error");

            if let Err(e) = respond(&ctx, &command, format!("Error: {}", e), true).await {
                error!(error = %e, "Failed to send error response");
            }
        }
    }
}

impl Handler {
    async fn handle_command(
        &self,
        ctx: &SerenityContext,
        command: &CommandInteraction,
    ) -> Result<()> {
        let Some(kind) = BotCommand::from_name(&command.data.name) else {
            warn!(command = %command.data.name, "Unknown command received");
            return Ok(());
        };

        let invoker = invoker(ctx, command).await?;
        if !is_admin(&self.config.discord, &invoker) {
            warn!(
                user_id = invoker.user_id,
                command = kind.name(),
                "Unauthorized access attempt"
            );
            let denial = CommandError::Unauthorized {
                role: self.config.discord.admin_role.clone(),
            };
            return respond(ctx, command, denial.to_string(), true).await;
        }

        match kind {
            BotCommand::SetChannel => self.handle_set_channel(ctx, command).await,
            BotCommand::CurrentChannel => self.handle_current_channel(ctx, command).await,
            BotCommand::PostDate => self.handle_post_date(ctx, command).await,
            BotCommand::NextHoliday => self.handle_next_holiday(ctx, command).await,
            BotCommand::SetYearOffset => self.handle_set_year_offset(ctx, command).await,
            BotCommand::CalendarHelp => respond(ctx, command, messages::HELP, false).await,
            BotCommand::Ping => respond(ctx, command, messages::PONG, false).await,
        }
    }

    async fn handle_set_channel(
        &self,
        ctx: &SerenityContext,
        command: &CommandInteraction,
    ) -> Result<()> {
        let guild_id = command.guild_id.ok_or(CommandError::GuildOnly)?;
        let channel_id = option(command, "channel")
            .and_then(CommandDataOptionValue::as_channel_id)
            .ok_or(CommandError::MissingOption("channel"))?;

        self.store
            .set_destination(TrackedDestination {
                guild_id: guild_id.get(),
                channel_id: channel_id.get(),
            })
            .await?;
        info!(
            guild_id = guild_id.get(),
            channel_id = channel_id.get(),
            "Daily update channel set"
        );

        respond(
            ctx,
            command,
            messages::channel_set(channel_id.mention()),
            false,
        )
        .await
    }

    async fn handle_current_channel(
        &self,
        ctx: &SerenityContext,
        command: &CommandInteraction,
    ) -> Result<()> {
        let guild_id = command.guild_id.ok_or(CommandError::GuildOnly)?;

        let content = match self.store.destination(guild_id.get()).await? {
            Some(destination) => match channel_id(destination.channel_id) {
                Some(channel_id) if channel_id.to_channel(&ctx.http).await.is_ok() => {
                    messages::current_channel(channel_id.mention())
                }
                _ => {
                    warn!(
                        guild_id = destination.guild_id,
                        channel_id = destination.channel_id,
                        "Tracked channel cannot be found"
                    );
                    messages::CHANNEL_MISSING.to_string()
                }
            },
            None => messages::NO_CHANNEL.to_string(),
        };

        respond(ctx, command, content, false).await
    }

    async fn handle_post_date(
        &self,
        ctx: &SerenityContext,
        command: &CommandInteraction,
    ) -> Result<()> {
        let today = current_adjusted_date();
        let holidays = self.store.holiday_calendar().await?;
        let content = messages::today(today, self.year_offset.get(), &holidays);

        respond(ctx, command, content, false).await
    }

    async fn handle_next_holiday(
        &self,
        ctx: &SerenityContext,
        command: &CommandInteraction,
    ) -> Result<()> {
        let today = current_adjusted_date();
        let holidays = self.store.holiday_calendar().await?;
        let content = messages::next_holiday(holidays.nearest(today).as_ref());

        respond(ctx, command, content, false).await
    }

    async fn handle_set_year_offset(
        &self,
        ctx: &SerenityContext,
        command: &CommandInteraction,
    ) -> Result<()> {
        let offset = option(command, "offset")
            .and_then(CommandDataOptionValue::as_i64)
            .ok_or(CommandError::MissingOption("offset"))?;
        let offset = validate_year_offset(offset)?;

        self.year_offset.set(offset);
        let year = i64::from(current_adjusted_date().year()) + offset;
        info!(offset, year, user_id = command.user.id.get(), "Year offset updated");

        respond(
            ctx,
            command,
            messages::year_offset_updated(offset, year),
            false,
        )
        .await
    }
}

/// コマンド実行者の権限とロール名を集める。
async fn invoker(ctx: &SerenityContext, command: &CommandInteraction) -> Result<Invoker> {
    let mut invoker = Invoker {
        user_id: command.user.id.get(),
        ..Default::default()
    };

    let (Some(member), Some(guild_id)) = (command.member.as_deref(), command.guild_id) else {
        return Ok(invoker);
    };

    invoker.administrator = member
        .permissions
        .is_some_and(|permissions| permissions.administrator());

    if !invoker.administrator && !member.roles.is_empty() {
        let roles = guild_id
            .roles(&ctx.http)
            .await
            .context("Failed to fetch guild roles")?;
        invoker.role_names = member
            .roles
            .iter()
            .filter_map(|role_id| roles.get(role_id))
            .map(|role| role.name.clone())
            .collect();
    }

    Ok(invoker)
}

fn option<'a>(command: &'a CommandInteraction, name: &str) -> Option<&'a CommandDataOptionValue> {
    command
        .data
        .options
        .iter()
        .find(|opt| opt.name == name)
        .map(|opt| &opt.value)
}

// serenity の ID 型は 0 を受け付けない
fn channel_id(id: u64) -> Option<ChannelId> {
    (id != 0).then(|| ChannelId::new(id))
}

fn guild_id(id: u64) -> Option<GuildId> {
    (id != 0).then(|| GuildId::new(id))
}

async fn respond(
    ctx: &SerenityContext,
    command: &CommandInteraction,
    content: impl Into<String>,
    ephemeral: bool,
) -> Result<()> {
    let response = CreateInteractionResponseMessage::new()
        .content(content)
        .ephemeral(ephemeral);

    command
        .create_response(&ctx.http, CreateInteractionResponse::Message(response))
        .await?;

    Ok(())
}

/// Discord の HTTP API を使った配信手段。
pub struct SerenityTransport {
    http: Arc<Http>,
}

impl SerenityTransport {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Transport for SerenityTransport {
    async fn resolve(&self, destination: &TrackedDestination) -> Result<ChannelId, LookupMiss> {
        let TrackedDestination {
            guild_id: guild,
            channel_id: channel,
        } = *destination;

        let guild_not_found = LookupMiss::GuildNotFound { guild_id: guild };
        let Some(guild_id) = guild_id(guild) else {
            return Err(guild_not_found);
        };
        if let Err(e) = self.http.get_guild(guild_id).await {
            debug!(error = %e, guild_id = guild, "Failed to fetch guild");
            return Err(guild_not_found);
        }

        let channel_not_found = LookupMiss::ChannelNotFound { channel_id: channel };
        let Some(channel_id) = channel_id(channel) else {
            return Err(channel_not_found);
        };
        let resolved = match channel_id.to_channel(&self.http).await {
            Ok(resolved) => resolved,
            Err(e) => {
                debug!(error = %e, channel_id = channel, "Failed to fetch channel");
                return Err(channel_not_found);
            }
        };

        match resolved.guild() {
            Some(guild_channel) if guild_channel.guild_id == guild_id => Ok(guild_channel.id),
            _ => Err(LookupMiss::ChannelNotInGuild {
                guild_id: guild,
                channel_id: channel,
            }),
        }
    }

    async fn send(&self, channel_id: ChannelId, content: &str) -> Result<()> {
        channel_id
            .say(&self.http, content)
            .await
            .context("Failed to send message")?;
        Ok(())
    }
}

pub async fn run(config: Config, store: Store) -> Result<()> {
    let intents = GatewayIntents::GUILDS;
    let handler = Handler {
        year_offset: YearOffset::new(config.calendar.year_offset),
        scheduler: Arc::new(Scheduler::new(store.clone())),
        store,
        config: config.clone(),
    };

    let mut client = Client::builder(&config.discord.token, intents)
        .event_handler(handler)
        .await
        .context("Failed to create client")?;

    info!("Starting bot");
    client.start().await.context("Client error")?;

    Ok(())
}
