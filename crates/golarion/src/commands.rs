//! スラッシュコマンドの定義。

use serenity::all::{ChannelType, CommandOptionType, CreateCommand, CreateCommandOption};
use thiserror::Error;

/// コマンドで設定できる年オフセットの絶対値の上限。
pub const MAX_YEAR_OFFSET: i64 = 1_000_000;

/// ユーザーに返すコマンドのエラー。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("You must be an administrator or have the @{role} role to use this command.")]
    Unauthorized { role: String },
    #[error("This command can only be used in a server.")]
    GuildOnly,
    #[error("Missing option: {0}")]
    MissingOption(&'static str),
    #[error("Year offset {0} is out of range.")]
    OffsetOutOfRange(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    SetChannel,
    CurrentChannel,
    PostDate,
    NextHoliday,
    SetYearOffset,
    CalendarHelp,
    Ping,
}

impl BotCommand {
    pub const ALL: [BotCommand; 7] = [
        BotCommand::SetChannel,
        BotCommand::CurrentChannel,
        BotCommand::PostDate,
        BotCommand::NextHoliday,
        BotCommand::SetYearOffset,
        BotCommand::CalendarHelp,
        BotCommand::Ping,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BotCommand::SetChannel => "set_channel",
            BotCommand::CurrentChannel => "current_channel",
            BotCommand::PostDate => "post_date",
            BotCommand::NextHoliday => "next_holiday",
            BotCommand::SetYearOffset => "set_year_offset",
            BotCommand::CalendarHelp => "calendar_help",
            BotCommand::Ping => "ping",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|command| command.name() == name)
    }

    fn description(self) -> &'static str {
        match self {
            BotCommand::SetChannel => "Set the channel for daily Golarion date updates",
            BotCommand::CurrentChannel => "Display the channel currently set for daily updates",
            BotCommand::PostDate => "Post the current Golarion date",
            BotCommand::NextHoliday => "Display the next upcoming holiday",
            BotCommand::SetYearOffset => "Adjust the Golarion year offset",
            BotCommand::CalendarHelp => "List the calendar commands",
            BotCommand::Ping => "Check that the bot is responsive",
        }
    }

    /// 登録用のコマンド定義を作成する。
    pub fn create(self) -> CreateCommand {
        let command = CreateCommand::new(self.name()).description(self.description());

        match self {
            BotCommand::SetChannel => command.add_option(
                CreateCommandOption::new(
                    CommandOptionType::Channel,
                    "channel",
                    "Channel to post daily updates in",
                )
                .channel_types(vec![ChannelType::Text])
                .required(true),
            ),
            BotCommand::SetYearOffset => command.add_option(
                CreateCommandOption::new(
                    CommandOptionType::Integer,
                    "offset",
                    "Years added to the real-world year",
                )
                .required(true),
            ),
            _ => command,
        }
    }
}

/// 年オフセットが設定可能な範囲に収まっているか確認する。
pub fn validate_year_offset(offset: i64) -> Result<i64, CommandError> {
    if !(-MAX_YEAR_OFFSET..=MAX_YEAR_OFFSET).contains(&offset) {
        return Err(CommandError::OffsetOutOfRange(offset));
    }
    Ok(offset)
}
