//! ユーザーに返すメッセージの組み立て。

use std::fmt::Display;

use chrono::NaiveDate;
use golarion_calendar::{HolidayCalendar, UpcomingHoliday, to_fictional_date};

pub const PONG: &str = "Pong!";

pub const NO_UPCOMING_HOLIDAYS: &str = "No upcoming holidays found.";

pub const NO_CHANNEL: &str =
    "No channel is currently set for daily updates. Use `/set_channel` to set one.";

pub const CHANNEL_MISSING: &str = "The previously set channel cannot be found. \
Please set a new channel using `/set_channel`.";

pub const HELP: &str = "Here are the commands you can use:\n\
**/set_channel [#channel]** - Set the channel for daily Golarion date updates.\n\
**/current_channel** - Display the channel currently set for daily updates.\n\
**/post_date** - Manually post the current Golarion date.\n\
**/next_holiday** - Display the next upcoming holiday and how many days away it is.\n\
**/set_year_offset [offset]** - Manually adjust the Golarion year offset.\n\
**/calendar_help** - Display this help message.\n\
**/ping** - Check that the bot is responsive.\n\
All commands require the administrator permission or the admin role.";

/// `Today in Golarion: ...` の 1 行。
pub fn today(date: NaiveDate, year_offset: i64, holidays: &HolidayCalendar) -> String {
    format!(
        "Today in Golarion: {}",
        to_fictional_date(date, year_offset, holidays)
    )
}

/// 次の祝日の案内。祝日が無ければその旨を返す。
pub fn next_holiday(upcoming: Option<&UpcomingHoliday<'_>>) -> String {
    match upcoming {
        Some(upcoming) => format!(
            "The next holiday is **{}** on **{}**, which is in **{} days**.",
            upcoming.holiday.name(),
            upcoming.holiday.fictional_date_label(),
            upcoming.days_away
        ),
        None => NO_UPCOMING_HOLIDAYS.to_string(),
    }
}

/// 日次更新で投稿する本文。
pub fn daily_update(date: NaiveDate, year_offset: i64, holidays: &HolidayCalendar) -> String {
    format!(
        "{}\n{}",
        today(date, year_offset, holidays),
        next_holiday(holidays.nearest(date).as_ref())
    )
}

pub fn channel_set(channel: impl Display) -> String {
    format!("Daily updates will be posted in {channel}.")
}

pub fn current_channel(channel: impl Display) -> String {
    format!("Daily updates are currently set to be posted in {channel}.")
}

pub fn year_offset_updated(year_offset: i64, year: i64) -> String {
    format!(
        "The Golarion year offset has been updated to {year_offset}. \
         The current Golarion year is now {year}."
    )
}
