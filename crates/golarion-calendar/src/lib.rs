//! ゴラリオン暦 (Pathfinder) の暦計算を提供するライブラリ。
//!
//! 現実のグレゴリオ暦の日付からゴラリオン暦の日付を求める変換、
//! 最も近い祝日の探索、米国中部時間の手動 DST ルールを扱う。
//! I/O は一切行わない。

mod calendar;
pub mod clock;
mod error;
mod holiday;

pub use calendar::{
    DEFAULT_YEAR_OFFSET, FIRST_LEAP_YEAR, FictionalDate, Month, Weekday, is_leap_year,
    to_fictional_date,
};
pub use error::{CalendarError, Result};
pub use holiday::{
    HolidayCalendar, HolidayRecord, SEED_HOLIDAYS, UpcomingHoliday, nearest_holiday,
    seed_holidays,
};
