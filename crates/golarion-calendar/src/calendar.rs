//! 現実の日付をゴラリオン暦の日付に変換する。

use std::fmt;

use chrono::{Datelike, NaiveDate};

use crate::holiday::HolidayCalendar;

/// 現実の年に加算してゴラリオン暦の年を得るオフセットの既定値。
pub const DEFAULT_YEAR_OFFSET: i64 = 2697;

/// ゴラリオン暦で最初の閏年。以降 4 年ごとに閏年となる。
pub const FIRST_LEAP_YEAR: i64 = 4724;

/// ゴラリオン暦の曜日。現実の月曜日が `Moonday` に対応する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Weekday {
    Moonday,
    Toilday,
    Wealday,
    Oathday,
    Fireday,
    Starday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Moonday,
        Weekday::Toilday,
        Weekday::Wealday,
        Weekday::Oathday,
        Weekday::Fireday,
        Weekday::Starday,
        Weekday::Sunday,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Weekday::Moonday => "Moonday",
            Weekday::Toilday => "Toilday",
            Weekday::Wealday => "Wealday",
            Weekday::Oathday => "Oathday",
            Weekday::Fireday => "Fireday",
            Weekday::Starday => "Starday",
            Weekday::Sunday => "Sunday",
        }
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(weekday: chrono::Weekday) -> Self {
        Self::ALL[weekday.num_days_from_monday() as usize]
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// ゴラリオン暦の月。現実の 1 月が `Abadius` に対応する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Month {
    Abadius,
    Calistril,
    Pharast,
    Gozran,
    Desnus,
    Sarenith,
    Erastus,
    Arodus,
    Rova,
    Lamashan,
    Neth,
    Kuthona,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::Abadius,
        Month::Calistril,
        Month::Pharast,
        Month::Gozran,
        Month::Desnus,
        Month::Sarenith,
        Month::Erastus,
        Month::Arodus,
        Month::Rova,
        Month::Lamashan,
        Month::Neth,
        Month::Kuthona,
    ];

    /// 1 始まりの月番号から月を得る。
    pub fn from_number(month: u32) -> Option<Self> {
        let index = usize::try_from(month.checked_sub(1)?).ok()?;
        Self::ALL.get(index).copied()
    }

    pub fn number(self) -> u32 {
        self as u32 + 1
    }

    pub fn name(self) -> &'static str {
        match self {
            Month::Abadius => "Abadius",
            Month::Calistril => "Calistril",
            Month::Pharast => "Pharast",
            Month::Gozran => "Gozran",
            Month::Desnus => "Desnus",
            Month::Sarenith => "Sarenith",
            Month::Erastus => "Erastus",
            Month::Arodus => "Arodus",
            Month::Rova => "Rova",
            Month::Lamashan => "Lamashan",
            Month::Neth => "Neth",
            Month::Kuthona => "Kuthona",
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 変換されたゴラリオン暦の日付。保存はせず、必要な時に都度計算する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FictionalDate {
    pub weekday: Weekday,
    pub month: Month,
    pub day: u32,
    pub year: i64,
    /// 現実の月日に紐付く祝日名
    pub holiday: Option<String>,
}

impl fmt::Display for FictionalDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {} {}, {}",
            self.weekday, self.month, self.day, self.year
        )?;
        if let Some(holiday) = &self.holiday {
            write!(f, " (Holiday: {holiday})")?;
        }
        Ok(())
    }
}

/// ゴラリオン暦の閏年かどうかを判定する。
///
/// 現実の閏年とは独立しており、4724 年以降の 4 年ごとが閏年となる。
pub fn is_leap_year(year: i64) -> bool {
    year >= FIRST_LEAP_YEAR && (year - FIRST_LEAP_YEAR) % 4 == 0
}

/// 現実の日付をゴラリオン暦の日付に変換する。
///
/// 閏年では Calistril に 1 日が挿入されるため、3 月以降の日は一律 +1 される。
/// 月末を超える場合も繰り上げはしない (3/31 は Pharast 32 になる)。
/// 祝日は現実の月日をキーに引く。
/// 年が `i64` に収まらないオフセットでは年を `i64::MIN` / `i64::MAX` に丸める。
///
/// # Arguments
/// * `date` - 現実の日付
/// * `year_offset` - 現実の年に加算するオフセット
/// * `holidays` - 祝日カレンダー
pub fn to_fictional_date(
    date: NaiveDate,
    year_offset: i64,
    holidays: &HolidayCalendar,
) -> FictionalDate {
    let year = i64::from(date.year()).saturating_add(year_offset);

    let day = if is_leap_year(year) && date.month() > 2 {
        date.day() + 1
    } else {
        // 2/29 はそのまま Calistril 29 になる
        date.day()
    };

    FictionalDate {
        weekday: date.weekday().into(),
        month: Month::ALL[date.month0() as usize],
        day,
        year,
        holiday: holidays
            .find(date.month(), date.day())
            .map(|h| h.name().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::holiday::seed_holidays;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn leap_years_start_at_4724() {
        assert!(!is_leap_year(4720));
        assert!(!is_leap_year(4723));
        assert!(is_leap_year(4724));
        assert!(!is_leap_year(4725));
        assert!(!is_leap_year(4726));
        assert!(!is_leap_year(4727));
        assert!(is_leap_year(4728));
        assert!(is_leap_year(4732));
    }

    #[test]
    fn leap_day_is_not_shifted() {
        let holidays = HolidayCalendar::default();
        // 2024 + 2700 = 4724
        for (year, offset) in [(2024, 2700), (2028, 2700), (2032, 2700)] {
            let date = to_fictional_date(ymd(year, 2, 29), offset, &holidays);
            assert_eq!(date.month, Month::Calistril);
            assert_eq!(date.day, 29);
        }
    }

    #[test]
    fn days_after_february_shift_in_leap_year() {
        let holidays = HolidayCalendar::default();

        let leap = to_fictional_date(ymd(2024, 3, 1), 2700, &holidays);
        assert_eq!(leap.year, 4724);
        assert_eq!(leap.month, Month::Pharast);
        assert_eq!(leap.day, 2);

        let common = to_fictional_date(ymd(2024, 3, 1), 2697, &holidays);
        assert_eq!(common.year, 4721);
        assert_eq!(common.day, 1);
    }

    #[test]
    fn shift_is_flat_across_months() {
        let holidays = HolidayCalendar::default();
        assert_eq!(to_fictional_date(ymd(2024, 2, 28), 2700, &holidays).day, 28);
        assert_eq!(to_fictional_date(ymd(2024, 6, 10), 2700, &holidays).day, 11);
        assert_eq!(to_fictional_date(ymd(2024, 12, 31), 2700, &holidays).day, 32);
        assert_eq!(to_fictional_date(ymd(2024, 3, 31), 2700, &holidays).day, 32);
    }

    #[test]
    fn no_shift_in_common_years() {
        let holidays = HolidayCalendar::default();
        // 2025 + 2700..=2702 = 4725..=4727
        for offset in 2700..=2702 {
            for month in 3..=12 {
                let date = to_fictional_date(ymd(2025, month, 10), offset, &holidays);
                assert_eq!(date.year, 2025 + offset);
                assert_eq!(date.day, 10);
            }
        }
    }

    #[test]
    fn extreme_offsets_saturate() {
        let holidays = HolidayCalendar::from_records(seed_holidays());

        let high = to_fictional_date(ymd(2024, 3, 15), i64::MAX, &holidays);
        assert_eq!(high.year, i64::MAX);
        assert_eq!(high.month, Month::Pharast);
        assert_eq!(high.holiday.as_deref(), Some("Spring Festival"));

        let low = to_fictional_date(ymd(2024, 3, 15), i64::MIN, &holidays);
        assert_eq!(low.year, i64::MIN);
        assert_eq!(low.day, 15);
    }

    #[test]
    fn weekday_follows_real_weekday() {
        let holidays = HolidayCalendar::default();
        // 2024-03-11 は月曜日
        let names: Vec<_> = (11..=17)
            .map(|d| to_fictional_date(ymd(2024, 3, d), 2697, &holidays).weekday)
            .collect();
        assert_eq!(names, Weekday::ALL);
    }

    #[test]
    fn formats_with_holiday() {
        let holidays = HolidayCalendar::from_records(seed_holidays());
        let date = to_fictional_date(ymd(2024, 3, 15), 2697, &holidays);
        assert_eq!(
            date.to_string(),
            "Fireday, Pharast 15, 4721 (Holiday: Spring Festival)"
        );
    }

    #[test]
    fn formats_without_holiday() {
        let holidays = HolidayCalendar::from_records(seed_holidays());
        let date = to_fictional_date(ymd(2024, 3, 16), 2697, &holidays);
        assert_eq!(date.holiday, None);
        assert_eq!(date.to_string(), "Starday, Pharast 16, 4721");
    }

    #[test]
    fn holiday_lookup_uses_real_month_and_day() {
        // 閏年で日付がずれても祝日は現実の 3/15 に紐付く
        let holidays = HolidayCalendar::from_records(seed_holidays());
        let date = to_fictional_date(ymd(2024, 3, 15), 2700, &holidays);
        assert_eq!(date.day, 16);
        assert_eq!(date.holiday.as_deref(), Some("Spring Festival"));
    }

    #[test]
    fn month_numbers_round_trip() {
        assert_eq!(Month::from_number(1), Some(Month::Abadius));
        assert_eq!(Month::from_number(12), Some(Month::Kuthona));
        assert_eq!(Month::from_number(0), None);
        assert_eq!(Month::from_number(13), None);
        assert_eq!(Month::Pharast.number(), 3);
    }
}
