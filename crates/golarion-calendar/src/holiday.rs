//! ゴラリオン暦の祝日と、最も近い祝日の探索。

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use chrono::{Datelike, NaiveDate};

use crate::calendar::Month;
use crate::error::{CalendarError, Result};

/// 初回起動時に登録する祝日 (月, 日, 名前)。月日は現実の暦で表す。
pub const SEED_HOLIDAYS: &[(u32, u32, &str)] = &[
    (1, 1, "New Year"),
    (2, 19, "Day of Bones"),
    (3, 15, "Spring Festival"),
    (4, 14, "Taxfest"),
    (6, 16, "Sunwrought Festival"),
    (8, 16, "First Brewing"),
    (10, 31, "Harvest Feast"),
    (11, 8, "Remembrance Moon"),
    (12, 25, "Winter Week"),
];

/// 閏年。月日の妥当性検証に使う (2/29 を許容するため)。
const VALIDATION_YEAR: i32 = 2000;

/// 2/29 が次に現れるまでの最大年数。
const MAX_YEARS_BETWEEN_OCCURRENCES: i32 = 8;

/// 祝日。(月, 日) ごとに高々 1 件。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolidayRecord {
    month: u32,
    day: u32,
    name: String,
}

impl HolidayRecord {
    /// 月日を検証して祝日を作成する。
    ///
    /// 月に存在しない日 (4/31 など) は拒否する。2/29 は許容する。
    pub fn new(month: u32, day: u32, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CalendarError::EmptyHolidayName);
        }
        if NaiveDate::from_ymd_opt(VALIDATION_YEAR, month, day).is_none() {
            return Err(CalendarError::InvalidHolidayDate { month, day });
        }
        Ok(Self { month, day, name })
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// ゴラリオン暦の月名で表した日付 (例: `Calistril 19`)。
    pub fn fictional_date_label(&self) -> String {
        match Month::from_number(self.month) {
            Some(month) => format!("{} {}", month, self.day),
            None => format!("{}/{}", self.month, self.day),
        }
    }

    /// `from` 以降 (当日を含む) で最初にこの祝日が訪れる日付を返す。
    pub fn next_occurrence(&self, from: NaiveDate) -> Option<NaiveDate> {
        (from.year()..=from.year().saturating_add(MAX_YEARS_BETWEEN_OCCURRENCES))
            .filter_map(|year| NaiveDate::from_ymd_opt(year, self.month, self.day))
            .find(|date| *date >= from)
    }
}

/// 初期登録用の祝日一覧を返す。
pub fn seed_holidays() -> Vec<HolidayRecord> {
    SEED_HOLIDAYS
        .iter()
        .filter_map(|&(month, day, name)| {
            let record = HolidayRecord::new(month, day, name);
            debug_assert!(record.is_ok(), "invalid seed holiday {month}/{day} {name}");
            record.ok()
        })
        .collect()
}

/// 最も近い祝日の探索結果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpcomingHoliday<'a> {
    pub holiday: &'a HolidayRecord,
    /// 祝日が訪れる現実の日付
    pub date: NaiveDate,
    /// 基準日から祝日までの日数。当日なら 0
    pub days_away: i64,
}

/// (月, 日) をキーにした祝日の集合。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolidayCalendar {
    holidays: BTreeMap<(u32, u32), HolidayRecord>,
}

impl HolidayCalendar {
    /// 祝日の一覧からカレンダーを作成する。同じ月日が重複した場合は先の方を残す。
    pub fn from_records(records: impl IntoIterator<Item = HolidayRecord>) -> Self {
        let mut calendar = Self::default();
        for record in records {
            calendar.insert(record);
        }
        calendar
    }

    /// 祝日を追加する。既に同じ月日の祝日があれば追加せず `false` を返す。
    pub fn insert(&mut self, record: HolidayRecord) -> bool {
        match self.holidays.entry((record.month, record.day)) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(record);
                true
            }
        }
    }

    pub fn find(&self, month: u32, day: u32) -> Option<&HolidayRecord> {
        self.holidays.get(&(month, day))
    }

    /// 月日の昇順で祝日を返す。
    pub fn iter(&self) -> impl Iterator<Item = &HolidayRecord> {
        self.holidays.values()
    }

    pub fn len(&self) -> usize {
        self.holidays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holidays.is_empty()
    }

    /// `date` から最も近い祝日を探す。
    pub fn nearest(&self, date: NaiveDate) -> Option<UpcomingHoliday<'_>> {
        nearest_holiday(date, self)
    }
}

/// `date` から最も近い祝日と、そこまでの日数を返す。
///
/// 今年の祝日が既に過ぎていれば翌年の同じ月日を使う。当日の祝日は 0 日後として扱う。
/// 日数が同じ場合は (月, 日) の昇順で先のものを選ぶ。祝日が 1 件もなければ `None`。
pub fn nearest_holiday(
    date: NaiveDate,
    holidays: &HolidayCalendar,
) -> Option<UpcomingHoliday<'_>> {
    let mut nearest: Option<UpcomingHoliday<'_>> = None;

    // BTreeMap は (月, 日) 順に走査されるため、厳密な `<` で同着は先勝ちになる
    for holiday in holidays.iter() {
        let Some(occurrence) = holiday.next_occurrence(date) else {
            continue;
        };
        let days_away = (occurrence - date).num_days();

        if nearest.as_ref().is_none_or(|n| days_away < n.days_away) {
            nearest = Some(UpcomingHoliday {
                holiday,
                date: occurrence,
                days_away,
            });
        }
    }

    nearest
}
