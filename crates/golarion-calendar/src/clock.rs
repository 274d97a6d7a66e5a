//! 米国中部時間 (US/Central) の手動 DST ルール。
//!
//! タイムゾーンデータベースには依存せず、以下のルールで UTC オフセットを決める。
//! - 夏時間 (UTC-5): 3 月第 2 日曜日から 11 月第 1 日曜日の前日まで
//! - 標準時 (UTC-6): それ以外
//!
//! 切り替えは標準時で見た日付の境界 (現地 0 時) で行う。
//! 日次ジョブの発火時刻と、コマンドでの「今日」の算出はどちらもこのモジュールを使う。

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};

pub const STANDARD_OFFSET_HOURS: i64 = -6;
pub const DAYLIGHT_OFFSET_HOURS: i64 = -5;

/// `date` 以降 (当日を含む) で最初の日曜日。
fn first_sunday_on_or_after(date: NaiveDate) -> NaiveDate {
    let days = (7 - date.weekday().num_days_from_sunday()) % 7;
    date + Duration::days(i64::from(days))
}

/// 夏時間の開始日 (3 月第 2 日曜日 = 3/8 以降で最初の日曜日)。
pub fn dst_start(year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, 3, 8).map(first_sunday_on_or_after)
}

/// 夏時間の終了日 (11 月第 1 日曜日 = 11/1 以降で最初の日曜日)。この日は標準時。
pub fn dst_end(year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, 11, 1).map(first_sunday_on_or_after)
}

/// 現地日付が夏時間かどうか。開始日を含み、終了日を含まない。
pub fn is_dst(date: NaiveDate) -> bool {
    match (dst_start(date.year()), dst_end(date.year())) {
        (Some(start), Some(end)) => start <= date && date < end,
        _ => false,
    }
}

/// 現地日付における UTC からのオフセット。
pub fn utc_offset_on(date: NaiveDate) -> Duration {
    if is_dst(date) {
        Duration::hours(DAYLIGHT_OFFSET_HOURS)
    } else {
        Duration::hours(STANDARD_OFFSET_HOURS)
    }
}

/// 指定した UTC 時刻における UTC からのオフセット。
pub fn utc_offset_at(now: DateTime<Utc>) -> Duration {
    let standard = now.naive_utc() + Duration::hours(STANDARD_OFFSET_HOURS);
    utc_offset_on(standard.date())
}

/// 指定した UTC 時刻の現地時刻。
pub fn local_time_at(now: DateTime<Utc>) -> NaiveDateTime {
    now.naive_utc() + utc_offset_at(now)
}

/// 現在の現地日付。日次ジョブとコマンドが共通で使う「今日」。
pub fn current_adjusted_date() -> NaiveDate {
    local_time_at(Utc::now()).date()
}

/// 現地時刻を UTC に変換する。
///
/// 夏時間開始で飛ばされる現地時刻は 1 時間後ろの時刻として扱う。
pub fn local_to_utc(local: NaiveDateTime) -> DateTime<Utc> {
    let utc = (local - utc_offset_on(local.date())).and_utc();
    if local_time_at(utc) < local {
        return (local - Duration::hours(STANDARD_OFFSET_HOURS)).and_utc();
    }
    utc
}

/// `now` より後で、現地時刻が `at` になる最初の UTC 時刻。
pub fn next_trigger_after(now: DateTime<Utc>, at: NaiveTime) -> Option<DateTime<Utc>> {
    local_time_at(now)
        .date()
        .iter_days()
        .take(3)
        .map(|date| local_to_utc(date.and_time(at)))
        .find(|trigger| *trigger > now)
}

/// 日次ジョブを実行すべき現地日付を返す。
///
/// 現地時刻が `at` を過ぎていて、その日付でまだ実行していなければ `Some(今日)`。
/// 再起動で呼び直しても同じ日に 2 回発火せず、起動が `at` より遅れても当日分は実行する。
pub fn due_date(
    now: DateTime<Utc>,
    at: NaiveTime,
    last_run: Option<NaiveDate>,
) -> Option<NaiveDate> {
    let local = local_time_at(now);
    let today = local.date();

    if local.time() < at {
        return None;
    }
    if last_run.is_some_and(|last| last >= today) {
        return None;
    }
    Some(today)
}
