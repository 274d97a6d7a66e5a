//! 変換・祝日探索・DST ルールを組み合わせたシナリオテスト

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Offset, TimeZone, Utc};
use chrono_tz::America::Chicago;
use golarion_calendar::{
    DEFAULT_YEAR_OFFSET, HolidayCalendar, Month, Weekday, clock, seed_holidays,
    to_fictional_date,
};

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn spring_festival_2024() {
    let holidays = HolidayCalendar::from_records(seed_holidays());
    let date = to_fictional_date(ymd(2024, 3, 15), DEFAULT_YEAR_OFFSET, &holidays);

    assert_eq!(date.year, 4721);
    assert_eq!(date.month, Month::Pharast);
    assert_eq!(date.day, 15);
    assert_eq!(date.weekday, Weekday::Fireday);
    assert_eq!(date.holiday.as_deref(), Some("Spring Festival"));
}

#[test]
fn conversion_is_deterministic() {
    let holidays = HolidayCalendar::from_records(seed_holidays());
    let mut date = ymd(2023, 1, 1);
    while date < ymd(2029, 1, 1) {
        assert_eq!(
            to_fictional_date(date, DEFAULT_YEAR_OFFSET, &holidays),
            to_fictional_date(date, DEFAULT_YEAR_OFFSET, &holidays)
        );
        date += Duration::days(1);
    }
}

#[test]
fn first_leap_year_with_default_offset() {
    // 2027 + 2697 = 4724。現実には 2/29 がないが 3 月以降はずれる
    let holidays = HolidayCalendar::default();
    assert_eq!(
        to_fictional_date(ymd(2027, 2, 28), DEFAULT_YEAR_OFFSET, &holidays).day,
        28
    );
    let march = to_fictional_date(ymd(2027, 3, 1), DEFAULT_YEAR_OFFSET, &holidays);
    assert_eq!(march.year, 4724);
    assert_eq!(march.to_string(), "Moonday, Pharast 2, 4724");
}

#[test]
fn next_holiday_from_new_year() {
    let holidays = HolidayCalendar::from_records(seed_holidays());
    let upcoming = holidays.nearest(ymd(2024, 1, 2)).unwrap();

    assert_eq!(upcoming.holiday.name(), "Day of Bones");
    assert_eq!(upcoming.holiday.fictional_date_label(), "Calistril 19");
    assert_eq!(upcoming.days_away, 48);
}

#[test]
fn nearest_holiday_is_never_in_the_past() {
    let holidays = HolidayCalendar::from_records(seed_holidays());
    let mut date = ymd(2024, 1, 1);
    while date < ymd(2026, 1, 1) {
        let upcoming = holidays.nearest(date).unwrap();
        assert!(upcoming.date >= date);
        assert!(upcoming.days_away >= 0);
        assert_eq!(
            upcoming.days_away == 0,
            holidays.find(date.month(), date.day()).is_some()
        );
        date += Duration::days(1);
    }
}

#[test]
fn manual_dst_rule_matches_tz_database_at_local_noon() {
    let mut date = ymd(2024, 1, 1);
    while date < ymd(2028, 1, 1) {
        let noon: DateTime<Utc> = date.and_hms_opt(18, 0, 0).unwrap().and_utc();
        let expected = Chicago
            .offset_from_utc_datetime(&noon.naive_utc())
            .fix()
            .local_minus_utc();

        assert_eq!(
            clock::utc_offset_at(noon).num_seconds(),
            i64::from(expected),
            "offset mismatch on {date}"
        );
        date += Duration::days(1);
    }
}

#[test]
fn daily_trigger_is_two_am_local_all_year() {
    let at = NaiveTime::from_hms_opt(2, 0, 0).unwrap();
    let mut now = ymd(2024, 1, 1).and_hms_opt(12, 0, 0).unwrap().and_utc();
    let end = ymd(2025, 1, 1).and_hms_opt(0, 0, 0).unwrap().and_utc();

    while now < end {
        let trigger = clock::next_trigger_after(now, at).unwrap();
        assert!(trigger > now);
        assert_eq!(clock::local_time_at(trigger).time(), at);
        assert_eq!(
            clock::local_time_at(trigger).date(),
            clock::local_time_at(now).date() + Duration::days(1)
        );
        now = trigger;
    }
}
