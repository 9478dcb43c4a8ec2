// File: ./src/model/parser/date.rs
// Resolves Russian date phrases ("5 ноября", "6-7 ноября", "в пятницу") to calendar dates.
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;

static DAY_AND_MONTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)(?:\s+или\s+\d+)?(?:-\d+)?\s+([а-яё]+)").unwrap());

// Order matters: the first stem contained in the fragment wins.
const MONTH_STEMS: &[(&str, u32)] = &[
    ("январ", 1),
    ("феврал", 2),
    ("март", 3),
    ("мар", 3),
    ("апрел", 4),
    ("май", 5),
    ("мая", 5),
    ("июн", 6),
    ("июл", 7),
    ("август", 8),
    ("сентябр", 9),
    ("октябр", 10),
    ("ноябр", 11),
    ("декабр", 12),
];

const WEEKDAY_WORDS: &[(&str, Weekday)] = &[
    ("понедельник", Weekday::Mon),
    ("вторник", Weekday::Tue),
    ("среда", Weekday::Wed),
    ("среду", Weekday::Wed),
    ("четверг", Weekday::Thu),
    ("пятница", Weekday::Fri),
    ("пятницу", Weekday::Fri),
    ("суббота", Weekday::Sat),
    ("субботу", Weekday::Sat),
    ("воскресенье", Weekday::Sun),
];

/// Resolves `text` relative to the reference moment `now`.
///
/// Day + month phrases land in the reference year, or the next one when midnight of
/// that day is already behind `now`. Weekday words resolve to the next occurrence
/// strictly after the reference day.
pub fn resolve_date(text: &str, now: NaiveDateTime) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Some(caps) = DAY_AND_MONTH.captures(text)
        && let Some(month) = month_from_fragment(&caps[2])
    {
        let day = caps[1].parse::<u32>().ok()?;
        return resolve_day_month(day, month, now);
    }

    let lower = text.to_lowercase();
    WEEKDAY_WORDS
        .iter()
        .find(|(word, _)| lower.contains(word))
        .and_then(|(_, target)| next_weekday(now.date(), *target))
}

/// Month number for a (possibly inflected) month name.
pub fn month_from_fragment(fragment: &str) -> Option<u32> {
    let lower = fragment.to_lowercase();
    MONTH_STEMS
        .iter()
        .find(|(stem, _)| lower.contains(stem))
        .map(|(_, month)| *month)
}

fn resolve_day_month(day: u32, month: u32, now: NaiveDateTime) -> Option<NaiveDate> {
    let candidate = NaiveDate::from_ymd_opt(now.year(), month, day)?;
    if candidate.and_time(NaiveTime::MIN) < now {
        NaiveDate::from_ymd_opt(now.year() + 1, month, day)
    } else {
        Some(candidate)
    }
}

fn next_weekday(from: NaiveDate, target: Weekday) -> Option<NaiveDate> {
    let mut d = from + Duration::days(1);
    while d.weekday() != target {
        d += Duration::days(1);
    }
    Some(d)
}
