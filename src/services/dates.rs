//! Turns the model's free-text reminder phrases ("yarın", "3 gün sonra",
//! "haftaya cuma", "15 mart") into an absolute local timestamp.
//!
//! Nothing in here fails: every unparseable piece degrades to a fixed
//! fallback (base date = today, time = 10:00).

use chrono::{Datelike, Days, Months, NaiveDate, NaiveDateTime, Weekday};

use crate::models::fields::{fold_case, is_unspecified};

const DEFAULT_TIME: (u32, u32) = (10, 0);

const WEEKDAY_NAMES: &[(&str, Weekday)] = &[
    // Longer names first: "pazartesi" starts with "pazar", "cumartesi" with "cuma".
    ("pazartesi", Weekday::Mon),
    ("cumartesi", Weekday::Sat),
    ("salı", Weekday::Tue),
    ("sali", Weekday::Tue),
    ("çarşamba", Weekday::Wed),
    ("carsamba", Weekday::Wed),
    ("perşembe", Weekday::Thu),
    ("persembe", Weekday::Thu),
    ("cuma", Weekday::Fri),
    ("pazar", Weekday::Sun),
    ("monday", Weekday::Mon),
    ("tuesday", Weekday::Tue),
    ("wednesday", Weekday::Wed),
    ("thursday", Weekday::Thu),
    ("friday", Weekday::Fri),
    ("saturday", Weekday::Sat),
    ("sunday", Weekday::Sun),
];

const MONTH_NAMES: &[(&str, u32)] = &[
    ("ocak", 1),
    ("şubat", 2),
    ("subat", 2),
    ("mart", 3),
    ("nisan", 4),
    ("mayıs", 5),
    ("mayis", 5),
    ("haziran", 6),
    ("temmuz", 7),
    ("ağustos", 8),
    ("agustos", 8),
    ("eylül", 9),
    ("eylul", 9),
    ("ekim", 10),
    ("kasım", 11),
    ("kasim", 11),
    ("aralık", 12),
    ("aralik", 12),
    ("january", 1),
    ("february", 2),
    ("march", 3),
    ("april", 4),
    ("may", 5),
    ("june", 6),
    ("july", 7),
    ("august", 8),
    ("september", 9),
    ("october", 10),
    ("november", 11),
    ("december", 12),
];

const NUMBER_WORDS: &[(&str, u32)] = &[
    ("bir", 1),
    ("iki", 2),
    ("üç", 3),
    ("uc", 3),
    ("dört", 4),
    ("dort", 4),
    ("beş", 5),
    ("bes", 5),
    ("altı", 6),
    ("alti", 6),
    ("yedi", 7),
    ("sekiz", 8),
    ("dokuz", 9),
    ("on", 10),
    ("yirmi", 20),
    ("otuz", 30),
];

const NEXT_WEEK: &[&str] = &[
    "haftaya",
    "önümüzdeki hafta",
    "onumuzdeki hafta",
    "gelecek hafta",
];

const NEXT_MONTH: &[&str] = &["önümüzdeki ay", "onumuzdeki ay", "gelecek ay"];

/// Resolves a reminder from its date and time phrases. `None` when the date
/// phrase is empty or the sentinel, regardless of the time phrase.
pub fn resolve(date_phrase: &str, time_phrase: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    if is_unspecified(date_phrase) {
        return None;
    }

    let phrase = fold_case(date_phrase.trim());
    let base = base_date(&phrase, now.date());
    let (hour, minute) = parse_time(time_phrase).unwrap_or(DEFAULT_TIME);

    base.and_hms_opt(hour, minute, 0)
        .or_else(|| base.and_hms_opt(DEFAULT_TIME.0, DEFAULT_TIME.1, 0))
}

// First match wins; the order matters because "haftaya" must be seen
// before "hafta sonra", "ay sonra" before "gelecek ay", and relative
// phrases before free-text parsing.
fn base_date(phrase: &str, today: NaiveDate) -> NaiveDate {
    if contains_any(phrase, &["yarın", "yarin"]) {
        add_days(today, 1)
    } else if contains_any(phrase, &["bugün", "bugun"]) {
        today
    } else if contains_any(phrase, &["gün sonra", "gun sonra"]) {
        add_days(today, u64::from(quantity(phrase)))
    } else if contains_any(phrase, NEXT_WEEK) {
        match named_weekday(phrase) {
            Some(weekday) => weekday_of_next_week(today, weekday),
            None => add_days(today, 7),
        }
    } else if phrase.contains("hafta sonra") {
        add_days(today, 7 * u64::from(quantity(phrase)))
    } else if phrase.contains("ay sonra") {
        add_months(today, quantity(phrase))
    } else if contains_any(phrase, NEXT_MONTH) {
        add_months(today, 1)
    } else {
        parse_free_text(phrase, today).unwrap_or(today)
    }
}

fn contains_any(phrase: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| phrase.contains(n))
}

fn add_days(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_add_days(Days::new(days)).unwrap_or(date)
}

// chrono clamps the day to the end of shorter months (Jan 31 + 1 = Feb 29).
fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months)).unwrap_or(date)
}

fn words(phrase: &str) -> impl Iterator<Item = &str> {
    phrase
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|w| !w.is_empty())
}

/// The count in "N gün/hafta/ay sonra": first run of digits, else a number
/// word, else 1.
fn quantity(phrase: &str) -> u32 {
    let digits: String = phrase
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if !digits.is_empty() {
        return digits.parse().unwrap_or(1);
    }

    // "on beş" is 15: consecutive number words add up.
    let total: u32 = words(phrase)
        .skip_while(|w| number_word(w).is_none())
        .map_while(number_word)
        .sum();
    if total == 0 {
        1
    } else {
        total
    }
}

fn number_word(word: &str) -> Option<u32> {
    NUMBER_WORDS
        .iter()
        .find(|(name, _)| *name == word)
        .map(|(_, n)| *n)
}

fn canonical_weekday(word: &str) -> Option<Weekday> {
    WEEKDAY_NAMES
        .iter()
        .find(|(name, _)| word.starts_with(name))
        .map(|(_, wd)| *wd)
}

fn named_weekday(phrase: &str) -> Option<Weekday> {
    words(phrase).find_map(canonical_weekday)
}

/// First date on or after `today` falling on `weekday`.
fn upcoming_weekday(today: NaiveDate, weekday: Weekday) -> NaiveDate {
    let current = today.weekday().num_days_from_monday();
    let target = weekday.num_days_from_monday();
    add_days(today, u64::from((target + 7 - current) % 7))
}

/// `weekday` inside the Monday-to-Sunday week after the current one.
fn weekday_of_next_week(today: NaiveDate, weekday: Weekday) -> NaiveDate {
    let next_monday = 7 - today.weekday().num_days_from_monday();
    add_days(today, u64::from(next_monday + weekday.num_days_from_monday()))
}

/// Absolute dates: `2024-03-15`, `15.03.2024`, `15/03`, `15 mart 2024`,
/// `mart` or a bare weekday. Missing parts come from `today`.
fn parse_free_text(phrase: &str, today: NaiveDate) -> Option<NaiveDate> {
    let tokens: Vec<&str> = words(phrase).collect();

    if let Some(date) = tokens.iter().find_map(|t| numeric_date(t, today)) {
        return Some(date);
    }

    if let Some(pos) = tokens.iter().position(|t| month_of(t).is_some()) {
        let month = month_of(tokens[pos])?;
        let day = pos
            .checked_sub(1)
            .and_then(|i| leading_number(tokens[i]))
            .unwrap_or(today.day());
        let year = tokens
            .get(pos + 1)
            .and_then(|t| leading_number(t))
            .filter(|y| *y >= 1000)
            .map(|y| y as i32)
            .unwrap_or(today.year());
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    named_weekday(phrase).map(|wd| upcoming_weekday(today, wd))
}

fn numeric_date(token: &str, today: NaiveDate) -> Option<NaiveDate> {
    let parts: Vec<&str> = token.split(['-', '.', '/']).collect();
    if parts.len() < 2 || parts.len() > 3 {
        return None;
    }
    let nums: Vec<u32> = parts
        .iter()
        .map(|p| p.parse::<u32>().ok())
        .collect::<Option<_>>()?;

    if token.contains('-') {
        // ISO order only.
        if parts.len() != 3 || parts[0].len() != 4 {
            return None;
        }
        return NaiveDate::from_ymd_opt(nums[0] as i32, nums[1], nums[2]);
    }

    let year = match nums.get(2) {
        Some(y) if *y < 100 => 2000 + *y as i32,
        Some(y) => *y as i32,
        None => today.year(),
    };
    NaiveDate::from_ymd_opt(year, nums[1], nums[0])
}

fn month_of(word: &str) -> Option<u32> {
    MONTH_NAMES
        .iter()
        .find(|(name, _)| word.starts_with(name))
        .map(|(_, m)| *m)
}

/// Leading digits of a word, so "15'inde" reads as 15.
fn leading_number(word: &str) -> Option<u32> {
    let digits: String = word.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// `HH:MM`, `HH` or `saat HH[:MM]`. `None` when it cannot be read as a
/// valid wall-clock time.
fn parse_time(phrase: &str) -> Option<(u32, u32)> {
    if is_unspecified(phrase) {
        return None;
    }

    let folded = fold_case(phrase.trim());
    let text = folded.strip_prefix("saat").unwrap_or(&folded).trim();

    let mut parts = text.split(':');
    let hour: u32 = parts.next()?.trim().parse().ok()?;
    let minute: u32 = match parts.next() {
        Some(m) => m.trim().parse().ok()?,
        None => 0,
    };

    (hour < 24 && minute < 60).then_some((hour, minute))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    // 2024-01-10 is a Wednesday.
    fn now() -> NaiveDateTime {
        dt("2024-01-10 09:00")
    }

    #[test]
    fn test_tomorrow_with_time() {
        assert_eq!(resolve("yarın", "17:00", now()), Some(dt("2024-01-11 17:00")));
        assert_eq!(resolve("Yarın sabah", "belirtilmedi", now()), Some(dt("2024-01-11 10:00")));
    }

    #[test]
    fn test_today_keeps_date() {
        assert_eq!(resolve("bugün", "15:30", now()), Some(dt("2024-01-10 15:30")));
    }

    #[test]
    fn test_days_later_defaults_hour() {
        assert_eq!(resolve("3 gün sonra", "belirtilmedi", now()), Some(dt("2024-01-13 10:00")));
        assert_eq!(resolve("iki gün sonra", "", now()), Some(dt("2024-01-12 10:00")));
        assert_eq!(resolve("birkaç gün sonra", "", now()), Some(dt("2024-01-11 10:00")));
    }

    #[test]
    fn test_unspecified_date_means_no_reminder() {
        assert_eq!(resolve("belirtilmedi", "14:00", now()), None);
        assert_eq!(resolve("BELİRTİLMEDİ", "14:00", now()), None);
        assert_eq!(resolve("", "14:00", now()), None);
    }

    #[test]
    fn test_next_week_with_and_without_weekday() {
        assert_eq!(resolve("haftaya cuma", "11:00", now()), Some(dt("2024-01-19 11:00")));
        assert_eq!(resolve("haftaya çarşamba", "", now()), Some(dt("2024-01-17 10:00")));
        assert_eq!(resolve("haftaya pazartesi", "", now()), Some(dt("2024-01-15 10:00")));
        assert_eq!(resolve("haftaya pazar", "", now()), Some(dt("2024-01-21 10:00")));
        assert_eq!(resolve("haftaya", "", now()), Some(dt("2024-01-17 10:00")));
    }

    #[test]
    fn test_next_week_weekday_never_before_plain_next_week_monday() {
        // From a Sunday the following week still starts tomorrow.
        let sunday = dt("2024-01-14 09:00");
        assert_eq!(resolve("haftaya pazartesi", "", sunday), Some(dt("2024-01-15 10:00")));
        assert_eq!(resolve("haftaya cuma", "", sunday), Some(dt("2024-01-19 10:00")));
    }

    #[test]
    fn test_next_week_and_month_synonyms() {
        assert_eq!(resolve("önümüzdeki hafta", "", now()), Some(dt("2024-01-17 10:00")));
        assert_eq!(resolve("gelecek hafta salı", "", now()), Some(dt("2024-01-16 10:00")));
        assert_eq!(resolve("Gelecek ay", "", dt("2024-01-31 09:00")), Some(dt("2024-02-29 10:00")));
        assert_eq!(resolve("önümüzdeki ay", "14:00", now()), Some(dt("2024-02-10 14:00")));
    }

    #[test]
    fn test_compound_number_words() {
        assert_eq!(resolve("on beş gün sonra", "", now()), Some(dt("2024-01-25 10:00")));
        assert_eq!(resolve("yirmi gün sonra", "", now()), Some(dt("2024-01-30 10:00")));
        assert_eq!(resolve("iki hafta sonra", "", now()), Some(dt("2024-01-24 10:00")));
    }

    #[test]
    fn test_weeks_later() {
        assert_eq!(resolve("2 hafta sonra", "09:00", now()), Some(dt("2024-01-24 09:00")));
        assert_eq!(resolve("hafta sonra", "", now()), Some(dt("2024-01-17 10:00")));
    }

    #[test]
    fn test_months_later_uses_calendar_months() {
        assert_eq!(
            resolve("2 ay sonra", "09:30", dt("2024-01-31 09:00")),
            Some(dt("2024-03-31 09:30"))
        );
    }

    #[test]
    fn test_months_later_clamps_to_month_end() {
        assert_eq!(
            resolve("1 ay sonra", "", dt("2024-01-31 09:00")),
            Some(dt("2024-02-29 10:00"))
        );
        assert_eq!(
            resolve("3 ay sonra", "", dt("2023-11-30 09:00")),
            Some(dt("2024-02-29 10:00"))
        );
    }

    #[test]
    fn test_bare_weekday_is_next_occurrence_or_today() {
        assert_eq!(resolve("cuma", "", now()), Some(dt("2024-01-12 10:00")));
        assert_eq!(resolve("cumartesi", "", now()), Some(dt("2024-01-13 10:00")));
        assert_eq!(resolve("pazar günü", "", now()), Some(dt("2024-01-14 10:00")));
        assert_eq!(resolve("çarşamba", "", now()), Some(dt("2024-01-10 10:00")));
    }

    #[test]
    fn test_absolute_dates() {
        assert_eq!(resolve("15 mart", "14:00", now()), Some(dt("2024-03-15 14:00")));
        assert_eq!(resolve("5 şubat 2025", "", now()), Some(dt("2025-02-05 10:00")));
        assert_eq!(resolve("2024-02-01", "", now()), Some(dt("2024-02-01 10:00")));
        assert_eq!(resolve("20.01.2024", "", now()), Some(dt("2024-01-20 10:00")));
        assert_eq!(resolve("25/12", "", now()), Some(dt("2024-12-25 10:00")));
    }

    #[test]
    fn test_unparseable_falls_back_to_today() {
        assert_eq!(resolve("en kısa zamanda", "", now()), Some(dt("2024-01-10 10:00")));
        assert_eq!(resolve("31.02.2024", "", now()), Some(dt("2024-01-10 10:00")));
    }

    #[test]
    fn test_time_phrase_variants() {
        assert_eq!(resolve("yarın", "saat 14", now()), Some(dt("2024-01-11 14:00")));
        assert_eq!(resolve("yarın", "9", now()), Some(dt("2024-01-11 09:00")));
        assert_eq!(resolve("yarın", "25:00", now()), Some(dt("2024-01-11 10:00")));
        assert_eq!(resolve("yarın", "öğleden sonra", now()), Some(dt("2024-01-11 10:00")));
    }

    #[test]
    fn test_seconds_are_zeroed() {
        let now = NaiveDateTime::parse_from_str("2024-01-10 09:17:42", "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(resolve("bugün", "", now), Some(dt("2024-01-10 10:00")));
    }
}
