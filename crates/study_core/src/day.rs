use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, Local, Months, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DAY_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("malformed day identifier `{raw}` (expected YYYY-MM-DD)")]
pub struct DayParseError {
    raw: String,
}

impl DayParseError {
    fn new(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
        }
    }
}

/// A calendar day with no time-of-day component.
///
/// Displays and serializes as `YYYY-MM-DD`. The derived ordering is
/// chronological and agrees with lexicographic order of the string form.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DayId(NaiveDate);

impl DayId {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Calendar day of `timestamp` in its own time zone.
    ///
    /// For `DateTime<Local>` this is the local calendar, so two instants on
    /// the same local day always map to the same identifier even when their
    /// UTC dates differ.
    pub fn from_datetime<Tz: TimeZone>(timestamp: &DateTime<Tz>) -> Self {
        Self(timestamp.date_naive())
    }

    /// Local calendar day according to the system clock.
    pub fn today() -> Self {
        Self::from_datetime(&Local::now())
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// The day `days` after this one (before it when negative).
    ///
    /// Saturates at the representable calendar bounds instead of panicking.
    pub fn add_days(self, days: i64) -> Self {
        let shifted = Duration::try_days(days).and_then(|delta| self.0.checked_add_signed(delta));
        match shifted {
            Some(date) => Self(date),
            None if days >= 0 => Self(NaiveDate::MAX),
            None => Self(NaiveDate::MIN),
        }
    }

    /// Signed number of days from `self` to `other`.
    pub fn days_until(self, other: DayId) -> i64 {
        other.0.signed_duration_since(self.0).num_days()
    }

    fn add_months(self, months: i32) -> Self {
        let shifted = if months >= 0 {
            self.0.checked_add_months(Months::new(months.unsigned_abs()))
        } else {
            self.0.checked_sub_months(Months::new(months.unsigned_abs()))
        };
        shifted.map(Self).unwrap_or(self)
    }
}

impl fmt::Display for DayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DAY_FORMAT))
    }
}

impl fmt::Debug for DayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DayId({self})")
    }
}

impl FromStr for DayId {
    type Err = DayParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        let well_shaped = bytes.len() == 10
            && bytes.iter().enumerate().all(|(idx, b)| match idx {
                4 | 7 => *b == b'-',
                _ => b.is_ascii_digit(),
            });
        if !well_shaped {
            return Err(DayParseError::new(s));
        }
        NaiveDate::parse_from_str(s, DAY_FORMAT)
            .map(Self)
            .map_err(|_| DayParseError::new(s))
    }
}

impl TryFrom<String> for DayId {
    type Error = DayParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DayId> for String {
    fn from(day: DayId) -> Self {
        day.to_string()
    }
}

impl From<NaiveDate> for DayId {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

/// Serde adapter for `Option<DayId>` persisted as `""` when unset.
pub mod optional_day {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::DayId;

    pub fn serialize<S: Serializer>(day: &Option<DayId>, serializer: S) -> Result<S::Ok, S::Error> {
        match day {
            Some(day) => serializer.collect_str(day),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DayId>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        trimmed.parse().map(Some).map_err(serde::de::Error::custom)
    }
}

/// Source of "today" for the planner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Clock {
    #[default]
    System,
    Fixed(DayId),
}

impl Clock {
    pub fn fixed(day: DayId) -> Self {
        Self::Fixed(day)
    }

    pub fn today(&self) -> DayId {
        match self {
            Clock::System => DayId::today(),
            Clock::Fixed(day) => *day,
        }
    }
}

/// Inclusive span of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DayId,
    pub end: DayId,
}

impl DateRange {
    /// Builds a range, swapping the bounds when given in reverse.
    pub fn new(start: DayId, end: DayId) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    pub fn single(day: DayId) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    /// Sunday-to-Saturday week containing `day`.
    pub fn week_of(day: DayId) -> Self {
        let offset = i64::from(day.date().weekday().num_days_from_sunday());
        let start = day.add_days(-offset);
        Self {
            start,
            end: start.add_days(6),
        }
    }

    pub fn month_of(day: DayId) -> Self {
        let date = day.date();
        let first = date.with_day(1).map(DayId).unwrap_or(day);
        let last = first.add_months(1).add_days(-1);
        Self { start: first, end: last }
    }

    pub fn contains(&self, day: DayId) -> bool {
        self.start <= day && day <= self.end
    }

    pub fn len_days(&self) -> i64 {
        self.start.days_until(self.end) + 1
    }

    pub fn days(&self) -> impl Iterator<Item = DayId> {
        let start = self.start;
        (0..self.len_days()).map(move |offset| start.add_days(offset))
    }

    /// The `view` range `steps` views away from this one.
    pub fn shift(&self, view: CalendarView, steps: i32) -> Self {
        view.range_for(view.step(self.start, steps))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalendarView {
    #[default]
    Month,
    Week,
    Day,
}

impl CalendarView {
    pub fn range_for(self, anchor: DayId) -> DateRange {
        match self {
            CalendarView::Month => DateRange::month_of(anchor),
            CalendarView::Week => DateRange::week_of(anchor),
            CalendarView::Day => DateRange::single(anchor),
        }
    }

    /// Moves `anchor` by `steps` views (negative steps go back).
    pub fn step(self, anchor: DayId, steps: i32) -> DayId {
        match self {
            CalendarView::Month => anchor.add_months(steps),
            CalendarView::Week => anchor.add_days(i64::from(steps) * 7),
            CalendarView::Day => anchor.add_days(i64::from(steps)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn day(raw: &str) -> DayId {
        raw.parse().unwrap()
    }

    #[test]
    fn parses_and_displays_round_trip() {
        let parsed = day("2024-03-09");
        assert_eq!(parsed.to_string(), "2024-03-09");
        assert_eq!(parsed, DayId::from_ymd(2024, 3, 9).unwrap());
    }

    #[test]
    fn rejects_malformed_identifiers() {
        for raw in [
            "",
            "2024-3-9",
            "2024/03/09",
            "2024-02-30",
            "2024-13-01",
            "2024-01-01T00:00",
            " 2024-01-01",
            "abcd-ef-gh",
        ] {
            assert!(raw.parse::<DayId>().is_err(), "{raw} should be rejected");
        }
    }

    #[test]
    fn add_days_rolls_over_months_and_years() {
        assert_eq!(day("2024-01-31").add_days(1), day("2024-02-01"));
        assert_eq!(day("2024-02-28").add_days(1), day("2024-02-29"));
        assert_eq!(day("2023-02-28").add_days(1), day("2023-03-01"));
        assert_eq!(day("2024-12-31").add_days(1), day("2025-01-01"));
        assert_eq!(day("2025-01-01").add_days(-1), day("2024-12-31"));
        assert_eq!(day("2024-06-15").add_days(0), day("2024-06-15"));
        assert_eq!(day("2024-01-01").add_days(366), day("2025-01-01"));
    }

    #[test]
    fn add_days_is_unaffected_by_daylight_saving_transitions() {
        // US spring-forward and fall-back weekends.
        assert_eq!(day("2024-03-09").add_days(1), day("2024-03-10"));
        assert_eq!(day("2024-03-10").add_days(1), day("2024-03-11"));
        assert_eq!(day("2024-11-02").add_days(2), day("2024-11-04"));
        assert_eq!(day("2024-03-31").add_days(-7), day("2024-03-24"));
    }

    #[test]
    fn add_days_saturates_instead_of_panicking() {
        assert_eq!(day("2024-01-01").add_days(i64::MAX).date(), NaiveDate::MAX);
        assert_eq!(day("2024-01-01").add_days(i64::MIN).date(), NaiveDate::MIN);
    }

    #[test]
    fn identifiers_sort_lexicographically_in_chronological_order() {
        let mut days = vec![day("2024-10-02"), day("2023-12-31"), day("2024-02-09")];
        let mut strings: Vec<String> = days.iter().map(ToString::to_string).collect();
        days.sort();
        strings.sort();
        let sorted: Vec<String> = days.iter().map(ToString::to_string).collect();
        assert_eq!(sorted, strings);
    }

    #[test]
    fn same_local_day_normalizes_to_same_identifier() {
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let early = tz.with_ymd_and_hms(2024, 5, 1, 0, 30, 0).unwrap();
        let late = tz.with_ymd_and_hms(2024, 5, 1, 23, 30, 0).unwrap();
        assert_eq!(DayId::from_datetime(&early), DayId::from_datetime(&late));
        // The late instant is already May 2nd in UTC.
        assert_eq!(
            DayId::from_datetime(&late.with_timezone(&Utc)),
            day("2024-05-02")
        );
        assert_eq!(DayId::from_datetime(&late), day("2024-05-01"));
    }

    #[test]
    fn days_until_is_signed() {
        assert_eq!(day("2024-01-01").days_until(day("2024-01-04")), 3);
        assert_eq!(day("2024-01-04").days_until(day("2024-01-01")), -3);
    }

    #[test]
    fn serde_uses_plain_strings() {
        let json = serde_json::to_string(&day("2024-07-04")).unwrap();
        assert_eq!(json, "\"2024-07-04\"");
        let back: DayId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, day("2024-07-04"));
        assert!(serde_json::from_str::<DayId>("\"07/04/2024\"").is_err());
    }

    #[test]
    fn week_starts_on_sunday() {
        // 2024-05-15 is a Wednesday.
        let week = DateRange::week_of(day("2024-05-15"));
        assert_eq!(week.start, day("2024-05-12"));
        assert_eq!(week.end, day("2024-05-18"));
        assert_eq!(week.days().count(), 7);
    }

    #[test]
    fn month_range_covers_leap_february() {
        let month = DateRange::month_of(day("2024-02-10"));
        assert_eq!(month.start, day("2024-02-01"));
        assert_eq!(month.end, day("2024-02-29"));
        assert_eq!(month.len_days(), 29);
        assert!(month.contains(day("2024-02-29")));
        assert!(!month.contains(day("2024-03-01")));
    }

    #[test]
    fn calendar_view_steps() {
        assert_eq!(
            CalendarView::Month.step(day("2024-01-31"), 1),
            day("2024-02-29")
        );
        assert_eq!(
            CalendarView::Month.step(day("2024-01-15"), -1),
            day("2023-12-15")
        );
        assert_eq!(
            CalendarView::Week.step(day("2024-01-15"), 1),
            day("2024-01-22")
        );
        assert_eq!(
            CalendarView::Day.step(day("2024-01-01"), -1),
            day("2023-12-31")
        );
    }

    #[test]
    fn shifting_ranges_moves_by_whole_views() {
        let january = DateRange::month_of(day("2024-01-10"));
        let february = january.shift(CalendarView::Month, 1);
        assert_eq!(february.end, day("2024-02-29"));

        let week = DateRange::week_of(day("2024-01-03"));
        let previous = week.shift(CalendarView::Week, -1);
        assert_eq!(previous.start, day("2023-12-24"));
        assert_eq!(previous.end, day("2023-12-30"));
    }

    #[test]
    fn range_new_orders_bounds() {
        let range = DateRange::new(day("2024-02-01"), day("2024-01-01"));
        assert_eq!(range.start, day("2024-01-01"));
        assert_eq!(range.end, day("2024-02-01"));
    }

    #[test]
    fn fixed_clock_reports_its_day() {
        let clock = Clock::fixed(day("2024-04-01"));
        assert_eq!(clock.today(), day("2024-04-01"));
    }
}
