//! The calendar-month partition key that user data collections are sharded by.
//!
//! Every stored record lives under a path segment identifying the calendar
//! month of its date, so a single read never pulls more than a month's worth
//! of data. [MonthKey] is the only place the textual form of that segment
//! exists; everything else passes the value around.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use time::{
    Date, Month, OffsetDateTime,
    format_description::{BorrowedFormatItem, well_known::Rfc3339},
    macros::format_description,
};

use crate::Error;

/// The earliest year a month key may refer to.
pub const MIN_YEAR: i32 = 1900;

/// The latest year a month key may refer to.
pub const MAX_YEAR: i32 = 2100;

const PLAIN_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// A calendar month, used to address one partition of a user's data.
///
/// The canonical textual form is two-digit month, underscore, four-digit
/// year, e.g. `04_2025`. Parsing also accepts the slash-separated form
/// (`04/2025`) that older clients wrote.
///
/// Keys order chronologically, so a sorted collection of keys reads oldest
/// to newest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    year: i32,
    month: u8,
}

impl MonthKey {
    /// Create a key from a month number and year.
    ///
    /// # Errors
    /// Returns [Error::InvalidKey] if the month is outside [1, 12] or the
    /// year is outside [[MIN_YEAR], [MAX_YEAR]].
    pub fn new(month: u8, year: i32) -> Result<Self, Error> {
        if !(1..=12).contains(&month) || !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(Error::InvalidKey(format!("{month:02}_{year:04}")));
        }

        Ok(Self { year, month })
    }

    /// The key for the calendar month containing `date`.
    ///
    /// The day is discarded: every date in the same calendar month maps to
    /// the same key.
    pub fn for_date(date: Date) -> Self {
        Self {
            year: date.year(),
            month: u8::from(date.month()),
        }
    }

    /// The key for the calendar month named in `text`.
    ///
    /// Accepts an RFC 3339 timestamp (`2025-04-15T10:00:00Z`) or a plain
    /// `YYYY-MM-DD` date.
    ///
    /// # Errors
    /// Returns [Error::InvalidDate] if `text` cannot be parsed into a valid
    /// calendar date, or if the date falls outside the supported year range.
    pub fn for_date_str(text: &str) -> Result<Self, Error> {
        let date = OffsetDateTime::parse(text, &Rfc3339)
            .map(|datetime| datetime.date())
            .or_else(|_| Date::parse(text, PLAIN_DATE))
            .map_err(|_| Error::InvalidDate(text.to_owned()))?;

        if !(MIN_YEAR..=MAX_YEAR).contains(&date.year()) {
            return Err(Error::InvalidDate(text.to_owned()));
        }

        Ok(Self::for_date(date))
    }

    /// The key for the month containing the current date (UTC).
    pub fn current() -> Self {
        Self::for_date(OffsetDateTime::now_utc().date())
    }

    /// The key for the month after this one.
    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// The key for the month before this one.
    pub fn prev(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// Whether `date` falls in the calendar month this key identifies.
    pub fn contains(&self, date: Date) -> bool {
        Self::for_date(date) == *self
    }

    /// The `n` keys ending at the current month, oldest first.
    ///
    /// This is the candidate list for bounded scans over recent partitions.
    pub fn trailing(n: usize) -> Vec<Self> {
        let mut keys = Vec::with_capacity(n);
        let mut key = Self::current();

        for _ in 0..n {
            keys.push(key);
            key = key.prev();
        }

        keys.reverse();
        keys
    }

    /// The month component, in [1, 12].
    pub fn month(&self) -> u8 {
        self.month
    }

    /// The year component.
    pub fn year(&self) -> i32 {
        self.year
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}_{:04}", self.month, self.year)
    }
}

impl FromStr for MonthKey {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let separator = if text.contains('_') { '_' } else { '/' };
        let parts: Vec<&str> = text.split(separator).collect();

        let [month, year] = parts[..] else {
            return Err(Error::InvalidKey(text.to_owned()));
        };

        let month: u8 = month.parse().map_err(|_| Error::InvalidKey(text.to_owned()))?;
        let year: i32 = year.parse().map_err(|_| Error::InvalidKey(text.to_owned()))?;

        Self::new(month, year).map_err(|_| Error::InvalidKey(text.to_owned()))
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;

        text.parse().map_err(de::Error::custom)
    }
}

/// Every month key from the month containing `start` through the month
/// containing `end`, inclusive, in chronological order with no duplicates.
///
/// The result always has at least one key for valid input: a range within a
/// single month yields exactly that month's key.
///
/// # Errors
/// Returns [Error::InvalidRange] if `start` is strictly after `end`.
pub fn keys_in_range(start: Date, end: Date) -> Result<Vec<MonthKey>, Error> {
    if start > end {
        return Err(Error::InvalidRange { start, end });
    }

    let last = MonthKey::for_date(end);
    let mut keys = Vec::new();
    let mut cursor = MonthKey::for_date(start);

    loop {
        keys.push(cursor);

        if cursor == last {
            break;
        }

        cursor = cursor.next();
    }

    Ok(keys)
}

/// The bounded window treated as "all of a user's data": the first of the
/// month five years back through the first of the month one year forward
/// from the current date.
pub fn all_data_window() -> (Date, Date) {
    let today = OffsetDateTime::now_utc().date();
    let start = Date::from_calendar_date(today.year() - 5, today.month(), 1)
        .expect("the first of the month is always a valid date");
    let end = Date::from_calendar_date(today.year() + 1, today.month(), 1)
        .expect("the first of the month is always a valid date");

    (start, end)
}

#[cfg(test)]
mod month_key_tests {
    use time::macros::date;

    use crate::Error;

    use super::{MonthKey, keys_in_range};

    #[test]
    fn dates_in_same_month_share_a_key() {
        assert_eq!(
            MonthKey::for_date(date!(2025 - 04 - 01)),
            MonthKey::for_date(date!(2025 - 04 - 30)),
        );
    }

    #[test]
    fn dates_in_different_months_get_different_keys() {
        assert_ne!(
            MonthKey::for_date(date!(2025 - 04 - 30)),
            MonthKey::for_date(date!(2025 - 05 - 01)),
        );
        // Same month number in a different year must not collide either.
        assert_ne!(
            MonthKey::for_date(date!(2024 - 04 - 15)),
            MonthKey::for_date(date!(2025 - 04 - 15)),
        );
    }

    #[test]
    fn key_displays_as_padded_month_underscore_year() {
        let key = MonthKey::for_date(date!(2025 - 04 - 15));

        assert_eq!(key.to_string(), "04_2025");
    }

    #[test]
    fn key_derives_from_rfc3339_string() {
        let key = MonthKey::for_date_str("2025-04-15T10:00:00Z").unwrap();

        assert_eq!(key.to_string(), "04_2025");
    }

    #[test]
    fn key_derives_from_plain_date_string() {
        let key = MonthKey::for_date_str("2025-04-15").unwrap();

        assert_eq!(key.to_string(), "04_2025");
    }

    #[test]
    fn unparseable_date_string_is_rejected() {
        let result = MonthKey::for_date_str("the ides of march");

        assert_eq!(
            result,
            Err(Error::InvalidDate("the ides of march".to_owned()))
        );
    }

    #[test]
    fn date_outside_supported_years_is_rejected() {
        let result = MonthKey::for_date_str("1850-01-01");

        assert_eq!(result, Err(Error::InvalidDate("1850-01-01".to_owned())));
    }

    #[test]
    fn parse_round_trips_display() {
        let key = MonthKey::for_date(date!(2025 - 04 - 15));

        let parsed: MonthKey = key.to_string().parse().unwrap();

        assert_eq!(parsed, key);
        assert_eq!(parsed.month(), 4);
        assert_eq!(parsed.year(), 2025);
    }

    #[test]
    fn parse_accepts_legacy_slash_separator() {
        let parsed: MonthKey = "04/2025".parse().unwrap();

        assert_eq!(parsed, MonthKey::new(4, 2025).unwrap());
    }

    #[test]
    fn parse_rejects_month_out_of_range() {
        let result = "13_2025".parse::<MonthKey>();

        assert_eq!(result, Err(Error::InvalidKey("13_2025".to_owned())));

        let result = "00_2025".parse::<MonthKey>();

        assert_eq!(result, Err(Error::InvalidKey("00_2025".to_owned())));
    }

    #[test]
    fn parse_rejects_year_out_of_range() {
        assert_eq!(
            "04_1899".parse::<MonthKey>(),
            Err(Error::InvalidKey("04_1899".to_owned()))
        );
        assert_eq!(
            "04_2101".parse::<MonthKey>(),
            Err(Error::InvalidKey("04_2101".to_owned()))
        );
    }

    #[test]
    fn parse_rejects_malformed_keys() {
        for key in ["", "042025", "04_2025_01", "april_2025", "04_"] {
            assert_eq!(
                key.parse::<MonthKey>(),
                Err(Error::InvalidKey(key.to_owned())),
                "expected {key:?} to be rejected",
            );
        }
    }

    #[test]
    fn contains_matches_only_the_keyed_month() {
        let key: MonthKey = "04_2025".parse().unwrap();

        assert!(key.contains(date!(2025 - 04 - 01)));
        assert!(key.contains(date!(2025 - 04 - 30)));
        assert!(!key.contains(date!(2025 - 05 - 01)));
        assert!(!key.contains(date!(2024 - 04 - 15)));
    }

    #[test]
    fn neighbor_keys_wrap_at_year_boundaries() {
        let december = MonthKey::new(12, 2024).unwrap();
        let january = MonthKey::new(1, 2025).unwrap();

        assert_eq!(december.next(), january);
        assert_eq!(january.prev(), december);
    }

    #[test]
    fn keys_order_chronologically() {
        assert!(MonthKey::new(12, 2024).unwrap() < MonthKey::new(1, 2025).unwrap());
        assert!(MonthKey::new(4, 2025).unwrap() < MonthKey::new(5, 2025).unwrap());
    }

    #[test]
    fn single_day_range_yields_one_key() {
        let day = date!(2025 - 04 - 15);

        let keys = keys_in_range(day, day).unwrap();

        assert_eq!(keys, vec![MonthKey::for_date(day)]);
    }

    #[test]
    fn year_spanning_range_yields_thirteen_ordered_keys() {
        let keys = keys_in_range(date!(2024 - 01 - 15), date!(2025 - 01 - 15)).unwrap();

        assert_eq!(keys.len(), 13);
        assert_eq!(keys.first().unwrap().to_string(), "01_2024");
        assert_eq!(keys.last().unwrap().to_string(), "01_2025");
        assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let start = date!(2025 - 04 - 15);
        let end = date!(2025 - 04 - 14);

        let result = keys_in_range(start, end);

        assert_eq!(result, Err(Error::InvalidRange { start, end }));
    }

    #[test]
    fn trailing_keys_end_at_the_current_month() {
        let keys = MonthKey::trailing(12);

        assert_eq!(keys.len(), 12);
        assert_eq!(*keys.last().unwrap(), MonthKey::current());
        assert!(keys.windows(2).all(|pair| pair[0].next() == pair[1]));
    }

    #[test]
    fn serializes_as_canonical_string() {
        let key = MonthKey::new(4, 2025).unwrap();

        assert_eq!(serde_json::to_string(&key).unwrap(), "\"04_2025\"");

        let round_tripped: MonthKey = serde_json::from_str("\"04_2025\"").unwrap();

        assert_eq!(round_tripped, key);
    }
}
