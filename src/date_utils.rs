use chrono::{Duration, NaiveDate};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a strict `YYYY-MM-DD` date. Signed, short or more-than-four-digit
/// forms that chrono would otherwise accept are rejected.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let well_formed = s.len() == 10
        && s.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return None;
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Whole days from `origin` to `date`; negative when `date` is earlier.
pub fn days_between(origin: NaiveDate, date: NaiveDate) -> i64 {
    (date - origin).num_days()
}

/// Half-open range of calendar days, `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DayRange {
    /// Returns `None` when `end` is before `start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (end >= start).then_some(Self { start, end })
    }

    /// Range covering both `first` and `last` inclusively.
    pub fn covering(first: NaiveDate, last: NaiveDate) -> Self {
        Self {
            start: first,
            end: last + Duration::days(1),
        }
    }

    pub fn len_days(&self) -> i64 {
        days_between(self.start, self.end)
    }
}
