use chrono::{DateTime, Datelike, FixedOffset, Local, NaiveDate};

use crate::error::UtilError;
use crate::Result;

/// English weekday abbreviations, Monday first (chrono's `num_days_from_monday`).
pub const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

pub const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// A commit timestamp with the timezone offset it was recorded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CommitDate {
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
    /// Minutes east of UTC, `-300` for EST.
    pub tz_offset: i32,
}

impl CommitDate {
    pub fn new(timestamp: i64, tz_offset: i32) -> Self {
        Self {
            timestamp,
            tz_offset,
        }
    }

    /// The current time in the local timezone.
    pub fn now() -> Self {
        let now = Local::now();
        Self::new(now.timestamp(), now.offset().local_minus_utc() / 60)
    }

    /// `None` for offsets chrono cannot represent (a day or more) and for
    /// timestamps out of range.
    pub fn to_datetime(&self) -> Option<DateTime<FixedOffset>> {
        let offset = FixedOffset::east_opt(self.tz_offset.checked_mul(60)?)?;
        Some(DateTime::from_timestamp(self.timestamp, 0)?.with_timezone(&offset))
    }

    /// The day as written in an RPM changelog header, e.g. `Thu Jan 01 1970`,
    /// in the recorded timezone.
    ///
    /// Names come from [`WEEKDAYS`] and [`MONTHS`], so the result does not
    /// depend on the process locale. An unrepresentable offset falls back to
    /// UTC.
    pub fn changelog_day(&self) -> String {
        let day = match self.to_datetime() {
            Some(dt) => dt.date_naive(),
            None => DateTime::from_timestamp(self.timestamp, 0)
                .unwrap_or(DateTime::UNIX_EPOCH)
                .date_naive(),
        };
        format_changelog_day(day)
    }
}

pub fn format_changelog_day(day: NaiveDate) -> String {
    format!(
        "{} {} {:02} {:04}",
        WEEKDAYS[day.weekday().num_days_from_monday() as usize],
        MONTHS[day.month0() as usize],
        day.day(),
        day.year()
    )
}

/// Parse a changelog day such as "Thu Jan 01 1970".
///
/// The weekday must be one of [`WEEKDAYS`] but is not checked against the
/// date; rpm accepts mismatched weekdays with a warning.
pub fn parse_changelog_day(input: &str) -> Result<NaiveDate> {
    let bad = |what: &str| UtilError::DateParse(format!("{what} in '{input}'"));

    let fields: Vec<&str> = input.split_whitespace().collect();
    let [dow, mon, day, year] = fields[..] else {
        return Err(bad("expected '<Dow> <Mon> <DD> <YYYY>'"));
    };
    if !WEEKDAYS.contains(&dow) {
        return Err(bad("unknown weekday"));
    }
    let month = MONTHS
        .iter()
        .position(|m| *m == mon)
        .ok_or_else(|| bad("unknown month"))?;
    let day: u32 = day.parse().map_err(|_| bad("invalid day"))?;
    let year: i32 = year.parse().map_err(|_| bad("invalid year"))?;

    NaiveDate::from_ymd_opt(year, month as u32 + 1, day).ok_or_else(|| bad("no such date"))
}

/// Author or committer identity with timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub name: String,
    pub email: String,
    pub date: CommitDate,
}

impl Signature {
    pub fn new(name: impl Into<String>, email: impl Into<String>, date: CommitDate) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            date,
        }
    }

    /// `Name <email>`, as shown in changelog headers.
    pub fn blurb(&self) -> String {
        format!("{} <{}>", self.name, self.email)
    }
}
