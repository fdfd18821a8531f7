use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

const BARE_TIME_FORMATS: [&str; 2] = ["%H:%M:%S%.f", "%H:%M"];

const DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeError {
    #[error("invalid time '{0}', expected HH:MM, HH:MM:SS or a full date-time")]
    InvalidTime(String),

    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("End time must be after start time")]
    EndNotAfterStart,

    #[error("time '{value}' falls on {found}, but the schedule date is {expected}")]
    DateMismatch {
        value: String,
        found: NaiveDate,
        expected: NaiveDate,
    },
}

/// A time as it arrives on the wire: either a bare time of day or a full
/// date-time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeValue {
    Bare(NaiveTime),
    Stamp(NaiveDateTime),
}

impl TimeValue {
    /// Offsets on ISO-8601 stamps are dropped; the wall-clock time as written
    /// is kept.
    pub fn parse(raw: &str) -> Result<Self, TimeError> {
        let raw = raw.trim();

        if let Some(time) = parse_bare_time(raw) {
            return Ok(TimeValue::Bare(time));
        }
        if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
            return Ok(TimeValue::Stamp(stamp.naive_local()));
        }
        DATE_TIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(TimeValue::Stamp)
            .ok_or_else(|| TimeError::InvalidTime(raw.to_string()))
    }

    pub fn time(&self) -> NaiveTime {
        match self {
            TimeValue::Bare(time) => *time,
            TimeValue::Stamp(stamp) => stamp.time(),
        }
    }

    /// Pins the value to `date`. A full date-time on another day is rejected
    /// rather than silently moved.
    pub fn on_date(self, date: NaiveDate, raw: &str) -> Result<NaiveTime, TimeError> {
        match self {
            TimeValue::Bare(time) => Ok(time),
            TimeValue::Stamp(stamp) if stamp.date() == date => Ok(stamp.time()),
            TimeValue::Stamp(stamp) => Err(TimeError::DateMismatch {
                value: raw.trim().to_string(),
                found: stamp.date(),
                expected: date,
            }),
        }
    }
}

fn parse_bare_time(raw: &str) -> Option<NaiveTime> {
    BARE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(raw, fmt).ok())
}

/// Accepts `YYYY-MM-DD`, or a full date-time whose date part is taken.
pub fn parse_date(raw: &str) -> Result<NaiveDate, TimeError> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    match TimeValue::parse(raw) {
        Ok(TimeValue::Stamp(stamp)) => Ok(stamp.date()),
        _ => Err(TimeError::InvalidDate(raw.to_string())),
    }
}

/// True when `end` is strictly after `start`.
///
/// Two full date-times compare as instants; any other pairing is reduced to
/// time of day first. Unparsable input is never valid.
pub fn validate_time_range(start: &str, end: &str) -> bool {
    match (TimeValue::parse(start), TimeValue::parse(end)) {
        (Ok(TimeValue::Stamp(start)), Ok(TimeValue::Stamp(end))) => end > start,
        (Ok(start), Ok(end)) => end.time() > start.time(),
        _ => false,
    }
}

/// Canonical start/end pair of a schedule on its date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeRange {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, TimeError> {
        if end <= start {
            return Err(TimeError::EndNotAfterStart);
        }
        Ok(Self { start, end })
    }

    /// Normalizes raw wire values for a schedule on `date`.
    pub fn resolve(date: NaiveDate, start: &str, end: &str) -> Result<Self, TimeError> {
        let start_time = TimeValue::parse(start)?.on_date(date, start)?;
        let end_time = TimeValue::parse(end)?.on_date(date, end)?;
        Self::new(start_time, end_time)
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// Whether a schedule starting at `start` on `date` is still ahead of `now`.
pub fn is_upcoming(date: NaiveDate, start: NaiveTime, now: NaiveDateTime) -> bool {
    date.and_time(start) > now
}
