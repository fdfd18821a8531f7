//! Month grids, day bucketing and the date/time helpers behind them.
//!
//! Everything here is pure: the caller supplies "today" and the selected day
//! through [`ViewState`], so the same inputs always produce the same grid.

pub mod bucket;
pub mod format;
pub mod grid;
pub mod time;

use chrono::{Datelike, Local, NaiveDate};
use serde::Serialize;

pub use bucket::{DayPreview, Dated, PREVIEW_LIMIT, bucket_by_day, bucket_schedules};
pub use format::{DisplayLocale, format_display_date, format_display_time, format_long_date, format_month_title};
pub use grid::{build_month_grid, first_of_month, month_grid_dates, normalize_month, padded_month_days};
pub use time::{TimeError, TimeRange, TimeValue, is_upcoming, parse_date, validate_time_range};

/// One slot of a month grid.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayCell<S> {
    pub date: NaiveDate,
    pub is_current_month: bool,
    pub is_today: bool,
    pub is_selected: bool,
    pub schedules: Vec<S>,
}

/// Render-time state that used to live in UI globals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewState {
    pub today: NaiveDate,
    pub selected: Option<NaiveDate>,
}

impl ViewState {
    pub fn new(today: NaiveDate) -> Self {
        Self { today, selected: None }
    }

    pub fn with_selected(mut self, selected: Option<NaiveDate>) -> Self {
        self.selected = selected;
        self
    }
}

/// Process-local calendar date.
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Calendar-day equality on `(year, month, day)`, whatever the time parts or
/// offsets of the inputs.
pub fn is_same_day<A: Datelike, B: Datelike>(a: &A, b: &B) -> bool {
    a.year() == b.year() && a.month() == b.month() && a.day() == b.day()
}

pub fn is_today<D: Datelike>(date: &D, today: &NaiveDate) -> bool {
    is_same_day(date, today)
}

pub fn is_selected<D: Datelike>(date: &D, selected: Option<&NaiveDate>) -> bool {
    selected.is_some_and(|selected| is_same_day(date, selected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone, Utc};

    #[test]
    fn same_day_is_reflexive_and_symmetric() {
        let a = NaiveDate::from_ymd_opt(2025, 9, 16).unwrap();
        let b = a.and_hms_opt(23, 59, 59).unwrap();
        let c = NaiveDate::from_ymd_opt(2025, 9, 17).unwrap();

        assert!(is_same_day(&a, &a));
        assert!(is_same_day(&a, &b));
        assert!(is_same_day(&b, &a));
        assert!(!is_same_day(&a, &c));
        assert!(!is_same_day(&c, &a));
    }

    #[test]
    fn same_day_uses_local_fields_of_each_value() {
        let jakarta = FixedOffset::east_opt(7 * 3600).unwrap();
        // 2025-09-16 01:00 in Jakarta is still 2025-09-15 in UTC
        let local = jakarta.with_ymd_and_hms(2025, 9, 16, 1, 0, 0).unwrap();
        let utc = Utc.with_ymd_and_hms(2025, 9, 15, 18, 0, 0).unwrap();
        let day = NaiveDate::from_ymd_opt(2025, 9, 16).unwrap();

        assert!(is_same_day(&local, &day));
        assert!(!is_same_day(&utc, &day));
    }

    #[test]
    fn selection_requires_a_selected_day() {
        let day = NaiveDate::from_ymd_opt(2025, 9, 16).unwrap();
        assert!(!is_selected(&day, None));
        assert!(is_selected(&day, Some(&day)));
        assert!(is_today(&day, &day));
    }
}
