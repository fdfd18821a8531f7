use chrono::{Datelike, Days, NaiveDate};

use super::{DayCell, ViewState, is_selected, is_today};

/// Folds a zero-based month index that may run past either end of the year
/// into a `(year, 1..=12)` pair. `(2025, -1)` is December 2024.
pub fn normalize_month(year: i32, month: i32) -> (i32, u32) {
    let year = year.saturating_add(month.div_euclid(12));
    let month = month.rem_euclid(12) as u32 + 1;
    (year, month)
}

/// First day of the (normalized) month.
pub fn first_of_month(year: i32, month: i32) -> NaiveDate {
    let (year, month) = normalize_month(year, month);
    let year = year.clamp(NaiveDate::MIN.year() + 1, NaiveDate::MAX.year() - 1);
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or_default()
}

pub fn last_of_month(first: NaiveDate) -> NaiveDate {
    first
        .checked_add_months(chrono::Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(first)
}

/// Sunday-first dates covering the whole month: from the Sunday on/before the
/// 1st through the Saturday on/after the last day.
pub fn month_grid_dates(year: i32, month: i32) -> Vec<NaiveDate> {
    let first = first_of_month(year, month);
    let last = last_of_month(first);

    let lead = first.weekday().num_days_from_sunday() as u64;
    let trail = 6 - last.weekday().num_days_from_sunday() as u64;
    let start = first.checked_sub_days(Days::new(lead)).unwrap_or(first);
    let end = last.checked_add_days(Days::new(trail)).unwrap_or(last);

    start.iter_days().take_while(|date| *date <= end).collect()
}

/// Single-month layout: `None` for every weekday slot before the 1st, then
/// each day of the month. Nothing is appended after the last day.
pub fn padded_month_days(year: i32, month: i32) -> Vec<Option<NaiveDate>> {
    let first = first_of_month(year, month);
    let last = last_of_month(first);
    let lead = first.weekday().num_days_from_sunday() as usize;

    std::iter::repeat_n(None, lead)
        .chain(first.iter_days().take_while(|date| *date <= last).map(Some))
        .collect()
}

/// Builds the full-weeks grid for a month with empty buckets. Years outside
/// chrono's range are clamped the same way [`first_of_month`] clamps them.
pub fn build_month_grid<S>(year: i32, month: i32, view: &ViewState) -> Vec<DayCell<S>> {
    let first = first_of_month(year, month);

    month_grid_dates(year, month)
        .into_iter()
        .map(|date| DayCell {
            date,
            is_current_month: date.year() == first.year() && date.month() == first.month(),
            is_today: is_today(&date, &view.today),
            is_selected: is_selected(&date, view.selected.as_ref()),
            schedules: Vec::new(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn normalizes_month_overflow() {
        assert_eq!(normalize_month(2025, -1), (2024, 12));
        assert_eq!(normalize_month(2025, 0), (2025, 1));
        assert_eq!(normalize_month(2025, 12), (2026, 1));
        assert_eq!(normalize_month(2025, -13), (2023, 12));
        assert_eq!(normalize_month(2025, 25), (2027, 2));
    }

    #[test]
    fn grid_covers_every_day_of_month_once() {
        for year in [1999, 2000, 2015, 2024, 2025, 2100] {
            for month in 0..12 {
                let dates = month_grid_dates(year, month);
                assert_eq!(dates.len() % 7, 0, "{year}-{month}");
                assert_eq!(dates.first().unwrap().weekday(), Weekday::Sun);
                assert_eq!(dates.last().unwrap().weekday(), Weekday::Sat);

                let first = first_of_month(year, month);
                let last = last_of_month(first);
                for day in first.iter_days().take_while(|d| *d <= last) {
                    assert_eq!(dates.iter().filter(|d| **d == day).count(), 1);
                }
            }
        }
    }

    #[test]
    fn september_2025_has_five_weeks() {
        let dates = month_grid_dates(2025, 8);
        assert_eq!(dates.len(), 35);
        assert_eq!(dates[0], ymd(2025, 8, 31));
        assert_eq!(dates[34], ymd(2025, 10, 4));
    }

    #[test]
    fn february_starting_on_sunday_fits_four_weeks() {
        let dates = month_grid_dates(2015, 1);
        assert_eq!(dates.len(), 28);
        assert_eq!(dates[0], ymd(2015, 2, 1));
    }

    #[test]
    fn padded_layout_has_leading_placeholders_only() {
        // 1 Oct 2025 is a Wednesday
        let days = padded_month_days(2025, 9);
        assert_eq!(days.len(), 3 + 31);
        assert!(days[..3].iter().all(Option::is_none));
        assert_eq!(days[3], Some(ymd(2025, 10, 1)));
        assert_eq!(days.last().copied().flatten(), Some(ymd(2025, 10, 31)));
    }

    #[test]
    fn grid_flags_month_today_and_selection() {
        let view = ViewState {
            today: ymd(2025, 9, 16),
            selected: Some(ymd(2025, 9, 20)),
        };
        let grid: Vec<DayCell<()>> = build_month_grid(2025, 8, &view);

        assert!(!grid[0].is_current_month);
        assert!(grid[1].is_current_month);
        assert_eq!(grid.iter().filter(|c| c.is_today).count(), 1);
        assert_eq!(grid.iter().filter(|c| c.is_selected).count(), 1);
        let today = grid.iter().find(|c| c.is_today).unwrap();
        assert_eq!(today.date, ymd(2025, 9, 16));
    }

    #[test]
    fn previous_month_navigation_wraps_year() {
        let view = ViewState::new(ymd(2025, 1, 10));
        let grid: Vec<DayCell<()>> = build_month_grid(2025, -1, &view);
        let in_month: Vec<_> = grid.iter().filter(|c| c.is_current_month).collect();
        assert_eq!(in_month.len(), 31);
        assert_eq!(in_month[0].date, ymd(2024, 12, 1));
    }

    #[test]
    fn out_of_range_year_still_marks_its_month() {
        let view = ViewState::new(ymd(2025, 1, 10));
        let first = first_of_month(300_000, 8);
        let grid: Vec<DayCell<()>> = build_month_grid(300_000, 8, &view);

        let in_month: Vec<_> = grid.iter().filter(|c| c.is_current_month).collect();
        assert_eq!(in_month.len() as u32, last_of_month(first).day());
        assert_eq!(in_month[0].date, first);
    }
}
