use std::collections::HashMap;

use chrono::NaiveDate;

use super::DayCell;

/// Number of schedules shown individually in a day cell before the rest are
/// collapsed into a count.
pub const PREVIEW_LIMIT: usize = 3;

/// Anything that sits on a single calendar day.
pub trait Dated {
    fn date(&self) -> NaiveDate;
}

/// Groups `schedules` under each of `dates`. Buckets keep the input order of
/// `schedules`; a `None` slot gets an empty bucket.
pub fn bucket_by_day<'a, S: Dated>(
    dates: &[Option<NaiveDate>],
    schedules: &'a [S],
) -> Vec<Vec<&'a S>> {
    let by_day = index_by_day(schedules);

    dates
        .iter()
        .map(|date| {
            date.and_then(|date| by_day.get(&date).cloned())
                .unwrap_or_default()
        })
        .collect()
}

/// Fills each cell of a grid with the schedules falling on its date.
pub fn bucket_schedules<S: Dated + Clone>(grid: Vec<DayCell<S>>, schedules: &[S]) -> Vec<DayCell<S>> {
    let by_day = index_by_day(schedules);

    grid.into_iter()
        .map(|mut cell| {
            cell.schedules = by_day
                .get(&cell.date)
                .map(|found| found.iter().map(|s| (*s).clone()).collect())
                .unwrap_or_default();
            cell
        })
        .collect()
}

fn index_by_day<S: Dated>(schedules: &[S]) -> HashMap<NaiveDate, Vec<&S>> {
    let mut by_day: HashMap<NaiveDate, Vec<&S>> = HashMap::new();
    for schedule in schedules {
        by_day.entry(schedule.date()).or_default().push(schedule);
    }
    by_day
}

/// What a day cell shows: the first few schedules and how many were left out.
#[derive(Debug, PartialEq, Eq)]
pub struct DayPreview<'a, S> {
    pub shown: &'a [S],
    pub hidden_count: usize,
}

impl<S> DayCell<S> {
    pub fn preview(&self) -> DayPreview<'_, S> {
        let shown = self.schedules.len().min(PREVIEW_LIMIT);
        DayPreview {
            shown: &self.schedules[..shown],
            hidden_count: self.schedules.len() - shown,
        }
    }
}
