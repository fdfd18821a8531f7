use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::calendar::{
    DayCell, DisplayLocale, ViewState, bucket_schedules, build_month_grid, first_of_month,
    format_long_date, format_month_title, is_same_day, is_upcoming,
};
use crate::db::repository::{self, ScheduleFilter};
use crate::error::AppError;
use crate::models::{ClassSummary, ClassWithCount, Schedule, ScheduleType};

/// How many upcoming schedules the dashboard lists.
pub const UPCOMING_LIMIT: usize = 3;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarView {
    pub class: ClassSummary,
    pub year: i32,
    /// Zero-based, like the request parameter.
    pub month: u32,
    pub title: String,
    pub weekdays: [&'static str; 7],
    pub days: Vec<DayView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayView {
    pub date: NaiveDate,
    pub is_current_month: bool,
    pub is_today: bool,
    pub is_selected: bool,
    pub schedules: Vec<ScheduleChip>,
    pub hidden_count: usize,
    pub total: usize,
}

/// Compact form of a schedule inside a day cell.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleChip {
    pub id: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub schedule_type: ScheduleType,
    pub label: &'static str,
    pub color: &'static str,
    pub start_time: String,
}

impl ScheduleChip {
    fn new(schedule: &Schedule, locale: DisplayLocale) -> Self {
        Self {
            id: schedule.id,
            title: schedule.title.clone(),
            schedule_type: schedule.schedule_type,
            label: schedule.schedule_type.label(locale),
            color: schedule.schedule_type.color(),
            start_time: hours_minutes(schedule.start_time),
        }
    }
}

impl DayView {
    fn from_cell(cell: &DayCell<Schedule>, locale: DisplayLocale) -> Self {
        let preview = cell.preview();
        Self {
            date: cell.date,
            is_current_month: cell.is_current_month,
            is_today: cell.is_today,
            is_selected: cell.is_selected,
            schedules: preview
                .shown
                .iter()
                .map(|s| ScheduleChip::new(s, locale))
                .collect(),
            hidden_count: preview.hidden_count,
            total: cell.schedules.len(),
        }
    }
}

/// Builds the month view from already-fetched schedules sorted by
/// `(date, start_time)`.
pub fn build_calendar_view(
    class: ClassSummary,
    year: i32,
    month: i32,
    view: &ViewState,
    schedules: &[Schedule],
    locale: DisplayLocale,
) -> CalendarView {
    let first = first_of_month(year, month);
    let grid = bucket_schedules(build_month_grid(year, month, view), schedules);

    CalendarView {
        class,
        year: first.year(),
        month: first.month0(),
        title: format_month_title(first, locale),
        weekdays: locale.weekday_headers(),
        days: grid.iter().map(|cell| DayView::from_cell(cell, locale)).collect(),
    }
}

pub async fn month_view(
    db: &SqlitePool,
    class_id: i64,
    year: i32,
    month: i32,
    view: ViewState,
    locale: DisplayLocale,
) -> Result<CalendarView, AppError> {
    let class = repository::find_class_by_id(db, class_id)
        .await?
        .ok_or(AppError::NotFound("Class not found"))?;

    // only the grid's own span is needed, leading and trailing days included
    let dates = crate::calendar::month_grid_dates(year, month);
    let filter = ScheduleFilter {
        class_id: Some(class_id),
        start_date: dates.first().copied(),
        end_date: dates.last().copied(),
    };
    let schedules: Vec<Schedule> = repository::fetch_schedules(db, &filter)
        .await?
        .into_iter()
        .map(|detail| detail.schedule)
        .collect();

    Ok(build_calendar_view(
        ClassSummary::from(&class),
        year,
        month,
        &view,
        &schedules,
        locale,
    ))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub class: ClassWithCount,
    pub today_label: String,
    pub today: Vec<AgendaItem>,
    pub upcoming: Vec<AgendaItem>,
    pub stats: Vec<TypeCount>,
}

/// How many schedules of one type the class has, past ones included.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeCount {
    #[serde(rename = "type")]
    pub schedule_type: ScheduleType,
    pub label: &'static str,
    pub color: &'static str,
    pub count: i64,
}

/// One entry per type, zero-filled, in `ScheduleType::ALL` order.
fn type_counts(counts: &[(ScheduleType, i64)], locale: DisplayLocale) -> Vec<TypeCount> {
    ScheduleType::ALL
        .into_iter()
        .map(|kind| TypeCount {
            schedule_type: kind,
            label: kind.label(locale),
            color: kind.color(),
            count: counts
                .iter()
                .filter(|(found, _)| *found == kind)
                .map(|(_, n)| *n)
                .sum(),
        })
        .collect()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgendaItem {
    #[serde(flatten)]
    pub schedule: Schedule,
    pub label: &'static str,
    pub color: &'static str,
    pub date_label: String,
    pub time_label: String,
}

impl AgendaItem {
    fn new(schedule: &Schedule, locale: DisplayLocale) -> Self {
        Self {
            schedule: schedule.clone(),
            label: schedule.schedule_type.label(locale),
            color: schedule.schedule_type.color(),
            date_label: format_long_date(schedule.date, locale),
            time_label: format!(
                "{} - {}",
                hours_minutes(schedule.start_time),
                hours_minutes(schedule.end_time)
            ),
        }
    }
}

/// Today's agenda, the next few schedules that have not started yet and the
/// per-type totals. `schedules` must be sorted by `(date, start_time)`;
/// `counts` covers the whole class, not just `schedules`.
pub fn build_dashboard(
    class: ClassWithCount,
    schedules: &[Schedule],
    counts: &[(ScheduleType, i64)],
    now: NaiveDateTime,
    locale: DisplayLocale,
) -> Dashboard {
    let today = now.date();

    Dashboard {
        class,
        today_label: format_long_date(today, locale),
        today: schedules
            .iter()
            .filter(|s| is_same_day(&s.date, &today))
            .map(|s| AgendaItem::new(s, locale))
            .collect(),
        upcoming: schedules
            .iter()
            .filter(|s| is_upcoming(s.date, s.start_time, now))
            .take(UPCOMING_LIMIT)
            .map(|s| AgendaItem::new(s, locale))
            .collect(),
        stats: type_counts(counts, locale),
    }
}

pub async fn dashboard(
    db: &SqlitePool,
    class_id: i64,
    now: NaiveDateTime,
    locale: DisplayLocale,
) -> Result<Dashboard, AppError> {
    let class = repository::find_class_with_count(db, class_id)
        .await?
        .ok_or(AppError::NotFound("Class not found"))?;

    let filter = ScheduleFilter {
        class_id: Some(class_id),
        start_date: Some(now.date()),
        end_date: None,
    };
    let schedules: Vec<Schedule> = repository::fetch_schedules(db, &filter)
        .await?
        .into_iter()
        .map(|detail| detail.schedule)
        .collect();
    let counts = repository::count_schedules_by_type(db, class_id).await?;

    Ok(build_dashboard(class, &schedules, &counts, now, locale))
}

fn hours_minutes(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}
