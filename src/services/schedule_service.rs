//! The one write path for schedules. Both `/classes/{id}/schedules` and
//! `/schedules` funnel through here, so every stored schedule has the same
//! canonical date and time representation.

use sqlx::SqlitePool;
use tracing::{debug, info};

use super::{normalize_text, parse_id};
use crate::calendar::{TimeRange, TimeValue, parse_date};
use crate::db::repository;
use crate::error::AppError;
use crate::models::{
    IdInput, NewScheduleRequest, Schedule, ScheduleDetail, ScheduleInput, ScheduleType,
    UpdateScheduleRequest,
};

const REQUIRED_FIELDS: &str = "Title, type, date, start time, and end time are required";

/// Checks a create request and converts it to canonical form.
pub fn validate_new(class_id: i64, req: NewScheduleRequest) -> Result<ScheduleInput, AppError> {
    let (Some(title), Some(kind), Some(date), Some(start), Some(end)) = (
        normalize_text(req.title),
        normalize_text(req.schedule_type),
        normalize_text(req.date),
        normalize_text(req.start_time),
        normalize_text(req.end_time),
    ) else {
        return Err(AppError::Validation(REQUIRED_FIELDS.to_string()));
    };

    let schedule_type = kind.parse::<ScheduleType>().map_err(AppError::Validation)?;
    let date = parse_date(&date)?;
    let range = TimeRange::resolve(date, &start, &end)?;

    Ok(ScheduleInput {
        class_id,
        title,
        schedule_type,
        date,
        range,
        room: normalize_text(req.room),
        lecturer: normalize_text(req.lecturer),
        description: normalize_text(req.description),
        material_url: checked_url("materialUrl", req.material_url)?,
        submission_link: checked_url("submissionLink", req.submission_link)?,
    })
}

/// Applies a partial update on top of the stored schedule and re-checks the
/// merged time range.
pub fn merge_update(existing: &Schedule, req: UpdateScheduleRequest) -> Result<ScheduleInput, AppError> {
    let title = normalize_text(req.title).unwrap_or_else(|| existing.title.clone());

    let schedule_type = match normalize_text(req.schedule_type) {
        Some(kind) => kind.parse::<ScheduleType>().map_err(AppError::Validation)?,
        None => existing.schedule_type,
    };

    let date = match normalize_text(req.date) {
        Some(raw) => parse_date(&raw)?,
        None => existing.date,
    };

    let start = match normalize_text(req.start_time) {
        Some(raw) => TimeValue::parse(&raw)?.on_date(date, &raw)?,
        None => existing.start_time,
    };
    let end = match normalize_text(req.end_time) {
        Some(raw) => TimeValue::parse(&raw)?.on_date(date, &raw)?,
        None => existing.end_time,
    };
    let range = TimeRange::new(start, end)?;

    let material_url = match req.material_url {
        Some(value) => checked_url("materialUrl", value)?,
        None => existing.material_url.clone(),
    };
    let submission_link = match req.submission_link {
        Some(value) => checked_url("submissionLink", value)?,
        None => existing.submission_link.clone(),
    };

    Ok(ScheduleInput {
        class_id: existing.class_id,
        title,
        schedule_type,
        date,
        range,
        room: keep_or_replace(req.room, &existing.room),
        lecturer: keep_or_replace(req.lecturer, &existing.lecturer),
        description: keep_or_replace(req.description, &existing.description),
        material_url,
        submission_link,
    })
}

/// Class id carried in the body of `POST /schedules`.
pub fn class_id_from_body(class_id: Option<&IdInput>) -> Result<i64, AppError> {
    match class_id {
        None => Err(AppError::Validation("Class ID is required".to_string())),
        Some(IdInput::Number(id)) if *id > 0 => Ok(*id),
        Some(IdInput::Number(_)) => Err(AppError::Validation("Invalid class ID".to_string())),
        Some(IdInput::Text(raw)) => parse_id(raw, "class"),
    }
}

pub async fn create_schedule(
    db: &SqlitePool,
    class_id: i64,
    req: NewScheduleRequest,
) -> Result<ScheduleDetail, AppError> {
    let input = validate_new(class_id, req)?;

    let mut tx = db.begin().await?;
    if repository::find_class_by_id(&mut *tx, class_id).await?.is_none() {
        return Err(AppError::NotFound("Class not found"));
    }

    let id = repository::insert_schedule(&mut *tx, &input).await?;
    let created = repository::find_schedule_by_id(&mut *tx, id)
        .await?
        .ok_or(AppError::Internal("created schedule missing after insert"))?;
    tx.commit().await?;

    info!(
        "created schedule {} ({} {}) for class {}",
        id, created.schedule.schedule_type, created.schedule.date, class_id
    );
    Ok(created)
}

/// No optimistic locking: concurrent updates of one schedule are
/// last-writer-wins.
pub async fn update_schedule(
    db: &SqlitePool,
    id: i64,
    req: UpdateScheduleRequest,
) -> Result<ScheduleDetail, AppError> {
    let mut tx = db.begin().await?;

    let existing = repository::find_schedule_by_id(&mut *tx, id)
        .await?
        .ok_or(AppError::NotFound("Schedule not found"))?;

    let input = merge_update(&existing.schedule, req)?;
    debug!("updating schedule {}: {:?}", id, input);

    repository::update_schedule(&mut *tx, id, &input).await?;
    let updated = repository::find_schedule_by_id(&mut *tx, id)
        .await?
        .ok_or(AppError::Internal("updated schedule missing after write"))?;

    tx.commit().await?;
    Ok(updated)
}

pub async fn delete_schedule(db: &SqlitePool, id: i64) -> Result<(), AppError> {
    if repository::delete_schedule(db, id).await? {
        info!("deleted schedule {}", id);
        Ok(())
    } else {
        Err(AppError::NotFound("Schedule not found"))
    }
}

fn keep_or_replace(update: Option<Option<String>>, current: &Option<String>) -> Option<String> {
    match update {
        Some(value) => normalize_text(value),
        None => current.clone(),
    }
}

fn checked_url(field: &str, value: Option<String>) -> Result<Option<String>, AppError> {
    let Some(url) = normalize_text(value) else {
        return Ok(None);
    };
    let lower = url.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        Ok(Some(url))
    } else {
        Err(AppError::Validation(format!("{} must be an http(s) URL", field)))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};

    use super::*;

    fn request() -> NewScheduleRequest {
        NewScheduleRequest {
            title: Some("Pertemuan 1".to_string()),
            schedule_type: Some("LECTURE".to_string()),
            date: Some("2025-09-16".to_string()),
            start_time: Some("08:00".to_string()),
            end_time: Some("09:40".to_string()),
            room: Some("  ".to_string()),
            material_url: Some("https://example.com/slides.pdf".to_string()),
            ..NewScheduleRequest::default()
        }
    }

    fn stored() -> Schedule {
        Schedule {
            id: 1,
            class_id: 3,
            title: "Pertemuan 1".to_string(),
            schedule_type: ScheduleType::Lecture,
            date: NaiveDate::from_ymd_opt(2025, 9, 16).unwrap(),
            start_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(9, 40, 0).unwrap(),
            room: Some("R.101".to_string()),
            lecturer: Some("Pak Budi".to_string()),
            description: None,
            material_url: None,
            submission_link: None,
            created_at: "2025-09-01T00:00:00+00:00".to_string(),
            updated_at: "2025-09-01T00:00:00+00:00".to_string(),
        }
    }

    fn validation_message(err: AppError) -> String {
        match err {
            AppError::Validation(msg) => msg,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn validates_and_normalizes_new_schedule() {
        let input = validate_new(3, request()).unwrap();
        assert_eq!(input.class_id, 3);
        assert_eq!(input.schedule_type, ScheduleType::Lecture);
        assert_eq!(input.range.start, NaiveTime::from_hms_opt(8, 0, 0).unwrap());
        assert_eq!(input.room, None);
        assert_eq!(input.material_url.as_deref(), Some("https://example.com/slides.pdf"));
    }

    #[test]
    fn accepts_full_timestamps_on_the_same_day() {
        let mut req = request();
        req.start_time = Some("2025-09-16 08:00:00".to_string());
        req.end_time = Some("2025-09-16T09:40:00.000Z".to_string());
        let input = validate_new(3, req).unwrap();
        assert_eq!(input.range.duration_minutes(), 100);
    }

    #[test]
    fn rejects_missing_fields() {
        let mut req = request();
        req.title = Some("   ".to_string());
        assert_eq!(validation_message(validate_new(1, req).unwrap_err()), REQUIRED_FIELDS);
    }

    #[test]
    fn rejects_unknown_type() {
        let mut req = request();
        req.schedule_type = Some("SEMINAR".to_string());
        let msg = validation_message(validate_new(1, req).unwrap_err());
        assert!(msg.starts_with("Invalid schedule type"));
    }

    #[test]
    fn rejects_inverted_or_empty_ranges() {
        let mut req = request();
        req.start_time = Some("10:00".to_string());
        req.end_time = Some("09:00".to_string());
        assert_eq!(
            validation_message(validate_new(1, req).unwrap_err()),
            "End time must be after start time"
        );

        let mut req = request();
        req.end_time = Some("08:00".to_string());
        assert!(validate_new(1, req).is_err());
    }

    #[test]
    fn rejects_timestamp_on_another_day() {
        let mut req = request();
        req.end_time = Some("2025-09-17T09:00:00Z".to_string());
        let msg = validation_message(validate_new(1, req).unwrap_err());
        assert!(msg.contains("2025-09-17"));
    }

    #[test]
    fn rejects_non_http_links() {
        let mut req = request();
        req.submission_link = Some("ftp://files/tugas".to_string());
        let msg = validation_message(validate_new(1, req).unwrap_err());
        assert_eq!(msg, "submissionLink must be an http(s) URL");
    }

    #[test]
    fn merge_keeps_absent_fields_and_clears_nulls() {
        let req = UpdateScheduleRequest {
            title: Some("".to_string()),
            room: Some(None),
            end_time: Some("10:00".to_string()),
            ..UpdateScheduleRequest::default()
        };
        let merged = merge_update(&stored(), req).unwrap();
        assert_eq!(merged.title, "Pertemuan 1");
        assert_eq!(merged.room, None);
        assert_eq!(merged.lecturer.as_deref(), Some("Pak Budi"));
        assert_eq!(merged.range.end, NaiveTime::from_hms_opt(10, 0, 0).unwrap());
    }

    #[test]
    fn merge_rechecks_range_against_stored_times() {
        let req = UpdateScheduleRequest {
            start_time: Some("09:40".to_string()),
            ..UpdateScheduleRequest::default()
        };
        assert!(merge_update(&stored(), req).is_err());
    }

    #[test]
    fn merge_pins_timestamps_to_new_date() {
        let req = UpdateScheduleRequest {
            date: Some("2025-09-18".to_string()),
            start_time: Some("2025-09-18T13:00:00Z".to_string()),
            end_time: Some("15:00".to_string()),
            ..UpdateScheduleRequest::default()
        };
        let merged = merge_update(&stored(), req).unwrap();
        assert_eq!(merged.date, NaiveDate::from_ymd_opt(2025, 9, 18).unwrap());
        assert_eq!(merged.range.start, NaiveTime::from_hms_opt(13, 0, 0).unwrap());
    }

    #[test]
    fn body_class_id_forms() {
        assert_eq!(class_id_from_body(Some(&IdInput::Number(4))).unwrap(), 4);
        assert_eq!(class_id_from_body(Some(&IdInput::Text("4".to_string()))).unwrap(), 4);
        assert!(class_id_from_body(Some(&IdInput::Number(0))).is_err());
        assert!(class_id_from_body(Some(&IdInput::Text("x".to_string()))).is_err());
        assert!(class_id_from_body(None).is_err());
    }
}
