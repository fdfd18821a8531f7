use chrono::{NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, QueryBuilder, Row, Sqlite, SqliteExecutor, SqlitePool};

use crate::models::{
    Class, ClassSummary, ClassWithCount, Schedule, ScheduleDetail, ScheduleInput, ScheduleType,
};

const CLASS_WITH_COUNT_SELECT: &str = r#"
    SELECT
        c.id AS id,
        c.name AS name,
        c.description AS description,
        c.created_at AS created_at,
        c.updated_at AS updated_at,
        (SELECT COUNT(*) FROM schedules s WHERE s.class_id = c.id) AS schedule_count
    FROM classes c
"#;

const SCHEDULE_DETAIL_SELECT: &str = r#"
    SELECT
        s.id AS id,
        s.class_id AS class_id,
        s.title AS title,
        s.schedule_type AS schedule_type,
        s.date AS date,
        s.start_time AS start_time,
        s.end_time AS end_time,
        s.room AS room,
        s.lecturer AS lecturer,
        s.description AS description,
        s.material_url AS material_url,
        s.submission_link AS submission_link,
        s.created_at AS created_at,
        s.updated_at AS updated_at,
        c.name AS class_name,
        c.description AS class_description
    FROM schedules s
    JOIN classes c ON c.id = s.class_id
"#;

/// Optional narrowing for schedule listings. Bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleFilter {
    pub class_id: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl ScheduleFilter {
    pub fn for_class(class_id: i64) -> Self {
        Self {
            class_id: Some(class_id),
            ..Self::default()
        }
    }

    pub fn on_day(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self.end_date = Some(date);
        self
    }
}

pub async fn fetch_classes(db: &SqlitePool) -> Result<Vec<ClassWithCount>, sqlx::Error> {
    sqlx::query_as::<_, ClassWithCount>(&format!(
        "{CLASS_WITH_COUNT_SELECT} ORDER BY c.name ASC, c.id ASC"
    ))
    .fetch_all(db)
    .await
}

pub async fn find_class_by_id<'e, E>(db: E, id: i64) -> Result<Option<Class>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Class>(
        "SELECT id, name, description, created_at, updated_at FROM classes WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn find_class_with_count<'e, E>(
    db: E,
    id: i64,
) -> Result<Option<ClassWithCount>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, ClassWithCount>(&format!("{CLASS_WITH_COUNT_SELECT} WHERE c.id = ?"))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn insert_class(
    db: &SqlitePool,
    name: String,
    description: Option<String>,
) -> Result<Class, sqlx::Error> {
    let now = Utc::now().to_rfc3339();

    let id = sqlx::query(
        r#"
        INSERT INTO classes (name, description, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?3)
        "#,
    )
    .bind(&name)
    .bind(&description)
    .bind(&now)
    .execute(db)
    .await?
    .last_insert_rowid();

    Ok(Class {
        id,
        name,
        description,
        created_at: now.clone(),
        updated_at: now,
    })
}

pub async fn update_class<'e, E>(db: E, class: &Class) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        UPDATE classes
        SET name = ?1,
            description = ?2,
            updated_at = ?3
        WHERE id = ?4
        "#,
    )
    .bind(&class.name)
    .bind(&class.description)
    .bind(&class.updated_at)
    .bind(class.id)
    .execute(db)
    .await?
    .rows_affected();

    Ok(result > 0)
}

/// Deletes a class and every schedule it owns in one transaction.
pub async fn delete_class(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let mut tx = db.begin().await?;

    sqlx::query("DELETE FROM schedules WHERE class_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let deleted = sqlx::query("DELETE FROM classes WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    tx.commit().await?;
    Ok(deleted > 0)
}

/// Schedules matching `filter`, ordered by date then start time.
pub async fn fetch_schedules(
    db: &SqlitePool,
    filter: &ScheduleFilter,
) -> Result<Vec<ScheduleDetail>, sqlx::Error> {
    let mut query = QueryBuilder::<Sqlite>::new(SCHEDULE_DETAIL_SELECT);
    query.push(" WHERE 1 = 1");

    if let Some(class_id) = filter.class_id {
        query.push(" AND s.class_id = ").push_bind(class_id);
    }
    if let Some(start) = filter.start_date {
        query.push(" AND s.date >= ").push_bind(start);
    }
    if let Some(end) = filter.end_date {
        query.push(" AND s.date <= ").push_bind(end);
    }
    query.push(" ORDER BY s.date ASC, s.start_time ASC, s.id ASC");

    let rows = query.build().fetch_all(db).await?;
    rows.iter().map(detail_from_row).collect()
}

/// Schedule counts per type for one class, over every date. Types with no
/// schedules are absent.
pub async fn count_schedules_by_type(
    db: &SqlitePool,
    class_id: i64,
) -> Result<Vec<(ScheduleType, i64)>, sqlx::Error> {
    sqlx::query_as::<_, (ScheduleType, i64)>(
        r#"
        SELECT schedule_type, COUNT(*)
        FROM schedules
        WHERE class_id = ?
        GROUP BY schedule_type
        "#,
    )
    .bind(class_id)
    .fetch_all(db)
    .await
}

pub async fn find_schedule_by_id<'e, E>(
    db: E,
    id: i64,
) -> Result<Option<ScheduleDetail>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let row = sqlx::query(&format!("{SCHEDULE_DETAIL_SELECT} WHERE s.id = ?"))
        .bind(id)
        .fetch_optional(db)
        .await?;

    row.as_ref().map(detail_from_row).transpose()
}

pub async fn insert_schedule<'e, E>(db: E, input: &ScheduleInput) -> Result<i64, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = Utc::now().to_rfc3339();

    let id = sqlx::query(
        r#"
        INSERT INTO schedules
            (class_id, title, schedule_type, date, start_time, end_time,
            room, lecturer, description, material_url, submission_link,
            created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)
        "#,
    )
    .bind(input.class_id)
    .bind(&input.title)
    .bind(input.schedule_type)
    .bind(input.date)
    .bind(input.range.start)
    .bind(input.range.end)
    .bind(&input.room)
    .bind(&input.lecturer)
    .bind(&input.description)
    .bind(&input.material_url)
    .bind(&input.submission_link)
    .bind(&now)
    .execute(db)
    .await?
    .last_insert_rowid();

    Ok(id)
}

pub async fn update_schedule<'e, E>(
    db: E,
    id: i64,
    input: &ScheduleInput,
) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = Utc::now().to_rfc3339();

    let result = sqlx::query(
        r#"
        UPDATE schedules
        SET title = ?1,
            schedule_type = ?2,
            date = ?3,
            start_time = ?4,
            end_time = ?5,
            room = ?6,
            lecturer = ?7,
            description = ?8,
            material_url = ?9,
            submission_link = ?10,
            updated_at = ?11
        WHERE id = ?12
        "#,
    )
    .bind(&input.title)
    .bind(input.schedule_type)
    .bind(input.date)
    .bind(input.range.start)
    .bind(input.range.end)
    .bind(&input.room)
    .bind(&input.lecturer)
    .bind(&input.description)
    .bind(&input.material_url)
    .bind(&input.submission_link)
    .bind(&now)
    .bind(id)
    .execute(db)
    .await?
    .rows_affected();

    Ok(result > 0)
}

pub async fn delete_schedule(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM schedules WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

fn detail_from_row(row: &SqliteRow) -> Result<ScheduleDetail, sqlx::Error> {
    let schedule = Schedule::from_row(row)?;
    let class = ClassSummary {
        id: schedule.class_id,
        name: row.try_get("class_name")?,
        description: row.try_get("class_description")?,
    };
    Ok(ScheduleDetail { schedule, class })
}
