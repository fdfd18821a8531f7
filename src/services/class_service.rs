use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use super::normalize_text;
use crate::db::repository;
use crate::error::AppError;
use crate::models::{Class, ClassWithCount, NewClassRequest, UpdateClassRequest};

pub async fn create_class(db: &SqlitePool, req: NewClassRequest) -> Result<Class, AppError> {
    let name = normalize_text(req.name)
        .ok_or_else(|| AppError::Validation("Name is required".to_string()))?;
    let description = normalize_text(req.description);

    let class = repository::insert_class(db, name, description).await?;
    info!("created class {} ({})", class.id, class.name);
    Ok(class)
}

/// Read-modify-write inside one transaction. A blank `name` keeps the stored
/// one.
pub async fn update_class(
    db: &SqlitePool,
    id: i64,
    req: UpdateClassRequest,
) -> Result<ClassWithCount, AppError> {
    let mut tx = db.begin().await?;

    let mut class = repository::find_class_by_id(&mut *tx, id)
        .await?
        .ok_or(AppError::NotFound("Class not found"))?;

    if let Some(name) = normalize_text(req.name) {
        class.name = name;
    }
    if let Some(description) = req.description {
        class.description = normalize_text(description);
    }
    class.updated_at = Utc::now().to_rfc3339();

    repository::update_class(&mut *tx, &class).await?;
    let updated = repository::find_class_with_count(&mut *tx, id)
        .await?
        .ok_or(AppError::Internal("updated class missing after write"))?;

    tx.commit().await?;
    Ok(updated)
}

pub async fn delete_class(db: &SqlitePool, id: i64) -> Result<(), AppError> {
    if repository::delete_class(db, id).await? {
        info!("deleted class {} and its schedules", id);
        Ok(())
    } else {
        Err(AppError::NotFound("Class not found"))
    }
}
