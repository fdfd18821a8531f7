use sqlx::SqlitePool;

use crate::calendar::DisplayLocale;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub locale: DisplayLocale,
}
