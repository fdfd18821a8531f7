use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Path, Query, Request, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{Datelike, Local};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::calendar::{ViewState, local_today, parse_date};
use crate::db::repository::{self, ScheduleFilter};
use crate::error::AppError;
use crate::models::*;
use crate::services::{
    CalendarView, Dashboard, calendar_view, class_service, parse_id, schedule_service,
};
use crate::state::AppState;

/// `Json` whose rejections come back as [`AppError`] bodies.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ApiJson(value))
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalendarQuery {
    year: Option<String>,
    month: Option<String>,
    selected: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleListQuery {
    class_id: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ClassScheduleQuery {
    date: Option<String>,
}

pub fn router(state: AppState) -> Router {
    // the browser client is served from another origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/classes", get(list_classes).post(create_class))
        .route(
            "/classes/{id}",
            get(get_class).put(update_class).delete(delete_class),
        )
        .route(
            "/classes/{id}/schedules",
            get(list_class_schedules).post(create_class_schedule),
        )
        .route("/classes/{id}/calendar", get(class_calendar))
        .route("/classes/{id}/dashboard", get(class_dashboard))
        .route("/schedules", get(list_schedules).post(create_schedule))
        .route(
            "/schedules/{id}",
            get(get_schedule).put(update_schedule).delete(delete_schedule),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

async fn list_classes(State(state): State<AppState>) -> Result<Json<Vec<ClassWithCount>>, AppError> {
    let classes = repository::fetch_classes(&state.db).await?;
    Ok(Json(classes))
}

async fn create_class(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<NewClassRequest>,
) -> Result<(StatusCode, Json<Class>), AppError> {
    let class = class_service::create_class(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(class)))
}

async fn get_class(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ClassWithCount>, AppError> {
    let id = parse_id(&id, "class")?;
    let class = repository::find_class_with_count(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("Class not found"))?;
    Ok(Json(class))
}

async fn update_class(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateClassRequest>,
) -> Result<Json<ClassWithCount>, AppError> {
    let id = parse_id(&id, "class")?;
    let class = class_service::update_class(&state.db, id, req).await?;
    Ok(Json(class))
}

async fn delete_class(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_id(&id, "class")?;
    class_service::delete_class(&state.db, id).await?;
    Ok(Json(MessageResponse {
        message: "Class deleted successfully",
    }))
}

async fn list_class_schedules(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<ClassScheduleQuery>,
) -> Result<Json<Vec<ScheduleDetail>>, AppError> {
    let id = parse_id(&id, "class")?;
    if repository::find_class_by_id(&state.db, id).await?.is_none() {
        return Err(AppError::NotFound("Class not found"));
    }

    let mut filter = ScheduleFilter::for_class(id);
    if let Some(raw) = non_blank(params.date) {
        filter = filter.on_day(parse_date(&raw)?);
    }

    let schedules = repository::fetch_schedules(&state.db, &filter).await?;
    Ok(Json(schedules))
}

async fn create_class_schedule(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<NewScheduleRequest>,
) -> Result<(StatusCode, Json<ScheduleDetail>), AppError> {
    let class_id = parse_id(&id, "class")?;
    let schedule = schedule_service::create_schedule(&state.db, class_id, req).await?;
    Ok((StatusCode::CREATED, Json(schedule)))
}

async fn class_calendar(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<CalendarQuery>,
) -> Result<Json<CalendarView>, AppError> {
    let id = parse_id(&id, "class")?;
    let today = local_today();

    let year = match non_blank(params.year) {
        Some(raw) => parse_number(&raw, "year")?,
        None => today.year(),
    };
    // zero-based; out-of-range values roll into the neighbouring year
    let month = match non_blank(params.month) {
        Some(raw) => parse_number(&raw, "month")?,
        None => today.month0() as i32,
    };
    let selected = non_blank(params.selected)
        .map(|raw| parse_date(&raw))
        .transpose()?;

    let view = ViewState::new(today).with_selected(selected);
    let calendar =
        calendar_view::month_view(&state.db, id, year, month, view, state.locale).await?;
    Ok(Json(calendar))
}

async fn class_dashboard(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Dashboard>, AppError> {
    let id = parse_id(&id, "class")?;
    let now = Local::now().naive_local();
    let dashboard = calendar_view::dashboard(&state.db, id, now, state.locale).await?;
    Ok(Json(dashboard))
}

async fn list_schedules(
    State(state): State<AppState>,
    Query(params): Query<ScheduleListQuery>,
) -> Result<Json<Vec<ScheduleDetail>>, AppError> {
    let filter = ScheduleFilter {
        class_id: non_blank(params.class_id)
            .map(|raw| parse_id(&raw, "class"))
            .transpose()?,
        start_date: non_blank(params.start_date)
            .map(|raw| parse_date(&raw))
            .transpose()?,
        end_date: non_blank(params.end_date)
            .map(|raw| parse_date(&raw))
            .transpose()?,
    };

    let schedules = repository::fetch_schedules(&state.db, &filter).await?;
    Ok(Json(schedules))
}

async fn create_schedule(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<NewScheduleRequest>,
) -> Result<(StatusCode, Json<ScheduleDetail>), AppError> {
    let class_id = schedule_service::class_id_from_body(req.class_id.as_ref())?;
    let schedule = schedule_service::create_schedule(&state.db, class_id, req).await?;
    Ok((StatusCode::CREATED, Json(schedule)))
}

async fn get_schedule(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ScheduleDetail>, AppError> {
    let id = parse_id(&id, "schedule")?;
    let schedule = repository::find_schedule_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("Schedule not found"))?;
    Ok(Json(schedule))
}

async fn update_schedule(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateScheduleRequest>,
) -> Result<Json<ScheduleDetail>, AppError> {
    let id = parse_id(&id, "schedule")?;
    let schedule = schedule_service::update_schedule(&state.db, id, req).await?;
    Ok(Json(schedule))
}

async fn delete_schedule(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_id(&id, "schedule")?;
    schedule_service::delete_schedule(&state.db, id).await?;
    Ok(Json(MessageResponse {
        message: "Schedule deleted successfully",
    }))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_number(raw: &str, what: &str) -> Result<i32, AppError> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| AppError::Validation(format!("Invalid {}", what)))
}
