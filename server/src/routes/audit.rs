use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use chrono::Utc;
use entity::audit_log;
use platform_api::{ApiResult, Page};
use products_hr::audit::{self, AuditSummary, LogQuery};
use serde::Deserialize;
use tracing::instrument;

use super::DateWindow;
use crate::http::AppState;

const DEFAULT_ACTIVITY_DAYS: u32 = 30;

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/logs", get(logs))
        .route("/logs/{id}", get(log))
        .route("/changes/{entity_type}/{entity_id}", get(entity_changes))
        .route("/user-activity/{user_id}", get(user_activity))
        .route("/summary", get(summary))
}

#[instrument(skip(state))]
async fn logs(
    State(state): State<AppState>,
    Query(query): Query<LogQuery>,
) -> ApiResult<Json<Page<audit_log::Model>>> {
    Ok(Json(audit::logs(&state.db, &query).await?))
}

#[instrument(skip(state))]
async fn log(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<Json<audit_log::Model>> {
    Ok(Json(audit::log(&state.db, id).await?))
}

#[derive(Debug, Deserialize)]
struct LimitQuery {
    limit: Option<u64>,
}

#[instrument(skip(state))]
async fn entity_changes(
    State(state): State<AppState>,
    Path((entity_type, entity_id)): Path<(String, String)>,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Json<Vec<audit_log::Model>>> {
    let rows = audit::entity_changes(&state.db, &entity_type, &entity_id, query.limit).await?;
    Ok(Json(rows))
}

#[derive(Debug, Deserialize)]
struct DaysQuery {
    days: Option<u32>,
}

#[instrument(skip(state))]
async fn user_activity(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<DaysQuery>,
) -> ApiResult<Json<Vec<audit_log::Model>>> {
    let days = query.days.unwrap_or(DEFAULT_ACTIVITY_DAYS);
    let rows = audit::user_activity(&state.db, &user_id, days, Utc::now()).await?;
    Ok(Json(rows))
}

#[instrument(skip(state))]
async fn summary(
    State(state): State<AppState>,
    Query(window): Query<DateWindow>,
) -> ApiResult<Json<AuditSummary>> {
    let report = audit::summary(&state.db, window.start_date, window.end_date, Utc::now()).await?;
    Ok(Json(report))
}
