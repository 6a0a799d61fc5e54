use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use chrono::Utc;
use platform_api::ApiResult;
use products_hr::dashboard::{
    self, CompensationTrend, DashboardSummary, DepartmentStats, YearAbsences, YearTurnover,
};
use serde::Deserialize;
use tracing::instrument;

use super::{YearQuery, current_year, today};
use crate::http::AppState;

const DEFAULT_TREND_MONTHS: u32 = 12;

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/summary", get(summary))
        .route("/department-stats", get(department_stats))
        .route("/turnover-metrics", get(turnover_metrics))
        .route("/compensation-trends", get(compensation_trends))
        .route("/absence-metrics", get(absence_metrics))
}

#[instrument(skip_all)]
async fn summary(State(state): State<AppState>) -> ApiResult<Json<DashboardSummary>> {
    Ok(Json(dashboard::summary(&state.db, Utc::now()).await?))
}

#[instrument(skip_all)]
async fn department_stats(State(state): State<AppState>) -> ApiResult<Json<Vec<DepartmentStats>>> {
    Ok(Json(dashboard::department_stats(&state.db).await?))
}

#[instrument(skip(state))]
async fn turnover_metrics(
    State(state): State<AppState>,
    Query(query): Query<YearQuery>,
) -> ApiResult<Json<YearTurnover>> {
    let year = query.year.unwrap_or_else(current_year);
    Ok(Json(dashboard::turnover_for_year(&state.db, year).await?))
}

#[derive(Debug, Deserialize)]
struct MonthsQuery {
    months: Option<u32>,
}

#[instrument(skip(state))]
async fn compensation_trends(
    State(state): State<AppState>,
    Query(query): Query<MonthsQuery>,
) -> ApiResult<Json<CompensationTrend>> {
    let months = query.months.unwrap_or(DEFAULT_TREND_MONTHS);
    Ok(Json(
        dashboard::compensation_trend(&state.db, months, today()).await?,
    ))
}

#[instrument(skip(state))]
async fn absence_metrics(
    State(state): State<AppState>,
    Query(query): Query<YearQuery>,
) -> ApiResult<Json<YearAbsences>> {
    let year = query.year.unwrap_or_else(current_year);
    Ok(Json(dashboard::absences_for_year(&state.db, year).await?))
}
