//! Chart endpoints: KPIs, headcount, geography, costs, turnover and the
//! board-level insight payloads.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use chrono::NaiveDate;
use platform_api::ApiResult;
use products_hr::{
    analytics::{self, CompensationSummary, Competitiveness, GeoRow, HeadcountPoint, Kpis, TimeHeatmap},
    costs::{self, AbsenteeismSeries, BudgetVariance, OvertimeSeries, TotalCostOfWorkforce},
    insights::{self, FinanceImpact, PayGapBridge, ProcessEfficiency},
    period::{Period, add_months},
    turnover::{self, TurnoverCosts, TurnoverMetrics},
};
use serde::Deserialize;
use tracing::instrument;

use super::{DateWindow, today};
use crate::http::AppState;

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/kpis", get(kpis))
        .route("/kpis/all", get(kpis_all))
        .route("/headcount/trend", get(headcount_trend))
        .route("/geo/headcount", get(geo_headcount))
        .route("/time/heatmap", get(time_heatmap))
        .route("/compensation/summary", get(compensation_summary))
        .route("/comp/competitiveness", get(competitiveness))
        .route("/equity/paygap", get(pay_gap))
        .route("/impact/finance", get(finance_impact))
        .route("/process/efficiency", get(process_efficiency))
        .route("/costs/tcow", get(tcow))
        .route("/costs/budget-variance", get(budget_variance))
        .route("/costs/overtime", get(overtime))
        .route("/costs/absenteeism", get(absenteeism))
        .route("/turnover/costs", get(turnover_costs))
        .route("/turnover/metrics", get(turnover_metrics))
}

#[derive(Debug, Default, Deserialize)]
struct Range {
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
}

#[instrument(skip(state))]
async fn kpis(State(state): State<AppState>, Query(range): Query<Range>) -> ApiResult<Json<Kpis>> {
    Ok(Json(analytics::kpis(&state.db, range.from, range.to, today()).await?))
}

#[instrument(skip_all)]
async fn kpis_all(State(state): State<AppState>) -> ApiResult<Json<Kpis>> {
    Ok(Json(analytics::kpis_all(&state.db).await?))
}

#[instrument(skip(state))]
async fn headcount_trend(
    State(state): State<AppState>,
    Query(range): Query<Range>,
) -> ApiResult<Json<Vec<HeadcountPoint>>> {
    let points = analytics::headcount_trend(&state.db, range.from, range.to, today()).await?;
    Ok(Json(points))
}

#[instrument(skip_all)]
async fn geo_headcount(State(state): State<AppState>) -> ApiResult<Json<Vec<GeoRow>>> {
    Ok(Json(analytics::geo_headcount(&state.db).await?))
}

#[instrument(skip_all)]
async fn time_heatmap(State(state): State<AppState>) -> ApiResult<Json<TimeHeatmap>> {
    Ok(Json(analytics::time_heatmap(&state.db).await?))
}

#[instrument(skip_all)]
async fn compensation_summary(
    State(state): State<AppState>,
) -> ApiResult<Json<CompensationSummary>> {
    Ok(Json(analytics::compensation_summary(&state.db).await?))
}

#[instrument(skip_all)]
async fn competitiveness(State(state): State<AppState>) -> ApiResult<Json<Competitiveness>> {
    Ok(Json(analytics::competitiveness(&state.db, today()).await?))
}

async fn pay_gap() -> Json<PayGapBridge> {
    Json(insights::pay_gap_bridge())
}

#[instrument(skip_all)]
async fn finance_impact(State(state): State<AppState>) -> ApiResult<Json<FinanceImpact>> {
    Ok(Json(insights::finance_impact(&state.db).await?))
}

async fn process_efficiency() -> Json<ProcessEfficiency> {
    Json(insights::process_efficiency())
}

#[instrument(skip_all)]
async fn tcow(State(state): State<AppState>) -> ApiResult<Json<TotalCostOfWorkforce>> {
    Ok(Json(costs::total_cost_of_workforce(&state.db).await?))
}

async fn budget_variance() -> Json<BudgetVariance> {
    Json(costs::budget_variance(today()))
}

#[instrument(skip_all)]
async fn overtime(State(state): State<AppState>) -> ApiResult<Json<OvertimeSeries>> {
    Ok(Json(costs::overtime_by_month(&state.db, today()).await?))
}

#[instrument(skip_all)]
async fn absenteeism(State(state): State<AppState>) -> ApiResult<Json<AbsenteeismSeries>> {
    Ok(Json(costs::absenteeism_by_month(&state.db, today()).await?))
}

#[instrument(skip_all)]
async fn turnover_costs(State(state): State<AppState>) -> ApiResult<Json<TurnoverCosts>> {
    Ok(Json(turnover::turnover_costs(&state.db, today()).await?))
}

/// Defaults to the twelve months before today.
#[instrument(skip(state))]
async fn turnover_metrics(
    State(state): State<AppState>,
    Query(window): Query<DateWindow>,
) -> ApiResult<Json<TurnoverMetrics>> {
    let end = window.end_date.unwrap_or_else(today);
    let start = window.start_date.unwrap_or_else(|| add_months(end, -12));
    let metrics = turnover::turnover_metrics(&state.db, Period::new(start, end)).await?;
    Ok(Json(metrics))
}
