use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use platform_api::ApiResult;
use products_hr::reports::{
    self, DepartmentPayrollReport, EarningsRow, PayrollSummaryRow, TaxReport,
};
use serde::Deserialize;
use tracing::instrument;

use super::{DateWindow, current_year, today};
use crate::http::AppState;

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/payroll-summary", get(payroll_summary))
        .route("/employee-earnings/{employee_id}", get(employee_earnings))
        .route("/department-payroll/{department_id}", get(department_payroll))
        .route("/tax-report", get(tax_report))
}

#[instrument(skip(state))]
async fn payroll_summary(
    State(state): State<AppState>,
    Query(window): Query<DateWindow>,
) -> ApiResult<Json<Vec<PayrollSummaryRow>>> {
    let rows =
        reports::payroll_summary(&state.db, window.start_date, window.end_date, today()).await?;
    Ok(Json(rows))
}

#[instrument(skip(state))]
async fn employee_earnings(
    State(state): State<AppState>,
    Path(employee_id): Path<i32>,
    Query(window): Query<DateWindow>,
) -> ApiResult<Json<Vec<EarningsRow>>> {
    let rows = reports::employee_earnings(
        &state.db,
        employee_id,
        window.start_date,
        window.end_date,
        today(),
    )
    .await?;
    Ok(Json(rows))
}

#[instrument(skip(state))]
async fn department_payroll(
    State(state): State<AppState>,
    Path(department_id): Path<i32>,
    Query(window): Query<DateWindow>,
) -> ApiResult<Json<DepartmentPayrollReport>> {
    let report = reports::department_payroll(
        &state.db,
        department_id,
        window.start_date,
        window.end_date,
        today(),
    )
    .await?;
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
struct TaxQuery {
    year: Option<i32>,
    quarter: Option<u32>,
}

#[instrument(skip(state))]
async fn tax_report(
    State(state): State<AppState>,
    Query(query): Query<TaxQuery>,
) -> ApiResult<Json<TaxReport>> {
    let year = query.year.unwrap_or_else(current_year);
    Ok(Json(reports::tax_report(&state.db, year, query.quarter).await?))
}
