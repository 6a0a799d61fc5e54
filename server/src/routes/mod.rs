//! REST surface under `/api`.

mod absences;
mod analytics;
mod audit;
mod auth;
mod compensations;
mod dashboard;
mod lookup;
mod reports;

use axum::{Router, middleware};
use chrono::{Datelike, NaiveDate, Utc};
use serde::Deserialize;

use crate::{auth::require_audit_access, http::AppState};

pub fn api_router(state: &AppState) -> Router<AppState> {
    let audit = audit::router().route_layer(middleware::from_fn_with_state(
        state.clone(),
        require_audit_access,
    ));
    Router::new()
        .merge(auth::router())
        .merge(analytics::router())
        .nest("/dashboard", dashboard::router())
        .nest("/absences", absences::router())
        .nest("/compensations", compensations::router())
        .nest("/lookup", lookup::router())
        .nest("/audit", audit)
        .nest("/reports", reports::router())
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn current_year() -> i32 {
    Utc::now().year()
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DateWindow {
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FilteredWindow {
    department_id: Option<i32>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
struct YearQuery {
    year: Option<i32>,
}
