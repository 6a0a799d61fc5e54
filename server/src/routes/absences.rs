use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use chrono::Utc;
use platform_api::ApiResult;
use products_hr::absence::{self, AbsenceInput, AbsenceMetrics, AbsenceView};
use tracing::instrument;

use super::FilteredWindow;
use crate::{auth::Caller, http::AppState};

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/metrics", get(metrics))
        .route("/employee/{employee_id}", get(for_employee))
        .route("/{id}", get(show).put(update).delete(remove))
}

#[instrument(skip_all)]
async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<AbsenceView>>> {
    Ok(Json(absence::list(&state.db).await?))
}

#[instrument(skip(state))]
async fn show(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<Json<AbsenceView>> {
    Ok(Json(absence::get(&state.db, id).await?))
}

#[instrument(skip(state))]
async fn for_employee(
    State(state): State<AppState>,
    Path(employee_id): Path<i32>,
) -> ApiResult<Json<Vec<AbsenceView>>> {
    Ok(Json(absence::for_employee(&state.db, employee_id).await?))
}

#[instrument(skip(state, caller, input))]
async fn create(
    State(state): State<AppState>,
    caller: Caller,
    Json(input): Json<AbsenceInput>,
) -> ApiResult<impl IntoResponse> {
    let created = absence::create(&state.db, input, &caller.actor(), Utc::now()).await?;
    let location = format!("/api/absences/{}", created.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(created)))
}

#[instrument(skip(state, caller, input))]
async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    caller: Caller,
    Json(input): Json<AbsenceInput>,
) -> ApiResult<StatusCode> {
    absence::update(&state.db, id, input, &caller.actor(), Utc::now()).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, caller))]
async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    caller: Caller,
) -> ApiResult<StatusCode> {
    absence::delete(&state.db, id, &caller.actor(), Utc::now()).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
async fn metrics(
    State(state): State<AppState>,
    Query(window): Query<FilteredWindow>,
) -> ApiResult<Json<AbsenceMetrics>> {
    let report = absence::metrics(
        &state.db,
        window.department_id,
        window.start_date,
        window.end_date,
    )
    .await?;
    Ok(Json(report))
}
