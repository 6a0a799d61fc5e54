use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use chrono::Utc;
use platform_api::ApiResult;
use products_hr::compensation::{self, CompensationInput, CompensationTrends, CompensationView};
use tracing::instrument;

use super::{FilteredWindow, today};
use crate::{auth::Caller, http::AppState};

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/trends", get(trends))
        .route("/employee/{employee_id}", get(for_employee))
        .route("/employee/{employee_id}/current", get(current))
        .route("/{id}", get(show).put(update).delete(remove))
}

#[instrument(skip_all)]
async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<CompensationView>>> {
    Ok(Json(compensation::list(&state.db).await?))
}

#[instrument(skip(state))]
async fn show(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<CompensationView>> {
    Ok(Json(compensation::get(&state.db, id).await?))
}

#[instrument(skip(state))]
async fn for_employee(
    State(state): State<AppState>,
    Path(employee_id): Path<i32>,
) -> ApiResult<Json<Vec<CompensationView>>> {
    Ok(Json(compensation::for_employee(&state.db, employee_id).await?))
}

#[instrument(skip(state))]
async fn current(
    State(state): State<AppState>,
    Path(employee_id): Path<i32>,
) -> ApiResult<Json<CompensationView>> {
    let view = compensation::current_for_employee(&state.db, employee_id, today()).await?;
    Ok(Json(view))
}

#[instrument(skip(state, caller, input))]
async fn create(
    State(state): State<AppState>,
    caller: Caller,
    Json(input): Json<CompensationInput>,
) -> ApiResult<impl IntoResponse> {
    let created = compensation::create(&state.db, input, &caller.actor(), Utc::now()).await?;
    let location = format!("/api/compensations/{}", created.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(created)))
}

#[instrument(skip(state, caller, input))]
async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    caller: Caller,
    Json(input): Json<CompensationInput>,
) -> ApiResult<StatusCode> {
    compensation::update(&state.db, id, input, &caller.actor(), Utc::now()).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, caller))]
async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    caller: Caller,
) -> ApiResult<StatusCode> {
    compensation::delete(&state.db, id, &caller.actor(), Utc::now()).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
async fn trends(
    State(state): State<AppState>,
    Query(window): Query<FilteredWindow>,
) -> ApiResult<Json<CompensationTrends>> {
    let report = compensation::trends(
        &state.db,
        window.department_id,
        window.start_date,
        window.end_date,
    )
    .await?;
    Ok(Json(report))
}
