use axum::{Json, Router, extract::State, routing::get};
use entity::{absence_type, department, location, pay_grade};
use platform_api::ApiResult;
use products_hr::lookup;

use crate::http::AppState;

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/departments", get(departments))
        .route("/job-titles", get(job_titles))
        .route("/absence-types", get(absence_types))
        .route("/pay-grades", get(pay_grades))
        .route("/employment-types", get(employment_types))
        .route("/locations", get(locations))
}

async fn departments(State(state): State<AppState>) -> ApiResult<Json<Vec<department::Model>>> {
    Ok(Json(lookup::departments(&state.db).await?))
}

async fn job_titles(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(lookup::job_titles(&state.db).await?))
}

async fn absence_types(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<absence_type::Model>>> {
    Ok(Json(lookup::absence_types(&state.db).await?))
}

async fn pay_grades(State(state): State<AppState>) -> ApiResult<Json<Vec<pay_grade::Model>>> {
    Ok(Json(lookup::pay_grades(&state.db).await?))
}

async fn employment_types(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(lookup::employment_types(&state.db).await?))
}

async fn locations(State(state): State<AppState>) -> ApiResult<Json<Vec<location::Model>>> {
    Ok(Json(lookup::locations(&state.db).await?))
}
