use axum::{Extension, Json, Router, extract::State, routing::post};
use platform_api::{ApiError, ApiResult};
use platform_authn::{Subject, issue_token};
use products_hr::accounts;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::http::{AppState, Tenant};

pub(super) fn router() -> Router<AppState> {
    Router::new().route("/auth/login", post(login))
}

#[derive(Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    token: String,
    username: String,
    role: String,
}

#[instrument(skip_all, fields(username = %body.username))]
async fn login(
    State(state): State<AppState>,
    Extension(tenant): Extension<Tenant>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let account = accounts::authenticate(&state.db, &body.username, &body.password).await?;
    let subject = Subject {
        user_id: account.id,
        username: account.username.clone(),
        role: account.role.clone(),
        tenant: account.tenant_id.clone(),
    };
    let token = issue_token(&subject, &state.config.tokens)
        .map_err(|err| ApiError::internal(err.into()))?;
    info!(tenant = %tenant.0, role = %account.role, "login succeeded");
    Ok(Json(LoginResponse {
        token,
        username: account.username,
        role: account.role,
    }))
}
