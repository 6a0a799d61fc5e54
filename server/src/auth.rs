use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header::USER_AGENT, request::Parts},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use platform_api::ApiError;
use platform_authn::{Claims, decode_token};
use platform_authz::{AUDIT_RESOURCE, PolicyContext, PolicyEngine, Role};
use products_hr::audit::Actor;
use tracing::debug;

use crate::http::AppState;

const FORWARDED_FOR: &str = "x-forwarded-for";

/// Who is calling. `claims` is always present when auth is enforced; otherwise
/// a missing or unreadable token leaves it empty.
#[derive(Clone, Debug, Default)]
pub struct Caller {
    pub claims: Option<Claims>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl Caller {
    pub fn actor(&self) -> Actor {
        Actor {
            user_id: self.claims.as_ref().map(|c| c.sub.clone()),
            user_name: self.claims.as_ref().map(|c| c.name.clone()),
            ip_address: self.ip_address.clone(),
            user_agent: self.user_agent.clone(),
        }
    }

    pub fn roles(&self) -> Vec<Role> {
        self.claims
            .as_ref()
            .and_then(|c| Role::parse(&c.role))
            .into_iter()
            .collect()
    }
}

fn header_text(headers: &HeaderMap, name: impl axum::http::header::AsHeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let bearer = TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
            .await
            .ok();
        let claims = match bearer {
            Some(TypedHeader(Authorization(token))) => {
                match decode_token(token.token(), &state.config.tokens) {
                    Ok(claims) => Some(claims),
                    Err(err) if state.config.auth_enforced => {
                        debug!(error = %err, "rejected bearer token");
                        return Err(ApiError::Unauthorized);
                    }
                    Err(err) => {
                        debug!(error = %err, "ignoring unreadable bearer token");
                        None
                    }
                }
            }
            None if state.config.auth_enforced => return Err(ApiError::Unauthorized),
            None => None,
        };
        let ip_address = header_text(&parts.headers, FORWARDED_FOR)
            .and_then(|list| list.split(',').next().map(|ip| ip.trim().to_string()));
        Ok(Self {
            claims,
            ip_address,
            user_agent: header_text(&parts.headers, USER_AGENT),
        })
    }
}

/// Route layer for `/api/audit`: Admin or Auditor when auth is enforced.
pub async fn require_audit_access(
    State(state): State<AppState>,
    caller: Caller,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if state.config.auth_enforced {
        let ctx = PolicyContext {
            subject: caller
                .claims
                .as_ref()
                .map(|c| c.sub.clone())
                .unwrap_or_default(),
            roles: caller.roles(),
            action: "read".into(),
            resource: AUDIT_RESOURCE.into(),
        };
        PolicyEngine.check(&ctx).map_err(|err| {
            debug!(error = %err, "audit access denied");
            ApiError::Forbidden
        })?;
    }
    Ok(next.run(request).await)
}
