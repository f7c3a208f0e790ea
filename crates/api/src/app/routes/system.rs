use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use userhub_auth::{ADMIN, SCOPE_CLAIM, TEST_SCOPE};

use crate::app::dto::{AccessTokenResponse, MessageResponse};
use crate::app::errors::ApiError;
use crate::context::PrincipalContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn actuator_health() -> impl IntoResponse {
    Json(json!({ "status": "UP" }))
}

pub async fn secret(Extension(_principal): Extension<PrincipalContext>) -> Json<MessageResponse> {
    Json(MessageResponse::new("secret for you"))
}

pub async fn admin(
    Extension(principal): Extension<PrincipalContext>,
) -> Result<Json<MessageResponse>, ApiError> {
    principal.require(&ADMIN)?;
    Ok(Json(MessageResponse::new("admin role for you")))
}

pub async fn admin_scope(
    Extension(principal): Extension<PrincipalContext>,
) -> Result<Json<MessageResponse>, ApiError> {
    principal.require(&TEST_SCOPE)?;
    Ok(Json(MessageResponse::new("scope for you")))
}

/// Echo the caller's identity, token and resolved authorities.
pub async fn access_token(
    Extension(principal): Extension<PrincipalContext>,
) -> Json<AccessTokenResponse> {
    let p = principal.principal();
    Json(AccessTokenResponse {
        principal: p.name().to_string(),
        access_token: principal.token().to_string(),
        authorities: p.authorities().to_strings(),
        scope: p.claims().get(SCOPE_CLAIM).cloned(),
    })
}
