use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Extension, Path, Query},
    routing::{delete, get, post, put},
    Json, Router,
};

use userhub_auth::ADMIN;
use userhub_core::{Page, Username};
use userhub_infra::directory::{NewUser, UserCredentials, UserProfile, UserRecord};

use crate::app::AppState;
use crate::app::dto::{ListUsersParams, MessageResponse, StatusRequest};
use crate::app::errors::ApiError;
use crate::context::PrincipalContext;

/// User management; every route requires `ROLE_ADMIN`.
pub fn router() -> Router {
    Router::new()
        .route("/", get(list_users))
        .route("/add", post(create_user))
        .route("/update/:username", put(update_user))
        .route("/delete/:username", delete(delete_user))
        .route("/:username", get(get_user))
        .route("/:username/status", put(set_status))
}

fn parse_username(raw: &str) -> Result<Username, ApiError> {
    Username::new(raw).map_err(|e| ApiError::BadRequest(e.to_string()))
}

pub async fn list_users(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<PrincipalContext>,
    params: Result<Query<ListUsersParams>, QueryRejection>,
) -> Result<Json<Page<UserRecord>>, ApiError> {
    principal.require(&ADMIN)?;
    let Query(params) = params?;
    let page = state.directory.list_users(&params.into_query()).await?;
    Ok(Json(page))
}

pub async fn get_user(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(username): Path<String>,
) -> Result<Json<UserRecord>, ApiError> {
    principal.require(&ADMIN)?;
    let user = state.directory.get_user(&parse_username(&username)?).await?;
    Ok(Json(user))
}

pub async fn create_user(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<NewUser>,
) -> Result<Json<UserCredentials>, ApiError> {
    principal.require(&ADMIN)?;
    let credentials = state.accounts.create_user(body).await?;
    Ok(Json(credentials))
}

pub async fn update_user(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(username): Path<String>,
    Json(body): Json<UserProfile>,
) -> Result<Json<UserRecord>, ApiError> {
    principal.require(&ADMIN)?;
    let username = parse_username(&username)?;
    state.accounts.update_user(&username, &body).await?;
    Ok(Json(state.directory.get_user(&username).await?))
}

pub async fn delete_user(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(username): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    principal.require(&ADMIN)?;
    let username = parse_username(&username)?;
    state.accounts.delete_user(&username).await?;
    Ok(Json(MessageResponse::new(format!("user {username} disabled"))))
}

pub async fn set_status(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(username): Path<String>,
    Json(body): Json<StatusRequest>,
) -> Result<Json<UserRecord>, ApiError> {
    principal.require(&ADMIN)?;
    let username = parse_username(&username)?;
    state.accounts.set_status(&username, &body.status).await?;
    Ok(Json(state.directory.get_user(&username).await?))
}
