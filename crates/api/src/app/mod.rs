//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router};

use userhub_auth::{Hs256JwtVerifier, JwtVerifier};
use userhub_infra::{
    AccountService, DirectoryError, InMemoryUserDirectory, LogNotifier, PostgresUserDirectory,
    UserDirectory,
};

use crate::config::ApiConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<dyn UserDirectory>,
    pub accounts: AccountService,
}

impl AppState {
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        let accounts = AccountService::new(directory.clone(), Arc::new(LogNotifier));
        Self {
            directory,
            accounts,
        }
    }
}

/// Token verifier described by `config`.
pub fn verifier_from_config(config: &ApiConfig) -> Arc<dyn JwtVerifier> {
    let mut verifier = Hs256JwtVerifier::new(config.jwt_secret.as_bytes());
    if let Some(issuer) = &config.jwt_issuer {
        verifier = verifier.with_issuer(issuer);
    }
    if let Some(audience) = &config.jwt_audience {
        verifier = verifier.with_audience(audience);
    }
    Arc::new(verifier)
}

/// Directory described by `config`: Postgres when a URL is set, else in memory.
pub async fn directory_from_config(
    config: &ApiConfig,
) -> Result<Arc<dyn UserDirectory>, DirectoryError> {
    let Some(url) = &config.database_url else {
        tracing::warn!("DATABASE_URL not set; using in-memory user directory");
        return Ok(Arc::new(InMemoryUserDirectory::new()));
    };

    let directory = PostgresUserDirectory::connect(url, config.database_max_connections).await?;
    if config.run_migrations {
        directory.migrate().await?;
    }
    Ok(Arc::new(directory))
}

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &ApiConfig) -> Result<Router, DirectoryError> {
    let directory = directory_from_config(config).await?;
    Ok(build_router(AppState::new(directory), verifier_from_config(config)))
}

/// Assemble the router around an existing state and verifier.
pub fn build_router(state: AppState, verifier: Arc<dyn JwtVerifier>) -> Router {
    let auth_state = middleware::AuthState { verifier };

    // Protected routes: require a verified bearer token.
    let protected = routes::router()
        .layer(Extension(Arc::new(state)))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    routes::public_router().merge(protected)
}
