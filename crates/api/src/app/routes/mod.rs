use axum::{routing::get, Router};

pub mod system;
pub mod users;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/secret", get(system::secret))
        .route("/access_token", get(system::access_token))
        .route("/admin", get(system::admin))
        .route("/admin/scope", get(system::admin_scope))
        .nest("/users", users::router())
}

/// Router for endpoints reachable without a token.
pub fn public_router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .route("/actuator/health", get(system::actuator_health))
        .route("/actuator/health/liveness", get(system::actuator_health))
        .route("/actuator/health/readiness", get(system::actuator_health))
}
