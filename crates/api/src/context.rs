use std::sync::Arc;

use userhub_auth::{Permission, Principal};

use crate::app::errors::ApiError;

/// Authenticated caller for a request, inserted by the auth middleware.
///
/// Immutable; cloning shares the underlying principal.
#[derive(Debug, Clone)]
pub struct PrincipalContext {
    principal: Arc<Principal>,
    token: Arc<str>,
}

impl PrincipalContext {
    pub fn new(principal: Principal, token: &str) -> Self {
        Self {
            principal: Arc::new(principal),
            token: Arc::from(token),
        }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    /// The raw bearer token the principal was verified from.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Gate an operation on `required`, mapping failure to 403.
    pub fn require(&self, required: &Permission) -> Result<(), ApiError> {
        self.principal.require(required).map_err(|e| {
            tracing::debug!(principal = %self.principal.name(), %required, "access denied");
            ApiError::Forbidden(e.to_string())
        })
    }
}
