use crate::{
    AuthoritySource, AuthzError, Permission, PermissionSet, VerifiedClaims, authorize,
    resolve_authorities,
};

/// An authenticated caller: its verified claims and the permissions resolved
/// from them. Built once per request.
#[derive(Debug, Clone, PartialEq)]
pub struct Principal {
    name: String,
    claims: VerifiedClaims,
    authorities: PermissionSet,
    source: AuthoritySource,
}

impl Principal {
    pub fn from_claims(claims: VerifiedClaims) -> Self {
        let resolved = resolve_authorities(&claims);
        Self {
            name: claims.subject().unwrap_or_default().to_string(),
            claims,
            authorities: resolved.permissions,
            source: resolved.source,
        }
    }

    /// Principal name (the token subject; empty if the token has none).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn claims(&self) -> &VerifiedClaims {
        &self.claims
    }

    pub fn authorities(&self) -> &PermissionSet {
        &self.authorities
    }

    pub fn authority_source(&self) -> AuthoritySource {
        self.source
    }

    pub fn require(&self, required: &Permission) -> Result<(), AuthzError> {
        authorize(&self.authorities, required)
    }
}
