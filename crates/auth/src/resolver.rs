//! Verified claims → permission set.
//!
//! One fixed rule: a `roles` claim wins; without it the `scope` claim is used.

use serde::Serialize;

use crate::claims::{ROLES_CLAIM, SCOPE_CLAIM, VerifiedClaims};
use crate::permissions::{Permission, PermissionSet};

/// Which claim the permissions were taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthoritySource {
    Roles,
    Scope,
    /// Neither claim was present; the permission set is empty.
    None,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAuthorities {
    pub source: AuthoritySource,
    pub permissions: PermissionSet,
}

/// Resolve the permissions carried by a verified token.
///
/// - `roles` present (even as an empty list): `ROLE_<r>` for each entry, and
///   `scope` is ignored
/// - otherwise `scope` present: `SCOPE_<s>` for each entry
/// - neither present: an empty set, which every permission check rejects
///
/// Entry names are taken verbatim and source order is preserved.
///
/// - No IO
/// - No panics
pub fn resolve_authorities(claims: &VerifiedClaims) -> ResolvedAuthorities {
    if let Some(roles) = claims.string_list(ROLES_CLAIM) {
        tracing::debug!(?roles, "resolving authorities from roles claim");
        return ResolvedAuthorities {
            source: AuthoritySource::Roles,
            permissions: roles.into_iter().map(Permission::role).collect(),
        };
    }

    if let Some(scopes) = claims.string_list(SCOPE_CLAIM) {
        tracing::debug!(?scopes, "resolving authorities from scope claim");
        return ResolvedAuthorities {
            source: AuthoritySource::Scope,
            permissions: scopes.into_iter().map(Permission::scope).collect(),
        };
    }

    tracing::warn!(
        subject = claims.subject().unwrap_or_default(),
        "token carries neither roles nor scope claim; no authorities granted"
    );
    ResolvedAuthorities {
        source: AuthoritySource::None,
        permissions: PermissionSet::default(),
    }
}
