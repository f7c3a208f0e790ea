//! `userhub-auth`: token claims to permissions, and permission checks.
//!
//! This crate is intentionally decoupled from HTTP and storage: it verifies a
//! bearer token, resolves the verified claims into a `PermissionSet`, and tests
//! that set against the permission a protected operation requires.

pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod permissions;
pub mod principal;
pub mod resolver;
pub mod roles;

pub use authorize::{authorize, AuthzError};
pub use claims::{VerifiedClaims, ROLES_CLAIM, SCOPE_CLAIM};
pub use jwt::{Hs256JwtVerifier, JwtVerifier, TokenError};
pub use permissions::{ADMIN, Permission, PermissionParseError, PermissionSet, TEST_SCOPE};
pub use principal::Principal;
pub use resolver::{resolve_authorities, AuthoritySource, ResolvedAuthorities};
pub use roles::Role;
