use std::borrow::Cow;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const ROLE_PREFIX: &str = "ROLE_";
const SCOPE_PREFIX: &str = "SCOPE_";

/// An internal permission tag, tagged by where it came from.
///
/// The string form is `ROLE_<name>` or `SCOPE_<name>`; the name is kept
/// verbatim (no case change).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Permission {
    Role(Cow<'static, str>),
    Scope(Cow<'static, str>),
}

/// `ROLE_ADMIN`: required by every user-management operation.
pub const ADMIN: Permission = Permission::Role(Cow::Borrowed("ADMIN"));

/// `SCOPE_u.test`: required by `GET /admin/scope`.
pub const TEST_SCOPE: Permission = Permission::Scope(Cow::Borrowed("u.test"));

impl Permission {
    pub fn role(name: impl Into<Cow<'static, str>>) -> Self {
        Self::Role(name.into())
    }

    pub fn scope(name: impl Into<Cow<'static, str>>) -> Self {
        Self::Scope(name.into())
    }

    /// The bare name, without its origin prefix.
    pub fn name(&self) -> &str {
        match self {
            Self::Role(n) | Self::Scope(n) => n,
        }
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Role(n) => write!(f, "{ROLE_PREFIX}{n}"),
            Self::Scope(n) => write!(f, "{SCOPE_PREFIX}{n}"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("permission '{0}' has neither a ROLE_ nor a SCOPE_ prefix")]
pub struct PermissionParseError(pub String);

impl FromStr for Permission {
    type Err = PermissionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(name) = s.strip_prefix(ROLE_PREFIX) {
            Ok(Self::role(name.to_string()))
        } else if let Some(name) = s.strip_prefix(SCOPE_PREFIX) {
            Ok(Self::scope(name.to_string()))
        } else {
            Err(PermissionParseError(s.to_string()))
        }
    }
}

impl TryFrom<String> for Permission {
    type Error = PermissionParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Permission> for String {
    fn from(value: Permission) -> Self {
        value.to_string()
    }
}

/// Ordered permissions resolved for one request.
///
/// Order follows the source claim; duplicates are kept.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(Vec<Permission>);

impl PermissionSet {
    pub fn new(permissions: Vec<Permission>) -> Self {
        Self(permissions)
    }

    /// Exact membership test.
    pub fn contains(&self, required: &Permission) -> bool {
        self.0.iter().any(|p| p == required)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Permission> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// String forms, in order (`["ROLE_ADMIN", ...]`).
    pub fn to_strings(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }

    pub fn into_inner(self) -> Vec<Permission> {
        self.0
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl core::fmt::Display for PermissionSet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "[{}]", self.to_strings().join(", "))
    }
}
