use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::Permission;

/// Role name as supplied when an account is created (e.g. "admin", "Hr").
///
/// Roles are opaque strings at this layer. When persisted as an account's
/// authority the name is upper-cased; token resolution never re-cases.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Authority stored for an account holding this role (`ROLE_<UPPER>`).
    pub fn stored_authority(&self) -> Permission {
        Permission::role(self.0.trim().to_uppercase())
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
