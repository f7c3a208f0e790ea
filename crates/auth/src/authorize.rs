use thiserror::Error;

use crate::{Permission, PermissionSet};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),
}

/// Check that `granted` contains `required` (exact string match).
///
/// - No IO
/// - No panics
/// - No wildcard or hierarchy: `ROLE_ADMIN` does not imply any scope
pub fn authorize(granted: &PermissionSet, required: &Permission) -> Result<(), AuthzError> {
    if granted.contains(required) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::{ADMIN, TEST_SCOPE};

    #[test]
    fn admin_role_passes_admin_gate() {
        let set = PermissionSet::new(vec![Permission::role("USER"), Permission::role("ADMIN")]);
        assert!(authorize(&set, &ADMIN).is_ok());
    }

    #[test]
    fn admin_role_does_not_imply_scope() {
        let set = PermissionSet::new(vec![Permission::role("ADMIN")]);
        assert_eq!(
            authorize(&set, &TEST_SCOPE),
            Err(AuthzError::Forbidden("SCOPE_u.test".to_string()))
        );
    }

    #[test]
    fn empty_set_is_denied_everything() {
        let set = PermissionSet::default();
        assert!(authorize(&set, &ADMIN).is_err());
        assert!(authorize(&set, &TEST_SCOPE).is_err());
    }

    #[test]
    fn scope_gate_is_case_sensitive() {
        let set = PermissionSet::new(vec![Permission::scope("U.TEST")]);
        assert!(authorize(&set, &TEST_SCOPE).is_err());
    }
}
