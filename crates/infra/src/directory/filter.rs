//! Listing predicates, shared by the SQL and in-memory directories.

use sqlx::{Postgres, QueryBuilder};

use userhub_core::PageQuery;

use super::model::UserRecord;

/// Predicates derived from a `PageQuery`, AND-combined.
///
/// - text: case-insensitive substring of username, full name, email or department
/// - role: case-sensitive exact match on the authority
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserFilter<'a> {
    text: Option<&'a str>,
    role: Option<&'a str>,
}

impl<'a> UserFilter<'a> {
    pub fn from_query(query: &'a PageQuery) -> Self {
        Self {
            text: query.text_filter(),
            role: query.role_filter(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.role.is_none()
    }

    /// `%text%` with LIKE metacharacters escaped, so the match is literal.
    pub fn like_pattern(&self) -> Option<String> {
        self.text.map(|t| format!("%{}%", escape_like(t)))
    }

    /// Append a `WHERE` clause (or nothing) to a query over the directory join.
    ///
    /// Expects the aliases `u` (users), `i` (userinfo) and `a` (authorities).
    pub fn push_where<'args>(&self, qb: &mut QueryBuilder<'args, Postgres>) {
        let mut keyword = " WHERE ";

        if let Some(pattern) = self.like_pattern() {
            qb.push(keyword);
            qb.push("(u.username ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR i.full_name ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR i.email ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR i.department ILIKE ");
            qb.push_bind(pattern);
            qb.push(")");
            keyword = " AND ";
        }

        if let Some(role) = self.role {
            qb.push(keyword);
            qb.push("a.authority = ");
            qb.push_bind(role.to_string());
        }
    }

    /// Evaluate the same predicates against an already-joined record.
    pub fn matches(&self, user: &UserRecord) -> bool {
        if let Some(text) = self.text {
            let needle = text.to_lowercase();
            let hit = |field: Option<&str>| field.is_some_and(|v| v.to_lowercase().contains(&needle));
            let any = hit(Some(user.username.as_str()))
                || hit(user.profile.full_name.as_deref())
                || hit(user.profile.email.as_deref())
                || hit(user.profile.department.as_deref());
            if !any {
                return false;
            }
        }

        if let Some(role) = self.role {
            if user.authority.as_deref() != Some(role) {
                return false;
            }
        }

        true
    }
}

/// Escape `\`, `%` and `_` for use inside a LIKE pattern (default escape `\`).
pub fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
