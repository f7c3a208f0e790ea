use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Claim carrying directory roles (e.g. `["ADMIN", "USER"]`).
pub const ROLES_CLAIM: &str = "roles";

/// Standard OAuth2 scope claim.
pub const SCOPE_CLAIM: &str = "scope";

/// Claims of a token that has already passed signature/issuer verification.
///
/// This is transport-agnostic: whatever verified the token hands over the
/// decoded claim map and nothing else.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VerifiedClaims(Map<String, Value>);

impl VerifiedClaims {
    pub fn new(claims: Map<String, Value>) -> Self {
        Self(claims)
    }

    /// Build from a JSON value; anything other than an object is rejected.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Subject (`sub`) of the token, if present.
    pub fn subject(&self) -> Option<&str> {
        self.get("sub").and_then(Value::as_str)
    }

    /// Read a claim as an ordered list of strings.
    ///
    /// - array: entries in order (non-string scalars are stringified, nulls skipped)
    /// - string: split on whitespace (space-delimited `scope` form)
    /// - any other value (number, bool, object): a single stringified entry
    /// - absent or `null`: `None`
    ///
    /// Only absence yields `None`; an empty array is *present* and yields
    /// `Some(vec![])`.
    pub fn string_list(&self, name: &str) -> Option<Vec<String>> {
        match self.get(name)? {
            Value::Array(items) => Some(
                items
                    .iter()
                    .filter_map(|v| match v {
                        Value::String(s) => Some(s.clone()),
                        Value::Null => None,
                        other => Some(other.to_string()),
                    })
                    .collect(),
            ),
            Value::String(s) => Some(s.split_whitespace().map(str::to_string).collect()),
            Value::Null => None,
            other => Some(vec![other.to_string()]),
        }
    }
}

impl From<Map<String, Value>> for VerifiedClaims {
    fn from(value: Map<String, Value>) -> Self {
        Self(value)
    }
}
