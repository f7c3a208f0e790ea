//! Directory records and the inputs that create or change them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use userhub_core::Username;

/// Mutable profile fields (the `userinfo` table).
///
/// Every field is optional: an account created outside this service may have
/// no profile row at all, and a profile update only touches supplied fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub full_name: Option<String>,
    pub picture: Option<String>,
    pub email: Option<String>,
    pub email_verified: Option<bool>,
    pub gender: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub phone_number: Option<String>,
    pub phone_number_verified: Option<bool>,
    pub address: Option<String>,
    pub position: Option<String>,
    pub department: Option<String>,
    pub note: Option<String>,
}

impl UserProfile {
    /// Overwrite every field that `update` supplies; leave the rest.
    pub fn apply(&mut self, update: &UserProfile) {
        macro_rules! merge {
            ($($field:ident),* $(,)?) => {
                $(if update.$field.is_some() { self.$field = update.$field.clone(); })*
            };
        }
        merge!(
            full_name,
            picture,
            email,
            email_verified,
            gender,
            birthdate,
            phone_number,
            phone_number_verified,
            address,
            position,
            department,
            note,
        );
    }
}

/// One row of the users ⟕ userinfo ⟕ authorities join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub username: Username,
    pub enabled: bool,
    pub authority: Option<String>,
    #[serde(flatten)]
    pub profile: UserProfile,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Account creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub full_name: String,
    pub role: String,
    pub email: Option<String>,
    pub gender: Option<String>,
    pub dob: Option<NaiveDate>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub department: Option<String>,
    pub note: Option<String>,
}

impl NewUser {
    /// Initial profile; the requested role doubles as the position.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            full_name: Some(self.full_name.trim().to_string()),
            email: self.email.clone(),
            gender: self.gender.clone(),
            birthdate: self.dob,
            phone_number: self.phone_number.clone(),
            address: self.address.clone(),
            position: Some(self.role.clone()),
            department: self.department.clone(),
            note: self.note.clone(),
            ..Default::default()
        }
    }
}

/// Fully prepared account rows, ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub username: Username,
    pub password_hash: String,
    pub authority: String,
    pub profile: UserProfile,
    pub created_at: DateTime<Utc>,
}

/// Credentials handed back once, right after creation.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCredentials {
    pub username: Username,
    pub password: String,
    pub full_name: String,
    pub email: Option<String>,
}

impl core::fmt::Debug for UserCredentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("UserCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("full_name", &self.full_name)
            .field("email", &self.email)
            .finish()
    }
}

/// Status value that enables an account; any other value disables it.
pub const STATUS_ACTIVE: &str = "active";

pub fn enabled_from_status(status: &str) -> bool {
    status == STATUS_ACTIVE
}
