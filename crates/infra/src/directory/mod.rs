//! User directory boundary.
//!
//! The directory is a read-mostly view over three relations joined on
//! username: `users` (account + enabled flag), `userinfo` (profile) and
//! `authorities` (exactly one authority per account). Listings are filtered,
//! ordered by username and paged; deletion is always a soft delete.

pub mod filter;
pub mod in_memory;
pub mod model;
pub mod postgres;

use chrono::{DateTime, Utc};
use thiserror::Error;

use userhub_core::{DomainError, Page, PageQuery, Username};

pub use filter::{UserFilter, escape_like};
pub use in_memory::InMemoryUserDirectory;
pub use model::{
    NewAccount, NewUser, STATUS_ACTIVE, UserCredentials, UserProfile, UserRecord,
    enabled_from_status,
};
pub use postgres::PostgresUserDirectory;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("user not found: {0}")]
    NotFound(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage failure: {0}")]
    Storage(String),
}

impl From<DomainError> for DirectoryError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => Self::InvalidArgument(msg),
        }
    }
}

/// Queryable user directory.
///
/// Implementations must:
/// - reject `page_size <= 0` and `page_no < 0` with `InvalidArgument`
/// - clamp a page past the end to the last page
/// - order listings by username ascending
/// - report unknown usernames as `NotFound`, never as an empty record
#[async_trait::async_trait]
pub trait UserDirectory: Send + Sync {
    /// Filtered, paginated listing.
    async fn list_users(&self, query: &PageQuery) -> Result<Page<UserRecord>, DirectoryError>;

    /// Single account by exact username.
    async fn get_user(&self, username: &Username) -> Result<UserRecord, DirectoryError>;

    /// Number of accounts whose username starts with `prefix` (literal match).
    async fn count_usernames_with_prefix(&self, prefix: &str) -> Result<u64, DirectoryError>;

    /// Insert account, authority and profile rows atomically.
    ///
    /// A taken username is reported as `Conflict`.
    async fn insert_account(&self, account: NewAccount) -> Result<(), DirectoryError>;

    /// Overwrite the supplied profile fields and stamp `updated_at`.
    async fn update_profile(
        &self,
        username: &Username,
        update: &UserProfile,
        updated_at: DateTime<Utc>,
    ) -> Result<(), DirectoryError>;

    /// Enable or disable an account.
    async fn set_enabled(&self, username: &Username, enabled: bool) -> Result<(), DirectoryError>;
}
