use std::sync::Arc;

use chrono::Utc;
use tracing::instrument;

use userhub_auth::Role;
use userhub_core::Username;

use crate::directory::{
    DirectoryError, NewAccount, NewUser, UserCredentials, UserDirectory, UserProfile,
    enabled_from_status,
};
use crate::notify::{Notifier, RegistrationNotice};

use super::password::{generate_password, hash_password};
use super::username::{numbered, username_base};

/// How many times `create_user` regenerates a username after losing an
/// insert race on the same base.
pub const MAX_CREATE_ATTEMPTS: u64 = 3;

/// Account lifecycle on top of a `UserDirectory`.
#[derive(Clone)]
pub struct AccountService {
    directory: Arc<dyn UserDirectory>,
    notifier: Arc<dyn Notifier>,
}

impl AccountService {
    pub fn new(directory: Arc<dyn UserDirectory>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            directory,
            notifier,
        }
    }

    /// Create an enabled account with a generated username and password.
    ///
    /// The plaintext password is only ever returned here; the directory
    /// stores its hash.
    #[instrument(skip(self, request), fields(role = %request.role), err)]
    pub async fn create_user(&self, request: NewUser) -> Result<UserCredentials, DirectoryError> {
        let role = request.role.trim();
        if role.is_empty() {
            return Err(DirectoryError::InvalidArgument("role must not be empty".into()));
        }
        let base = username_base(&request.full_name)?;
        let authority = Role::new(role.to_string()).stored_authority().to_string();

        let password = generate_password();
        let password_hash = hash_password(&password)
            .map_err(|e| DirectoryError::Storage(format!("password hashing failed: {e}")))?;
        let profile = request.profile();

        let mut attempt = 0;
        let username = loop {
            let taken = self.directory.count_usernames_with_prefix(&base).await?;
            let username = Username::new(numbered(&base, taken + 1 + attempt))?;

            let account = NewAccount {
                username: username.clone(),
                password_hash: password_hash.clone(),
                authority: authority.clone(),
                profile: profile.clone(),
                created_at: Utc::now(),
            };
            match self.directory.insert_account(account).await {
                Ok(()) => break username,
                Err(DirectoryError::Conflict(msg)) if attempt + 1 < MAX_CREATE_ATTEMPTS => {
                    tracing::warn!(%username, attempt, %msg, "username taken, retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        };

        tracing::info!(%username, %authority, "account created");

        let credentials = UserCredentials {
            username,
            password,
            full_name: request.full_name.trim().to_string(),
            email: request.email,
        };
        let notice = RegistrationNotice {
            username: credentials.username.clone(),
            password: credentials.password.clone(),
            full_name: credentials.full_name.clone(),
            email: credentials.email.clone(),
        };
        // The account exists at this point; a failed notice must not undo it.
        if let Err(e) = self.notifier.account_created(&notice).await {
            tracing::warn!(username = %notice.username, error = %e, "registration notice failed");
        }

        Ok(credentials)
    }

    #[instrument(skip(self, username, update), fields(username = %username), err)]
    pub async fn update_user(
        &self,
        username: &Username,
        update: &UserProfile,
    ) -> Result<(), DirectoryError> {
        self.directory
            .update_profile(username, update, Utc::now())
            .await
    }

    /// Soft delete: the account is disabled, never removed.
    #[instrument(skip(self, username), fields(username = %username), err)]
    pub async fn delete_user(&self, username: &Username) -> Result<(), DirectoryError> {
        self.directory.set_enabled(username, false).await
    }

    #[instrument(skip(self, username), fields(username = %username), err)]
    pub async fn set_status(&self, username: &Username, status: &str) -> Result<(), DirectoryError> {
        self.directory
            .set_enabled(username, enabled_from_status(status))
            .await
    }
}
