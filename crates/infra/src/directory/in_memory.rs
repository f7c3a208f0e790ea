use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use userhub_core::{Page, PageQuery, PageWindow, Username};

use super::filter::UserFilter;
use super::model::{NewAccount, UserProfile, UserRecord};
use super::{DirectoryError, UserDirectory};

#[derive(Debug, Clone)]
struct StoredAccount {
    record: UserRecord,
    password_hash: String,
}

/// In-memory user directory for tests/dev.
///
/// Keyed by username in a `BTreeMap`, so iteration order is the listing order.
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    inner: RwLock<BTreeMap<Username, StoredAccount>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored password hash, if the account exists.
    pub fn password_hash(&self, username: &Username) -> Result<Option<String>, DirectoryError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(username).map(|a| a.password_hash.clone()))
    }

    pub fn len(&self) -> Result<usize, DirectoryError> {
        Ok(self.inner.read().map_err(|_| poisoned())?.len())
    }

    pub fn is_empty(&self) -> Result<bool, DirectoryError> {
        Ok(self.len()? == 0)
    }
}

fn poisoned() -> DirectoryError {
    DirectoryError::Storage("in-memory directory lock poisoned".to_string())
}

#[async_trait::async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn list_users(&self, query: &PageQuery) -> Result<Page<UserRecord>, DirectoryError> {
        query.validate()?;
        let filter = UserFilter::from_query(query);

        let map = self.inner.read().map_err(|_| poisoned())?;
        let matching: Vec<&UserRecord> = map
            .values()
            .map(|a| &a.record)
            .filter(|r| filter.matches(r))
            .collect();

        let window = PageWindow::clamp(query.page_no, query.page_size, matching.len() as u64)?;
        let content = matching
            .into_iter()
            .skip(window.offset() as usize)
            .take(window.limit() as usize)
            .cloned()
            .collect();

        Ok(Page::new(content, window))
    }

    async fn get_user(&self, username: &Username) -> Result<UserRecord, DirectoryError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        map.get(username)
            .map(|a| a.record.clone())
            .ok_or_else(|| DirectoryError::NotFound(username.to_string()))
    }

    async fn count_usernames_with_prefix(&self, prefix: &str) -> Result<u64, DirectoryError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.keys().filter(|u| u.as_str().starts_with(prefix)).count() as u64)
    }

    async fn insert_account(&self, account: NewAccount) -> Result<(), DirectoryError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        if map.contains_key(&account.username) {
            return Err(DirectoryError::Conflict(format!(
                "username already exists: {}",
                account.username
            )));
        }

        let record = UserRecord {
            username: account.username.clone(),
            enabled: true,
            authority: Some(account.authority),
            profile: account.profile,
            created_at: Some(account.created_at),
            updated_at: Some(account.created_at),
        };
        map.insert(
            account.username,
            StoredAccount {
                record,
                password_hash: account.password_hash,
            },
        );
        Ok(())
    }

    async fn update_profile(
        &self,
        username: &Username,
        update: &UserProfile,
        updated_at: DateTime<Utc>,
    ) -> Result<(), DirectoryError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        let account = map
            .get_mut(username)
            .ok_or_else(|| DirectoryError::NotFound(username.to_string()))?;

        account.record.profile.apply(update);
        account.record.created_at.get_or_insert(updated_at);
        account.record.updated_at = Some(updated_at);
        Ok(())
    }

    async fn set_enabled(&self, username: &Username, enabled: bool) -> Result<(), DirectoryError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        let account = map
            .get_mut(username)
            .ok_or_else(|| DirectoryError::NotFound(username.to_string()))?;
        account.record.enabled = enabled;
        Ok(())
    }
}
