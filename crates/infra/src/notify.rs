//! Registration notifications.
//!
//! Delivery (mail, chat, ...) lives outside this service; `Notifier` is the
//! seam. `LogNotifier` only records that a notice would have been sent.

use thiserror::Error;

use userhub_core::Username;

/// Sent once per created account.
#[derive(Clone, PartialEq, Eq)]
pub struct RegistrationNotice {
    pub username: Username,
    pub password: String,
    pub full_name: String,
    pub email: Option<String>,
}

impl core::fmt::Debug for RegistrationNotice {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RegistrationNotice")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("full_name", &self.full_name)
            .field("email", &self.email)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("recipient has no address: {0}")]
    NoRecipient(String),

    #[error("delivery failed: {0}")]
    Delivery(String),
}

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn account_created(&self, notice: &RegistrationNotice) -> Result<(), NotifyError>;
}

/// Notifier that writes a log line and nothing else.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    async fn account_created(&self, notice: &RegistrationNotice) -> Result<(), NotifyError> {
        let Some(email) = notice.email.as_deref() else {
            return Err(NotifyError::NoRecipient(notice.username.to_string()));
        };
        tracing::info!(
            username = %notice.username,
            email = %email,
            "registration notice queued"
        );
        Ok(())
    }
}
