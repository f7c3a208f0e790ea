//! Infrastructure layer: the user directory (Postgres and in-memory), account
//! lifecycle, and the registration notifier seam.

pub mod accounts;
pub mod directory;
pub mod notify;

pub use accounts::AccountService;
pub use directory::{DirectoryError, InMemoryUserDirectory, PostgresUserDirectory, UserDirectory};
pub use notify::{LogNotifier, Notifier, RegistrationNotice};
