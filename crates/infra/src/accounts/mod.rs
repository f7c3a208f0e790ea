//! Account lifecycle: create (generated username + password), update, soft
//! delete and status toggle.

pub mod password;
pub mod service;
pub mod username;

pub use password::{generate_password, hash_password, verify_password};
pub use service::{AccountService, MAX_CREATE_ATTEMPTS};
pub use username::username_base;
