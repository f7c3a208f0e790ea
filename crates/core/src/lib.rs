//! `userhub-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! the error model, the username identifier and the paging arithmetic shared by
//! every directory backend.

pub mod error;
pub mod page;
pub mod username;

pub use error::{DomainError, DomainResult};
pub use page::{DEFAULT_PAGE_SIZE, FILTER_ROLE_ALL, Page, PageQuery, PageWindow};
pub use username::Username;
