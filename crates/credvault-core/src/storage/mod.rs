//! Credential persistence layer.
//!
//! - **traits**: the `CredentialStore` interface the facade is written
//!   against
//! - **types**: the persisted data model
//! - **mysql**: the MySQL-backed implementation
//! - **validation**: identity-field and search-term hygiene shared by
//!   backends

pub mod mysql;
pub mod traits;
pub mod types;
pub mod validation;

pub use mysql::MysqlStore;
pub use traits::CredentialStore;
pub use types::{Credential, SaveOutcome};
