//! # credvault Core
//!
//! Core library for credvault - a single-user desktop utility for storing
//! and retrieving service credentials with passwords encrypted at rest.
//!
//! This crate provides the key lifecycle, the password cipher, the
//! credential store, and the application facade, independent of the desktop
//! form layer that consumes them.
//!
//! ## Architecture
//!
//! - **crypto**: key file lifecycle and the authenticated password cipher
//! - **storage**: the credential table behind the `CredentialStore` trait,
//!   backed by MySQL
//! - **vault**: the facade orchestrating save / list / search / delete
//! - **config**: the static connection and key-path configuration
//! - **error**: one error type across all of the above

pub mod config;
pub mod crypto;
pub mod error;
pub mod storage;
pub mod vault;

pub use config::{read_config, DatabaseConfig, EncryptionConfig, VaultConfig};
pub use crypto::{Cipher, EncryptionKey, KeyProvenance, KeyStore};
pub use error::{Result, VaultError};
pub use storage::{Credential, CredentialStore, MysqlStore, SaveOutcome};
pub use vault::{CredentialEntry, PasswordField, Vault};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
