//! Application facade.
//!
//! Orchestrates the key store, cipher, and credential store behind the
//! operations the (excluded) form layer consumes. This is the single place
//! that decides what is user-visible: expected negatives stay typed errors,
//! per-row decrypt failures become inline placeholders, and no error text
//! carries key material or ciphertext.

use chrono::NaiveDateTime;
use tracing::warn;

use crate::config::VaultConfig;
use crate::crypto::{Cipher, KeyProvenance, KeyStore};
use crate::error::{Result, VaultError};
use crate::storage::validation::trimmed_identity;
use crate::storage::{Credential, CredentialStore, MysqlStore, SaveOutcome};

/// One credential as presented to the form layer.
#[derive(Debug, Clone, PartialEq)]
pub struct CredentialEntry {
    pub service: String,
    pub username: String,
    pub password: PasswordField,
    pub created_at: NaiveDateTime,
}

/// Outcome of decrypting one row's password.
///
/// A listing's contract explicitly allows partial success: rows that fail
/// decryption are flagged instead of aborting the call.
#[derive(Debug, Clone, PartialEq)]
pub enum PasswordField {
    /// The recovered plaintext password.
    Plaintext(String),
    /// The password could not be decrypted; holds a user-presentable reason.
    Unreadable(String),
}

impl PasswordField {
    pub fn is_readable(&self) -> bool {
        matches!(self, PasswordField::Plaintext(_))
    }

    pub fn as_plaintext(&self) -> Option<&str> {
        match self {
            PasswordField::Plaintext(value) => Some(value),
            PasswordField::Unreadable(_) => None,
        }
    }
}

/// The credential vault: cipher plus store behind the user operations.
///
/// Generic over the store so tests (and future backends) can substitute the
/// persistence layer; `Vault::open` wires the production MySQL store.
pub struct Vault<S: CredentialStore> {
    store: S,
    cipher: Cipher,
    key_provenance: KeyProvenance,
}

impl Vault<MysqlStore> {
    /// Load or create the key, build the cipher, connect the store.
    ///
    /// Fatal on connection or configuration problems. A key replacement is
    /// not fatal; it is reported through [`Vault::key_was_replaced`].
    pub fn open(config: &VaultConfig) -> Result<Self> {
        let key_store = KeyStore::new(&config.encryption.key_path);
        let (key, provenance) = key_store.load_or_create()?;

        let cipher = Cipher::new(&key);
        cipher.self_test()?;

        let store = MysqlStore::connect(&config.database)?;

        if provenance.replaced_existing() {
            warn!("encryption key was replaced; previously stored passwords are unreadable");
        }

        Ok(Self::with_parts(store, cipher, provenance))
    }
}

impl<S: CredentialStore> Vault<S> {
    /// Assemble a vault from already-built parts.
    pub fn with_parts(store: S, cipher: Cipher, key_provenance: KeyProvenance) -> Self {
        Self {
            store,
            cipher,
            key_provenance,
        }
    }

    /// True when startup replaced an invalid key file. The form layer should
    /// warn that all previously encrypted rows are now unreadable.
    pub fn key_was_replaced(&self) -> bool {
        self.key_provenance.replaced_existing()
    }

    /// Encrypt and persist a credential.
    ///
    /// All three fields must be non-empty (identity fields after trimming).
    /// Encryption completes before any persistence call, so rows are never
    /// partially written.
    pub fn save_credential(
        &mut self,
        service: &str,
        username: &str,
        password: &str,
    ) -> Result<SaveOutcome> {
        let (service, username) = trimmed_identity(service, username)?;
        if password.is_empty() {
            return Err(VaultError::EmptyInput("password"));
        }

        let token = self.cipher.encrypt(password)?;
        self.store.upsert(service, username, &token)
    }

    /// All credentials with passwords decrypted, ordered by
    /// `(service, username)`.
    pub fn list_credentials(&mut self) -> Result<Vec<CredentialEntry>> {
        let rows = self.store.list_all()?;
        self.decrypt_rows(rows)
    }

    /// Credentials whose service contains `term`, with the same per-row
    /// decrypt-failure tolerance as `list_credentials`.
    pub fn find_credentials(&mut self, term: &str) -> Result<Vec<CredentialEntry>> {
        let rows = self.store.search(term)?;
        self.decrypt_rows(rows)
    }

    /// Delete the credential for `(service, username)`.
    ///
    /// `VaultError::NotFound` is a normal negative result, distinct from
    /// other failures.
    pub fn remove_credential(&mut self, service: &str, username: &str) -> Result<()> {
        self.store.delete(service, username)
    }

    /// Probe the backend connection.
    pub fn test_connection(&mut self) -> Result<()> {
        self.store.test_connection()
    }

    /// Release the backing connection.
    pub fn close(self) -> Result<()> {
        self.store.close()
    }

    fn decrypt_rows(&self, rows: Vec<Credential>) -> Result<Vec<CredentialEntry>> {
        rows.into_iter()
            .map(|row| {
                let password = match self.cipher.decrypt(&row.encrypted_password) {
                    Ok(plaintext) => PasswordField::Plaintext(plaintext),
                    Err(
                        e @ (VaultError::AuthenticationFailed
                        | VaultError::MalformedCiphertext(_)
                        | VaultError::EmptyInput(_)),
                    ) => {
                        warn!(
                            service = %row.service,
                            username = %row.username,
                            "stored password could not be decrypted: {}", e
                        );
                        PasswordField::Unreadable(e.to_string())
                    }
                    Err(other) => return Err(other),
                };

                Ok(CredentialEntry {
                    service: row.service,
                    username: row.username,
                    password,
                    created_at: row.created_at,
                })
            })
            .collect()
    }
}
