//! Credential store trait definition.
//!
//! The `CredentialStore` trait is the seam between the facade and the
//! backing table. The production backend is MySQL; tests substitute an
//! in-memory implementation.

use super::types::{Credential, SaveOutcome};
use crate::error::Result;

/// Interface over the `(service, username, encrypted_password, created_at)`
/// table.
///
/// All implementations must ensure:
/// - At most one live row per `(service, username)` pair, enforced by the
///   backend's own constraint mechanism
/// - Identity fields trimmed and non-empty before any write or delete
/// - Mutations atomic per call (single-row effect, single commit)
/// - Only opaque encrypted tokens in the password column, never plaintext
pub trait CredentialStore {
    /// Insert or update the row for `(service, username)`.
    ///
    /// # Returns
    ///
    /// Which branch occurred, for user feedback.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::EmptyInput` if either identity field is empty
    /// after trimming, `VaultError::DuplicateViolation` if the backend
    /// raises a uniqueness conflict anyway.
    fn upsert(
        &mut self,
        service: &str,
        username: &str,
        encrypted_password: &str,
    ) -> Result<SaveOutcome>;

    /// All rows, ordered by `(service, username)` ascending.
    fn list_all(&mut self) -> Result<Vec<Credential>>;

    /// Rows whose `service` contains `term` as a substring, same ordering
    /// as `list_all`. An empty term matches everything.
    fn search(&mut self, term: &str) -> Result<Vec<Credential>>;

    /// Remove exactly the row for `(service, username)`.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::NotFound` if no row matches the pair.
    fn delete(&mut self, service: &str, username: &str) -> Result<()>;

    /// Connectivity probe.
    fn test_connection(&mut self) -> Result<()>;

    /// Release the backing connection.
    fn close(self) -> Result<()>
    where
        Self: Sized;
}
