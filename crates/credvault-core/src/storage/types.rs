//! Core data types for the storage layer.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One persisted credential row.
///
/// `encrypted_password` is an opaque authenticated-ciphertext token; the
/// storage layer never sees plaintext or key material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    /// Site or application this credential belongs to
    pub service: String,

    /// Account identifier within the service
    pub username: String,

    /// Textually encoded authenticated ciphertext
    pub encrypted_password: String,

    /// Assigned by the backend on insert, refreshed on update
    pub created_at: NaiveDateTime,
}

/// Which branch an upsert took, for user feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// A new `(service, username)` row was inserted.
    Created,
    /// An existing row's password and timestamp were replaced in place.
    Updated,
}

impl SaveOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaveOutcome::Created => "created",
            SaveOutcome::Updated => "updated",
        }
    }
}

impl std::fmt::Display for SaveOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_outcome_display() {
        assert_eq!(SaveOutcome::Created.to_string(), "created");
        assert_eq!(SaveOutcome::Updated.to_string(), "updated");
    }
}
