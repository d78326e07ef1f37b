//! Error types for credvault core operations.
//!
//! This module defines the error hierarchy for all core operations.
//! Expected outcomes (`NotFound`, `EmptyInput`, `AuthenticationFailed`) and
//! true faults (`ConnectionFailure`, `Database`, `Io`) are distinct,
//! matchable kinds; the facade is the single place that decides what is
//! user-visible.

use thiserror::Error;

/// Result type alias for credvault operations.
pub type Result<T> = std::result::Result<T, VaultError>;

/// Core error type for credvault operations.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Backend unreachable or misconfigured. Fatal to startup, never retried.
    #[error("Database connection failed: {0}")]
    ConnectionFailure(String),

    /// Key file malformed. Recovered automatically by regeneration, but
    /// surfaced as a warning since it invalidates existing rows.
    #[error("Invalid key file: {0}")]
    InvalidKeyFormat(String),

    /// Caller-supplied field was empty (after trimming, for identity fields).
    #[error("{0} cannot be empty")]
    EmptyInput(&'static str),

    /// Ciphertext integrity tag did not verify: wrong key or corrupted data.
    ///
    /// Never conflated with a decode error; credential listings recover from
    /// this per row instead of aborting.
    #[error("Decryption failed: wrong encryption key or corrupted data")]
    AuthenticationFailed,

    /// Ciphertext could not be decoded into nonce and payload.
    #[error("Malformed ciphertext: {0}")]
    MalformedCiphertext(String),

    /// Delete target missing. A normal negative result, not a crash.
    #[error("No credential found for {service} ({username})")]
    NotFound {
        service: String,
        username: String,
    },

    /// Uniqueness conflict the upsert semantics should have prevented.
    #[error("Duplicate credential for {service} ({username})")]
    DuplicateViolation {
        service: String,
        username: String,
    },

    /// Configuration file missing, unreadable, or incomplete.
    #[error("Configuration error: {0}")]
    Config(String),

    /// MySQL error outside the specifically mapped cases.
    #[error("Database error: {source}")]
    Database {
        #[from]
        source: mysql::Error,
    },

    /// I/O error
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Generic error (fallback)
    #[error("{0}")]
    Other(String),
}
