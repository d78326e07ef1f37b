//! Cryptographic operations for credvault.
//!
//! This module provides the key lifecycle and the password cipher using
//! well-audited libraries:
//! - **ChaCha20-Poly1305**: authenticated encryption (confidentiality plus
//!   tamper detection in one ciphertext)
//! - **getrandom**: OS-level randomness for key generation
//!
//! ## Security Model
//!
//! - One 256-bit symmetric key per deployment, stored base64-encoded in a
//!   single file with restrictive permissions
//! - Fresh random nonce per encryption; tokens are self-contained
//! - Key material zeroized from memory on drop, redacted from `Debug`
//! - No key bytes in logs or error text
//!
//! ## Threat Model
//!
//! We defend against:
//! - Theft of the database contents without the key file
//! - Tampered or corrupted ciphertext being returned as valid
//!
//! We do NOT defend against:
//! - An attacker with read access to the key file
//! - Compromised OS / keylogger

pub mod cipher;
pub mod keyfile;

pub use cipher::Cipher;
pub use keyfile::{EncryptionKey, KeyProvenance, KeyStore, KEY_LENGTH};
