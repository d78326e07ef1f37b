//! Password encryption and decryption.
//!
//! Wraps the deployment key into a ChaCha20-Poly1305 cipher context over
//! UTF-8 text. Tokens are base64 of `nonce ‖ ciphertext ‖ tag`, so each one
//! is self-contained and the Poly1305 tag makes tampering or wrong-key use
//! detectable instead of silently wrong.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chacha20poly1305::aead::{Aead, KeyInit, OsRng};
use chacha20poly1305::{AeadCore, ChaCha20Poly1305, Key, Nonce};
use tracing::debug;

use crate::crypto::keyfile::EncryptionKey;
use crate::error::{Result, VaultError};

/// ChaCha20-Poly1305 nonce length in bytes.
const NONCE_LENGTH: usize = 12;

/// Poly1305 authentication tag length in bytes.
const TAG_LENGTH: usize = 16;

/// Cipher context bound to the deployment key.
///
/// Built once from an [`EncryptionKey`]; stateless thereafter. Holds only
/// the derived cipher state, never the key file path or its raw contents.
pub struct Cipher {
    aead: ChaCha20Poly1305,
}

impl Cipher {
    pub fn new(key: &EncryptionKey) -> Self {
        Self {
            aead: ChaCha20Poly1305::new(Key::from_slice(key.as_bytes())),
        }
    }

    /// Encrypt a plaintext password into a textual token.
    ///
    /// A fresh random nonce is drawn per call, so encrypting the same
    /// plaintext twice yields different tokens.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::EmptyInput` if the plaintext is empty.
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        if plaintext.is_empty() {
            return Err(VaultError::EmptyInput("plaintext"));
        }

        let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);
        let ciphertext = self
            .aead
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| VaultError::Other("encryption failed".to_string()))?;

        let mut blob = Vec::with_capacity(NONCE_LENGTH + ciphertext.len());
        blob.extend_from_slice(nonce.as_slice());
        blob.extend_from_slice(&ciphertext);

        Ok(STANDARD.encode(blob))
    }

    /// Decrypt a token produced by [`Cipher::encrypt`].
    ///
    /// # Errors
    ///
    /// - `VaultError::EmptyInput` if the token is empty
    /// - `VaultError::MalformedCiphertext` if the token cannot be decoded
    ///   into nonce and payload, or the payload is not UTF-8
    /// - `VaultError::AuthenticationFailed` if the integrity tag does not
    ///   verify (wrong key or corrupted data)
    pub fn decrypt(&self, token: &str) -> Result<String> {
        if token.is_empty() {
            return Err(VaultError::EmptyInput("ciphertext"));
        }

        let blob = STANDARD
            .decode(token.trim())
            .map_err(|e| VaultError::MalformedCiphertext(format!("invalid base64: {}", e)))?;

        if blob.len() < NONCE_LENGTH + TAG_LENGTH {
            return Err(VaultError::MalformedCiphertext(format!(
                "token too short: {} bytes",
                blob.len()
            )));
        }

        let (nonce, ciphertext) = blob.split_at(NONCE_LENGTH);
        let plaintext = self
            .aead
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| {
                debug!("ciphertext failed authentication");
                VaultError::AuthenticationFailed
            })?;

        String::from_utf8(plaintext).map_err(|_| {
            VaultError::MalformedCiphertext("decrypted payload is not valid UTF-8".to_string())
        })
    }

    /// Encrypt-then-decrypt probe, run once at startup as a sanity check on
    /// the cipher context.
    pub fn self_test(&self) -> Result<()> {
        const PROBE: &str = "credvault-cipher-probe";

        let token = self.encrypt(PROBE)?;
        let round = self.decrypt(&token)?;
        if round != PROBE {
            return Err(VaultError::Other("cipher self-test mismatch".to_string()));
        }
        debug!("cipher self-test passed");
        Ok(())
    }
}
