//! Encryption-key lifecycle.
//!
//! Exactly one symmetric key is active per deployment of the store. The key
//! lives in a single file as one base64 line; absence triggers generation,
//! presence triggers validation. A file that fails validation is replaced
//! with a fresh key and the replacement is surfaced to the caller, since it
//! makes every previously encrypted row unreadable.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::{info, warn};
use zeroize::ZeroizeOnDrop;

use crate::error::{Result, VaultError};

/// Length of the symmetric key in bytes (256 bits).
pub const KEY_LENGTH: usize = 32;

/// The symmetric key all credential encryption runs under.
///
/// Key material is zeroized from memory when dropped.
#[derive(Clone, ZeroizeOnDrop)]
pub struct EncryptionKey {
    key: [u8; KEY_LENGTH],
}

impl EncryptionKey {
    pub(crate) fn from_bytes(bytes: [u8; KEY_LENGTH]) -> Self {
        Self { key: bytes }
    }

    /// Get a reference to the raw key bytes.
    ///
    /// # Security
    ///
    /// Avoid storing or logging this value. Use only to build a cipher.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// How `load_or_create` obtained the key.
///
/// `Regenerated` means an existing key file failed validation and was
/// overwritten; every row encrypted under the old key is now unreadable and
/// the caller should warn the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyProvenance {
    /// An existing key file was read and validated.
    Loaded,
    /// No key file existed; a fresh key was generated.
    Generated,
    /// An existing key file was invalid and has been replaced.
    Regenerated,
}

impl KeyProvenance {
    /// True when a previously existing key was overwritten.
    pub fn replaced_existing(&self) -> bool {
        matches!(self, KeyProvenance::Regenerated)
    }
}

/// Owns the key file path and its byte content.
pub struct KeyStore {
    path: PathBuf,
}

impl KeyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the key from the configured file, or create one.
    ///
    /// An invalid key file (wrong length, not base64, not UTF-8) is replaced
    /// with a freshly generated key; the returned `KeyProvenance` reports
    /// that so the caller can warn about the now-unreadable rows. I/O errors
    /// propagate unchanged.
    pub fn load_or_create(&self) -> Result<(EncryptionKey, KeyProvenance)> {
        if !self.path.exists() {
            info!(path = %self.path.display(), "key file absent, generating a new key");
            let key = self.generate()?;
            return Ok((key, KeyProvenance::Generated));
        }

        match self.read() {
            Ok(key) => {
                info!(path = %self.path.display(), "encryption key loaded and validated");
                Ok((key, KeyProvenance::Loaded))
            }
            Err(VaultError::InvalidKeyFormat(reason)) => {
                warn!(
                    path = %self.path.display(),
                    %reason,
                    "key file invalid, replacing it; previously encrypted rows are now unreadable"
                );
                let key = self.generate()?;
                Ok((key, KeyProvenance::Regenerated))
            }
            Err(other) => Err(other),
        }
    }

    /// Read and validate the key file: strip surrounding whitespace, decode
    /// base64, and require exactly `KEY_LENGTH` bytes.
    fn read(&self) -> Result<EncryptionKey> {
        let raw = fs::read(&self.path)?;
        let text = std::str::from_utf8(&raw)
            .map_err(|_| VaultError::InvalidKeyFormat("key file is not valid UTF-8".to_string()))?;

        let decoded = STANDARD
            .decode(text.trim())
            .map_err(|e| VaultError::InvalidKeyFormat(format!("key is not valid base64: {}", e)))?;

        let bytes: [u8; KEY_LENGTH] = decoded.try_into().map_err(|v: Vec<u8>| {
            VaultError::InvalidKeyFormat(format!(
                "decoded key is {} bytes (expected {})",
                v.len(),
                KEY_LENGTH
            ))
        })?;

        Ok(EncryptionKey::from_bytes(bytes))
    }

    /// Generate a fresh random key and write it to the key file, overwriting
    /// any existing content. Nothing but the encoded key touches this file.
    fn generate(&self) -> Result<EncryptionKey> {
        let mut bytes = [0u8; KEY_LENGTH];
        getrandom::getrandom(&mut bytes)
            .map_err(|e| VaultError::Other(format!("failed to generate key bytes: {}", e)))?;

        ensure_parent_dir(&self.path)?;
        let encoded = STANDARD.encode(bytes);
        fs::write(&self.path, format!("{}\n", encoded))?;
        set_file_permissions(&self.path)?;

        info!(path = %self.path.display(), "new encryption key created");
        Ok(EncryptionKey::from_bytes(bytes))
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn set_file_permissions(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(path)?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(path, perms)?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_generates_key_when_absent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("encryption.key");
        let store = KeyStore::new(&path);

        let (key, provenance) = store.load_or_create().unwrap();

        assert_eq!(provenance, KeyProvenance::Generated);
        assert!(path.exists());
        assert_eq!(key.as_bytes().len(), KEY_LENGTH);

        // One base64 line, 44 characters for 32 bytes.
        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.trim().len(), 44);
    }

    #[test]
    fn test_loads_existing_key_unchanged() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("encryption.key");
        let store = KeyStore::new(&path);

        let (first, _) = store.load_or_create().unwrap();
        let (second, provenance) = store.load_or_create().unwrap();

        assert_eq!(provenance, KeyProvenance::Loaded);
        assert_eq!(first.as_bytes(), second.as_bytes());
    }

    #[test]
    fn test_surrounding_whitespace_tolerated() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("encryption.key");
        let store = KeyStore::new(&path);

        let (original, _) = store.load_or_create().unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        fs::write(&path, format!("  {}\n\n", contents.trim())).unwrap();

        let (reloaded, provenance) = store.load_or_create().unwrap();
        assert_eq!(provenance, KeyProvenance::Loaded);
        assert_eq!(original.as_bytes(), reloaded.as_bytes());
    }

    #[test]
    fn test_wrong_length_key_regenerated() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("encryption.key");
        let store = KeyStore::new(&path);

        // Valid base64, wrong decoded length.
        fs::write(&path, STANDARD.encode([0u8; 16])).unwrap();

        let (key, provenance) = store.load_or_create().unwrap();
        assert_eq!(provenance, KeyProvenance::Regenerated);
        assert_eq!(key.as_bytes().len(), KEY_LENGTH);

        // The file now holds the replacement key.
        let (reloaded, provenance) = store.load_or_create().unwrap();
        assert_eq!(provenance, KeyProvenance::Loaded);
        assert_eq!(key.as_bytes(), reloaded.as_bytes());
    }

    #[test]
    fn test_non_base64_key_regenerated() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("encryption.key");
        let store = KeyStore::new(&path);

        fs::write(&path, "definitely *not* a key!").unwrap();

        let (_, provenance) = store.load_or_create().unwrap();
        assert_eq!(provenance, KeyProvenance::Regenerated);
    }

    #[test]
    fn test_non_utf8_key_regenerated() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("encryption.key");
        let store = KeyStore::new(&path);

        fs::write(&path, [0xFFu8, 0xFE, 0x00, 0x01]).unwrap();

        let (_, provenance) = store.load_or_create().unwrap();
        assert_eq!(provenance, KeyProvenance::Regenerated);
    }

    #[cfg(unix)]
    #[test]
    fn test_key_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("encryption.key");
        KeyStore::new(&path).load_or_create().unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_debug_redacts_key_material() {
        let key = EncryptionKey::from_bytes([0x42; KEY_LENGTH]);
        let debug_output = format!("{:?}", key);

        assert!(debug_output.contains("REDACTED"));
        assert!(!debug_output.contains(&hex::encode(&key.as_bytes()[..4])));
    }
}
