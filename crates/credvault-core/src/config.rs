//! Static configuration for the vault.
//!
//! The (excluded) application shell owns where the configuration file lives;
//! this module owns its shape. Required database options fail fast at load
//! time, before any connection attempt.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, VaultError};

/// Top-level configuration: database connection plus encryption-key location.
#[derive(Debug, Serialize, Deserialize)]
pub struct VaultConfig {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub encryption: EncryptionConfig,
}

/// Connection parameters for the MySQL backend.
///
/// `host`, `user`, `password`, and `database` are required; `charset`
/// defaults to `utf8mb4`. Unrecognized options are rejected.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    pub host: String,
    pub user: String,
    pub password: String,
    pub database: String,
    #[serde(default = "default_charset")]
    pub charset: String,
}

/// Location of the symmetric key file.
#[derive(Debug, Serialize, Deserialize)]
pub struct EncryptionConfig {
    #[serde(default = "default_key_path")]
    pub key_path: PathBuf,
}

impl Default for EncryptionConfig {
    fn default() -> Self {
        Self {
            key_path: default_key_path(),
        }
    }
}

fn default_charset() -> String {
    "utf8mb4".to_string()
}

fn default_key_path() -> PathBuf {
    PathBuf::from("encryption.key")
}

/// Read and validate configuration from a TOML file.
///
/// # Errors
///
/// Returns `VaultError::Config` if the file cannot be read, does not parse,
/// or is missing a required database option.
pub fn read_config(path: &Path) -> Result<VaultConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| VaultError::Config(format!("failed to read {}: {}", path.display(), e)))?;
    toml::from_str(&contents)
        .map_err(|e| VaultError::Config(format!("failed to parse {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config_parses() {
        let config: VaultConfig = toml::from_str(
            r#"
            [database]
            host = "127.0.0.1"
            user = "vault"
            password = "secret"
            database = "credvault"
            charset = "utf8"

            [encryption]
            key_path = "/tmp/test.key"
            "#,
        )
        .unwrap();

        assert_eq!(config.database.host, "127.0.0.1");
        assert_eq!(config.database.charset, "utf8");
        assert_eq!(config.encryption.key_path, PathBuf::from("/tmp/test.key"));
    }

    #[test]
    fn test_charset_and_key_path_default() {
        let config: VaultConfig = toml::from_str(
            r#"
            [database]
            host = "localhost"
            user = "vault"
            password = "secret"
            database = "credvault"
            "#,
        )
        .unwrap();

        assert_eq!(config.database.charset, "utf8mb4");
        assert_eq!(
            config.encryption.key_path,
            PathBuf::from("encryption.key")
        );
    }

    #[test]
    fn test_missing_required_option_fails() {
        let result: std::result::Result<VaultConfig, _> = toml::from_str(
            r#"
            [database]
            host = "localhost"
            user = "vault"
            database = "credvault"
            "#,
        );
        let err = result.unwrap_err().to_string();
        assert!(err.contains("password"));
    }

    #[test]
    fn test_unrecognized_option_rejected() {
        let result: std::result::Result<VaultConfig, _> = toml::from_str(
            r#"
            [database]
            host = "localhost"
            user = "vault"
            password = "secret"
            database = "credvault"
            port = 3307
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_read_config_missing_file() {
        let result = read_config(Path::new("/nonexistent/credvault.toml"));
        assert!(matches!(result, Err(VaultError::Config(_))));
    }
}
