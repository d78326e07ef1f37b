//! MySQL-backed credential store.
//!
//! One long-lived connection, opened at startup and released by `close`.
//! The table is created on connect if it does not exist; the uniqueness of
//! `(service, username)` is the table's own constraint.

use chrono::NaiveDateTime;
use mysql::prelude::Queryable;
use mysql::{Conn, OptsBuilder};
use tracing::{debug, error, info, warn};

use super::traits::CredentialStore;
use super::types::{Credential, SaveOutcome};
use super::validation::{escape_like, trimmed_identity};
use crate::config::DatabaseConfig;
use crate::error::{Result, VaultError};

/// MySQL error code for a unique-key violation (ER_DUP_ENTRY).
const ER_DUP_ENTRY: u16 = 1062;

/// Format used to read `created_at` back out of the backend.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const SELECT_COLUMNS: &str = "SELECT service, username, encrypted_password, \
     DATE_FORMAT(created_at, '%Y-%m-%dT%H:%i:%S') \
     FROM credentials";

/// MySQL credential store.
pub struct MysqlStore {
    conn: Conn,
}

impl MysqlStore {
    /// Connect using the configured options and ensure the schema exists.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::ConnectionFailure` if the backend is unreachable
    /// or the options are wrong. The message names host and database, never
    /// the password.
    pub fn connect(config: &DatabaseConfig) -> Result<Self> {
        let opts = OptsBuilder::new()
            .ip_or_hostname(Some(config.host.clone()))
            .user(Some(config.user.clone()))
            .pass(Some(config.password.clone()))
            .db_name(Some(config.database.clone()))
            .init(vec![format!("SET NAMES {}", config.charset)]);

        let conn = Conn::new(opts).map_err(|e| {
            error!(
                host = %config.host,
                database = %config.database,
                "database connection failed: {}", e
            );
            VaultError::ConnectionFailure(format!(
                "cannot reach {}/{}: {}",
                config.host, config.database, e
            ))
        })?;

        let mut store = Self { conn };
        store.ensure_schema()?;

        info!(
            host = %config.host,
            database = %config.database,
            "connected to credential database"
        );
        Ok(store)
    }

    fn ensure_schema(&mut self) -> Result<()> {
        self.conn.query_drop(
            r#"
            CREATE TABLE IF NOT EXISTS credentials (
                id INT AUTO_INCREMENT PRIMARY KEY,
                service VARCHAR(255) NOT NULL,
                username VARCHAR(255) NOT NULL,
                encrypted_password VARCHAR(512) NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                UNIQUE KEY uniq_service_username (service, username)
            ) CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci
            "#,
        )?;
        Ok(())
    }

    fn rows_to_credentials(
        rows: Vec<(String, String, String, String)>,
    ) -> Result<Vec<Credential>> {
        rows.into_iter()
            .map(|(service, username, encrypted_password, created_at)| {
                let created_at = NaiveDateTime::parse_from_str(&created_at, TIMESTAMP_FORMAT)
                    .map_err(|e| {
                        VaultError::Other(format!("invalid created_at from backend: {}", e))
                    })?;
                Ok(Credential {
                    service,
                    username,
                    encrypted_password,
                    created_at,
                })
            })
            .collect()
    }
}

impl CredentialStore for MysqlStore {
    fn upsert(
        &mut self,
        service: &str,
        username: &str,
        encrypted_password: &str,
    ) -> Result<SaveOutcome> {
        let (service, username) = trimmed_identity(service, username)?;

        let existing: Option<u64> = self.conn.exec_first(
            "SELECT id FROM credentials WHERE service = ? AND username = ?",
            (service, username),
        )?;

        let outcome = if existing.is_some() {
            self.conn.exec_drop(
                "UPDATE credentials \
                 SET encrypted_password = ?, created_at = CURRENT_TIMESTAMP \
                 WHERE service = ? AND username = ?",
                (encrypted_password, service, username),
            )?;
            SaveOutcome::Updated
        } else {
            self.conn
                .exec_drop(
                    "INSERT INTO credentials (service, username, encrypted_password) \
                     VALUES (?, ?, ?)",
                    (service, username, encrypted_password),
                )
                .map_err(|e| duplicate_or_database(e, service, username))?;
            SaveOutcome::Created
        };

        info!(service, username, outcome = outcome.as_str(), "credential saved");
        Ok(outcome)
    }

    fn list_all(&mut self) -> Result<Vec<Credential>> {
        let rows = self
            .conn
            .query(format!("{} ORDER BY service, username", SELECT_COLUMNS))?;
        let credentials = Self::rows_to_credentials(rows)?;
        debug!(count = credentials.len(), "loaded credential rows");
        Ok(credentials)
    }

    fn search(&mut self, term: &str) -> Result<Vec<Credential>> {
        let pattern = format!("%{}%", escape_like(term));
        let rows = self.conn.exec(
            format!(
                "{} WHERE service LIKE ? ORDER BY service, username",
                SELECT_COLUMNS
            ),
            (pattern,),
        )?;
        let credentials = Self::rows_to_credentials(rows)?;
        debug!(term, count = credentials.len(), "search finished");
        Ok(credentials)
    }

    fn delete(&mut self, service: &str, username: &str) -> Result<()> {
        let (service, username) = trimmed_identity(service, username)?;

        self.conn.exec_drop(
            "DELETE FROM credentials WHERE service = ? AND username = ?",
            (service, username),
        )?;

        if self.conn.affected_rows() == 0 {
            warn!(service, username, "delete target not found");
            return Err(VaultError::NotFound {
                service: service.to_string(),
                username: username.to_string(),
            });
        }

        info!(service, username, "credential deleted");
        Ok(())
    }

    fn test_connection(&mut self) -> Result<()> {
        let _: Option<i32> = self.conn.query_first("SELECT 1")?;
        debug!("connectivity probe succeeded");
        Ok(())
    }

    fn close(self) -> Result<()> {
        info!("closing database connection");
        drop(self.conn);
        Ok(())
    }
}

/// Map a uniqueness conflict on insert to `DuplicateViolation`; anything
/// else stays a database error.
fn duplicate_or_database(err: mysql::Error, service: &str, username: &str) -> VaultError {
    match err {
        mysql::Error::MySqlError(ref server) if server.code == ER_DUP_ENTRY => {
            VaultError::DuplicateViolation {
                service: service.to_string(),
                username: username.to_string(),
            }
        }
        other => other.into(),
    }
}
