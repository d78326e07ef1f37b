//! Identity-field and search-term hygiene shared by storage backends.

use crate::error::{Result, VaultError};

/// Trim an identity pair and require both halves non-empty.
///
/// The trimmed pair is what gets persisted and matched, so upsert and delete
/// agree on what "the exact pair" means.
pub fn trimmed_identity<'a>(service: &'a str, username: &'a str) -> Result<(&'a str, &'a str)> {
    let service = service.trim();
    let username = username.trim();

    if service.is_empty() {
        return Err(VaultError::EmptyInput("service"));
    }
    if username.is_empty() {
        return Err(VaultError::EmptyInput("username"));
    }

    Ok((service, username))
}

/// Escape SQL `LIKE` wildcards so a search term stays a substring match.
pub fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_trimmed() {
        let (service, username) = trimmed_identity("  github ", "alice\n").unwrap();
        assert_eq!(service, "github");
        assert_eq!(username, "alice");
    }

    #[test]
    fn test_identity_empty_rejected() {
        assert!(matches!(
            trimmed_identity("", "alice"),
            Err(VaultError::EmptyInput("service"))
        ));
        assert!(matches!(
            trimmed_identity("github", "   "),
            Err(VaultError::EmptyInput("username"))
        ));
    }

    #[test]
    fn test_escape_like_wildcards() {
        assert_eq!(escape_like("100%_done"), "100\\%\\_done");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
        assert_eq!(escape_like("plain"), "plain");
    }
}
