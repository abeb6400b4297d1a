//! Error types for Sealnote core operations.
//!
//! This module defines the error hierarchy for all core operations.
//! Errors are descriptive at the core level; the embedding UI layer maps
//! these to user-friendly messages. No variant ever carries a passphrase,
//! key material, or note plaintext.

use thiserror::Error;
use uuid::Uuid;

/// Result type alias for Sealnote operations.
pub type Result<T> = std::result::Result<T, VaultError>;

/// Core error type for Sealnote operations.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Malformed arguments (empty salt, zero iterations, blank user id, weak passphrase)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No vault has been created for this user
    #[error("No vault exists for user {0}")]
    NoSuchVault(String),

    /// A vault already exists for this user
    #[error("A vault already exists for user {0}")]
    VaultExists(String),

    /// Wrong key, or ciphertext that was corrupted or tampered with.
    ///
    /// The two cases are deliberately indistinguishable.
    #[error("Invalid passphrase or corrupted data")]
    AuthenticationFailure,

    /// Persisting a new vault failed; nothing was made visible
    #[error("Vault creation failed: {0}")]
    VaultCreation(String),

    /// Vault record is present but unusable
    #[error("Vault is corrupted: {0}")]
    VaultCorrupted(String),

    /// A single note failed to open after the vault itself unlocked
    #[error("Note {note_id} could not be decrypted")]
    DecryptionPartialFailure { note_id: Uuid },

    /// Operation requires an unlocked vault
    #[error("Vault is locked")]
    NotUnlocked,

    /// A create/unlock finished after the vault was locked again
    #[error("Vault operation was superseded by a lock")]
    Superseded,

    /// Cryptographic primitive failure other than authentication
    #[error("Encryption error: {0}")]
    Crypto(String),

    /// Generic resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Storage backend error (generic)
    #[error("Storage error: {0}")]
    Storage(String),

    /// SQLite-specific storage error
    #[error("SQLite error: {source}")]
    Sqlite {
        #[from]
        source: rusqlite::Error,
    },

    /// I/O error
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    /// Configuration could not be parsed or is out of range
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error (fallback)
    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authentication_failure_message_is_generic() {
        let message = VaultError::AuthenticationFailure.to_string();
        assert_eq!(message, "Invalid passphrase or corrupted data");
    }

    #[test]
    fn test_partial_failure_names_the_note() {
        let note_id = Uuid::new_v4();
        let err = VaultError::DecryptionPartialFailure { note_id };
        assert!(err.to_string().contains(&note_id.to_string()));
    }
}
