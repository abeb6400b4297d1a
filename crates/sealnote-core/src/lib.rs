//! # Sealnote Core
//!
//! Core library for Sealnote - a client-held, passphrase-protected note store.
//!
//! This crate derives a vault key from the user's passphrase, seals note
//! fields before they reach persistence, and opens them again for display.
//! UI concerns (listing, filtering, editing) live outside and call in
//! through [`VaultKeyManager`].
//!
//! ## Architecture
//!
//! - **crypto**: PBKDF2 key derivation and AES-256-GCM envelopes
//! - **vault**: key manager, validation probe, lock state
//! - **notes**: note types and field-level encryption
//! - **storage**: vault/note store traits with memory and SQLite backends
//! - **config**: TOML configuration
//!
//! ## Example
//!
//! ```no_run
//! use secrecy::SecretString;
//! use sealnote_core::{MemoryStore, Note, NoteStore, StoredNote, VaultConfig, VaultKeyManager};
//!
//! # async fn demo() -> sealnote_core::Result<()> {
//! let manager = VaultKeyManager::new(MemoryStore::new(), VaultConfig::default())?;
//! let passphrase = SecretString::from("correct horse battery staple".to_string());
//!
//! manager.create_vault(&passphrase, "u1").await?;
//! let sealed = manager.encrypt_note(&Note::new("Groceries", "milk, eggs"))?;
//! manager.store().save_note("u1", &StoredNote::Encrypted(sealed))?;
//! manager.lock();
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod crypto;
pub mod error;
pub mod notes;
pub mod storage;
pub mod vault;

pub use config::VaultConfig;
pub use error::{Result, VaultError};
pub use notes::{Note, SealedNote, StoredNote};
pub use storage::{MemoryStore, NoteStore, SqliteStore, VaultRecord, VaultStore};
pub use vault::{UnlockOutcome, VaultKeyManager, VaultStatus};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
