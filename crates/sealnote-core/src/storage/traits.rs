//! Storage traits.
//!
//! The vault core never touches a database directly. It reads and writes
//! per-user key material through [`VaultStore`] and hands encrypted notes to
//! a [`NoteStore`]. Both are synchronous; implementations serialize access
//! internally.

use uuid::Uuid;

use super::types::VaultRecord;
use crate::crypto::Envelope;
use crate::error::Result;
use crate::notes::StoredNote;

/// Key-value store for per-user vault records.
///
/// All implementations must ensure:
/// - `create_vault` is atomic: salt, probe and existence marker become
///   visible together or not at all
/// - A probe, once stored, is never replaced
pub trait VaultStore: Send + Sync {
    /// Load the vault record for a user.
    ///
    /// # Returns
    ///
    /// Returns `Ok(Some(record))` if a completed vault exists, `Ok(None)` if not.
    fn load_vault(&self, user_id: &str) -> Result<Option<VaultRecord>>;

    /// Whether a completed vault exists for a user.
    fn vault_exists(&self, user_id: &str) -> Result<bool> {
        Ok(self.load_vault(user_id)?.is_some())
    }

    /// Persist a new vault record and mark the vault as existing.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::VaultExists` if a completed vault is already
    /// present, or a storage error if the write fails. On error nothing is
    /// visible to `load_vault`.
    fn create_vault(&self, user_id: &str, record: &VaultRecord) -> Result<()>;

    /// Attach a probe to an existing vault that has none.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::VaultCorrupted` if the vault is missing or
    /// already has a probe.
    fn store_probe(&self, user_id: &str, probe: &Envelope) -> Result<()>;

    /// Remove the vault record and every note belonging to the user.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::NoSuchVault` if there is nothing to remove.
    fn destroy_vault(&self, user_id: &str) -> Result<()>;
}

/// Persistence for the note collection.
///
/// Stores whatever shape it is given; encryption happens before notes get
/// here.
pub trait NoteStore: Send + Sync {
    /// Insert or replace a note owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::Storage` if the id already belongs to another user.
    fn save_note(&self, user_id: &str, note: &StoredNote) -> Result<()>;

    /// Get a note by ID.
    ///
    /// # Returns
    ///
    /// Returns `Ok(Some(note))` if found, `Ok(None)` if not found.
    fn get_note(&self, id: &Uuid) -> Result<Option<StoredNote>>;

    /// List a user's notes, pinned first, then most recently updated.
    fn list_notes(&self, user_id: &str) -> Result<Vec<StoredNote>>;

    /// Delete a note.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::NotFound` if the note doesn't exist.
    fn delete_note(&self, id: &Uuid) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_traits_are_object_safe() {
        fn _accepts_vault_store(_store: &dyn VaultStore) {}
        fn _accepts_note_store(_store: &dyn NoteStore) {}
    }
}
