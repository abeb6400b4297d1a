//! In-memory store.
//!
//! Backs tests and ephemeral sessions. Nothing survives the process.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use uuid::Uuid;

use crate::crypto::Envelope;
use crate::error::{Result, VaultError};
use crate::notes::StoredNote;
use crate::storage::traits::{NoteStore, VaultStore};
use crate::storage::types::VaultRecord;

#[derive(Debug, Default)]
pub struct MemoryStore {
    vaults: Mutex<HashMap<String, VaultRecord>>,
    notes: Mutex<HashMap<Uuid, (String, StoredNote)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record as-is, bypassing creation checks.
    ///
    /// Used when importing vaults from another store, including records
    /// written before validation probes existed. A record that already
    /// carries a probe is never replaced.
    pub fn import_vault(&self, user_id: &str, record: VaultRecord) -> Result<()> {
        let mut vaults = self.lock_vaults()?;
        if vaults.get(user_id).is_some_and(|existing| existing.probe.is_some()) {
            return Err(VaultError::VaultExists(user_id.to_string()));
        }
        vaults.insert(user_id.to_string(), record);
        Ok(())
    }

    fn lock_vaults(&self) -> Result<MutexGuard<'_, HashMap<String, VaultRecord>>> {
        self.vaults
            .lock()
            .map_err(|_| VaultError::Storage("Vault map poisoned".to_string()))
    }

    fn lock_notes(&self) -> Result<MutexGuard<'_, HashMap<Uuid, (String, StoredNote)>>> {
        self.notes
            .lock()
            .map_err(|_| VaultError::Storage("Note map poisoned".to_string()))
    }
}

impl VaultStore for MemoryStore {
    fn load_vault(&self, user_id: &str) -> Result<Option<VaultRecord>> {
        Ok(self.lock_vaults()?.get(user_id).cloned())
    }

    fn create_vault(&self, user_id: &str, record: &VaultRecord) -> Result<()> {
        let mut vaults = self.lock_vaults()?;
        if vaults.contains_key(user_id) {
            return Err(VaultError::VaultExists(user_id.to_string()));
        }
        vaults.insert(user_id.to_string(), record.clone());
        Ok(())
    }

    fn store_probe(&self, user_id: &str, probe: &Envelope) -> Result<()> {
        let mut vaults = self.lock_vaults()?;
        match vaults.get_mut(user_id) {
            Some(record) if record.probe.is_none() => {
                record.probe = Some(probe.clone());
                Ok(())
            }
            Some(_) => Err(VaultError::VaultCorrupted(
                "Validation probe already present".to_string(),
            )),
            None => Err(VaultError::VaultCorrupted(format!(
                "No vault record for user {}",
                user_id
            ))),
        }
    }

    fn destroy_vault(&self, user_id: &str) -> Result<()> {
        let mut vaults = self.lock_vaults()?;
        if vaults.remove(user_id).is_none() {
            return Err(VaultError::NoSuchVault(user_id.to_string()));
        }
        self.lock_notes()?.retain(|_, (owner, _)| owner != user_id);
        Ok(())
    }
}

impl NoteStore for MemoryStore {
    fn save_note(&self, user_id: &str, note: &StoredNote) -> Result<()> {
        let mut notes = self.lock_notes()?;
        if let Some((owner, _)) = notes.get(&note.id()) {
            if owner != user_id {
                return Err(VaultError::Storage(format!(
                    "Note {} belongs to another user",
                    note.id()
                )));
            }
        }
        notes.insert(note.id(), (user_id.to_string(), note.clone()));
        Ok(())
    }

    fn get_note(&self, id: &Uuid) -> Result<Option<StoredNote>> {
        Ok(self.lock_notes()?.get(id).map(|(_, note)| note.clone()))
    }

    fn list_notes(&self, user_id: &str) -> Result<Vec<StoredNote>> {
        let mut notes: Vec<StoredNote> = self
            .lock_notes()?
            .values()
            .filter(|(owner, _)| owner == user_id)
            .map(|(_, note)| note.clone())
            .collect();
        notes.sort_by(|a, b| {
            b.pinned()
                .cmp(&a.pinned())
                .then_with(|| b.updated_at().cmp(&a.updated_at()))
        });
        Ok(notes)
    }

    fn delete_note(&self, id: &Uuid) -> Result<()> {
        match self.lock_notes()?.remove(id) {
            Some(_) => Ok(()),
            None => Err(VaultError::NotFound(format!("Note {} not found", id))),
        }
    }
}
