//! Field-level note encryption.
//!
//! Title, content and every tag are sealed as independent envelopes.
//! Opening is all-or-nothing per note: a key that fails one field must not
//! present the others.

use tracing::debug;

use crate::crypto::{open_str, seal_str, DerivedKey, Envelope};
use crate::error::{Result, VaultError};
use crate::notes::types::{Note, SealedNote, StoredNote};

/// Seal a plaintext note.
///
/// Empty title or content is left as `None` rather than sealing an empty
/// string. Tags are always sealed so the list round-trips exactly.
pub fn encrypt_note(note: &Note, key: &DerivedKey) -> Result<SealedNote> {
    let tags = note
        .tags
        .iter()
        .map(|tag| seal_str(key, tag))
        .collect::<Result<Vec<_>>>()?;

    Ok(SealedNote {
        id: note.id,
        title: seal_optional(&note.title, key)?,
        content: seal_optional(&note.content, key)?,
        tags,
        pinned: note.pinned,
        archived: note.archived,
        created_at: note.created_at,
        updated_at: note.updated_at,
    })
}

/// Seal a plaintext note into its persisted shape.
pub fn seal_stored(note: &Note, key: &DerivedKey) -> Result<StoredNote> {
    encrypt_note(note, key).map(StoredNote::Encrypted)
}

/// Recover a plaintext note.
///
/// Legacy plaintext records are returned unchanged.
///
/// # Errors
///
/// Returns `VaultError::AuthenticationFailure` if any field fails to open.
/// The caller must treat the whole note as undecryptable.
pub fn decrypt_note(stored: &StoredNote, key: &DerivedKey) -> Result<Note> {
    let sealed = match stored {
        StoredNote::Plaintext(note) => return Ok(note.clone()),
        StoredNote::Encrypted(sealed) => sealed,
    };

    let tags = sealed
        .tags
        .iter()
        .map(|tag| open_str(key, tag))
        .collect::<Result<Vec<_>>>()?;

    Ok(Note {
        id: sealed.id,
        title: open_optional(sealed.title.as_ref(), key)?,
        content: open_optional(sealed.content.as_ref(), key)?,
        tags,
        pinned: sealed.pinned,
        archived: sealed.archived,
        created_at: sealed.created_at,
        updated_at: sealed.updated_at,
    })
}

/// Decrypt a collection, isolating notes that fail to open.
///
/// Each failing note becomes `VaultError::DecryptionPartialFailure` carrying
/// its id, so the caller can skip or report it and still show the rest.
pub fn decrypt_notes(stored: &[StoredNote], key: &DerivedKey) -> Vec<Result<Note>> {
    stored
        .iter()
        .map(|note| {
            decrypt_note(note, key).map_err(|err| match err {
                VaultError::AuthenticationFailure => {
                    debug!(note_id = %note.id(), "note failed to open");
                    VaultError::DecryptionPartialFailure { note_id: note.id() }
                }
                other => other,
            })
        })
        .collect()
}

fn seal_optional(value: &str, key: &DerivedKey) -> Result<Option<Envelope>> {
    if value.is_empty() {
        return Ok(None);
    }
    seal_str(key, value).map(Some)
}

fn open_optional(envelope: Option<&Envelope>, key: &DerivedKey) -> Result<String> {
    match envelope {
        Some(envelope) => open_str(key, envelope),
        None => Ok(String::new()),
    }
}
