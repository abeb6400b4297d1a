//! Note data types.
//!
//! A note exists in one of two shapes: [`Note`], the plaintext form the UI
//! works with while the vault is unlocked, and [`SealedNote`], the form the
//! persistence layer holds. [`StoredNote`] is what comes back from storage
//! and may be either, since older records were written before encryption.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::crypto::Envelope;

/// A note in plaintext form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Unique identifier for this note
    pub id: Uuid,

    pub title: String,

    pub content: String,

    pub tags: Vec<String>,

    pub pinned: bool,

    pub archived: bool,

    /// When this note was created
    pub created_at: DateTime<Utc>,

    /// Last edit timestamp
    pub updated_at: DateTime<Utc>,
}

impl Note {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            content: content.into(),
            tags: Vec::new(),
            pinned: false,
            archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_pinned(mut self, pinned: bool) -> Self {
        self.pinned = pinned;
        self
    }

    pub fn with_archived(mut self, archived: bool) -> Self {
        self.archived = archived;
        self
    }

    pub fn with_updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = updated_at;
        self
    }
}

/// A note whose text fields are individually sealed.
///
/// Each field gets its own envelope, so field lengths leak at ciphertext
/// granularity. Empty title or content is stored as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedNote {
    pub id: Uuid,

    pub title: Option<Envelope>,

    pub content: Option<Envelope>,

    pub tags: Vec<Envelope>,

    pub pinned: bool,

    pub archived: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// A note as held by persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoredNote {
    /// Legacy record written before encryption was enabled
    Plaintext(Note),

    Encrypted(SealedNote),
}

impl StoredNote {
    pub fn id(&self) -> Uuid {
        match self {
            StoredNote::Plaintext(note) => note.id,
            StoredNote::Encrypted(note) => note.id,
        }
    }

    pub fn is_encrypted(&self) -> bool {
        matches!(self, StoredNote::Encrypted(_))
    }

    pub fn pinned(&self) -> bool {
        match self {
            StoredNote::Plaintext(note) => note.pinned,
            StoredNote::Encrypted(note) => note.pinned,
        }
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        match self {
            StoredNote::Plaintext(note) => note.updated_at,
            StoredNote::Encrypted(note) => note.updated_at,
        }
    }
}

impl From<SealedNote> for StoredNote {
    fn from(note: SealedNote) -> Self {
        StoredNote::Encrypted(note)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_note_defaults() {
        let note = Note::new("Groceries", "milk, eggs");

        assert!(!note.id.is_nil());
        assert!(note.tags.is_empty());
        assert!(!note.pinned);
        assert!(!note.archived);
        assert_eq!(note.created_at, note.updated_at);
    }

    #[test]
    fn test_stored_note_discriminant() {
        let note = Note::new("Groceries", "milk, eggs").with_pinned(true);
        let id = note.id;
        let stored = StoredNote::Plaintext(note);

        assert!(!stored.is_encrypted());
        assert!(stored.pinned());
        assert_eq!(stored.id(), id);
    }

    #[test]
    fn test_stored_note_serializes_with_kind_tag() {
        let stored = StoredNote::Plaintext(Note::new("a", "b"));
        let json = serde_json::to_value(&stored).unwrap();
        assert_eq!(json["kind"], "plaintext");
    }
}
