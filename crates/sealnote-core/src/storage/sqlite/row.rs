//! Note row type for database queries.

use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::crypto::Envelope;
use crate::error::{Result, VaultError};
use crate::notes::{Note, SealedNote, StoredNote};

/// Raw row data from the notes table, before parsing into domain types.
#[derive(Debug)]
pub struct NoteRow {
    pub id: String,
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags_json: String,
    pub encrypted: bool,
    pub pinned: bool,
    pub archived: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl NoteRow {
    pub const COLUMNS: &'static str =
        "id, title, content, tags_json, encrypted, pinned, archived, created_at, updated_at";

    pub fn from_sql(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            content: row.get(2)?,
            tags_json: row.get(3)?,
            encrypted: row.get(4)?,
            pinned: row.get(5)?,
            archived: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }

    pub fn from_note(note: &StoredNote) -> Result<Self> {
        let row = match note {
            StoredNote::Plaintext(note) => Self {
                id: note.id.to_string(),
                title: Some(note.title.clone()),
                content: Some(note.content.clone()),
                tags_json: serde_json::to_string(&note.tags)?,
                encrypted: false,
                pinned: note.pinned,
                archived: note.archived,
                created_at: format_timestamp(&note.created_at),
                updated_at: format_timestamp(&note.updated_at),
            },
            StoredNote::Encrypted(note) => Self {
                id: note.id.to_string(),
                title: note.title.as_ref().map(|e| e.as_str().to_string()),
                content: note.content.as_ref().map(|e| e.as_str().to_string()),
                tags_json: serde_json::to_string(&note.tags)?,
                encrypted: true,
                pinned: note.pinned,
                archived: note.archived,
                created_at: format_timestamp(&note.created_at),
                updated_at: format_timestamp(&note.updated_at),
            },
        };
        Ok(row)
    }
}

/// Fixed-width RFC 3339 so that timestamp columns sort lexically.
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)
        .map_err(|e| VaultError::Storage(format!("Invalid timestamp: {}", e)))?
        .with_timezone(&Utc))
}

impl TryFrom<NoteRow> for StoredNote {
    type Error = VaultError;

    fn try_from(row: NoteRow) -> Result<Self> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| VaultError::Storage(format!("Invalid note UUID: {}", e)))?;
        let created_at = parse_timestamp(&row.created_at)?;
        let updated_at = parse_timestamp(&row.updated_at)?;

        if row.encrypted {
            let tags: Vec<Envelope> = serde_json::from_str(&row.tags_json)
                .map_err(|e| VaultError::Storage(format!("Invalid tags JSON: {}", e)))?;
            Ok(StoredNote::Encrypted(SealedNote {
                id,
                title: row.title.map(Envelope::from_encoded),
                content: row.content.map(Envelope::from_encoded),
                tags,
                pinned: row.pinned,
                archived: row.archived,
                created_at,
                updated_at,
            }))
        } else {
            let tags: Vec<String> = serde_json::from_str(&row.tags_json)
                .map_err(|e| VaultError::Storage(format!("Invalid tags JSON: {}", e)))?;
            Ok(StoredNote::Plaintext(Note {
                id,
                title: row.title.unwrap_or_default(),
                content: row.content.unwrap_or_default(),
                tags,
                pinned: row.pinned,
                archived: row.archived,
                created_at,
                updated_at,
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_format_is_fixed_width() {
        let whole = DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let fractional = DateTime::parse_from_rfc3339("2026-01-01T00:00:00.5Z")
            .unwrap()
            .with_timezone(&Utc);

        let a = format_timestamp(&whole);
        let b = format_timestamp(&fractional);
        assert_eq!(a.len(), b.len());
        assert!(a < b);
        assert_eq!(parse_timestamp(&b).unwrap(), fractional);
    }

    #[test]
    fn test_plaintext_row_with_null_fields() {
        let row = NoteRow {
            id: Uuid::new_v4().to_string(),
            title: None,
            content: None,
            tags_json: "[]".to_string(),
            encrypted: false,
            pinned: false,
            archived: true,
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: "2026-01-01T00:00:00Z".to_string(),
        };

        match StoredNote::try_from(row).unwrap() {
            StoredNote::Plaintext(note) => {
                assert!(note.title.is_empty());
                assert!(note.archived);
            }
            other => panic!("expected plaintext note, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_uuid_rejected() {
        let row = NoteRow {
            id: "not-a-uuid".to_string(),
            title: None,
            content: None,
            tags_json: "[]".to_string(),
            encrypted: true,
            pinned: false,
            archived: false,
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: "2026-01-01T00:00:00Z".to_string(),
        };

        assert!(matches!(
            StoredNote::try_from(row),
            Err(VaultError::Storage(_))
        ));
    }
}
