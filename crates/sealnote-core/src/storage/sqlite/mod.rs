//! SQLite storage backend.
//!
//! Vault records and the note collection live in one database. The
//! database only ever sees salts, iteration counts and envelopes; note
//! plaintext reaches it only for legacy unencrypted records.

mod row;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, OptionalExtension};
use tracing::debug;
use uuid::Uuid;

use crate::crypto::Envelope;
use crate::error::{Result, VaultError};
use crate::notes::StoredNote;
use crate::storage::traits::{NoteStore, VaultStore};
use crate::storage::types::VaultRecord;

use row::{format_timestamp, parse_timestamp, NoteRow};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS vaults (
        user_id TEXT PRIMARY KEY,
        salt BLOB NOT NULL,
        kdf_iterations INTEGER NOT NULL,
        probe TEXT,
        vault_marker INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS notes (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        title TEXT,
        content TEXT,
        tags_json TEXT NOT NULL,
        encrypted INTEGER NOT NULL,
        pinned INTEGER NOT NULL DEFAULT 0,
        archived INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS notes_by_user ON notes (user_id);
"#;

/// SQLite-backed vault and note store.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a database file.
    pub fn open(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "opening sqlite store");
        Self::init(Connection::open(path)?)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Lock the database connection, returning an error if the mutex is poisoned.
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| VaultError::Storage("SQLite connection poisoned".to_string()))
    }
}

impl VaultStore for SqliteStore {
    fn load_vault(&self, user_id: &str) -> Result<Option<VaultRecord>> {
        let conn = self.lock_conn()?;

        let row = conn
            .query_row(
                r#"
                SELECT salt, kdf_iterations, probe, created_at
                FROM vaults
                WHERE user_id = ? AND vault_marker = 1
                "#,
                [user_id],
                |row| {
                    Ok((
                        row.get::<_, Vec<u8>>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        let Some((salt, iterations, probe, created_at)) = row else {
            return Ok(None);
        };

        let kdf_iterations = u32::try_from(iterations).map_err(|_| {
            VaultError::VaultCorrupted(format!("Invalid iteration count: {}", iterations))
        })?;

        Ok(Some(VaultRecord {
            salt,
            kdf_iterations,
            probe: probe.map(Envelope::from_encoded),
            created_at: parse_timestamp(&created_at)?,
        }))
    }

    fn create_vault(&self, user_id: &str, record: &VaultRecord) -> Result<()> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        let marker: Option<bool> = tx
            .query_row(
                "SELECT vault_marker FROM vaults WHERE user_id = ?",
                [user_id],
                |row| row.get(0),
            )
            .optional()?;

        if marker == Some(true) {
            return Err(VaultError::VaultExists(user_id.to_string()));
        }

        // A row without the marker is a creation that never committed its
        // marker; it is not a vault and gets replaced.
        tx.execute(
            r#"
            INSERT OR REPLACE INTO vaults (
                user_id,
                salt,
                kdf_iterations,
                probe,
                vault_marker,
                created_at
            )
            VALUES (?, ?, ?, ?, 1, ?)
            "#,
            (
                user_id,
                &record.salt,
                i64::from(record.kdf_iterations),
                record.probe.as_ref().map(|p| p.as_str()),
                format_timestamp(&record.created_at),
            ),
        )?;

        tx.commit()?;
        Ok(())
    }

    fn store_probe(&self, user_id: &str, probe: &Envelope) -> Result<()> {
        let conn = self.lock_conn()?;

        let changed = conn.execute(
            r#"
            UPDATE vaults SET probe = ?
            WHERE user_id = ? AND vault_marker = 1 AND probe IS NULL
            "#,
            (probe.as_str(), user_id),
        )?;

        if changed == 0 {
            return Err(VaultError::VaultCorrupted(
                "Validation probe already present or vault missing".to_string(),
            ));
        }
        Ok(())
    }

    fn destroy_vault(&self, user_id: &str) -> Result<()> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        let removed = tx.execute("DELETE FROM vaults WHERE user_id = ?", [user_id])?;
        if removed == 0 {
            return Err(VaultError::NoSuchVault(user_id.to_string()));
        }
        tx.execute("DELETE FROM notes WHERE user_id = ?", [user_id])?;

        tx.commit()?;
        Ok(())
    }
}

impl NoteStore for SqliteStore {
    fn save_note(&self, user_id: &str, note: &StoredNote) -> Result<()> {
        let row = NoteRow::from_note(note)?;
        let conn = self.lock_conn()?;

        let changed = conn.execute(
            r#"
            INSERT INTO notes (
                id,
                user_id,
                title,
                content,
                tags_json,
                encrypted,
                pinned,
                archived,
                created_at,
                updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                content = excluded.content,
                tags_json = excluded.tags_json,
                encrypted = excluded.encrypted,
                pinned = excluded.pinned,
                archived = excluded.archived,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at
            WHERE notes.user_id = excluded.user_id
            "#,
            (
                &row.id,
                user_id,
                &row.title,
                &row.content,
                &row.tags_json,
                row.encrypted,
                row.pinned,
                row.archived,
                &row.created_at,
                &row.updated_at,
            ),
        )?;

        if changed == 0 {
            return Err(VaultError::Storage(format!(
                "Note {} belongs to another user",
                row.id
            )));
        }
        Ok(())
    }

    fn get_note(&self, id: &Uuid) -> Result<Option<StoredNote>> {
        let conn = self.lock_conn()?;

        let row = conn
            .query_row(
                &format!("SELECT {} FROM notes WHERE id = ?", NoteRow::COLUMNS),
                [id.to_string()],
                NoteRow::from_sql,
            )
            .optional()?;

        row.map(StoredNote::try_from).transpose()
    }

    fn list_notes(&self, user_id: &str) -> Result<Vec<StoredNote>> {
        let conn = self.lock_conn()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM notes WHERE user_id = ? ORDER BY pinned DESC, updated_at DESC",
            NoteRow::COLUMNS
        ))?;
        let rows = stmt
            .query_map([user_id], NoteRow::from_sql)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter().map(StoredNote::try_from).collect()
    }

    fn delete_note(&self, id: &Uuid) -> Result<()> {
        let conn = self.lock_conn()?;

        let removed = conn.execute("DELETE FROM notes WHERE id = ?", [id.to_string()])?;
        if removed == 0 {
            return Err(VaultError::NotFound(format!("Note {} not found", id)));
        }
        Ok(())
    }
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").finish_non_exhaustive()
    }
}
