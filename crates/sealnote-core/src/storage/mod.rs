//! Storage abstraction for Sealnote.
//!
//! This module defines the `VaultStore` and `NoteStore` traits and the
//! record type they persist.
//!
//! ## Architecture
//!
//! The storage layer is backend-agnostic:
//! - `MemoryStore`: process-local maps, for tests and ephemeral sessions
//! - `SqliteStore`: a single SQLite database file
//!
//! ## Security
//!
//! Storage engines never see a passphrase or a derived key. They are
//! responsible for:
//! - Making vault creation atomic
//! - Never replacing an existing validation probe

pub mod memory;
pub mod sqlite;
pub mod traits;
pub mod types;

// Re-export public types
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{NoteStore, VaultStore};
pub use types::VaultRecord;
