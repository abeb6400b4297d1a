//! Notes and their field-level encryption.

pub mod codec;
pub mod types;

pub use codec::{decrypt_note, decrypt_notes, encrypt_note, seal_stored};
pub use types::{Note, SealedNote, StoredNote};
