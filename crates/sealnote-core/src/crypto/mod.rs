//! Cryptographic operations for Sealnote.
//!
//! This module provides key derivation and envelope encryption using
//! well-audited libraries:
//! - **PBKDF2-HMAC-SHA256**: salted, slow key derivation
//! - **AES-256-GCM**: authenticated encryption, one random nonce per seal
//!
//! ## Security Model
//!
//! - One key per vault, derived from the passphrase and a per-user salt
//! - Key material zeroized from memory on drop
//! - No plaintext passphrases or password hashes stored; a sealed constant
//!   (the validation probe) is what verifies a passphrase
//!
//! ## Threat Model
//!
//! We defend against:
//! - Theft of the persisted vault and notes
//! - Offline brute-force attacks on the passphrase
//!
//! We do NOT defend against:
//! - Compromised OS / keylogger
//! - Access to an unlocked session / process memory

pub mod cipher;
pub mod key;
pub mod passphrase;

pub use cipher::{open, open_str, seal, seal_str, Envelope, NONCE_LENGTH, TAG_LENGTH};
pub use key::{
    derive_key, generate_salt, DerivedKey, DEFAULT_KDF_ITERATIONS, KEY_LENGTH,
    MIN_KDF_ITERATIONS, SALT_LENGTH,
};
pub use passphrase::validate_passphrase;
