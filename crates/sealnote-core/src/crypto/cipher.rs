//! AES-256-GCM envelopes.
//!
//! Every seal draws a fresh 96-bit nonce from the OS CSPRNG and produces a
//! self-contained envelope:
//!
//! ```text
//! base64( nonce (12 bytes) | ciphertext | tag (16 bytes) )
//! ```
//!
//! The base64 text is the only persisted form of ciphertext, so it has to
//! survive a plain string column unchanged.

use std::fmt;

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::crypto::key::DerivedKey;
use crate::error::{Result, VaultError};

/// Size of AES-GCM nonce in bytes.
pub const NONCE_LENGTH: usize = 12;

/// Size of AES-GCM authentication tag in bytes.
pub const TAG_LENGTH: usize = 16;

/// A sealed payload in its storable text form.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Envelope(String);

impl Envelope {
    /// Wrap an encoded envelope read back from storage.
    ///
    /// No validation happens here; a malformed value fails at [`open`].
    pub fn from_encoded(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Envelope").field(&self.0.len()).finish()
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Encrypt `plaintext` under `key` into a new envelope.
///
/// Two calls with the same key and plaintext never produce the same
/// envelope.
///
/// # Examples
///
/// ```
/// use sealnote_core::crypto::{derive_key, open, seal};
///
/// let key = derive_key("my-passphrase", b"unique-salt-per-vault", 1_000).unwrap();
/// let envelope = seal(&key, b"secret data").unwrap();
/// assert_eq!(open(&key, &envelope).unwrap(), b"secret data");
/// ```
pub fn seal(key: &DerivedKey, plaintext: &[u8]) -> Result<Envelope> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| VaultError::Crypto(format!("Failed to create cipher: {}", e)))?;

    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|e| VaultError::Crypto(format!("Encryption failed: {}", e)))?;

    let mut blob = Vec::with_capacity(NONCE_LENGTH + ciphertext.len());
    blob.extend_from_slice(&nonce);
    blob.extend_from_slice(&ciphertext);

    Ok(Envelope(STANDARD.encode(blob)))
}

/// Decrypt an envelope produced by [`seal`].
///
/// # Errors
///
/// Returns `VaultError::AuthenticationFailure` if:
/// - The envelope is not valid base64
/// - The envelope is too short to hold a nonce and tag
/// - The tag does not verify (wrong key, corrupted or tampered data)
pub fn open(key: &DerivedKey, envelope: &Envelope) -> Result<Vec<u8>> {
    let blob = STANDARD
        .decode(envelope.as_str())
        .map_err(|_| VaultError::AuthenticationFailure)?;

    if blob.len() < NONCE_LENGTH + TAG_LENGTH {
        return Err(VaultError::AuthenticationFailure);
    }

    let (nonce_bytes, ciphertext) = blob.split_at(NONCE_LENGTH);
    let nonce = Nonce::from_slice(nonce_bytes);

    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| VaultError::Crypto(format!("Failed to create cipher: {}", e)))?;

    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| VaultError::AuthenticationFailure)
}

/// Seal a UTF-8 string.
pub fn seal_str(key: &DerivedKey, plaintext: &str) -> Result<Envelope> {
    seal(key, plaintext.as_bytes())
}

/// Open an envelope that is expected to hold UTF-8 text.
///
/// Bytes that verify but are not UTF-8 cannot have come from [`seal_str`]
/// and are reported as `AuthenticationFailure`.
pub fn open_str(key: &DerivedKey, envelope: &Envelope) -> Result<String> {
    let bytes = open(key, envelope)?;
    String::from_utf8(bytes).map_err(|_| VaultError::AuthenticationFailure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::key::derive_key;

    fn test_key(passphrase: &str) -> DerivedKey {
        derive_key(passphrase, b"cipher-test-salt", 1_000).unwrap()
    }

    #[test]
    fn test_seal_open_round_trip() {
        let key = test_key("test-passphrase-secure-123");
        let plaintext = b"Hello, World! This is secret data.";

        let envelope = seal(&key, plaintext).unwrap();
        let opened = open(&key, &envelope).unwrap();

        assert_eq!(opened, plaintext);
    }

    #[test]
    fn test_envelope_layout() {
        let key = test_key("test-passphrase-secure-123");
        let plaintext = b"twelve bytes";

        let envelope = seal(&key, plaintext).unwrap();
        let blob = STANDARD.decode(envelope.as_str()).unwrap();

        assert_eq!(blob.len(), NONCE_LENGTH + plaintext.len() + TAG_LENGTH);
    }

    #[test]
    fn test_same_plaintext_different_envelopes() {
        let key = test_key("test-passphrase-secure-123");
        let plaintext = b"same plaintext";

        let envelope1 = seal(&key, plaintext).unwrap();
        let envelope2 = seal(&key, plaintext).unwrap();

        assert_ne!(envelope1, envelope2);
        assert_eq!(open(&key, &envelope1).unwrap(), plaintext);
        assert_eq!(open(&key, &envelope2).unwrap(), plaintext);
    }

    #[test]
    fn test_wrong_key_fails() {
        let key1 = test_key("correct-passphrase-123");
        let key2 = test_key("wrong-passphrase-456");

        let envelope = seal(&key1, b"secret data").unwrap();

        let result = open(&key2, &envelope);
        assert!(matches!(result, Err(VaultError::AuthenticationFailure)));
    }

    #[test]
    fn test_tampered_envelope_fails() {
        let key = test_key("test-passphrase-secure-123");
        let envelope = seal(&key, b"secret data").unwrap();

        let mut blob = STANDARD.decode(envelope.as_str()).unwrap();
        let last = blob.len() - 1;
        blob[last] ^= 0x01;
        let tampered = Envelope::from_encoded(STANDARD.encode(blob));

        let result = open(&key, &tampered);
        assert!(matches!(result, Err(VaultError::AuthenticationFailure)));
    }

    #[test]
    fn test_malformed_envelopes_fail_as_authentication() {
        let key = test_key("test-passphrase-secure-123");

        let not_base64 = Envelope::from_encoded("not base64 at all!");
        assert!(matches!(
            open(&key, &not_base64),
            Err(VaultError::AuthenticationFailure)
        ));

        let too_short = Envelope::from_encoded(STANDARD.encode([0u8; NONCE_LENGTH]));
        assert!(matches!(
            open(&key, &too_short),
            Err(VaultError::AuthenticationFailure)
        ));
    }

    #[test]
    fn test_empty_plaintext() {
        let key = test_key("test-passphrase-secure-123");

        let envelope = seal(&key, b"").unwrap();
        assert!(open(&key, &envelope).unwrap().is_empty());
    }

    #[test]
    fn test_string_helpers_handle_non_ascii() {
        let key = test_key("test-passphrase-secure-123");
        let text = "Einkäufe: Milch, Eier 🥚";

        let envelope = seal_str(&key, text).unwrap();
        assert_eq!(open_str(&key, &envelope).unwrap(), text);
    }

    #[test]
    fn test_open_str_rejects_non_utf8() {
        let key = test_key("test-passphrase-secure-123");
        let envelope = seal(&key, &[0xff, 0xfe, 0xfd]).unwrap();

        assert!(matches!(
            open_str(&key, &envelope),
            Err(VaultError::AuthenticationFailure)
        ));
    }

    #[test]
    fn test_envelope_debug_hides_contents() {
        let key = test_key("test-passphrase-secure-123");
        let envelope = seal(&key, b"secret data").unwrap();

        let debug_output = format!("{:?}", envelope);
        assert!(!debug_output.contains(envelope.as_str()));
    }
}
