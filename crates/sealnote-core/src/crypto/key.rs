//! Key derivation using PBKDF2-HMAC-SHA256.
//!
//! This module turns a passphrase and a per-user salt into the 256-bit key
//! used to seal note fields. The iteration count makes offline brute-force
//! against a captured salt and validation probe expensive.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::OsRng;
use sha2::Sha256;
use zeroize::ZeroizeOnDrop;

use crate::error::{Result, VaultError};

/// Iteration count used for new vaults unless configured otherwise.
pub const DEFAULT_KDF_ITERATIONS: u32 = 100_000;

/// Lowest iteration count accepted from configuration.
pub const MIN_KDF_ITERATIONS: u32 = 100_000;

/// Length of a per-user salt in bytes.
pub const SALT_LENGTH: usize = 16;

/// Length of derived key in bytes (32 bytes = 256 bits for AES-256-GCM).
pub const KEY_LENGTH: usize = 32;

/// A cryptographic key derived from a passphrase.
///
/// This type ensures that key material is securely zeroized from memory
/// when dropped, reducing the window of exposure.
#[derive(Clone, ZeroizeOnDrop)]
pub struct DerivedKey {
    /// The raw key bytes (zeroized on drop)
    key: [u8; KEY_LENGTH],
}

impl DerivedKey {
    /// Create a new DerivedKey from raw bytes.
    ///
    /// # Security
    ///
    /// The caller is responsible for ensuring the bytes come from a secure source.
    pub(crate) fn from_bytes(bytes: [u8; KEY_LENGTH]) -> Self {
        Self { key: bytes }
    }

    /// Get a reference to the raw key bytes.
    ///
    /// # Security
    ///
    /// Avoid storing or logging this value. Use only for immediate encryption operations.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Derive an encryption key from a passphrase using PBKDF2-HMAC-SHA256.
///
/// # Arguments
///
/// * `passphrase` - The passphrase to derive from
/// * `salt` - The vault's salt (must be unique per vault)
/// * `iterations` - PBKDF2 work factor
///
/// # Security
///
/// - Same passphrase + salt + iterations always produces same key (deterministic)
/// - Different salt produces different key (salt must be stored with the vault)
///
/// # Errors
///
/// Returns `VaultError::InvalidInput` for an empty salt or a zero iteration
/// count. Both indicate a programming error in the caller.
///
/// # Examples
///
/// ```
/// use sealnote_core::crypto::derive_key;
///
/// let salt = b"unique-salt-per-vault";
/// let key = derive_key("my-passphrase", salt, 1_000).unwrap();
/// assert_eq!(key.as_bytes().len(), 32);
/// ```
pub fn derive_key(passphrase: &str, salt: &[u8], iterations: u32) -> Result<DerivedKey> {
    if salt.is_empty() {
        return Err(VaultError::InvalidInput("Salt cannot be empty".to_string()));
    }

    if iterations == 0 {
        return Err(VaultError::InvalidInput(
            "Iteration count must be positive".to_string(),
        ));
    }

    let mut key_bytes = [0u8; KEY_LENGTH];
    pbkdf2::pbkdf2_hmac::<Sha256>(passphrase.as_bytes(), salt, iterations, &mut key_bytes);

    Ok(DerivedKey::from_bytes(key_bytes))
}

/// Generate a fresh random salt from the OS CSPRNG.
///
/// Called once per vault; the result is persisted next to the vault record.
pub fn generate_salt() -> [u8; SALT_LENGTH] {
    let mut salt = [0u8; SALT_LENGTH];
    OsRng.fill_bytes(&mut salt);
    salt
}
