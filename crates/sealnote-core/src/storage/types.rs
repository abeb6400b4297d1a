//! Persisted vault record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::crypto::Envelope;

/// Per-user key material record.
///
/// Holds nothing secret: the salt is public by design and the probe is
/// ciphertext. A store only returns a record whose creation completed, so
/// a visible record doubles as the vault-exists marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultRecord {
    /// Salt mixed into key derivation; fixed for the vault's lifetime
    pub salt: Vec<u8>,

    /// PBKDF2 iterations the vault was created with
    pub kdf_iterations: u32,

    /// Sealed validation constant. `None` only for vaults written before
    /// probes existed.
    pub probe: Option<Envelope>,

    /// When this vault was created
    pub created_at: DateTime<Utc>,
}

impl VaultRecord {
    pub fn new(salt: Vec<u8>, kdf_iterations: u32, probe: Envelope) -> Self {
        Self {
            salt,
            kdf_iterations,
            probe: Some(probe),
            created_at: Utc::now(),
        }
    }

    /// A record as written before validation probes existed.
    pub fn legacy(salt: Vec<u8>, kdf_iterations: u32) -> Self {
        Self {
            salt,
            kdf_iterations,
            probe: None,
            created_at: Utc::now(),
        }
    }
}
