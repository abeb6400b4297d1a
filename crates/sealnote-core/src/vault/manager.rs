//! Vault key manager.
//!
//! Owns the salt lifecycle, derives keys, verifies passphrases against the
//! validation probe, and holds the active key while the vault is unlocked.
//!
//! A passphrase is verified by opening the probe: a known constant sealed
//! under the vault key at creation time. AES-GCM authentication rejects any
//! other key, so no password hash is ever stored.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};

use crate::config::VaultConfig;
use crate::crypto::{derive_key, generate_salt, open, seal, validate_passphrase, DerivedKey};
use crate::error::{Result, VaultError};
use crate::notes::{self, Note, SealedNote, StoredNote};
use crate::storage::{VaultRecord, VaultStore};
use crate::vault::state::{StateMachine, VaultStatus};

/// Plaintext sealed into every validation probe.
pub const VALIDATION_PROBE_PLAINTEXT: &[u8] = b"sealnote-vault-validation-v1";

/// Result of an unlock attempt that ran to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockOutcome {
    /// Passphrase verified against the validation probe
    Granted,

    /// Legacy vault without a probe; a probe was sealed under this passphrase
    Bootstrapped,

    /// Passphrase did not open the probe
    Denied,
}

impl UnlockOutcome {
    pub fn is_unlocked(self) -> bool {
        !matches!(self, UnlockOutcome::Denied)
    }
}

/// Holds at most one active vault key per instance.
///
/// Share by reference (or `Arc`) with whatever needs to encrypt. Create,
/// unlock and lock are expected to be serialized by the caller; if a lock
/// lands while a create or unlock is still deriving, the late key is
/// discarded.
pub struct VaultKeyManager<S> {
    store: S,
    config: VaultConfig,
    machine: Mutex<StateMachine>,
}

impl<S: VaultStore> VaultKeyManager<S> {
    /// # Errors
    ///
    /// Returns `VaultError::Config` if the configuration fails validation.
    pub fn new(store: S, config: VaultConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store,
            config,
            machine: Mutex::new(StateMachine::default()),
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    pub fn status(&self) -> VaultStatus {
        self.machine().status()
    }

    pub fn is_unlocked(&self) -> bool {
        self.status() == VaultStatus::Unlocked
    }

    /// User whose vault is currently unlocked.
    pub fn active_user(&self) -> Option<String> {
        self.machine().user_id().map(str::to_string)
    }

    pub fn vault_exists(&self, user_id: &str) -> Result<bool> {
        self.store.vault_exists(user_id)
    }

    /// Create a vault for `user_id` and leave it unlocked.
    ///
    /// Salt, probe and the existence marker are persisted in one store call.
    ///
    /// # Errors
    ///
    /// - `VaultError::InvalidInput` for a blank user id or weak passphrase
    /// - `VaultError::VaultExists` if the user already has a vault
    /// - `VaultError::VaultCreation` if persistence fails; no vault is left behind
    /// - `VaultError::Superseded` if `lock()` ran before creation finished.
    ///   The vault exists and can be unlocked.
    pub async fn create_vault(&self, passphrase: &SecretString, user_id: &str) -> Result<()> {
        validate_user_id(user_id)?;
        validate_passphrase(passphrase.expose_secret())?;

        if self.store.vault_exists(user_id)? {
            return Err(VaultError::VaultExists(user_id.to_string()));
        }

        let attempt = self.machine().begin();
        debug!(user_id, attempt, "creating vault");

        match self.seal_new_vault(passphrase, user_id).await {
            Ok(key) => {
                if self.machine().complete(attempt, user_id, Arc::new(key)) {
                    info!(user_id, "vault created");
                    Ok(())
                } else {
                    debug!(user_id, attempt, "vault created after lock; key discarded");
                    Err(VaultError::Superseded)
                }
            }
            Err(err) => {
                self.machine().abandon(attempt);
                Err(err)
            }
        }
    }

    /// Try to unlock `user_id`'s vault with `passphrase`.
    ///
    /// A wrong passphrase is not an error: it yields `UnlockOutcome::Denied`
    /// and leaves the vault locked.
    ///
    /// # Errors
    ///
    /// - `VaultError::NoSuchVault` if the user has no vault
    /// - `VaultError::VaultCorrupted` if the vault has no probe and probe
    ///   bootstrap is disabled
    /// - `VaultError::Superseded` if `lock()` ran before derivation finished
    pub async fn unlock(&self, passphrase: &SecretString, user_id: &str) -> Result<UnlockOutcome> {
        let record = self
            .store
            .load_vault(user_id)?
            .ok_or_else(|| VaultError::NoSuchVault(user_id.to_string()))?;

        if record.probe.is_none() && !self.config.unlock.allow_probe_bootstrap {
            warn!(user_id, "vault has no validation probe");
            return Err(VaultError::VaultCorrupted(
                "Vault has no validation probe".to_string(),
            ));
        }

        let attempt = self.machine().begin();
        debug!(user_id, attempt, "unlocking vault");

        match self.verify(passphrase, user_id, record, attempt).await {
            Ok(Some((key, outcome))) => {
                if self.machine().complete(attempt, user_id, Arc::new(key)) {
                    info!(user_id, ?outcome, "vault unlocked");
                    Ok(outcome)
                } else {
                    debug!(user_id, attempt, "unlock finished after lock; key discarded");
                    Err(VaultError::Superseded)
                }
            }
            Ok(None) => {
                self.machine().abandon(attempt);
                info!(user_id, "unlock denied");
                Ok(UnlockOutcome::Denied)
            }
            Err(VaultError::Superseded) => {
                debug!(user_id, attempt, "probe bootstrap cancelled by lock; nothing stored");
                Err(VaultError::Superseded)
            }
            Err(err) => {
                self.machine().abandon(attempt);
                Err(err)
            }
        }
    }

    /// Drop the active key. Idempotent; also cancels any in-flight attempt.
    pub fn lock(&self) {
        let mut machine = self.machine();
        if machine.status() != VaultStatus::Locked {
            info!("vault locked");
        }
        machine.lock();
    }

    /// The active key.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::NotUnlocked` unless the vault is unlocked.
    pub fn active_key(&self) -> Result<Arc<DerivedKey>> {
        self.machine().key().ok_or(VaultError::NotUnlocked)
    }

    /// Destroy the unlocked vault: salt, probe, marker and all of its notes.
    ///
    /// Only the currently unlocked vault can be destroyed. Locks first.
    pub fn destroy_vault(&self) -> Result<()> {
        let user_id = self.active_user().ok_or(VaultError::NotUnlocked)?;
        self.lock();
        self.store.destroy_vault(&user_id)?;
        info!(user_id = %user_id, "vault destroyed");
        Ok(())
    }

    /// Seal a note under the active key.
    pub fn encrypt_note(&self, note: &Note) -> Result<SealedNote> {
        let key = self.active_key()?;
        notes::encrypt_note(note, &key)
    }

    /// Open a stored note under the active key.
    pub fn decrypt_note(&self, stored: &StoredNote) -> Result<Note> {
        let key = self.active_key()?;
        notes::decrypt_note(stored, &key)
    }

    /// Open a collection under the active key, isolating corrupt notes.
    pub fn decrypt_notes(&self, stored: &[StoredNote]) -> Result<Vec<Result<Note>>> {
        let key = self.active_key()?;
        Ok(notes::decrypt_notes(stored, &key))
    }

    async fn seal_new_vault(&self, passphrase: &SecretString, user_id: &str) -> Result<DerivedKey> {
        let salt = generate_salt().to_vec();
        let iterations = self.config.kdf.iterations;

        let key = derive(passphrase, salt.clone(), iterations).await?;
        let probe = seal(&key, VALIDATION_PROBE_PLAINTEXT)?;

        self.store
            .create_vault(user_id, &VaultRecord::new(salt, iterations, probe))
            .map_err(|err| match err {
                VaultError::VaultExists(user) => VaultError::VaultExists(user),
                other => VaultError::VaultCreation(other.to_string()),
            })?;

        Ok(key)
    }

    /// Derive and check a candidate key. `Ok(None)` means the passphrase is wrong.
    async fn verify(
        &self,
        passphrase: &SecretString,
        user_id: &str,
        record: VaultRecord,
        attempt: u64,
    ) -> Result<Option<(DerivedKey, UnlockOutcome)>> {
        let key = derive(passphrase, record.salt, record.kdf_iterations).await?;

        let Some(probe) = record.probe else {
            // Only reachable with bootstrap enabled; the store refuses to
            // replace a probe that appeared in the meantime.
            let probe = seal(&key, VALIDATION_PROBE_PLAINTEXT)?;
            {
                // A lock cannot slip in between the check and the write.
                let machine = self.machine();
                if !machine.is_current(attempt) {
                    return Err(VaultError::Superseded);
                }
                self.store.store_probe(user_id, &probe)?;
            }
            warn!(user_id, "sealed validation probe for legacy vault");
            return Ok(Some((key, UnlockOutcome::Bootstrapped)));
        };

        match open(&key, &probe) {
            Ok(plaintext) if plaintext == VALIDATION_PROBE_PLAINTEXT => {
                Ok(Some((key, UnlockOutcome::Granted)))
            }
            Ok(_) | Err(VaultError::AuthenticationFailure) => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn machine(&self) -> MutexGuard<'_, StateMachine> {
        // Every transition is a single assignment, so a poisoned state is still consistent.
        self.machine.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S> std::fmt::Debug for VaultKeyManager<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultKeyManager")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Run PBKDF2 on the blocking pool.
async fn derive(passphrase: &SecretString, salt: Vec<u8>, iterations: u32) -> Result<DerivedKey> {
    let passphrase = SecretString::from(passphrase.expose_secret().to_owned());
    tokio::task::spawn_blocking(move || derive_key(passphrase.expose_secret(), &salt, iterations))
        .await
        .map_err(|e| VaultError::Other(format!("Key derivation task failed: {}", e)))?
}

fn validate_user_id(user_id: &str) -> Result<()> {
    if user_id.trim().is_empty() {
        return Err(VaultError::InvalidInput(
            "User id cannot be empty".to_string(),
        ));
    }
    Ok(())
}
